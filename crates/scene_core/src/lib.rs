//! # Scene Core
//!
//! Entity/component storage and hierarchical transform propagation for a
//! real-time 3D engine.
//!
//! ## Features
//!
//! - **Generational Entities**: Recycled indices never alias a destroyed entity
//! - **SoA Component Pools**: Dense per-component columns with O(1) swap-remove
//! - **Scene Graph**: Ordered parent/child hierarchy with recursive destruction
//! - **Deferred Transforms**: Dirty-counter driven world matrix resolution,
//!   parent before child, once per frame
//! - **Render Extraction**: GPU-ready object constants and draw ranges
//!
//! ## Quick Start
//!
//! ```rust
//! use scene_core::prelude::*;
//!
//! fn main() -> Result<(), EcsError> {
//!     let mut scene = Scene::new();
//!     let ship = scene.spawn(None, TransformInfo::from_position(Vec3::new(0.0, 0.0, -5.0)))?;
//!     let turret = scene.spawn(Some(ship), TransformInfo::from_position(Vec3::new(0.0, 1.0, 0.0)))?;
//!     scene.add_component::<Geometry>(turret, Mesh::cube().into())?;
//!
//!     scene.transforms().set_rotation(ship, Vec3::new(0.0, 90.0, 0.0))?;
//!     scene.update(1.0 / 60.0);
//!
//!     let frame = extract(&scene);
//!     assert_eq!(frame.draws.len(), 1);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::must_use_candidate)]

pub mod foundation;
pub mod config;
pub mod ecs;
pub mod scene;
pub mod render;

/// Common imports for crate users
pub mod prelude {
    pub use crate::{
        config::{Config, ConfigError, SceneConfig},
        ecs::{
            components::{
                Geometry, GeometryInfo, Metadata, MetadataInfo, Script, ScriptBehaviour, ScriptFlags, ScriptInfo,
                Transform, TransformInfo,
            },
            Component, ComponentHandle, EcsError, EcsResult, Entity, Pool, Storage,
        },
        foundation::math::{Mat4, Vec3},
        render::{extract, DrawItem, FrameData, Mesh, ObjectConstants, ShaderKind, SubMesh, Vertex},
        scene::{ResolveReport, Scene, Transforms},
    };
}
