//! ECS Components module
//!
//! Built-in components: transform hierarchy data, renderable geometry,
//! editor metadata and user scripts.

pub mod transform;
pub mod geometry;
pub mod metadata;
pub mod script;

pub use transform::{Transform, TransformInfo, TransformStorage, CLEAN};
pub use geometry::{Geometry, GeometryInfo, GeometryStorage};
pub use metadata::{Metadata, MetadataInfo, MetadataStorage};
pub use script::{Script, ScriptBehaviour, ScriptFlags, ScriptInfo, ScriptStorage};
