//! Renderer-facing data
//!
//! CPU-side mesh layout and the per-frame extraction of object constants and
//! draw ranges from a resolved [`Scene`](crate::scene::Scene).

pub mod mesh;
pub mod extract;

pub use mesh::{Mesh, ShaderKind, SubMesh, Vertex};
pub use extract::{extract, DrawItem, FrameData, ObjectConstants};
