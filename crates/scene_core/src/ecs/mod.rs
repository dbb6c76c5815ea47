//! Entity-Component-System implementation
//!
//! Generational entity identifiers, structure-of-arrays component pools and
//! the built-in components.

pub mod entity;
pub mod error;
pub mod component;
pub mod pool;
pub mod components;

pub use entity::{Entity, IdentityRegistry};
pub use error::{EcsError, EcsResult};
pub use component::{Component, ComponentHandle, Storage};
pub use pool::Pool;
pub(crate) use pool::ErasedPool;
