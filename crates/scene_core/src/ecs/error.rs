//! Error types for entity and component operations

use super::Entity;

/// Errors raised by the registry, pools and scene graph
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum EcsError {
    /// The identifier's generation no longer matches the live slot
    #[error("Stale identifier: entity {0} is no longer alive")]
    StaleIdentifier(Entity),

    /// The entity does not own a component of this type
    #[error("Component {component} not found on entity {entity}")]
    ComponentNotFound {
        /// Entity that was looked up
        entity: Entity,
        /// Component type name
        component: &'static str,
    },

    /// The entity already owns a component of this type
    #[error("Component {component} already attached to entity {entity}")]
    DuplicateComponent {
        /// Entity the component was added to
        entity: Entity,
        /// Component type name
        component: &'static str,
    },

    /// Reparenting would make an entity its own ancestor
    #[error("Reparenting entity {entity} under {parent} would create a cycle")]
    CycleDetected {
        /// Entity being moved
        entity: Entity,
        /// Requested parent
        parent: Entity,
    },

    /// The identifier index space is used up
    #[error("Entity capacity exhausted: {capacity} live entities")]
    CapacityExhausted {
        /// Configured capacity
        capacity: u32,
    },
}

impl EcsError {
    /// Whether callers can reasonably continue after this error
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Self::CapacityExhausted { .. })
    }
}

/// Result alias for entity and component operations
pub type EcsResult<T> = Result<T, EcsError>;
