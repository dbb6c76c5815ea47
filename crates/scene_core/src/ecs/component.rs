//! Component and column-storage traits

use std::fmt;
use std::marker::PhantomData;

use super::{EcsResult, Entity, Pool};
use crate::scene::Scene;

/// A component type that can be attached to entities.
///
/// Implementors are usually zero-sized markers; the data lives in
/// [`Component::Storage`], one column per field.
pub trait Component: 'static {
    /// Human readable name used in errors and logs
    const NAME: &'static str;

    /// Value consumed when the component is attached
    type InitInfo;

    /// Structure-of-arrays column storage for this component
    type Storage: Storage<InitInfo = Self::InitInfo>;

    /// Called by the scene after the component has been attached
    fn on_attach(_scene: &mut Scene, _entity: Entity) {}

    /// Called by the scene after the component has been detached while the
    /// entity stays alive
    fn on_detach(_scene: &mut Scene, _entity: Entity) {}
}

/// Dense column storage driven by a [`Pool`].
///
/// Rows are appended and swap-removed in lockstep with the pool's owner list;
/// row `i` of every column belongs to the same entity.
pub trait Storage: Default + 'static {
    /// Value consumed by [`Storage::push`]
    type InitInfo;

    /// Reserve room for `additional` rows in every column
    fn reserve(&mut self, additional: usize);

    /// Append one row built from `info`
    fn push(&mut self, owner: Entity, info: Self::InitInfo);

    /// Remove `row` by moving the last row into its place
    fn swap_remove(&mut self, row: usize, owner: Entity);

    /// Number of rows
    fn len(&self) -> usize;

    /// Whether the storage has no rows
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Typed reference to a component attached to an entity.
///
/// Holds only the entity; data is always reached through the pool so the
/// handle stays valid when other rows are swap-removed.
pub struct ComponentHandle<C: Component> {
    entity: Entity,
    _marker: PhantomData<fn() -> C>,
}

impl<C: Component> ComponentHandle<C> {
    pub(crate) const fn new(entity: Entity) -> Self {
        Self { entity, _marker: PhantomData }
    }

    /// Entity owning the component
    pub const fn entity(&self) -> Entity {
        self.entity
    }

    /// Current dense row of the component in `pool`
    pub fn row(&self, pool: &Pool<C>) -> EcsResult<usize> {
        pool.row(self.entity)
    }

    /// Whether the component is still attached
    pub fn is_attached(&self, pool: &Pool<C>) -> bool {
        pool.contains(self.entity)
    }
}

impl<C: Component> Clone for ComponentHandle<C> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<C: Component> Copy for ComponentHandle<C> {}

impl<C: Component> PartialEq for ComponentHandle<C> {
    fn eq(&self, other: &Self) -> bool {
        self.entity == other.entity
    }
}

impl<C: Component> Eq for ComponentHandle<C> {}

impl<C: Component> fmt::Debug for ComponentHandle<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({:?})", C::NAME, self.entity)
    }
}
