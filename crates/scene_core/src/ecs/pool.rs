//! Per-component-type pools
//!
//! A [`Pool`] maps entities to dense rows of its component's column storage:
//!
//! - `sparse[entity.index()]` → dense row (or `INVALID_ROW`)
//! - `owners[row]`            → entity owning that row
//! - `storage`                → the component's columns, row-aligned with `owners`
//!
//! Removal swap-removes, so dense rows move. Only entity-keyed access stays
//! valid across removals.

use std::any::Any;

use super::{Component, ComponentHandle, EcsError, EcsResult, Entity, Storage};

const INVALID_ROW: u32 = u32::MAX;

/// Structure-of-arrays store for one component type
pub struct Pool<C: Component> {
    sparse: Vec<u32>,
    owners: Vec<Entity>,
    storage: C::Storage,
}

impl<C: Component> Pool<C> {
    /// Create an empty pool
    pub fn new() -> Self {
        Self::from_storage(C::Storage::default())
    }

    /// Create an empty pool with room for `capacity` rows
    pub fn with_capacity(capacity: usize) -> Self {
        let mut pool = Self::new();
        pool.reserve(capacity);
        pool
    }

    /// Create a pool around pre-configured (empty) column storage
    pub fn from_storage(storage: C::Storage) -> Self {
        debug_assert!(storage.is_empty(), "pool storage must start empty");
        Self {
            sparse: Vec::new(),
            owners: Vec::new(),
            storage,
        }
    }

    /// Reserve room for `additional` rows
    pub fn reserve(&mut self, additional: usize) {
        self.owners.reserve(additional);
        self.storage.reserve(additional);
    }

    /// Attach the component to `entity`, appending a row to every column
    pub fn add(&mut self, entity: Entity, info: C::InitInfo) -> EcsResult<ComponentHandle<C>> {
        let slot = entity.index() as usize;
        if self.sparse.get(slot).is_some_and(|&row| row != INVALID_ROW) {
            // Either this entity or an older generation of its slot owns a row.
            return Err(EcsError::DuplicateComponent { entity, component: C::NAME });
        }

        let row = u32::try_from(self.owners.len())
            .ok()
            .filter(|&row| row != INVALID_ROW)
            .ok_or(EcsError::CapacityExhausted { capacity: INVALID_ROW })?;

        if slot >= self.sparse.len() {
            self.sparse.resize(slot + 1, INVALID_ROW);
        }
        self.sparse[slot] = row;
        self.owners.push(entity);
        self.storage.push(entity, info);
        debug_assert_eq!(self.owners.len(), self.storage.len());

        Ok(ComponentHandle::new(entity))
    }

    /// Detach the component from `entity` with an O(1) swap-remove
    pub fn remove(&mut self, entity: Entity) -> EcsResult<()> {
        let row = self.row(entity)?;
        let last = self.owners.len() - 1;

        self.storage.swap_remove(row, entity);
        self.owners.swap_remove(row);

        if row != last {
            let moved = self.owners[row];
            #[allow(clippy::cast_possible_truncation)]
            {
                self.sparse[moved.index() as usize] = row as u32;
            }
        }
        self.sparse[entity.index() as usize] = INVALID_ROW;
        debug_assert_eq!(self.owners.len(), self.storage.len());

        Ok(())
    }

    /// Dense row currently holding `entity`'s component
    pub fn row(&self, entity: Entity) -> EcsResult<usize> {
        self.sparse
            .get(entity.index() as usize)
            .copied()
            .filter(|&row| row != INVALID_ROW)
            .map(|row| row as usize)
            .filter(|&row| self.owners[row] == entity)
            .ok_or(EcsError::ComponentNotFound { entity, component: C::NAME })
    }

    /// Whether `entity` owns this component
    pub fn contains(&self, entity: Entity) -> bool {
        self.row(entity).is_ok()
    }

    /// Number of attached components
    pub fn count(&self) -> usize {
        self.owners.len()
    }

    /// Whether no entity owns this component
    pub fn is_empty(&self) -> bool {
        self.owners.is_empty()
    }

    /// Owners in dense-row order; `entities()[row]` owns `row`
    pub fn entities(&self) -> &[Entity] {
        &self.owners
    }

    /// Column storage, for systems streaming over whole columns
    pub fn storage(&self) -> &C::Storage {
        &self.storage
    }

    /// Owner list and mutable columns at the same time
    pub(crate) fn parts_mut(&mut self) -> (&[Entity], &mut C::Storage) {
        (&self.owners, &mut self.storage)
    }

    /// Resolve `entity` and hand its row with mutable column access
    pub(crate) fn row_mut(&mut self, entity: Entity) -> EcsResult<(usize, &mut C::Storage)> {
        let row = self.row(entity)?;
        Ok((row, &mut self.storage))
    }

    /// Check the sparse/dense/owner invariants
    #[cfg(test)]
    pub(crate) fn assert_consistent(&self) {
        assert_eq!(self.owners.len(), self.storage.len());
        for (row, &owner) in self.owners.iter().enumerate() {
            assert_eq!(self.sparse[owner.index() as usize] as usize, row);
        }
        let mapped = self.sparse.iter().filter(|&&row| row != INVALID_ROW).count();
        assert_eq!(mapped, self.owners.len());
    }
}

impl<C: Component> Default for Pool<C> {
    fn default() -> Self {
        Self::new()
    }
}

/// Type-erased view of a pool, used by the scene to manage entity lifecycle
/// without knowing every component type
pub(crate) trait ErasedPool: Any {
    /// Remove the entity's component if it has one
    fn remove_entity(&mut self, entity: Entity) -> bool;

    /// Number of attached components
    fn len(&self) -> usize;

    /// Component type name
    fn component_name(&self) -> &'static str;

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<C: Component> ErasedPool for Pool<C> {
    fn remove_entity(&mut self, entity: Entity) -> bool {
        self.remove(entity).is_ok()
    }

    fn len(&self) -> usize {
        self.count()
    }

    fn component_name(&self) -> &'static str {
        C::NAME
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
