//! Transform hierarchy engine
//!
//! [`Transforms`] is a short-lived mutable view over the transform pool that
//! also sees the registry and the scene graph. Every local edit marks the
//! transform and its subtree fully dirty; the once-per-frame
//! [`Transforms::update`] pass then recomputes world matrices parent first.
//!
//! Dirty counter values:
//!
//! - `full_dirty` (frames in flight + 1): local data changed, world matrix stale
//! - `full_dirty - 1`: world matrix current, GPU copies still to refresh
//! - down to [`CLEAN`]: every GPU copy refreshed, entity leaves the dirty set
//!
//! Entities without a transform are transparent: they pass dirtiness on to
//! their children, and children compose with the nearest ancestor that has a
//! transform.

use crate::ecs::components::{Transform, TransformInfo, CLEAN};
use crate::ecs::{EcsResult, Entity, IdentityRegistry, Pool};
use crate::foundation::math::{self, utils, Mat4, Point3, Vec3};

use super::Hierarchy;

/// Outcome of one frame's resolve pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolveReport {
    /// Entities whose GPU constants must be rewritten this frame
    pub refreshed: Vec<Entity>,
    /// World matrices recomputed
    pub resolved: usize,
    /// Entities that became clean and left the dirty set
    pub evicted: usize,
}

/// Mutable view over the transform pool, scoped to one scene borrow
pub struct Transforms<'s> {
    registry: &'s IdentityRegistry,
    hierarchy: &'s Hierarchy,
    pool: &'s mut Pool<Transform>,
}

impl<'s> Transforms<'s> {
    pub(crate) fn new(registry: &'s IdentityRegistry, hierarchy: &'s Hierarchy, pool: &'s mut Pool<Transform>) -> Self {
        Self { registry, hierarchy, pool }
    }

    /// Underlying pool, for read access
    pub fn pool(&self) -> &Pool<Transform> {
        &*self.pool
    }

    fn row(&self, entity: Entity) -> EcsResult<usize> {
        self.registry.check(entity)?;
        self.pool.row(entity)
    }

    // --- getters ---

    /// Local position
    pub fn position(&self, entity: Entity) -> EcsResult<Vec3> {
        self.registry.check(entity)?;
        self.pool.position(entity)
    }

    /// Local rotation in degrees
    pub fn rotation(&self, entity: Entity) -> EcsResult<Vec3> {
        self.registry.check(entity)?;
        self.pool.rotation(entity)
    }

    /// Local scale
    pub fn scale(&self, entity: Entity) -> EcsResult<Vec3> {
        self.registry.check(entity)?;
        self.pool.scale(entity)
    }

    /// Cached world matrix
    pub fn world(&self, entity: Entity) -> EcsResult<Mat4> {
        self.registry.check(entity)?;
        self.pool.world(entity)
    }

    /// Cached inverse world matrix
    pub fn inverse_world(&self, entity: Entity) -> EcsResult<Mat4> {
        self.registry.check(entity)?;
        self.pool.inverse_world(entity)
    }

    /// World-space position
    pub fn world_position(&self, entity: Entity) -> EcsResult<Vec3> {
        self.registry.check(entity)?;
        self.pool.world_position(entity)
    }

    /// World-space scale
    pub fn world_scale(&self, entity: Entity) -> EcsResult<Vec3> {
        self.registry.check(entity)?;
        self.pool.world_scale(entity)
    }

    /// World-space rotation in degrees
    pub fn world_rotation(&self, entity: Entity) -> EcsResult<Vec3> {
        self.registry.check(entity)?;
        self.pool.world_rotation(entity)
    }

    /// Dirty counter
    pub fn dirty(&self, entity: Entity) -> EcsResult<u8> {
        self.registry.check(entity)?;
        self.pool.dirty(entity)
    }

    // --- local setters ---

    /// Set the local position
    pub fn set_position(&mut self, entity: Entity, position: Vec3) -> EcsResult<()> {
        let row = self.row(entity)?;
        self.pool.parts_mut().1.set_position(row, position);
        self.mark_dirty(entity);
        Ok(())
    }

    /// Set the local rotation in degrees
    pub fn set_rotation(&mut self, entity: Entity, degrees: Vec3) -> EcsResult<()> {
        let row = self.row(entity)?;
        self.pool
            .parts_mut()
            .1
            .set_rotation_radians(row, utils::vec_to_radians(&degrees));
        self.mark_dirty(entity);
        Ok(())
    }

    /// Set the local scale
    pub fn set_scale(&mut self, entity: Entity, scale: Vec3) -> EcsResult<()> {
        let row = self.row(entity)?;
        self.pool.parts_mut().1.set_scale(row, scale);
        self.mark_dirty(entity);
        Ok(())
    }

    /// Replace position, rotation and scale at once
    pub fn set_local(&mut self, entity: Entity, local: TransformInfo) -> EcsResult<()> {
        let row = self.row(entity)?;
        let storage = self.pool.parts_mut().1;
        storage.set_position(row, local.position);
        storage.set_rotation_radians(row, utils::vec_to_radians(&local.rotation));
        storage.set_scale(row, local.scale);
        self.mark_dirty(entity);
        Ok(())
    }

    // --- world setters ---

    /// Move the entity so its world position becomes `position`
    pub fn set_world_position(&mut self, entity: Entity, position: Vec3) -> EcsResult<()> {
        let row = self.row(entity)?;
        let parent_inverse = match self.parent_transform(entity) {
            Some(parent) => {
                self.resolve_entity(parent);
                self.pool.inverse_world(parent)?
            }
            None => Mat4::identity(),
        };
        let local = parent_inverse.transform_point(&Point3::from(position)).coords;
        self.pool.parts_mut().1.set_position(row, local);
        self.finish_world_set(entity, row);
        Ok(())
    }

    /// Scale the entity so its world scale becomes `scale`
    pub fn set_world_scale(&mut self, entity: Entity, scale: Vec3) -> EcsResult<()> {
        let row = self.row(entity)?;
        let local = match self.parent_world(entity) {
            Some(parent) => math::divide_scale(&scale, &math::scale(&parent)),
            None => scale,
        };
        self.pool.parts_mut().1.set_scale(row, local);
        self.finish_world_set(entity, row);
        Ok(())
    }

    /// Rotate the entity so its world rotation becomes `degrees`
    pub fn set_world_rotation(&mut self, entity: Entity, degrees: Vec3) -> EcsResult<()> {
        let row = self.row(entity)?;
        let radians = utils::vec_to_radians(&degrees);
        let local = match self.parent_world(entity) {
            Some(parent) => {
                let desired = math::euler_rotation(&radians);
                math::euler_angles(&(math::rotation(&parent).inverse() * desired))
            }
            None => radians,
        };
        self.pool.parts_mut().1.set_rotation_radians(row, local);
        self.finish_world_set(entity, row);
        Ok(())
    }

    /// Recompute the world matrix right away and invalidate the subtree
    fn finish_world_set(&mut self, entity: Entity, row: usize) {
        let parent = self.parent_world(entity).unwrap_or_else(Mat4::identity);
        let storage = self.pool.parts_mut().1;
        let world = parent * storage.local_matrix(row);
        storage.set_world(row, world);
        let world_set = storage.world_set_dirty();
        storage.set_dirty_at(row, world_set);
        storage.dirty_set_mut().insert(entity);
        self.mark_children_dirty(entity);
    }

    // --- dirty state machine ---

    /// Invalidate the entity's world matrix and every descendant's
    pub fn set_dirty(&mut self, entity: Entity) -> EcsResult<()> {
        self.row(entity)?;
        self.mark_dirty(entity);
        Ok(())
    }

    /// Recompute the world matrix if it is stale.
    ///
    /// Returns whether anything was recomputed.
    pub fn resolve(&mut self, entity: Entity) -> EcsResult<bool> {
        self.row(entity)?;
        Ok(self.resolve_entity(entity))
    }

    /// Count one GPU copy as refreshed without recomputing anything
    pub fn un_dirty(&mut self, entity: Entity) -> EcsResult<()> {
        let row = self.row(entity)?;
        self.un_dirty_row(entity, row);
        Ok(())
    }

    /// Once-per-frame pass over the dirty set.
    ///
    /// Every member is decremented exactly once: stale members are resolved
    /// (parents first), the rest are un-dirtied. Members reaching zero leave
    /// the set.
    pub fn update(&mut self) -> ResolveReport {
        let full = self.pool.storage().full_dirty();
        let pending: Vec<Entity> = self.pool.pending().collect();
        let (stale, settling): (Vec<Entity>, Vec<Entity>) = pending
            .iter()
            .copied()
            .partition(|&entity| self.pool.dirty(entity) == Ok(full));

        // A stale member may already have been resolved as some child's parent.
        for &entity in &stale {
            self.resolve_entity(entity);
        }
        for &entity in &settling {
            if let Ok(row) = self.pool.row(entity) {
                self.un_dirty_row(entity, row);
            }
        }

        let report = ResolveReport {
            resolved: stale.len(),
            evicted: pending.iter().filter(|&&entity| !self.pool.is_pending(entity)).count(),
            refreshed: pending,
        };
        log::trace!(
            "Transform pass: {} refreshed, {} resolved, {} evicted, {} pending",
            report.refreshed.len(),
            report.resolved,
            report.evicted,
            self.pool.pending_len()
        );
        report
    }

    /// Mark `entity` fully dirty and propagate to its subtree
    pub(crate) fn mark_dirty(&mut self, entity: Entity) {
        if let Ok(row) = self.pool.row(entity) {
            let storage = self.pool.parts_mut().1;
            let full = storage.full_dirty();
            let dirty = storage.dirty_at(row);
            if dirty == full {
                return;
            }
            if dirty == CLEAN {
                storage.dirty_set_mut().insert(entity);
            }
            storage.set_dirty_at(row, full);
        }
        self.mark_children_dirty(entity);
    }

    /// Mark every child subtree of `entity` fully dirty
    pub(crate) fn mark_children_dirty(&mut self, entity: Entity) {
        let hierarchy = self.hierarchy;
        for &child in hierarchy.children(entity) {
            self.mark_dirty(child);
        }
    }

    /// Nearest ancestor owning a transform
    fn parent_transform(&self, entity: Entity) -> Option<Entity> {
        let mut current = self.hierarchy.parent(entity);
        while let Some(parent) = current {
            if self.pool.contains(parent) {
                return Some(parent);
            }
            current = self.hierarchy.parent(parent);
        }
        None
    }

    /// Up-to-date world matrix of the nearest transformed ancestor
    fn parent_world(&mut self, entity: Entity) -> Option<Mat4> {
        let parent = self.parent_transform(entity)?;
        self.resolve_entity(parent);
        self.pool.world(parent).ok()
    }

    fn resolve_entity(&mut self, entity: Entity) -> bool {
        let Ok(row) = self.pool.row(entity) else {
            return false;
        };
        let full = self.pool.storage().full_dirty();
        if self.pool.storage().dirty_at(row) != full {
            return false;
        }

        let parent = self.parent_world(entity).unwrap_or_else(Mat4::identity);
        let storage = self.pool.parts_mut().1;
        let world = parent * storage.local_matrix(row);
        storage.set_world(row, world);
        storage.set_dirty_at(row, full - 1);
        true
    }

    fn un_dirty_row(&mut self, entity: Entity, row: usize) {
        let storage = self.pool.parts_mut().1;
        let dirty = storage.dirty_at(row).saturating_sub(1);
        storage.set_dirty_at(row, dirty);
        if dirty == CLEAN {
            storage.dirty_set_mut().remove(&entity);
        }
    }
}
