//! Transform component for the ECS system
//!
//! Local position / rotation / scale plus cached world and inverse-world
//! matrices, stored column by column. The per-row dirty counter and the
//! pool-wide dirty set drive the deferred resolve pass in
//! [`Transforms`](crate::scene::Transforms).
//!
//! Rotations are exposed in degrees and stored in radians.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::ecs::{Component, EcsResult, Entity, Pool, Storage};
use crate::foundation::math::{self, utils, Mat4, Vec3};
use crate::scene::Scene;

/// Dirty counter of a transform whose world matrix is up to date everywhere
pub const CLEAN: u8 = 0;

/// Frames in flight assumed when no configuration is given
pub const DEFAULT_FRAMES_IN_FLIGHT: u8 = 3;

/// Initial local transform of a newly attached component
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformInfo {
    /// Local position
    pub position: Vec3,

    /// Local Euler rotation in degrees
    pub rotation: Vec3,

    /// Local scale factors
    pub scale: Vec3,
}

impl Default for TransformInfo {
    fn default() -> Self {
        Self {
            position: Vec3::zeros(),
            rotation: Vec3::zeros(),
            scale: Vec3::new(1.0, 1.0, 1.0),
        }
    }
}

impl TransformInfo {
    /// Identity transform
    pub fn identity() -> Self {
        Self::default()
    }

    /// Create from position only
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Builder pattern: Set rotation (degrees)
    pub fn with_rotation(mut self, degrees: Vec3) -> Self {
        self.rotation = degrees;
        self
    }

    /// Builder pattern: Set scale (non-uniform)
    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    /// Builder pattern: Set scale (uniform)
    pub fn with_uniform_scale(self, scale: f32) -> Self {
        self.with_scale(Vec3::new(scale, scale, scale))
    }
}

/// Transform component marker; selects the transform pool
#[derive(Debug, Clone, Copy)]
pub struct Transform;

impl Component for Transform {
    const NAME: &'static str = "Transform";
    type InitInfo = TransformInfo;
    type Storage = TransformStorage;

    fn on_attach(scene: &mut Scene, entity: Entity) {
        // The row itself starts fully dirty; descendants now compose with it.
        scene.transforms().mark_children_dirty(entity);
    }

    fn on_detach(scene: &mut Scene, entity: Entity) {
        scene.transforms().mark_children_dirty(entity);
    }
}

/// Column storage of the transform pool
#[derive(Debug, Clone)]
pub struct TransformStorage {
    positions: Vec<Vec3>,
    rotations: Vec<Vec3>,
    scales: Vec<Vec3>,
    world: Vec<Mat4>,
    inverse_world: Vec<Mat4>,
    dirty: Vec<u8>,
    dirty_set: BTreeSet<Entity>,
    full_dirty: u8,
}

impl TransformStorage {
    /// Create empty storage for a renderer with `frames_in_flight` constant
    /// buffer copies
    pub fn new(frames_in_flight: u8) -> Self {
        Self {
            positions: Vec::new(),
            rotations: Vec::new(),
            scales: Vec::new(),
            world: Vec::new(),
            inverse_world: Vec::new(),
            dirty: Vec::new(),
            dirty_set: BTreeSet::new(),
            full_dirty: frames_in_flight.clamp(1, u8::MAX - 1) + 1,
        }
    }

    /// Dirty counter of a freshly invalidated transform
    pub fn full_dirty(&self) -> u8 {
        self.full_dirty
    }

    /// Dirty counter right after a world-space setter recomputed the matrix
    pub fn world_set_dirty(&self) -> u8 {
        self.full_dirty - 1
    }

    /// World matrices in dense-row order
    pub fn world_column(&self) -> &[Mat4] {
        &self.world
    }

    /// Inverse world matrices in dense-row order
    pub fn inverse_world_column(&self) -> &[Mat4] {
        &self.inverse_world
    }

    /// Dirty counters in dense-row order
    pub fn dirty_column(&self) -> &[u8] {
        &self.dirty
    }

    /// Local affine matrix of `row`
    pub(crate) fn local_matrix(&self, row: usize) -> Mat4 {
        math::affine_transformation(&self.positions[row], &self.rotations[row], &self.scales[row])
    }

    pub(crate) fn set_world(&mut self, row: usize, world: Mat4) {
        self.inverse_world[row] = math::inverse_or_identity(&world);
        self.world[row] = world;
    }

    pub(crate) fn set_position(&mut self, row: usize, position: Vec3) {
        self.positions[row] = position;
    }

    pub(crate) fn set_rotation_radians(&mut self, row: usize, radians: Vec3) {
        self.rotations[row] = radians;
    }

    pub(crate) fn set_scale(&mut self, row: usize, scale: Vec3) {
        self.scales[row] = scale;
    }

    pub(crate) fn dirty_at(&self, row: usize) -> u8 {
        self.dirty[row]
    }

    pub(crate) fn set_dirty_at(&mut self, row: usize, value: u8) {
        self.dirty[row] = value;
    }

    pub(crate) fn dirty_set_mut(&mut self) -> &mut BTreeSet<Entity> {
        &mut self.dirty_set
    }
}

impl Default for TransformStorage {
    fn default() -> Self {
        Self::new(DEFAULT_FRAMES_IN_FLIGHT)
    }
}

impl Storage for TransformStorage {
    type InitInfo = TransformInfo;

    fn reserve(&mut self, additional: usize) {
        self.positions.reserve(additional);
        self.rotations.reserve(additional);
        self.scales.reserve(additional);
        self.world.reserve(additional);
        self.inverse_world.reserve(additional);
        self.dirty.reserve(additional);
    }

    fn push(&mut self, owner: Entity, info: TransformInfo) {
        let radians = utils::vec_to_radians(&info.rotation);
        let local = math::affine_transformation(&info.position, &radians, &info.scale);

        self.positions.push(info.position);
        self.rotations.push(radians);
        self.scales.push(info.scale);
        self.world.push(local);
        self.inverse_world.push(math::inverse_or_identity(&local));
        self.dirty.push(self.full_dirty);
        self.dirty_set.insert(owner);
    }

    fn swap_remove(&mut self, row: usize, owner: Entity) {
        self.positions.swap_remove(row);
        self.rotations.swap_remove(row);
        self.scales.swap_remove(row);
        self.world.swap_remove(row);
        self.inverse_world.swap_remove(row);
        self.dirty.swap_remove(row);
        self.dirty_set.remove(&owner);
    }

    fn len(&self) -> usize {
        self.positions.len()
    }
}

/// Read accessors. Mutation goes through
/// [`Transforms`](crate::scene::Transforms), which also sees the hierarchy.
impl Pool<Transform> {
    /// Local position
    pub fn position(&self, entity: Entity) -> EcsResult<Vec3> {
        Ok(self.storage().positions[self.row(entity)?])
    }

    /// Local rotation in degrees
    pub fn rotation(&self, entity: Entity) -> EcsResult<Vec3> {
        Ok(utils::vec_to_degrees(&self.storage().rotations[self.row(entity)?]))
    }

    /// Local scale
    pub fn scale(&self, entity: Entity) -> EcsResult<Vec3> {
        Ok(self.storage().scales[self.row(entity)?])
    }

    /// Local transform in the same shape it was attached with
    pub fn local(&self, entity: Entity) -> EcsResult<TransformInfo> {
        let row = self.row(entity)?;
        let storage = self.storage();
        Ok(TransformInfo {
            position: storage.positions[row],
            rotation: utils::vec_to_degrees(&storage.rotations[row]),
            scale: storage.scales[row],
        })
    }

    /// Cached world matrix, current as of the last resolve
    pub fn world(&self, entity: Entity) -> EcsResult<Mat4> {
        Ok(self.storage().world[self.row(entity)?])
    }

    /// Cached inverse of the world matrix
    pub fn inverse_world(&self, entity: Entity) -> EcsResult<Mat4> {
        Ok(self.storage().inverse_world[self.row(entity)?])
    }

    /// World-space position
    pub fn world_position(&self, entity: Entity) -> EcsResult<Vec3> {
        Ok(math::translation(&self.world(entity)?))
    }

    /// World-space scale
    pub fn world_scale(&self, entity: Entity) -> EcsResult<Vec3> {
        Ok(math::scale(&self.world(entity)?))
    }

    /// World-space Euler rotation in degrees
    pub fn world_rotation(&self, entity: Entity) -> EcsResult<Vec3> {
        let rotation = math::rotation(&self.world(entity)?);
        Ok(utils::vec_to_degrees(&math::euler_angles(&rotation)))
    }

    /// Current dirty counter
    pub fn dirty(&self, entity: Entity) -> EcsResult<u8> {
        Ok(self.storage().dirty[self.row(entity)?])
    }

    /// Whether the entity is waiting in the dirty set
    pub fn is_pending(&self, entity: Entity) -> bool {
        self.storage().dirty_set.contains(&entity)
    }

    /// Entities currently in the dirty set
    pub fn pending(&self) -> impl Iterator<Item = Entity> + '_ {
        self.storage().dirty_set.iter().copied()
    }

    /// Size of the dirty set
    pub fn pending_len(&self) -> usize {
        self.storage().dirty_set.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::IdentityRegistry;
    use approx::assert_relative_eq;

    #[test]
    fn test_attach_starts_fully_dirty() {
        let mut registry = IdentityRegistry::default();
        let mut pool = Pool::<Transform>::new();
        let entity = registry.create().unwrap();

        pool.add(entity, TransformInfo::default()).unwrap();

        assert_eq!(pool.dirty(entity), Ok(4));
        assert!(pool.is_pending(entity));
        assert_eq!(pool.world(entity), Ok(Mat4::identity()));
    }

    #[test]
    fn test_rotation_roundtrips_through_degrees() {
        let mut registry = IdentityRegistry::default();
        let mut pool = Pool::<Transform>::new();
        let entity = registry.create().unwrap();
        let info = TransformInfo::from_position(Vec3::new(1.0, 2.0, 3.0))
            .with_rotation(Vec3::new(30.0, -20.0, 45.0))
            .with_uniform_scale(2.0);

        pool.add(entity, info).unwrap();

        assert_relative_eq!(pool.rotation(entity).unwrap(), info.rotation, epsilon = 1e-4);
        assert_relative_eq!(pool.world_rotation(entity).unwrap(), info.rotation, epsilon = 1e-3);
        assert_relative_eq!(pool.world_position(entity).unwrap(), info.position, epsilon = 1e-5);
        assert_relative_eq!(pool.world_scale(entity).unwrap(), info.scale, epsilon = 1e-5);
    }

    #[test]
    fn test_remove_evicts_from_dirty_set() {
        let mut registry = IdentityRegistry::default();
        let mut pool = Pool::<Transform>::new();
        let a = registry.create().unwrap();
        let b = registry.create().unwrap();
        pool.add(a, TransformInfo::default()).unwrap();
        pool.add(b, TransformInfo::from_position(Vec3::new(1.0, 0.0, 0.0))).unwrap();

        pool.remove(a).unwrap();

        assert!(!pool.is_pending(a));
        assert!(pool.is_pending(b));
        assert_eq!(pool.pending_len(), 1);
        assert_eq!(pool.position(b), Ok(Vec3::new(1.0, 0.0, 0.0)));
        pool.assert_consistent();
    }

    #[test]
    fn test_full_dirty_follows_frames_in_flight() {
        let storage = TransformStorage::new(2);
        assert_eq!(storage.full_dirty(), 3);
        assert_eq!(storage.world_set_dirty(), 2);
        assert_eq!(TransformStorage::default().full_dirty(), 4);
    }
}
