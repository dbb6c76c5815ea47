//! # Scene
//!
//! The [`Scene`] owns the identity registry, the parent/child hierarchy and
//! every component pool. It is the only place that sees all three at once,
//! so entity lifecycle (creation, recursive destruction, reparenting) and
//! component attach/detach hooks live here.
//!
//! ```
//! use scene_core::prelude::*;
//!
//! let mut scene = Scene::new();
//! let root = scene.spawn(None, TransformInfo::default()).unwrap();
//! let child = scene
//!     .spawn(Some(root), TransformInfo::from_position(Vec3::new(1.0, 0.0, 0.0)))
//!     .unwrap();
//!
//! scene.transforms().set_position(root, Vec3::new(5.0, 0.0, 0.0)).unwrap();
//! scene.update(1.0 / 60.0);
//!
//! let world = scene.transforms().world_position(child).unwrap();
//! assert!((world - Vec3::new(6.0, 0.0, 0.0)).norm() < 1e-5);
//! ```

mod hierarchy;
mod transforms;

#[cfg(test)]
mod scene_tests;

pub use hierarchy::Hierarchy;
pub use transforms::{ResolveReport, Transforms};

use std::any::{Any, TypeId};
use std::collections::HashMap;

use crate::config::SceneConfig;
use crate::ecs::components::{Metadata, MetadataInfo, Script, Transform, TransformInfo, TransformStorage};
use crate::ecs::{Component, ComponentHandle, EcsError, EcsResult, Entity, ErasedPool, IdentityRegistry, Pool};

/// Entities, their hierarchy and their components
pub struct Scene {
    config: SceneConfig,
    registry: IdentityRegistry,
    hierarchy: Hierarchy,
    /// Kept outside `pools` so the transform view can borrow it next to the
    /// registry and hierarchy
    transforms: Pool<Transform>,
    pools: HashMap<TypeId, Box<dyn ErasedPool>>,
    frame: u64,
}

impl Scene {
    /// Create a new scene with default configuration
    pub fn new() -> Self {
        Self::with_config(SceneConfig::default())
    }

    /// Create a scene with custom configuration
    pub fn with_config(config: SceneConfig) -> Self {
        let mut transforms = Pool::from_storage(TransformStorage::new(config.frames_in_flight));
        transforms.reserve(config.initial_capacity);
        log::debug!(
            "Scene created: max {} entities, {} frames in flight",
            config.max_entities,
            config.frames_in_flight
        );

        Self {
            registry: IdentityRegistry::with_capacity(config.max_entities),
            hierarchy: Hierarchy::new(),
            transforms,
            pools: HashMap::new(),
            frame: 0,
            config,
        }
    }

    /// Scene configuration
    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    /// Number of completed [`Scene::update`] calls
    pub fn frame(&self) -> u64 {
        self.frame
    }

    // --- entities ---

    /// Create an entity, optionally as the last child of `parent`
    pub fn create_entity(&mut self, parent: Option<Entity>) -> EcsResult<Entity> {
        if let Some(parent) = parent {
            self.registry.check(parent)?;
        }
        let entity = self.registry.create().map_err(|err| {
            log::error!("Failed to create entity: {err}");
            err
        })?;
        self.hierarchy.insert(entity, parent);
        log::debug!("Created entity {entity} (parent: {parent:?})");
        Ok(entity)
    }

    /// Create an entity carrying a transform and default metadata
    pub fn spawn(&mut self, parent: Option<Entity>, transform: TransformInfo) -> EcsResult<Entity> {
        let entity = self.create_entity(parent)?;
        self.add_component::<Transform>(entity, transform)?;
        self.add_component::<Metadata>(entity, MetadataInfo::default())?;
        Ok(entity)
    }

    /// Destroy an entity and its whole subtree, children before parents
    pub fn destroy_entity(&mut self, entity: Entity) -> EcsResult<()> {
        self.registry.check(entity)?;

        let mut doomed = self.hierarchy.descendants(entity);
        doomed.reverse();
        doomed.push(entity);

        for &victim in &doomed {
            self.transforms.remove_entity(victim);
            for pool in self.pools.values_mut() {
                pool.remove_entity(victim);
            }
            self.hierarchy.remove(victim);
            self.registry.destroy(victim);
        }

        log::debug!("Destroyed entity {entity} and {} descendants", doomed.len() - 1);
        Ok(())
    }

    /// Move `entity` under `parent`, or make it a root.
    ///
    /// The local transform is kept, so the world transform follows the new
    /// parent.
    pub fn reparent(&mut self, entity: Entity, parent: Option<Entity>) -> EcsResult<()> {
        self.registry.check(entity)?;
        if let Some(parent) = parent {
            self.registry.check(parent)?;
            if parent == entity || self.hierarchy.is_ancestor(entity, parent) {
                log::warn!("Refused to reparent {entity} under its own subtree member {parent}");
                return Err(EcsError::CycleDetected { entity, parent });
            }
        }

        self.hierarchy.set_parent(entity, parent);
        self.transforms().mark_dirty(entity);
        log::debug!("Reparented entity {entity} under {parent:?}");
        Ok(())
    }

    /// Whether the identifier refers to a live entity
    pub fn is_alive(&self, entity: Entity) -> bool {
        self.registry.is_alive(entity)
    }

    /// Number of live entities
    pub fn entity_count(&self) -> usize {
        self.registry.len()
    }

    /// Live entities in index order
    pub fn entities(&self) -> impl Iterator<Item = Entity> + '_ {
        self.registry.iter()
    }

    /// Entities without a parent, in creation order
    pub fn roots(&self) -> &[Entity] {
        self.hierarchy.roots()
    }

    /// Parent of `entity`
    pub fn parent(&self, entity: Entity) -> EcsResult<Option<Entity>> {
        self.registry.check(entity)?;
        Ok(self.hierarchy.parent(entity))
    }

    /// Children of `entity` in insertion order
    pub fn children(&self, entity: Entity) -> EcsResult<&[Entity]> {
        self.registry.check(entity)?;
        Ok(self.hierarchy.children(entity))
    }

    /// Every descendant of `entity`, parents before children
    pub fn descendants(&self, entity: Entity) -> EcsResult<Vec<Entity>> {
        self.registry.check(entity)?;
        Ok(self.hierarchy.descendants(entity))
    }

    // --- components ---

    /// Attach a component, registering its pool on first use
    pub fn add_component<C: Component>(&mut self, entity: Entity, info: C::InitInfo) -> EcsResult<ComponentHandle<C>> {
        self.registry.check(entity)?;
        let handle = self.register::<C>().add(entity, info).map_err(|err| {
            log::warn!("{err}");
            err
        })?;
        C::on_attach(self, entity);
        Ok(handle)
    }

    /// Detach a component from a live entity
    pub fn remove_component<C: Component>(&mut self, entity: Entity) -> EcsResult<()> {
        self.registry.check(entity)?;
        self.pool_mut::<C>()
            .ok_or(EcsError::ComponentNotFound { entity, component: C::NAME })?
            .remove(entity)?;
        C::on_detach(self, entity);
        Ok(())
    }

    /// Whether a live entity owns the component
    pub fn has_component<C: Component>(&self, entity: Entity) -> bool {
        self.is_alive(entity) && self.pool::<C>().is_some_and(|pool| pool.contains(entity))
    }

    /// Owners of the component in dense order
    pub fn entities_with<C: Component>(&self) -> &[Entity] {
        self.pool::<C>().map_or(&[], |pool| pool.entities())
    }

    /// Pool of a component type, if registered
    pub fn pool<C: Component>(&self) -> Option<&Pool<C>> {
        let transforms: &dyn Any = &self.transforms;
        transforms.downcast_ref::<Pool<C>>().or_else(|| {
            self.pools
                .get(&TypeId::of::<C>())
                .and_then(|pool| pool.as_any().downcast_ref::<Pool<C>>())
        })
    }

    /// Mutable pool of a component type, if registered.
    ///
    /// Attach and detach through [`Scene::add_component`] and
    /// [`Scene::remove_component`] so liveness checks and hooks run.
    pub fn pool_mut<C: Component>(&mut self) -> Option<&mut Pool<C>> {
        let Self { transforms, pools, .. } = self;
        let transforms: &mut dyn Any = transforms;
        if let Some(pool) = transforms.downcast_mut::<Pool<C>>() {
            return Some(pool);
        }
        pools
            .get_mut(&TypeId::of::<C>())
            .and_then(|pool| pool.as_any_mut().downcast_mut::<Pool<C>>())
    }

    /// Pool of a component type, created on first call
    pub fn register<C: Component>(&mut self) -> &mut Pool<C> {
        let Self { config, transforms, pools, .. } = self;
        let transforms: &mut dyn Any = transforms;
        if let Some(pool) = transforms.downcast_mut::<Pool<C>>() {
            return pool;
        }
        let capacity = config.initial_capacity;
        let pool = pools.entry(TypeId::of::<C>()).or_insert_with(|| {
            log::debug!("Registered component pool {}", C::NAME);
            Box::new(Pool::<C>::with_capacity(capacity))
        });
        match pool.as_any_mut().downcast_mut::<Pool<C>>() {
            Some(pool) => pool,
            None => unreachable!("component pools are keyed by their own TypeId"),
        }
    }

    /// Names and sizes of every registered pool
    pub fn pool_stats(&self) -> Vec<(&'static str, usize)> {
        let mut stats = vec![(Transform::NAME, self.transforms.count())];
        stats.extend(self.pools.values().map(|pool| (pool.component_name(), pool.len())));
        stats.sort_unstable();
        stats
    }

    // --- transforms ---

    /// Mutable transform view: setters, world-space queries, resolve pass
    pub fn transforms(&mut self) -> Transforms<'_> {
        Transforms::new(&self.registry, &self.hierarchy, &mut self.transforms)
    }

    /// Transform pool, for readers such as render extraction
    pub fn transform_pool(&self) -> &Pool<Transform> {
        &self.transforms
    }

    // --- frame ---

    /// Advance one frame: run scripts, then resolve dirty transforms
    pub fn update(&mut self, delta_time: f32) -> ResolveReport {
        let scripted = self.pool_mut::<Script>().map_or(0, |scripts| scripts.run(delta_time));
        let report = self.transforms().update();
        self.frame += 1;

        log::trace!(
            "Frame {}: {} scripts, {} transforms refreshed",
            self.frame,
            scripted,
            report.refreshed.len()
        );
        report
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}
