//! End-to-end hierarchy scenarios driven through the public scene API

use approx::assert_relative_eq;

use super::*;
use crate::ecs::components::{Geometry, ScriptBehaviour, ScriptInfo};
use crate::foundation::logging;
use crate::foundation::math::{Mat4, Vec3};
use crate::render::Mesh;

fn at(x: f32, y: f32, z: f32) -> TransformInfo {
    TransformInfo::from_position(Vec3::new(x, y, z))
}

#[test]
fn test_child_follows_moved_root() {
    logging::init_for_tests();
    let mut scene = Scene::new();
    let root = scene.spawn(None, TransformInfo::default()).unwrap();
    let child = scene.spawn(Some(root), at(1.0, 0.0, 0.0)).unwrap();
    scene.update(0.0);

    scene.transforms().set_position(root, Vec3::new(5.0, 0.0, 0.0)).unwrap();
    scene.update(0.0);

    assert_relative_eq!(
        scene.transforms().world_position(child).unwrap(),
        Vec3::new(6.0, 0.0, 0.0),
        epsilon = 1e-5
    );
}

#[test]
fn test_only_edited_leaf_is_recomputed() {
    let mut scene = Scene::new();
    let root = scene.spawn(None, at(0.0, 1.0, 0.0)).unwrap();
    let a = scene.spawn(Some(root), at(2.0, 0.0, 0.0).with_uniform_scale(2.0)).unwrap();
    let b = scene.spawn(Some(a), at(1.0, 0.0, 0.0)).unwrap();
    for _ in 0..4 {
        scene.update(0.0);
    }
    let world_a = scene.transforms().world(a).unwrap();

    scene.transforms().set_position(b, Vec3::new(0.0, 0.0, 3.0)).unwrap();
    let report = scene.update(0.0);

    assert_eq!(report.refreshed, vec![b]);
    assert_eq!(report.resolved, 1);
    assert_eq!(scene.transforms().world(a), Ok(world_a));
    let expected = world_a * Mat4::new_translation(&Vec3::new(0.0, 0.0, 3.0));
    assert_relative_eq!(scene.transforms().world(b).unwrap(), expected, epsilon = 1e-5);
    assert_relative_eq!(
        scene.transforms().world_position(b).unwrap(),
        Vec3::new(2.0, 1.0, 6.0),
        epsilon = 1e-5
    );
}

#[test]
fn test_child_with_lower_index_resolves_after_parent() {
    let mut scene = Scene::new();
    let root = scene.spawn(None, TransformInfo::default()).unwrap();
    let filler = scene.spawn(None, TransformInfo::default()).unwrap();
    let parent = scene.spawn(Some(root), at(1.0, 0.0, 0.0).with_uniform_scale(2.0)).unwrap();
    scene.destroy_entity(filler).unwrap();
    let child = scene.spawn(Some(parent), at(1.0, 1.0, 0.0)).unwrap();
    assert!(child.index() < parent.index());
    for _ in 0..4 {
        scene.update(0.0);
    }

    scene.transforms().set_position(root, Vec3::new(5.0, 0.0, 0.0)).unwrap();
    let report = scene.update(0.0);

    assert_eq!(report.refreshed, vec![root, child, parent]);
    assert_eq!(report.resolved, 3);
    // Each member stepped down exactly once, so the parent was not resolved twice.
    for entity in [root, child, parent] {
        assert_eq!(scene.transforms().dirty(entity), Ok(3));
    }
    let world_parent = scene.transforms().world(parent).unwrap();
    let expected = world_parent * Mat4::new_translation(&Vec3::new(1.0, 1.0, 0.0));
    assert_relative_eq!(scene.transforms().world(child).unwrap(), expected, epsilon = 1e-5);
    assert_relative_eq!(
        scene.transforms().world_position(child).unwrap(),
        Vec3::new(8.0, 2.0, 0.0),
        epsilon = 1e-5
    );
}

#[test]
fn test_reparent_under_descendant_is_refused() {
    let mut scene = Scene::new();
    let a = scene.spawn(None, TransformInfo::default()).unwrap();
    let b = scene.spawn(Some(a), TransformInfo::default()).unwrap();
    let c = scene.spawn(Some(b), TransformInfo::default()).unwrap();
    for _ in 0..4 {
        scene.update(0.0);
    }

    assert_eq!(scene.reparent(a, Some(c)), Err(EcsError::CycleDetected { entity: a, parent: c }));
    assert_eq!(scene.reparent(a, Some(a)), Err(EcsError::CycleDetected { entity: a, parent: a }));

    assert_eq!(scene.parent(a), Ok(None));
    assert_eq!(scene.children(a), Ok(&[b][..]));
    assert_eq!(scene.children(b), Ok(&[c][..]));
    assert_eq!(scene.transforms().dirty(a), Ok(0));
    assert_eq!(scene.transform_pool().pending_len(), 0);
}

#[test]
fn test_reparent_keeps_local_and_marks_dirty() {
    let mut scene = Scene::new();
    let left = scene.spawn(None, at(-10.0, 0.0, 0.0)).unwrap();
    let right = scene.spawn(None, at(10.0, 0.0, 0.0)).unwrap();
    let item = scene.spawn(Some(left), at(1.0, 0.0, 0.0)).unwrap();
    scene.update(0.0);

    scene.reparent(item, Some(right)).unwrap();
    assert_eq!(scene.transforms().dirty(item), Ok(4));
    scene.update(0.0);

    assert_eq!(scene.children(left), Ok(&[][..]));
    assert_eq!(scene.parent(item), Ok(Some(right)));
    assert_eq!(scene.transforms().position(item), Ok(Vec3::new(1.0, 0.0, 0.0)));
    assert_relative_eq!(
        scene.transforms().world_position(item).unwrap(),
        Vec3::new(11.0, 0.0, 0.0),
        epsilon = 1e-5
    );

    scene.reparent(item, None).unwrap();
    assert_eq!(scene.roots(), &[left, right, item]);
}

#[test]
fn test_destroy_removes_whole_subtree() {
    let mut scene = Scene::new();
    let keep = scene.spawn(None, TransformInfo::default()).unwrap();
    let root = scene.spawn(None, TransformInfo::default()).unwrap();
    let a = scene.spawn(Some(root), TransformInfo::default()).unwrap();
    let b = scene.spawn(Some(a), TransformInfo::default()).unwrap();
    let c = scene.create_entity(Some(root)).unwrap();
    scene.add_component::<Geometry>(b, Mesh::cube().into()).unwrap();

    scene.destroy_entity(root).unwrap();

    for entity in [root, a, b, c] {
        assert!(!scene.is_alive(entity));
        assert!(!scene.has_component::<Transform>(entity));
    }
    assert!(scene.is_alive(keep));
    assert_eq!(scene.entity_count(), 1);
    assert_eq!(scene.roots(), &[keep]);
    assert_eq!(scene.entities_with::<Transform>(), &[keep]);
    assert!(scene.entities_with::<Geometry>().is_empty());
    assert_eq!(scene.pool::<Metadata>().map(Pool::count), Some(1));
    assert_eq!(scene.transform_pool().pending().collect::<Vec<_>>(), vec![keep]);
}

#[test]
fn test_detach_and_reattach_resets_transform() {
    let mut scene = Scene::new();
    let root = scene.spawn(None, at(3.0, 0.0, 0.0)).unwrap();
    let child = scene.spawn(Some(root), at(1.0, 0.0, 0.0)).unwrap();
    for _ in 0..4 {
        scene.update(0.0);
    }

    scene.remove_component::<Transform>(root).unwrap();
    assert_eq!(scene.transforms().dirty(child), Ok(4));
    assert!(matches!(
        scene.transforms().position(root),
        Err(EcsError::ComponentNotFound { .. })
    ));

    scene.add_component::<Transform>(root, TransformInfo::default()).unwrap();
    assert_eq!(scene.transforms().position(root), Ok(Vec3::zeros()));
    assert_eq!(scene.transforms().rotation(root), Ok(Vec3::zeros()));
    assert_eq!(scene.transforms().scale(root), Ok(Vec3::new(1.0, 1.0, 1.0)));
    assert_eq!(scene.transforms().dirty(root), Ok(4));
    assert!(scene.transform_pool().is_pending(root));

    scene.update(0.0);
    assert_relative_eq!(
        scene.transforms().world_position(child).unwrap(),
        Vec3::new(1.0, 0.0, 0.0),
        epsilon = 1e-5
    );
}

#[test]
fn test_stale_identifier_rejected_after_reuse() {
    let mut scene = Scene::new();
    let old = scene.spawn(None, TransformInfo::default()).unwrap();
    scene.destroy_entity(old).unwrap();
    let new = scene.spawn(None, TransformInfo::default()).unwrap();
    assert_eq!(new.index(), old.index());
    assert_ne!(new, old);

    let stale = Err(EcsError::StaleIdentifier(old));
    assert_eq!(scene.destroy_entity(old), stale);
    assert_eq!(scene.reparent(old, None), stale);
    assert_eq!(scene.children(old).map(<[Entity]>::len), Err(EcsError::StaleIdentifier(old)));
    assert_eq!(scene.transforms().set_position(old, Vec3::zeros()), stale);
    assert_eq!(scene.transforms().world(old), Err(EcsError::StaleIdentifier(old)));
    assert_eq!(
        scene.add_component::<Geometry>(old, Mesh::cube().into()).map(|handle| handle.entity()),
        Err(EcsError::StaleIdentifier(old))
    );
    assert_eq!(scene.create_entity(Some(old)), Err(EcsError::StaleIdentifier(old)));
    assert!(!scene.has_component::<Transform>(old));
    assert!(scene.has_component::<Transform>(new));
}

#[test]
fn test_duplicate_and_missing_components() {
    let mut scene = Scene::new();
    let entity = scene.spawn(None, TransformInfo::default()).unwrap();

    assert_eq!(
        scene.add_component::<Transform>(entity, TransformInfo::default()).map(|h| h.entity()),
        Err(EcsError::DuplicateComponent { entity, component: "Transform" })
    );
    assert_eq!(
        scene.remove_component::<Geometry>(entity),
        Err(EcsError::ComponentNotFound { entity, component: "Geometry" })
    );
}

#[test]
fn test_capacity_exhausted() {
    let config = SceneConfig {
        max_entities: 2,
        ..SceneConfig::default()
    };
    let mut scene = Scene::with_config(config);
    let first = scene.create_entity(None).unwrap();
    scene.create_entity(None).unwrap();

    let err = scene.create_entity(None).unwrap_err();
    assert_eq!(err, EcsError::CapacityExhausted { capacity: 2 });
    assert!(!err.is_recoverable());

    scene.destroy_entity(first).unwrap();
    assert!(scene.create_entity(None).is_ok());
}

#[test]
fn test_frames_in_flight_sets_drain_length() {
    let config = SceneConfig {
        frames_in_flight: 1,
        ..SceneConfig::default()
    };
    let mut scene = Scene::with_config(config);
    let entity = scene.spawn(None, TransformInfo::default()).unwrap();

    assert_eq!(scene.transforms().dirty(entity), Ok(2));
    assert_eq!(scene.update(0.0).refreshed, vec![entity]);
    let report = scene.update(0.0);
    assert_eq!(report.evicted, 1);
    assert_eq!(scene.transform_pool().pending_len(), 0);
}

#[test]
fn test_scripts_tick_every_frame() {
    struct Counter(std::rc::Rc<std::cell::Cell<u32>>);

    impl ScriptBehaviour for Counter {
        fn update(&mut self, _entity: Entity, _delta_time: f32) {
            self.0.set(self.0.get() + 1);
        }
    }

    let ticks = std::rc::Rc::new(std::cell::Cell::new(0));
    let mut scene = Scene::new();
    let entity = scene.spawn(None, TransformInfo::default()).unwrap();
    scene
        .add_component::<Script>(entity, ScriptInfo::new(Counter(ticks.clone())))
        .unwrap();

    scene.update(0.016);
    scene.update(0.016);

    assert_eq!(ticks.get(), 2);
    assert_eq!(scene.frame(), 2);
}

#[test]
fn test_pool_stats_lists_registered_pools() {
    let mut scene = Scene::new();
    let entity = scene.spawn(None, TransformInfo::default()).unwrap();
    scene.add_component::<Geometry>(entity, Mesh::cube().into()).unwrap();

    assert_eq!(
        scene.pool_stats(),
        vec![("Geometry", 1), ("Metadata", 1), ("Transform", 1)]
    );
}
