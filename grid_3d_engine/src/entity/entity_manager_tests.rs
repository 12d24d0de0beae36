use glam::Vec3;
use crate::entity::{Entity, EntityStore, Laser, Projectile};
use crate::render::MockRenderer;
use crate::scene::{SceneGraph, AABB};
use crate::spatial::{SpatialPartition, SpatialPartitionConfig};
use super::*;

fn partition() -> SpatialPartition {
    SpatialPartition::new(SpatialPartitionConfig::default()).unwrap()
}

fn target(position: Vec3) -> Entity {
    Entity::new("target", position).with_collider(true)
}

fn bullet(position: Vec3) -> Entity {
    Entity::projectile("bullet", position, Projectile::new(Vec3::X, 0.0, 10.0))
}

/// Target registered in the graph and the partition, as a world does it
fn spawn_target(
    manager: &mut EntityManager,
    partition: &mut SpatialPartition,
    graph: &mut SceneGraph,
    entity: Entity,
) -> EntityKey {
    let key = manager.add_entity(entity, EntityCategory::Graph);
    graph.add_node(key, &*manager).unwrap();
    assert!(partition.add(key, &*manager));
    key
}

// ============================================================================
// Storage
// ============================================================================

#[test]
fn test_add_and_categories() {
    let mut manager = EntityManager::new();
    let fixed = manager.add_entity(Entity::new("rock", Vec3::ZERO), EntityCategory::Fixed);
    let shot = manager.add_entity(bullet(Vec3::ZERO), EntityCategory::Projectile);
    let node = manager.add_entity(Entity::new("tree", Vec3::ZERO), EntityCategory::Graph);

    assert_eq!(manager.entity_count(), 3);
    assert_eq!(manager.projectile_count(), 1);
    assert_eq!(manager.category(fixed), Some(EntityCategory::Fixed));
    assert_eq!(manager.category(shot), Some(EntityCategory::Projectile));
    assert_eq!(manager.category(node), Some(EntityCategory::Graph));
    assert_eq!(manager.keys(EntityCategory::Fixed), &[fixed]);
    assert_eq!(manager.entity(node).unwrap().mesh(), "tree");
}

#[test]
fn test_remove_entity() {
    let mut manager = EntityManager::new();
    let key = manager.add_entity(bullet(Vec3::ZERO), EntityCategory::Projectile);

    assert!(manager.remove_entity(key));
    assert!(!manager.remove_entity(key));
    assert_eq!(manager.projectile_count(), 0);
    assert_eq!(manager.category(key), None);
    // Stale keys resolve to absent
    assert!(!manager.contains(key));
    assert_eq!(manager.position(key), None);
    assert!(!manager.set_aabb(key, AABB::zero()));
}

#[test]
fn test_clear() {
    let mut manager = EntityManager::new();
    manager.add_entity(Entity::new("rock", Vec3::ZERO), EntityCategory::Fixed);
    manager.add_entity(bullet(Vec3::ZERO), EntityCategory::Projectile);
    manager.clear();
    assert_eq!(manager.entity_count(), 0);
    assert_eq!(manager.projectile_count(), 0);
}

// ============================================================================
// Tick
// ============================================================================

#[test]
fn test_update_skips_graph_entities() {
    let mut manager = EntityManager::new();
    let moving = Projectile::new(Vec3::Z, 2.0, 10.0);
    let shot = manager.add_entity(Entity::projectile("a", Vec3::ZERO, moving.clone()), EntityCategory::Projectile);
    let driven = manager.add_entity(Entity::projectile("b", Vec3::ZERO, moving), EntityCategory::Graph);

    manager.update(1.0);
    assert_eq!(manager.position(shot), Some(Vec3::new(0.0, 0.0, 2.0)));
    assert_eq!(manager.position(driven), Some(Vec3::ZERO));
}

#[test]
fn test_expired_projectile_is_removed() {
    let mut manager = EntityManager::new();
    let shot = manager.add_entity(
        Entity::projectile("a", Vec3::ZERO, Projectile::new(Vec3::X, 1.0, 0.5)),
        EntityCategory::Projectile,
    );

    manager.update(1.0);
    assert!(manager.is_done(shot));
    assert_eq!(manager.remove_done(), 1);
    assert_eq!(manager.projectile_count(), 0);
    assert_eq!(manager.remove_done(), 0);
}

#[test]
fn test_remove_done_all_categories() {
    let mut manager = EntityManager::new();
    let a = manager.add_entity(Entity::new("a", Vec3::ZERO), EntityCategory::Fixed);
    let b = manager.add_entity(Entity::new("b", Vec3::ZERO), EntityCategory::Graph);
    let c = manager.add_entity(Entity::new("c", Vec3::ZERO), EntityCategory::Graph);
    manager.set_done(a, true);
    manager.set_done(b, true);

    assert_eq!(manager.remove_done(), 2);
    assert_eq!(manager.entity_count(), 1);
    assert!(manager.keys(EntityCategory::Fixed).is_empty());
    assert_eq!(manager.keys(EntityCategory::Graph), &[c]);
}

// ============================================================================
// Collision
// ============================================================================

#[test]
fn test_projectile_hit() {
    let mut manager = EntityManager::new();
    let mut partition = partition();
    let mut graph = SceneGraph::new();
    let victim = spawn_target(&mut manager, &mut partition, &mut graph, target(Vec3::new(10.0, 0.0, 10.0)));
    let shot = manager.add_entity(bullet(Vec3::new(10.5, 0.0, 10.0)), EntityCategory::Projectile);

    assert_eq!(manager.check_for_collision(&mut partition, &mut graph, 20.0), 1);
    assert!(manager.is_done(shot));
    assert!(manager.is_done(victim));
    assert_eq!(graph.node_count(), 0);
    assert!(partition.get_objects(Vec3::new(10.0, 0.0, 10.0), 0.0, &manager).is_empty());

    assert_eq!(manager.remove_done(), 2);
    assert_eq!(manager.entity_count(), 0);
}

#[test]
fn test_laser_hit() {
    let mut manager = EntityManager::new();
    let mut partition = partition();
    let mut graph = SceneGraph::new();
    let victim = spawn_target(&mut manager, &mut partition, &mut graph, target(Vec3::new(10.0, 0.0, 10.0)));
    let beam = manager.add_entity(
        Entity::laser("laser", Vec3::new(0.0, 0.0, 10.0), Laser::new(Vec3::X, 0.0, 10.0, 15.0)),
        EntityCategory::Projectile,
    );

    assert_eq!(manager.check_for_collision(&mut partition, &mut graph, 20.0), 1);
    assert!(manager.is_done(beam));
    assert!(manager.is_done(victim));
}

#[test]
fn test_short_laser_misses() {
    let mut manager = EntityManager::new();
    let mut partition = partition();
    let mut graph = SceneGraph::new();
    let victim = spawn_target(&mut manager, &mut partition, &mut graph, target(Vec3::new(10.0, 0.0, 10.0)));
    manager.add_entity(
        Entity::laser("laser", Vec3::new(0.0, 0.0, 10.0), Laser::new(Vec3::X, 0.0, 10.0, 5.0)),
        EntityCategory::Projectile,
    );

    assert_eq!(manager.check_for_collision(&mut partition, &mut graph, 20.0), 0);
    assert!(!manager.is_done(victim));
    assert_eq!(graph.node_count(), 1);
}

#[test]
fn test_targets_without_collider_or_out_of_range_are_ignored() {
    let mut manager = EntityManager::new();
    let mut partition = partition();
    let mut graph = SceneGraph::new();
    let ghost = spawn_target(
        &mut manager,
        &mut partition,
        &mut graph,
        Entity::new("ghost", Vec3::new(10.0, 0.0, 10.0)),
    );
    let far = spawn_target(&mut manager, &mut partition, &mut graph, target(Vec3::new(40.0, 0.0, 40.0)));
    manager.add_entity(bullet(Vec3::new(10.0, 0.0, 10.0)), EntityCategory::Projectile);

    assert_eq!(manager.check_for_collision(&mut partition, &mut graph, 20.0), 0);
    assert!(!manager.is_done(ghost));
    assert!(!manager.is_done(far));
}

#[test]
fn test_target_hit_once_per_tick() {
    let mut manager = EntityManager::new();
    let mut partition = partition();
    let mut graph = SceneGraph::new();
    let victim = spawn_target(&mut manager, &mut partition, &mut graph, target(Vec3::new(10.0, 0.0, 10.0)));
    let first = manager.add_entity(bullet(Vec3::new(10.2, 0.0, 10.0)), EntityCategory::Projectile);
    let second = manager.add_entity(bullet(Vec3::new(9.8, 0.0, 10.0)), EntityCategory::Projectile);
    // A projectile sharing the cell is never its own target
    assert!(partition.add(first, &manager));

    assert_eq!(manager.check_for_collision(&mut partition, &mut graph, 20.0), 1);
    assert!(manager.is_done(victim));
    assert!(manager.is_done(first));
    assert!(!manager.is_done(second));
}

#[test]
fn test_done_projectile_is_skipped() {
    let mut manager = EntityManager::new();
    let mut partition = partition();
    let mut graph = SceneGraph::new();
    let victim = spawn_target(&mut manager, &mut partition, &mut graph, target(Vec3::new(10.0, 0.0, 10.0)));
    let shot = manager.add_entity(bullet(Vec3::new(10.0, 0.0, 10.0)), EntityCategory::Projectile);
    manager.set_done(shot, true);

    assert_eq!(manager.check_for_collision(&mut partition, &mut graph, 20.0), 0);
    assert!(!manager.is_done(victim));
}

#[test]
fn test_hit_without_scene_node() {
    let mut manager = EntityManager::new();
    let mut partition = partition();
    let mut graph = SceneGraph::new();
    let loose = manager.add_entity(target(Vec3::new(10.0, 0.0, 10.0)), EntityCategory::Fixed);
    assert!(partition.add(loose, &manager));
    manager.add_entity(bullet(Vec3::new(10.0, 0.0, 10.0)), EntityCategory::Projectile);

    assert_eq!(manager.check_for_collision(&mut partition, &mut graph, 20.0), 1);
    assert!(manager.is_done(loose));
}

// ============================================================================
// Render
// ============================================================================

#[test]
fn test_render_fixed_then_projectiles() {
    let mut manager = EntityManager::new();
    manager.add_entity(bullet(Vec3::new(1.0, 0.0, 0.0)), EntityCategory::Projectile);
    manager.add_entity(
        Entity::new("rock", Vec3::new(0.0, 0.0, 5.0)).with_scale(Vec3::splat(2.0)),
        EntityCategory::Fixed,
    );
    manager.add_entity(Entity::new("tree", Vec3::ZERO), EntityCategory::Graph);

    let mut renderer = MockRenderer::new();
    manager.render(&mut renderer);

    assert!(renderer.is_balanced());
    assert_eq!(renderer.mesh_names(), vec!["rock", "bullet"]);
    let draws = renderer.mesh_draws();
    assert_eq!(draws[0].1.transform_point3(Vec3::X), Vec3::new(2.0, 0.0, 5.0));

    let mut renderer = MockRenderer::new();
    manager.render_projectiles(&mut renderer);
    assert_eq!(renderer.mesh_names(), vec!["bullet"]);
}
