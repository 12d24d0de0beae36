/// Entity manager - owns every entity of a world.
///
/// Entities live in a slot map; three ordered key lists record which
/// subsystem drives them:
///
/// - `Fixed`: updated and rendered by the manager
/// - `Projectile`: updated and rendered by the manager, and tested for
///   hits every tick
/// - `Graph`: updated and rendered only through the scene graph
///
/// The manager is also the `EntityStore` handed to the scene graph and
/// the spatial partition.

use rustc_hash::FxHashSet;
use slotmap::SlotMap;
use crate::engine_debug;
use crate::engine_trace;
use crate::render::Renderer;
use crate::scene::SceneGraph;
use crate::spatial::SpatialPartition;
use super::collision;
use super::entity::{Entity, EntityKey};
use super::entity_store::EntityStore;

/// Which list an entity is registered in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityCategory {
    Fixed,
    Projectile,
    Graph,
}

#[derive(Debug, Default)]
pub struct EntityManager {
    entities: SlotMap<EntityKey, Entity>,
    fixed: Vec<EntityKey>,
    projectiles: Vec<EntityKey>,
    graph: Vec<EntityKey>,
}

impl EntityManager {
    pub fn new() -> Self {
        Self::default()
    }

    // ===== STORAGE =====

    /// Take ownership of `entity` and register it under `category`
    pub fn add_entity(&mut self, entity: Entity, category: EntityCategory) -> EntityKey {
        let key = self.entities.insert(entity);
        self.list_mut(category).push(key);
        key
    }

    /// Drop an entity immediately. Returns `false` for a stale key.
    pub fn remove_entity(&mut self, key: EntityKey) -> bool {
        if self.entities.remove(key).is_none() {
            return false;
        }
        self.fixed.retain(|&k| k != key);
        self.projectiles.retain(|&k| k != key);
        self.graph.retain(|&k| k != key);
        true
    }

    pub fn entity(&self, key: EntityKey) -> Option<&Entity> {
        self.entities.get(key)
    }

    pub fn entity_mut(&mut self, key: EntityKey) -> Option<&mut Entity> {
        self.entities.get_mut(key)
    }

    /// Category an entity was registered under
    pub fn category(&self, key: EntityKey) -> Option<EntityCategory> {
        [EntityCategory::Fixed, EntityCategory::Projectile, EntityCategory::Graph]
            .into_iter()
            .find(|&category| self.list(category).contains(&key))
    }

    /// Entities of every category
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    pub fn projectile_count(&self) -> usize {
        self.projectiles.len()
    }

    /// Keys of one category in insertion order
    pub fn keys(&self, category: EntityCategory) -> &[EntityKey] {
        self.list(category)
    }

    /// Drop every entity (the manager stays usable)
    pub fn clear(&mut self) {
        let count = self.entities.len();
        self.entities.clear();
        self.fixed.clear();
        self.projectiles.clear();
        self.graph.clear();
        engine_debug!("grid3d::EntityManager", "Cleared {} entities", count);
    }

    fn list(&self, category: EntityCategory) -> &Vec<EntityKey> {
        match category {
            EntityCategory::Fixed => &self.fixed,
            EntityCategory::Projectile => &self.projectiles,
            EntityCategory::Graph => &self.graph,
        }
    }

    fn list_mut(&mut self, category: EntityCategory) -> &mut Vec<EntityKey> {
        match category {
            EntityCategory::Fixed => &mut self.fixed,
            EntityCategory::Projectile => &mut self.projectiles,
            EntityCategory::Graph => &mut self.graph,
        }
    }

    // ===== TICK =====

    /// Update every `Fixed` entity, then every projectile
    pub fn update(&mut self, dt: f64) {
        for &key in self.fixed.iter().chain(&self.projectiles) {
            if let Some(entity) = self.entities.get_mut(key) {
                entity.update(dt);
            }
        }
    }

    /// Drop every done entity, whatever its category.
    ///
    /// Returns how many were removed.
    pub fn remove_done(&mut self) -> usize {
        let before = self.entities.len();
        self.entities.retain(|_, entity| !entity.is_done());
        let removed = before - self.entities.len();
        if removed == 0 {
            return 0;
        }

        let entities = &self.entities;
        self.fixed.retain(|&key| entities.contains_key(key));
        self.projectiles.retain(|&key| entities.contains_key(key));
        self.graph.retain(|&key| entities.contains_key(key));

        engine_trace!("grid3d::EntityManager", "Removed {} done entities", removed);
        removed
    }

    /// Test every live collider projectile against the partition cell it
    /// is in.
    ///
    /// Lasers use their beam segment; other projectiles use the sphere
    /// pre-test followed by the box test. Each hit marks the projectile
    /// and the target done, removes the target from the partition and
    /// deletes its scene node. A target is hit at most once per call.
    /// Returns the number of hits.
    pub fn check_for_collision(
        &mut self,
        partition: &mut SpatialPartition,
        graph: &mut SceneGraph,
        radius: f32,
    ) -> usize {
        let mut victims: FxHashSet<EntityKey> = FxHashSet::default();
        let mut hits = 0;

        for i in 0..self.projectiles.len() {
            let key = self.projectiles[i];
            let Some(projectile) = self.entities.get(key) else {
                continue;
            };
            if !projectile.has_collider() || projectile.is_done() {
                continue;
            }
            let position = projectile.position();
            let local = projectile.aabb();
            let beam = projectile.laser_segment();

            for target in partition.get_objects(position, radius, &self.entities) {
                if target == key || victims.contains(&target) {
                    continue;
                }
                let Some(other) = self.entities.get(target) else {
                    continue;
                };
                if !other.has_collider() || other.is_done() {
                    continue;
                }

                let hit = match beam {
                    Some((tip, tail)) => {
                        let bounds = other.world_aabb();
                        collision::check_line_segment_aabb(tip, tail, bounds.min, bounds.max).is_some()
                    }
                    None => {
                        collision::check_sphere_collision(position, &local, other.position(), &other.aabb())
                            && collision::check_aabb_collision(position, &local, other.position(), &other.aabb())
                    }
                };
                if !hit {
                    continue;
                }

                victims.insert(target);
                self.entities.set_done(key, true);
                self.entities.set_done(target, true);
                partition.remove(target, &self.entities);
                if !graph.delete_node(target, &mut self.entities) {
                    engine_trace!(
                        "grid3d::EntityManager",
                        "Entity {:?} hit by {:?} has no scene node",
                        target, key
                    );
                }
                engine_debug!(
                    "grid3d::EntityManager",
                    "{} {:?} hit entity {:?}",
                    if beam.is_some() { "Laser" } else { "Projectile" }, key, target
                );
                hits += 1;
            }
        }
        hits
    }

    // ===== RENDER =====

    /// Draw `Fixed` entities, then projectiles, each in its own matrix scope
    pub fn render(&self, renderer: &mut dyn Renderer) {
        self.render_list(&self.fixed, renderer);
        self.render_projectiles(renderer);
    }

    /// Draw projectiles only
    pub fn render_projectiles(&self, renderer: &mut dyn Renderer) {
        self.render_list(&self.projectiles, renderer);
    }

    fn render_list(&self, keys: &[EntityKey], renderer: &mut dyn Renderer) {
        for &key in keys {
            let Some(entity) = self.entities.get(key) else {
                continue;
            };
            renderer.push_matrix();
            renderer.translate(entity.position());
            renderer.scale(entity.scale());
            entity.render_mesh(renderer);
            renderer.pop_matrix();
        }
    }
}

impl EntityStore for EntityManager {
    fn get(&self, key: EntityKey) -> Option<&Entity> {
        self.entities.get(key)
    }

    fn get_mut(&mut self, key: EntityKey) -> Option<&mut Entity> {
        self.entities.get_mut(key)
    }
}

#[cfg(test)]
#[path = "entity_manager_tests.rs"]
mod tests;
