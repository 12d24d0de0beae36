/// Narrow entity interface consumed by the scene graph and the spatial
/// partition.
///
/// Every accessor takes a key and tolerates stale keys: reads return
/// `None` / `false`, writes are ignored.

use glam::Vec3;
use slotmap::SlotMap;
use crate::render::Renderer;
use crate::scene::AABB;
use crate::spatial::DetailLevel;
use super::entity::{Entity, EntityKey};

pub trait EntityStore {
    /// Borrow an entity
    fn get(&self, key: EntityKey) -> Option<&Entity>;

    /// Mutably borrow an entity
    fn get_mut(&mut self, key: EntityKey) -> Option<&mut Entity>;

    fn contains(&self, key: EntityKey) -> bool {
        self.get(key).is_some()
    }

    fn position(&self, key: EntityKey) -> Option<Vec3> {
        self.get(key).map(Entity::position)
    }

    /// Local bounding box (relative to the entity position)
    fn aabb(&self, key: EntityKey) -> Option<AABB> {
        self.get(key).map(Entity::aabb)
    }

    /// Returns `false` for a stale key
    fn set_aabb(&mut self, key: EntityKey, aabb: AABB) -> bool {
        match self.get_mut(key) {
            Some(entity) => {
                entity.set_aabb(aabb);
                true
            }
            None => false,
        }
    }

    fn set_done(&mut self, key: EntityKey, done: bool) {
        if let Some(entity) = self.get_mut(key) {
            entity.set_done(done);
        }
    }

    fn is_done(&self, key: EntityKey) -> bool {
        self.get(key).is_some_and(Entity::is_done)
    }

    fn has_collider(&self, key: EntityKey) -> bool {
        self.get(key).is_some_and(Entity::has_collider)
    }

    fn has_lod(&self, key: EntityKey) -> bool {
        self.get(key).is_some_and(Entity::has_lod)
    }

    fn set_detail_level(&mut self, key: EntityKey, level: DetailLevel) {
        if let Some(entity) = self.get_mut(key) {
            entity.set_detail_level(level);
        }
    }

    fn detail_level(&self, key: EntityKey) -> Option<DetailLevel> {
        self.get(key).and_then(Entity::detail_level)
    }

    fn update_entity(&mut self, key: EntityKey, dt: f64) {
        if let Some(entity) = self.get_mut(key) {
            entity.update(dt);
        }
    }

    /// Draw the entity's mesh under the current model matrix
    fn render_entity(&self, key: EntityKey, renderer: &mut dyn Renderer) {
        if let Some(entity) = self.get(key) {
            entity.render_mesh(renderer);
        }
    }
}

/// Plain slot map storage, handy when no `EntityManager` is needed
impl EntityStore for SlotMap<EntityKey, Entity> {
    fn get(&self, key: EntityKey) -> Option<&Entity> {
        SlotMap::get(self, key)
    }

    fn get_mut(&mut self, key: EntityKey) -> Option<&mut Entity> {
        SlotMap::get_mut(self, key)
    }
}
