//! Entities and their owner
//!
//! `Entity` is the concrete game object; the scene graph and spatial
//! partition never hold one directly. They keep `EntityKey`s and reach
//! entity state through the `EntityStore` trait, so a key whose entity
//! has been removed simply resolves to nothing.

mod entity;
mod entity_store;
mod entity_manager;
pub mod collision;

pub use entity::{
    Entity, EntityKey, EntityKind, EntityFlags,
    Patrol, Projectile, Laser, PATROL_BOUNDARY_MARGIN,
};
pub use entity_store::EntityStore;
pub use entity_manager::{EntityManager, EntityCategory};
