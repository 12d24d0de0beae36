/// Game entities and their capability variants.
///
/// Capabilities (collider, LOD, projectile/laser behaviour) are fixed
/// when the entity is built; callers branch on `EntityKind` and
/// `EntityFlags` instead of probing types at runtime.

use bitflags::bitflags;
use glam::Vec3;
use slotmap::new_key_type;
use crate::render::Renderer;
use crate::scene::AABB;
use crate::spatial::{DetailLevel, LevelOfDetails};

new_key_type! {
    /// Stable key to an entity stored in an `EntityManager`
    pub struct EntityKey;
}

bitflags! {
    /// Capabilities resolved at creation time
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct EntityFlags: u32 {
        /// Takes part in projectile collision checks
        const COLLIDER = 1 << 0;
        /// Renders through its `LevelOfDetails` set
        const LOD = 1 << 1;
        /// Drawn by `render_mesh`
        const RENDERABLE = 1 << 2;
    }
}

/// Distance kept between a patrolling entity and its boundary
pub const PATROL_BOUNDARY_MARGIN: f32 = 20.0;

/// Moves toward a destination inside a rectangular boundary.
///
/// Reaching the near or far z limit mirrors the destination's z, so
/// the entity walks back and forth across the terrain.
#[derive(Debug, Clone, PartialEq)]
pub struct Patrol {
    pub destination: Vec3,
    pub speed: f32,
    pub boundary_min: Vec3,
    pub boundary_max: Vec3,
    pub margin: f32,
}

impl Patrol {
    pub fn new(destination: Vec3, speed: f32, boundary_min: Vec3, boundary_max: Vec3) -> Self {
        Self {
            destination,
            speed,
            boundary_min,
            boundary_max,
            margin: PATROL_BOUNDARY_MARGIN,
        }
    }

    pub fn with_margin(mut self, margin: f32) -> Self {
        self.margin = margin;
        self
    }

    fn step(&mut self, position: &mut Vec3, dt: f32) {
        let direction = (self.destination - *position).normalize_or_zero();
        *position += direction * self.speed * dt;
        self.constrain(position);
    }

    fn constrain(&mut self, position: &mut Vec3) {
        let lo = self.boundary_min + Vec3::splat(self.margin);
        let hi = self.boundary_max - Vec3::splat(self.margin);

        if position.x > hi.x {
            position.x = hi.x;
        }
        if position.z > hi.z {
            position.z = hi.z;
            self.destination.z = -position.z;
        }
        if position.x < lo.x {
            position.x = lo.x;
        }
        if position.z < lo.z {
            position.z = lo.z;
            self.destination.z = -position.z;
        }
    }
}

/// Straight-line projectile with a finite lifetime (seconds)
#[derive(Debug, Clone, PartialEq)]
pub struct Projectile {
    pub direction: Vec3,
    pub speed: f32,
    pub lifetime: f32,
}

impl Projectile {
    pub fn new(direction: Vec3, speed: f32, lifetime: f32) -> Self {
        Self { direction, speed, lifetime }
    }

    /// Advance one tick. Returns `false` once the lifetime has run out.
    fn step(&mut self, position: &mut Vec3, dt: f32) -> bool {
        self.lifetime -= dt;
        if self.lifetime < 0.0 {
            return false;
        }
        *position += self.direction * self.speed * dt;
        true
    }
}

/// Projectile whose hit test is the segment `[position, position + direction * length]`
#[derive(Debug, Clone, PartialEq)]
pub struct Laser {
    pub projectile: Projectile,
    pub length: f32,
}

impl Laser {
    pub fn new(direction: Vec3, speed: f32, lifetime: f32, length: f32) -> Self {
        Self {
            projectile: Projectile::new(direction, speed, lifetime),
            length,
        }
    }
}

/// Behaviour variant of an entity
#[derive(Debug, Clone, PartialEq)]
pub enum EntityKind {
    /// Static prop, no per-tick behaviour
    Generic,
    Patrol(Patrol),
    Projectile(Projectile),
    Laser(Laser),
}

/// A positioned object with a local bounding box.
///
/// The AABB is stored relative to `position`.
#[derive(Debug, Clone)]
pub struct Entity {
    position: Vec3,
    scale: Vec3,
    aabb: AABB,
    done: bool,
    flags: EntityFlags,
    lod: Option<LevelOfDetails>,
    mesh: String,
    kind: EntityKind,
}

impl Entity {
    /// Renderable generic entity with a unit bounding box
    pub fn new(mesh: impl Into<String>, position: Vec3) -> Self {
        Self {
            position,
            scale: Vec3::ONE,
            aabb: AABB::from_half_extents(Vec3::splat(0.5)),
            done: false,
            flags: EntityFlags::RENDERABLE,
            lod: None,
            mesh: mesh.into(),
            kind: EntityKind::Generic,
        }
    }

    /// Collider projectile
    pub fn projectile(mesh: impl Into<String>, position: Vec3, projectile: Projectile) -> Self {
        Self::new(mesh, position)
            .with_kind(EntityKind::Projectile(projectile))
            .with_collider(true)
    }

    /// Collider laser
    pub fn laser(mesh: impl Into<String>, position: Vec3, laser: Laser) -> Self {
        Self::new(mesh, position)
            .with_kind(EntityKind::Laser(laser))
            .with_collider(true)
    }

    /// Patrolling entity
    pub fn patrol(mesh: impl Into<String>, position: Vec3, patrol: Patrol) -> Self {
        Self::new(mesh, position).with_kind(EntityKind::Patrol(patrol))
    }

    pub fn with_kind(mut self, kind: EntityKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    /// Local bounding box (relative to the position)
    pub fn with_aabb(mut self, aabb: AABB) -> Self {
        self.aabb = aabb;
        self
    }

    pub fn with_collider(mut self, enabled: bool) -> Self {
        self.flags.set(EntityFlags::COLLIDER, enabled);
        self
    }

    /// Attach an LOD mesh set and enable LOD rendering
    pub fn with_lod(mut self, lod: LevelOfDetails) -> Self {
        self.lod = Some(lod);
        self.flags.insert(EntityFlags::LOD);
        self
    }

    /// Exclude from `render_mesh` (invisible group nodes)
    pub fn hidden(mut self) -> Self {
        self.flags.remove(EntityFlags::RENDERABLE);
        self
    }

    // ===== ACCESSORS =====

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    pub fn scale(&self) -> Vec3 {
        self.scale
    }

    pub fn aabb(&self) -> AABB {
        self.aabb
    }

    pub fn set_aabb(&mut self, aabb: AABB) {
        self.aabb = aabb;
    }

    /// Bounding box in world space
    pub fn world_aabb(&self) -> AABB {
        self.aabb.translated(self.position)
    }

    pub fn is_done(&self) -> bool {
        self.done
    }

    pub fn set_done(&mut self, done: bool) {
        self.done = done;
    }

    pub fn flags(&self) -> EntityFlags {
        self.flags
    }

    pub fn has_collider(&self) -> bool {
        self.flags.contains(EntityFlags::COLLIDER)
    }

    /// LOD enabled and a mesh set attached
    pub fn has_lod(&self) -> bool {
        self.flags.contains(EntityFlags::LOD) && self.lod.is_some()
    }

    /// Toggle LOD rendering without dropping the mesh set
    pub fn set_lod_enabled(&mut self, enabled: bool) {
        self.flags.set(EntityFlags::LOD, enabled);
    }

    pub fn lod(&self) -> Option<&LevelOfDetails> {
        self.lod.as_ref()
    }

    /// Forward a tier to the LOD set. Ignored without one.
    pub fn set_detail_level(&mut self, level: DetailLevel) {
        if let Some(lod) = &mut self.lod {
            lod.set_detail_level(level);
        }
    }

    pub fn detail_level(&self) -> Option<DetailLevel> {
        self.lod.as_ref().map(LevelOfDetails::detail_level)
    }

    pub fn mesh(&self) -> &str {
        &self.mesh
    }

    pub fn kind(&self) -> &EntityKind {
        &self.kind
    }

    pub fn kind_mut(&mut self) -> &mut EntityKind {
        &mut self.kind
    }

    pub fn is_projectile(&self) -> bool {
        matches!(self.kind, EntityKind::Projectile(_) | EntityKind::Laser(_))
    }

    pub fn is_laser(&self) -> bool {
        matches!(self.kind, EntityKind::Laser(_))
    }

    /// `(tip, tail)` of a laser beam, `None` for other kinds
    pub fn laser_segment(&self) -> Option<(Vec3, Vec3)> {
        match &self.kind {
            EntityKind::Laser(laser) => Some((
                self.position + laser.projectile.direction * laser.length,
                self.position,
            )),
            _ => None,
        }
    }

    // ===== BEHAVIOUR =====

    /// Advance this entity by `dt` seconds
    pub fn update(&mut self, dt: f64) {
        let dt = dt as f32;
        match &mut self.kind {
            EntityKind::Generic => {}
            EntityKind::Patrol(patrol) => patrol.step(&mut self.position, dt),
            EntityKind::Projectile(projectile) => {
                if !projectile.step(&mut self.position, dt) {
                    self.done = true;
                }
            }
            EntityKind::Laser(laser) => {
                if !laser.projectile.step(&mut self.position, dt) {
                    self.done = true;
                }
            }
        }
    }

    /// Draw the entity's mesh under the current model matrix.
    ///
    /// LOD entities draw the mesh of their current tier, and nothing at
    /// `DetailLevel::None`.
    pub fn render_mesh(&self, renderer: &mut dyn Renderer) {
        if !self.flags.contains(EntityFlags::RENDERABLE) {
            return;
        }
        match &self.lod {
            Some(lod) if self.flags.contains(EntityFlags::LOD) => {
                if let Some(mesh) = lod.mesh() {
                    renderer.render_mesh(mesh);
                }
            }
            _ => renderer.render_mesh(&self.mesh),
        }
    }
}

#[cfg(test)]
#[path = "entity_tests.rs"]
mod tests;
