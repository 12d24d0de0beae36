/// One rectangular cell of the spatial partition.
///
/// A cell owns the keys of the entities currently inside its
/// `[min, max)` footprint on x and z. Membership only changes through
/// `add`, `remove` and the migration scan in `update`.

use glam::Vec3;
use crate::engine_debug;
use crate::engine_trace;
use crate::entity::{EntityKey, EntityStore};
use crate::render::CellDraw;
use super::level_of_details::DetailLevel;

/// Column/row coordinates of a cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GridIndex {
    pub x: i32,
    pub z: i32,
}

impl GridIndex {
    pub fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }
}

/// How a cell quad is drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MeshRenderMode {
    #[default]
    Fill,
    Wire,
}

/// Occupancy band, used to color cells when they are drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum CellOccupancy {
    Empty,
    /// 1-2 occupants
    Light,
    /// 3-4 occupants
    Busy,
    /// 5 or more occupants
    Crowded,
}

impl CellOccupancy {
    pub fn from_count(count: usize) -> Self {
        match count {
            0 => CellOccupancy::Empty,
            1..=2 => CellOccupancy::Light,
            3..=4 => CellOccupancy::Busy,
            _ => CellOccupancy::Crowded,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Grid {
    index: GridIndex,
    min: Vec3,
    max: Vec3,
    occupants: Vec<EntityKey>,
    detail_level: DetailLevel,
    mesh_render_mode: MeshRenderMode,
}

impl Grid {
    /// Cell `index` of size `width` x `depth`, shifted by `-x_offset` / `-z_offset`.
    ///
    /// Bounds are flat (y = 0); only x and z take part in containment.
    /// `max` is the next cell's `min`, so neighbouring footprints share
    /// their boundary exactly.
    pub fn new(index: GridIndex, width: f32, depth: f32, x_offset: f32, z_offset: f32) -> Self {
        Self {
            index,
            min: Vec3::new(
                cell_boundary(index.x, width, x_offset),
                0.0,
                cell_boundary(index.z, depth, z_offset),
            ),
            max: Vec3::new(
                cell_boundary(index.x + 1, width, x_offset),
                0.0,
                cell_boundary(index.z + 1, depth, z_offset),
            ),
            occupants: Vec::new(),
            detail_level: DetailLevel::None,
            mesh_render_mode: MeshRenderMode::Fill,
        }
    }

    pub fn index(&self) -> GridIndex {
        self.index
    }

    pub fn min(&self) -> Vec3 {
        self.min
    }

    pub fn max(&self) -> Vec3 {
        self.max
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// `true` when `position` lies in `[min, max)` on x and z
    pub fn contains_point(&self, position: Vec3) -> bool {
        in_footprint(self.min, self.max, position)
    }

    // ===== OCCUPANTS =====

    /// Insert `key` unless it is already here. Returns `true` if inserted.
    pub fn add(&mut self, key: EntityKey) -> bool {
        if self.occupants.contains(&key) {
            return false;
        }
        self.occupants.push(key);
        true
    }

    /// Remove the first occurrence of `key`
    pub fn remove(&mut self, key: EntityKey) -> bool {
        match self.occupants.iter().position(|&k| k == key) {
            Some(i) => {
                self.occupants.remove(i);
                true
            }
            None => false,
        }
    }

    /// Drop every occupant
    pub fn clear(&mut self) {
        self.occupants.clear();
    }

    /// Whether `key` is an occupant of this cell
    pub fn contains(&self, key: EntityKey) -> bool {
        self.occupants.contains(&key)
    }

    pub fn occupants(&self) -> &[EntityKey] {
        &self.occupants
    }

    pub fn occupant_count(&self) -> usize {
        self.occupants.len()
    }

    pub fn occupancy(&self) -> CellOccupancy {
        CellOccupancy::from_count(self.occupants.len())
    }

    /// Move every occupant that left this cell into `migration`.
    ///
    /// Keys whose entity no longer exists are dropped without being queued.
    pub fn update(&mut self, store: &dyn EntityStore, migration: &mut Vec<EntityKey>) {
        let (min, max, index) = (self.min, self.max, self.index);
        self.occupants.retain(|&key| match store.position(key) {
            Some(position) if in_footprint(min, max, position) => true,
            Some(_) => {
                migration.push(key);
                false
            }
            None => {
                engine_trace!("grid3d::Grid", "Dropping stale entity {:?} from cell {:?}", key, index);
                false
            }
        });
    }

    /// Occupants near `position`.
    ///
    /// A `radius <= 0` returns every occupant unfiltered; otherwise only
    /// occupants strictly closer than `radius` are returned.
    pub fn get_occupants(&self, position: Vec3, radius: f32, store: &dyn EntityStore) -> Vec<EntityKey> {
        if radius <= 0.0 {
            return self.occupants.clone();
        }
        let radius_sq = radius * radius;
        self.occupants
            .iter()
            .copied()
            .filter(|&key| {
                store
                    .position(key)
                    .is_some_and(|p| p.distance_squared(position) < radius_sq)
            })
            .collect()
    }

    // ===== LEVEL OF DETAIL =====

    pub fn detail_level(&self) -> DetailLevel {
        self.detail_level
    }

    /// Store `level` and forward it to every LOD-enabled occupant
    pub fn set_detail_level(&mut self, level: DetailLevel, store: &mut dyn EntityStore) {
        self.detail_level = level;
        for &key in &self.occupants {
            if store.has_lod(key) {
                store.set_detail_level(key, level);
            }
        }
    }

    // ===== RENDERING =====

    pub fn mesh_render_mode(&self) -> MeshRenderMode {
        self.mesh_render_mode
    }

    pub fn set_mesh_render_mode(&mut self, mode: MeshRenderMode) {
        self.mesh_render_mode = mode;
    }

    /// Draw description for the renderer
    pub fn draw(&self) -> CellDraw {
        CellDraw {
            index: self.index,
            occupancy: self.occupancy(),
            mode: self.mesh_render_mode,
            detail_level: self.detail_level,
        }
    }

    /// Log this cell's occupants at DEBUG (silent when empty)
    pub fn debug_dump(&self, store: &dyn EntityStore) {
        if self.occupants.is_empty() {
            return;
        }
        engine_debug!(
            "grid3d::Grid",
            "Cell {:?} min {:?} max {:?} LOD {} ({} occupants)",
            self.index, self.min, self.max, self.detail_level.label(), self.occupants.len()
        );
        for (i, &key) in self.occupants.iter().enumerate() {
            match store.position(key) {
                Some(position) if store.has_lod(key) => engine_debug!(
                    "grid3d::Grid",
                    "  {} : {:?} LOD {:?}",
                    i, position, store.detail_level(key)
                ),
                Some(position) => engine_debug!("grid3d::Grid", "  {} : {:?}", i, position),
                None => engine_debug!("grid3d::Grid", "  {} : <stale {:?}>", i, key),
            }
        }
    }
}

/// Lower edge of cell `index` along one axis
pub(crate) fn cell_boundary(index: i32, size: f32, offset: f32) -> f32 {
    index as f32 * size - offset
}

fn in_footprint(min: Vec3, max: Vec3, position: Vec3) -> bool {
    min.x <= position.x && position.x < max.x && min.z <= position.z && position.z < max.z
}

#[cfg(test)]
#[path = "grid_tests.rs"]
mod tests;
