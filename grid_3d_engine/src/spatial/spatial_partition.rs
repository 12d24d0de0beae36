/// Uniform grid over a bounded, origin-centred world.
///
/// The partition owns `cells_x * cells_z` cells, stored x-major
/// (`x * cells_z + z`). Entities are routed to a cell by their x/z
/// position; entities outside the covered area are silently ignored.
///
/// Each tick the cells are scanned for occupants that left their
/// footprint. Leavers go to a migration queue and are re-added once
/// every cell has been scanned, so an entity is never lost while it
/// stays inside the world.

use glam::Vec3;
use crate::camera::{CameraPose, FrustumCulling, FrustumConfig};
use crate::engine_config_err;
use crate::engine_debug;
use crate::engine_info;
use crate::engine_trace;
use crate::entity::{EntityKey, EntityStore};
use crate::error::Result;
use crate::render::Renderer;
use super::grid::{cell_boundary, Grid, GridIndex, MeshRenderMode};
use super::level_of_details::DetailLevel;

/// Partition layout and LOD thresholds
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpatialPartitionConfig {
    /// Cell size along x
    pub cell_width: f32,
    /// Cell size along z
    pub cell_depth: f32,
    /// Number of cells along x
    pub cells_x: i32,
    /// Number of cells along z
    pub cells_z: i32,
    /// Height at which cell quads are drawn
    pub y_offset: f32,
    /// Squared distance below which a cell is `High`
    pub lod_high_mid: f32,
    /// Squared distance below which a cell is `Mid` (otherwise `Low`)
    pub lod_mid_low: f32,
}

impl Default for SpatialPartitionConfig {
    fn default() -> Self {
        Self {
            cell_width: 100.0,
            cell_depth: 100.0,
            cells_x: 10,
            cells_z: 10,
            y_offset: -9.9,
            lod_high_mid: 10000.0,
            lod_mid_low: 160000.0,
        }
    }
}

impl SpatialPartitionConfig {
    fn validate(&self) -> Result<()> {
        const SOURCE: &str = "grid3d::SpatialPartition";

        if !(self.cell_width.is_finite() && self.cell_width > 0.0)
            || !(self.cell_depth.is_finite() && self.cell_depth > 0.0)
        {
            return Err(engine_config_err!(
                SOURCE,
                "Cell size must be positive, got {} x {}",
                self.cell_width, self.cell_depth
            ));
        }
        if self.cells_x <= 0 || self.cells_z <= 0 {
            return Err(engine_config_err!(
                SOURCE,
                "Cell count must be positive, got {} x {}",
                self.cells_x, self.cells_z
            ));
        }
        if self.cells_x.checked_mul(self.cells_z).is_none() {
            return Err(engine_config_err!(
                SOURCE,
                "Cell count {} x {} overflows",
                self.cells_x, self.cells_z
            ));
        }
        let x_size = self.cell_width * self.cells_x as f32;
        let z_size = self.cell_depth * self.cells_z as f32;
        if !x_size.is_finite() || !z_size.is_finite() {
            return Err(engine_config_err!(
                SOURCE,
                "World size {} x {} is not finite",
                x_size, z_size
            ));
        }
        if !self.y_offset.is_finite()
            || !self.lod_high_mid.is_finite()
            || !self.lod_mid_low.is_finite()
        {
            return Err(engine_config_err!(
                SOURCE,
                "Non-finite y offset or LOD threshold ({}, {}, {})",
                self.y_offset, self.lod_high_mid, self.lod_mid_low
            ));
        }
        Ok(())
    }
}

#[derive(Debug)]
pub struct SpatialPartition {
    config: SpatialPartitionConfig,
    cells: Vec<Grid>,
    x_size: f32,
    z_size: f32,
    migration: Vec<EntityKey>,
    camera: Option<CameraPose>,
    frustum: FrustumCulling,
    mesh_render_mode: MeshRenderMode,
}

impl SpatialPartition {
    /// Build a partition with the default frustum configuration.
    ///
    /// Fails with `Error::InvalidConfiguration` on non-positive
    /// dimensions or non-finite values.
    pub fn new(config: SpatialPartitionConfig) -> Result<Self> {
        Self::with_frustum(config, FrustumConfig::default())
    }

    pub fn with_frustum(config: SpatialPartitionConfig, frustum: FrustumConfig) -> Result<Self> {
        config.validate()?;

        let x_size = config.cell_width * config.cells_x as f32;
        let z_size = config.cell_depth * config.cells_z as f32;

        let mut cells = Vec::with_capacity(config.cells_x as usize * config.cells_z as usize);
        for x in 0..config.cells_x {
            for z in 0..config.cells_z {
                cells.push(Grid::new(
                    GridIndex::new(x, z),
                    config.cell_width,
                    config.cell_depth,
                    x_size * 0.5,
                    z_size * 0.5,
                ));
            }
        }

        engine_info!(
            "grid3d::SpatialPartition",
            "Created {} x {} cells of {} x {} ({} x {} world)",
            config.cells_x, config.cells_z, config.cell_width, config.cell_depth, x_size, z_size
        );

        Ok(Self {
            config,
            cells,
            x_size,
            z_size,
            migration: Vec::new(),
            camera: None,
            frustum: FrustumCulling::new(frustum),
            mesh_render_mode: MeshRenderMode::Fill,
        })
    }

    // ===== LAYOUT =====

    pub fn config(&self) -> &SpatialPartitionConfig {
        &self.config
    }

    /// World extent along x
    pub fn x_size(&self) -> f32 {
        self.x_size
    }

    /// World extent along z
    pub fn z_size(&self) -> f32 {
        self.z_size
    }

    pub fn cell_width(&self) -> f32 {
        self.config.cell_width
    }

    pub fn cell_depth(&self) -> f32 {
        self.config.cell_depth
    }

    pub fn cells_x(&self) -> i32 {
        self.config.cells_x
    }

    pub fn cells_z(&self) -> i32 {
        self.config.cells_z
    }

    /// Cell at `(x, z)`, `None` when out of range
    pub fn grid(&self, x: i32, z: i32) -> Option<&Grid> {
        self.slot(GridIndex::new(x, z)).map(|slot| &self.cells[slot])
    }

    /// All cells, x-major
    pub fn grids(&self) -> &[Grid] {
        &self.cells
    }

    /// Cell containing `position`, `None` outside the world.
    ///
    /// Floor division gives a first guess; the cell footprints have the
    /// final say, so the returned cell always satisfies
    /// `grid.contains_point(position)`.
    pub fn cell_index_of(&self, position: Vec3) -> Option<GridIndex> {
        let x = snap_to_cell(position.x, self.config.cell_width, self.x_size * 0.5, self.config.cells_x)?;
        let z = snap_to_cell(position.z, self.config.cell_depth, self.z_size * 0.5, self.config.cells_z)?;
        Some(GridIndex::new(x, z))
    }

    fn slot(&self, index: GridIndex) -> Option<usize> {
        let in_range = (0..self.config.cells_x).contains(&index.x)
            && (0..self.config.cells_z).contains(&index.z);
        in_range.then(|| (index.x * self.config.cells_z + index.z) as usize)
    }

    /// Centre of cell `(x, z)`, also defined for out-of-range indices
    fn cell_center(&self, x: i32, z: i32) -> Vec3 {
        Vec3::new(
            self.config.cell_width * (x as f32 + 0.5) - self.x_size * 0.5,
            0.0,
            self.config.cell_depth * (z as f32 + 0.5) - self.z_size * 0.5,
        )
    }

    // ===== MEMBERSHIP =====

    /// Put an entity into the cell under its position.
    ///
    /// Returns `false` (and does nothing) for stale keys and positions
    /// outside the world.
    pub fn add(&mut self, key: EntityKey, store: &dyn EntityStore) -> bool {
        let Some(slot) = self.slot_of(key, store) else {
            return false;
        };
        self.cells[slot].add(key);
        true
    }

    /// Remove an entity from the cell under its current position.
    ///
    /// An entity that moved since its last migration scan is not found.
    pub fn remove(&mut self, key: EntityKey, store: &dyn EntityStore) -> bool {
        match self.slot_of(key, store) {
            Some(slot) => self.cells[slot].remove(key),
            None => false,
        }
    }

    fn slot_of(&self, key: EntityKey, store: &dyn EntityStore) -> Option<usize> {
        let position = store.position(key)?;
        match self.cell_index_of(position) {
            Some(index) => self.slot(index),
            None => {
                engine_trace!(
                    "grid3d::SpatialPartition",
                    "Entity {:?} at {:?} is outside the partition",
                    key, position
                );
                None
            }
        }
    }

    /// Entities in the cell containing `position` (see `Grid::get_occupants`).
    ///
    /// Only that single cell is searched; occupants of neighbouring cells
    /// are never returned even when they are within `radius`.
    pub fn get_objects(&self, position: Vec3, radius: f32, store: &dyn EntityStore) -> Vec<EntityKey> {
        match self.cell_index_of(position).and_then(|index| self.slot(index)) {
            Some(slot) => self.cells[slot].get_occupants(position, radius, store),
            None => Vec::new(),
        }
    }

    /// Drop every occupant and pending migration
    pub fn clear(&mut self) {
        for cell in &mut self.cells {
            cell.clear();
        }
        self.migration.clear();
    }

    /// Entities scanned out of their cell and not yet re-added
    pub fn pending_migrations(&self) -> &[EntityKey] {
        &self.migration
    }

    // ===== TICK =====

    /// Scan every cell for leavers, then re-add all migrated entities.
    pub fn update(&mut self, store: &mut dyn EntityStore) {
        for cell in &mut self.cells {
            cell.update(&*store, &mut self.migration);
        }
        self.process_migrations(&*store);
    }

    fn process_migrations(&mut self, store: &dyn EntityStore) {
        if self.migration.is_empty() {
            return;
        }
        let migrating = std::mem::take(&mut self.migration);
        for key in migrating {
            if !self.add(key, store) {
                engine_trace!("grid3d::SpatialPartition", "Entity {:?} left the world", key);
            }
        }
    }

    /// Migration scan plus frustum-aware LOD classification.
    ///
    /// Cells outside the frustum get `DetailLevel::None`; occupied cells
    /// inside get a tier by squared distance to the camera; empty cells
    /// inside keep their tier. Migrated entities stay queued until the
    /// next `update`. Without a camera only the scan runs.
    pub fn enable_frustum_culling(&mut self, store: &mut dyn EntityStore) {
        self.classify(store, true);
    }

    /// Migration scan plus distance-only LOD classification of every cell
    pub fn disable_frustum_culling(&mut self, store: &mut dyn EntityStore) {
        self.classify(store, false);
    }

    fn classify(&mut self, store: &mut dyn EntityStore, culling: bool) {
        let (width, depth) = (self.config.cell_width, self.config.cell_depth);

        for slot in 0..self.cells.len() {
            self.cells[slot].update(&*store, &mut self.migration);

            let Some(camera) = self.camera else {
                continue;
            };
            let cell = &self.cells[slot];
            let index = cell.index();
            let level = if culling && !self.frustum.is_box_in_frustum(cell.center(), width, depth) {
                Some(DetailLevel::None)
            } else if culling && cell.occupant_count() == 0 {
                None
            } else {
                let distance = self.calculate_distance_square(camera.position, index.x, index.z);
                Some(self.detail_level_for(distance))
            };

            if let Some(level) = level {
                self.cells[slot].set_detail_level(level, store);
            }
        }
    }

    // ===== LEVEL OF DETAIL =====

    /// Set the two squared-distance thresholds (high/mid, mid/low)
    pub fn set_level_of_details(&mut self, high_mid: f32, mid_low: f32) {
        self.config.lod_high_mid = high_mid;
        self.config.lod_mid_low = mid_low;
    }

    pub fn level_of_details(&self) -> (f32, f32) {
        (self.config.lod_high_mid, self.config.lod_mid_low)
    }

    /// Tier for a squared distance
    pub fn detail_level_for(&self, distance_sq: f32) -> DetailLevel {
        if distance_sq < self.config.lod_high_mid {
            DetailLevel::High
        } else if distance_sq < self.config.lod_mid_low {
            DetailLevel::Mid
        } else {
            DetailLevel::Low
        }
    }

    /// Squared x/z distance from `camera_position` to the centre of cell `(x, z)`
    pub fn calculate_distance_square(&self, camera_position: Vec3, x: i32, z: i32) -> f32 {
        let center = self.cell_center(x, z);
        let dx = center.x - camera_position.x;
        let dz = center.z - camera_position.z;
        dx * dx + dz * dz
    }

    /// Coarse visibility: the camera is within the cell's radius, or the
    /// cell centre is not behind the camera.
    pub fn is_visible(&self, camera_position: Vec3, camera_direction: Vec3, x: i32, z: i32) -> bool {
        let center = self.cell_center(x, z);
        let offset = Vec3::new(center.x - camera_position.x, 0.0, center.z - camera_position.z);
        let (w, d) = (self.config.cell_width, self.config.cell_depth);
        if offset.length_squared() < w * w + d * d {
            return true;
        }
        camera_direction.dot(offset) >= 0.0
    }

    // ===== CAMERA =====

    /// Track a camera pose and rebuild the frustum from it
    pub fn set_camera(&mut self, camera: CameraPose) {
        self.frustum.update(camera.position, camera.target, camera.up);
        self.camera = Some(camera);
    }

    /// Stop LOD classification (cells keep their last tier)
    pub fn remove_camera(&mut self) {
        self.camera = None;
    }

    pub fn camera(&self) -> Option<&CameraPose> {
        self.camera.as_ref()
    }

    pub fn frustum(&self) -> &FrustumCulling {
        &self.frustum
    }

    // ===== RENDERING =====

    pub fn set_mesh_render_mode(&mut self, mode: MeshRenderMode) {
        self.mesh_render_mode = mode;
        for cell in &mut self.cells {
            cell.set_mesh_render_mode(mode);
        }
    }

    pub fn mesh_render_mode(&self) -> MeshRenderMode {
        self.mesh_render_mode
    }

    /// Draw every occupied cell inside the frustum of `camera`.
    ///
    /// The whole grid is lifted by `y_offset`; each cell quad is drawn at
    /// its centre, scaled to its footprint and laid flat.
    pub fn render(&mut self, renderer: &mut dyn Renderer, camera: &CameraPose) {
        self.frustum.update(camera.position, camera.target, camera.up);
        let (width, depth) = (self.config.cell_width, self.config.cell_depth);

        renderer.push_matrix();
        renderer.translate(Vec3::new(0.0, self.config.y_offset, 0.0));
        for cell in &self.cells {
            if cell.occupant_count() == 0 || !self.frustum.is_box_in_frustum(cell.center(), width, depth) {
                continue;
            }
            let center = cell.center();
            renderer.push_matrix();
            renderer.translate(Vec3::new(center.x, 0.0, center.z));
            renderer.push_matrix();
            renderer.scale(Vec3::new(width, 1.0, depth));
            renderer.rotate(-90.0, Vec3::X);
            renderer.render_cell(&cell.draw());
            renderer.pop_matrix();
            renderer.pop_matrix();
        }
        renderer.pop_matrix();
    }

    /// Log the layout and every occupied cell at DEBUG
    pub fn debug_dump(&self, store: &dyn EntityStore) {
        engine_debug!(
            "grid3d::SpatialPartition",
            "World {} x {}, {} x {} cells, {} pending migrations",
            self.x_size, self.z_size, self.config.cells_x, self.config.cells_z, self.migration.len()
        );
        for cell in &self.cells {
            cell.debug_dump(store);
        }
    }
}

/// Index in `0..count` of the cell whose footprint holds `coord` on one axis.
///
/// The guess from floor division can be one cell off when `size` has no
/// exact float form; walking against `cell_boundary` settles it.
fn snap_to_cell(coord: f32, size: f32, offset: f32, count: i32) -> Option<i32> {
    let guess = ((coord + offset) / size).floor();
    if !guess.is_finite() {
        return None;
    }
    let mut index = (guess as i32).clamp(-1, count);
    while index >= 0 && coord < cell_boundary(index, size, offset) {
        index -= 1;
    }
    while index < count && coord >= cell_boundary(index + 1, size, offset) {
        index += 1;
    }
    (0..count).contains(&index).then_some(index)
}

#[cfg(test)]
#[path = "spatial_partition_tests.rs"]
mod tests;
