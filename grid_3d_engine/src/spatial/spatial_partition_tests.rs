use glam::Vec3;
use slotmap::SlotMap;
use crate::camera::CameraPose;
use crate::entity::{Entity, EntityKey, EntityStore};
use crate::error::Error;
use crate::render::MockRenderer;
use crate::spatial::{DetailLevel, LevelOfDetails, MeshRenderMode, CellOccupancy};
use super::*;

type Store = SlotMap<EntityKey, Entity>;

/// 10 x 10 cells of 10 x 10: world x, z in [-50, 50)
fn small_config() -> SpatialPartitionConfig {
    SpatialPartitionConfig {
        cell_width: 10.0,
        cell_depth: 10.0,
        cells_x: 10,
        cells_z: 10,
        lod_high_mid: 100.0,
        lod_mid_low: 1600.0,
        ..Default::default()
    }
}

fn small_partition() -> SpatialPartition {
    SpatialPartition::new(small_config()).unwrap()
}

fn spawn(store: &mut Store, position: Vec3) -> EntityKey {
    store.insert(Entity::new("cube", position))
}

fn spawn_lod(store: &mut Store, position: Vec3) -> EntityKey {
    store.insert(Entity::new("tree", position).with_lod(LevelOfDetails::new("h", "m", "l")))
}

fn total_occupants(partition: &SpatialPartition) -> usize {
    partition.grids().iter().map(Grid::occupant_count).sum()
}

/// Camera 10 units up at the origin, looking down -z
fn forward_camera() -> CameraPose {
    CameraPose::new(Vec3::new(0.0, 10.0, 0.0), Vec3::new(0.0, 10.0, -100.0), Vec3::Y)
}

// ============================================================================
// Construction
// ============================================================================

#[test]
fn test_default_config() {
    let config = SpatialPartitionConfig::default();
    assert_eq!((config.cell_width, config.cell_depth), (100.0, 100.0));
    assert_eq!((config.cells_x, config.cells_z), (10, 10));
    assert!((config.y_offset + 9.9).abs() < 1e-6);
    assert_eq!((config.lod_high_mid, config.lod_mid_low), (10000.0, 160000.0));
}

#[test]
fn test_layout_getters() {
    let partition = small_partition();
    assert_eq!(partition.x_size(), 100.0);
    assert_eq!(partition.z_size(), 100.0);
    assert_eq!(partition.cell_width(), 10.0);
    assert_eq!(partition.cell_depth(), 10.0);
    assert_eq!(partition.cells_x(), 10);
    assert_eq!(partition.cells_z(), 10);
    assert_eq!(partition.grids().len(), 100);
    assert_eq!(partition.level_of_details(), (100.0, 1600.0));
}

#[test]
fn test_cells_are_centred_on_origin() {
    let partition = small_partition();
    let first = partition.grid(0, 0).unwrap();
    assert_eq!(first.min(), Vec3::new(-50.0, 0.0, -50.0));
    let last = partition.grid(9, 9).unwrap();
    assert_eq!(last.max(), Vec3::new(50.0, 0.0, 50.0));
    assert!(partition.grid(10, 0).is_none());
    assert!(partition.grid(0, -1).is_none());
}

#[test]
fn test_storage_is_x_major() {
    let partition = small_partition();
    assert_eq!(partition.grids()[1].index(), GridIndex::new(0, 1));
    assert_eq!(partition.grids()[10].index(), GridIndex::new(1, 0));
}

#[test]
fn test_non_positive_dimensions_are_rejected() {
    let bad = [
        SpatialPartitionConfig { cell_width: 0.0, ..small_config() },
        SpatialPartitionConfig { cell_depth: -1.0, ..small_config() },
        SpatialPartitionConfig { cells_x: 0, ..small_config() },
        SpatialPartitionConfig { cells_z: -3, ..small_config() },
    ];
    for config in bad {
        match SpatialPartition::new(config) {
            Err(Error::InvalidConfiguration(_)) => {}
            other => panic!("expected InvalidConfiguration, got {:?}", other.err()),
        }
    }
}

#[test]
fn test_non_finite_values_are_rejected() {
    let config = SpatialPartitionConfig { y_offset: f32::NAN, ..small_config() };
    assert!(matches!(SpatialPartition::new(config), Err(Error::InvalidConfiguration(_))));

    let config = SpatialPartitionConfig { lod_mid_low: f32::INFINITY, ..small_config() };
    assert!(matches!(SpatialPartition::new(config), Err(Error::InvalidConfiguration(_))));
}

#[test]
fn test_overflowing_layout_is_rejected() {
    let bad = [
        SpatialPartitionConfig { cells_x: 70_000, cells_z: 70_000, ..small_config() },
        SpatialPartitionConfig { cell_width: f32::MAX, ..small_config() },
        SpatialPartitionConfig { cell_depth: f32::MAX / 2.0, ..small_config() },
    ];
    for config in bad {
        match SpatialPartition::new(config) {
            Err(Error::InvalidConfiguration(_)) => {}
            other => panic!("expected InvalidConfiguration, got {:?}", other.err()),
        }
    }
}

// ============================================================================
// Cell mapping / Add / Remove
// ============================================================================

#[test]
fn test_position_maps_to_cell() {
    let partition = small_partition();
    assert_eq!(partition.cell_index_of(Vec3::new(5.0, 0.0, 5.0)), Some(GridIndex::new(5, 5)));
    assert_eq!(partition.cell_index_of(Vec3::new(-50.0, 0.0, -50.0)), Some(GridIndex::new(0, 0)));
    assert_eq!(partition.cell_index_of(Vec3::new(49.9, 0.0, -0.1)), Some(GridIndex::new(9, 4)));
    assert_eq!(partition.cell_index_of(Vec3::new(50.0, 0.0, 0.0)), None);
    assert_eq!(partition.cell_index_of(Vec3::new(-55.0, 0.0, 0.0)), None);
    assert_eq!(partition.cell_index_of(Vec3::new(f32::NAN, 0.0, 0.0)), None);
}

/// 10 x 10 cells of 0.1 x 0.1, a size with no exact float form
fn fine_partition() -> SpatialPartition {
    SpatialPartition::new(SpatialPartitionConfig {
        cell_width: 0.1,
        cell_depth: 0.1,
        ..small_config()
    })
    .unwrap()
}

#[test]
fn test_mapped_cell_contains_position_for_inexact_cell_size() {
    let partition = fine_partition();
    for k in 0..1000 {
        let x = -0.5 + k as f32 * 0.001;
        let position = Vec3::new(x, 0.0, x * 0.5);
        let index = partition.cell_index_of(position).unwrap();
        let grid = partition.grid(index.x, index.z).unwrap();
        assert!(grid.contains_point(position), "{:?} mapped to {:?}", position, index);
    }
}

#[test]
fn test_inexact_cell_size_does_not_churn_occupants() {
    let mut store = Store::with_key();
    let mut partition = fine_partition();
    let keys: Vec<EntityKey> = [-0.4, -0.3, -0.2]
        .into_iter()
        .map(|x| spawn_lod(&mut store, Vec3::new(x, 0.0, 0.0)))
        .collect();
    for &key in &keys {
        partition.add(key, &store);
    }

    let before: Vec<GridIndex> = keys
        .iter()
        .map(|&key| partition.cell_index_of(store.position(key).unwrap()).unwrap())
        .collect();
    for (&key, index) in keys.iter().zip(&before) {
        let grid = partition.grid(index.x, index.z).unwrap();
        assert!(grid.contains(key));
        assert!(grid.contains_point(store.position(key).unwrap()));
    }

    // Far along +z: planar distance ~10000 puts every cell past `lod_mid_low`
    partition.set_camera(CameraPose::new(Vec3::new(0.0, 10.0, 100.0), Vec3::new(0.0, 10.0, 0.0), Vec3::Y));
    partition.disable_frustum_culling(&mut store);
    assert!(partition.pending_migrations().is_empty());

    partition.update(&mut store);
    for (&key, index) in keys.iter().zip(&before) {
        assert!(partition.grid(index.x, index.z).unwrap().contains(key));
        assert_eq!(store.detail_level(key), Some(DetailLevel::Low));
    }
    assert_eq!(total_occupants(&partition), keys.len());
}

#[test]
fn test_add_routes_entity_to_its_cell() {
    let mut store = Store::with_key();
    let mut partition = small_partition();
    let key = spawn(&mut store, Vec3::new(5.0, 0.0, 5.0));

    assert!(partition.add(key, &store));
    assert!(partition.grid(5, 5).unwrap().contains(key));
    assert_eq!(total_occupants(&partition), 1);
}

#[test]
fn test_add_outside_world_is_a_noop() {
    let mut store = Store::with_key();
    let mut partition = small_partition();
    let inside = spawn(&mut store, Vec3::new(5.0, 0.0, 5.0));
    partition.add(inside, &store);

    let outside = spawn(&mut store, Vec3::new(-55.0, 0.0, 0.0));
    assert!(!partition.add(outside, &store));
    assert_eq!(total_occupants(&partition), 1);
}

#[test]
fn test_added_entity_is_found_at_its_position() {
    let mut store = Store::with_key();
    let mut partition = small_partition();
    let positions = [
        Vec3::new(-49.0, 0.0, 49.0),
        Vec3::new(0.0, 3.0, 0.0),
        Vec3::new(12.5, 0.0, -33.3),
    ];
    for position in positions {
        let key = spawn(&mut store, position);
        partition.add(key, &store);
        assert!(partition.get_objects(position, 0.0, &store).contains(&key));
    }
}

#[test]
fn test_repeated_add_keeps_one_occupant() {
    let mut store = Store::with_key();
    let mut partition = small_partition();
    let key = spawn(&mut store, Vec3::ONE);
    partition.add(key, &store);
    partition.add(key, &store);
    assert_eq!(total_occupants(&partition), 1);
}

#[test]
fn test_remove_uses_current_position() {
    let mut store = Store::with_key();
    let mut partition = small_partition();
    let key = spawn(&mut store, Vec3::new(5.0, 0.0, 5.0));
    partition.add(key, &store);

    // Moved without a migration scan: not found in the new cell
    store[key].set_position(Vec3::new(25.0, 0.0, 5.0));
    assert!(!partition.remove(key, &store));

    store[key].set_position(Vec3::new(5.0, 0.0, 5.0));
    assert!(partition.remove(key, &store));
    assert_eq!(total_occupants(&partition), 0);
}

#[test]
fn test_remove_stale_key_is_false() {
    let mut store = Store::with_key();
    let mut partition = small_partition();
    let key = spawn(&mut store, Vec3::ONE);
    partition.add(key, &store);
    store.remove(key);
    assert!(!partition.remove(key, &store));
}

// ============================================================================
// GetObjects
// ============================================================================

#[test]
fn test_get_objects_outside_world_is_empty() {
    let mut store = Store::with_key();
    let mut partition = small_partition();
    let key = spawn(&mut store, Vec3::ONE);
    partition.add(key, &store);
    assert!(partition.get_objects(Vec3::new(500.0, 0.0, 0.0), 0.0, &store).is_empty());
}

#[test]
fn test_get_objects_filters_by_radius() {
    let mut store = Store::with_key();
    let mut partition = small_partition();
    let near = spawn(&mut store, Vec3::new(1.5, 0.0, 1.0));
    let far = spawn(&mut store, Vec3::new(8.0, 0.0, 8.0));
    partition.add(near, &store);
    partition.add(far, &store);

    let query = Vec3::new(1.0, 0.0, 1.0);
    assert_eq!(partition.get_objects(query, 1.0, &store), vec![near]);
    assert_eq!(partition.get_objects(query, 0.0, &store).len(), 2);
}

#[test]
fn test_get_objects_searches_only_one_cell() {
    let mut store = Store::with_key();
    let mut partition = small_partition();
    // Cell (5, 5) covers x in [0, 10)
    let key = spawn(&mut store, Vec3::new(9.5, 0.0, 5.0));
    partition.add(key, &store);

    // 1 unit away but in cell (6, 5)
    assert!(partition.get_objects(Vec3::new(10.5, 0.0, 5.0), 5.0, &store).is_empty());
    assert_eq!(partition.get_objects(Vec3::new(8.5, 0.0, 5.0), 5.0, &store), vec![key]);
}

// ============================================================================
// Update (migration)
// ============================================================================

#[test]
fn test_update_migrates_to_new_cell() {
    let mut store = Store::with_key();
    let mut partition = small_partition();
    let key = spawn(&mut store, Vec3::new(5.0, 0.0, 5.0));
    partition.add(key, &store);

    store[key].set_position(Vec3::new(15.0, 0.0, 5.0));
    partition.update(&mut store);

    assert!(!partition.grid(5, 5).unwrap().contains(key));
    assert!(partition.grid(6, 5).unwrap().contains(key));
    assert!(partition.pending_migrations().is_empty());
    assert_eq!(total_occupants(&partition), 1);
}

#[test]
fn test_update_drops_entity_leaving_world() {
    let mut store = Store::with_key();
    let mut partition = small_partition();
    let key = spawn(&mut store, Vec3::new(45.0, 0.0, 5.0));
    partition.add(key, &store);

    store[key].set_position(Vec3::new(55.0, 0.0, 5.0));
    partition.update(&mut store);

    assert_eq!(total_occupants(&partition), 0);
    assert!(partition.pending_migrations().is_empty());
}

#[test]
fn test_update_settles_long_jumps_in_one_tick() {
    let mut store = Store::with_key();
    let mut partition = small_partition();
    let key = spawn(&mut store, Vec3::new(-45.0, 0.0, -45.0));
    partition.add(key, &store);

    store[key].set_position(Vec3::new(45.0, 0.0, 45.0));
    partition.update(&mut store);

    assert!(partition.grid(9, 9).unwrap().contains(key));
    assert_eq!(total_occupants(&partition), 1);
}

#[test]
fn test_update_forgets_removed_entities() {
    let mut store = Store::with_key();
    let mut partition = small_partition();
    let key = spawn(&mut store, Vec3::ONE);
    partition.add(key, &store);
    store.remove(key);

    partition.update(&mut store);
    assert_eq!(total_occupants(&partition), 0);
}

#[test]
fn test_clear_empties_every_cell() {
    let mut store = Store::with_key();
    let mut partition = small_partition();
    for i in 0..5 {
        let key = spawn(&mut store, Vec3::new(i as f32 * 10.0 - 40.0, 0.0, 0.0));
        partition.add(key, &store);
    }
    partition.clear();
    assert_eq!(total_occupants(&partition), 0);
}

// ============================================================================
// Level of detail / frustum culling
// ============================================================================

#[test]
fn test_detail_level_thresholds() {
    let partition = small_partition();
    assert_eq!(partition.detail_level_for(99.0), DetailLevel::High);
    assert_eq!(partition.detail_level_for(100.0), DetailLevel::Mid);
    assert_eq!(partition.detail_level_for(1599.0), DetailLevel::Mid);
    assert_eq!(partition.detail_level_for(1600.0), DetailLevel::Low);
}

#[test]
fn test_set_level_of_details() {
    let mut partition = small_partition();
    partition.set_level_of_details(1.0, 2.0);
    assert_eq!(partition.level_of_details(), (1.0, 2.0));
    assert_eq!(partition.detail_level_for(1.5), DetailLevel::Mid);
}

#[test]
fn test_distance_square_is_planar() {
    let partition = small_partition();
    // Cell (5, 5) centre is (5, 0, 5)
    let d = partition.calculate_distance_square(Vec3::new(0.0, 1000.0, 0.0), 5, 5);
    assert!((d - 50.0).abs() < 1e-4);
}

#[test]
fn test_disable_culling_classifies_every_cell_by_distance() {
    let mut store = Store::with_key();
    let mut partition = small_partition();
    let near = spawn_lod(&mut store, Vec3::new(5.0, 0.0, 5.0));
    let far = spawn_lod(&mut store, Vec3::new(5.0, 0.0, 45.0));
    partition.add(near, &store);
    partition.add(far, &store);

    partition.set_camera(CameraPose::new(Vec3::ZERO, Vec3::NEG_Z, Vec3::Y));
    partition.disable_frustum_culling(&mut store);

    assert_eq!(partition.grid(5, 5).unwrap().detail_level(), DetailLevel::High);
    // centre (5, 25): 650
    assert_eq!(partition.grid(5, 7).unwrap().detail_level(), DetailLevel::Mid);
    // centre (5, 45): 2050
    assert_eq!(partition.grid(5, 9).unwrap().detail_level(), DetailLevel::Low);
    assert_eq!(store.detail_level(near), Some(DetailLevel::High));
    assert_eq!(store.detail_level(far), Some(DetailLevel::Low));
}

#[test]
fn test_enable_culling_hides_cells_behind_camera() {
    let mut store = Store::with_key();
    let mut partition = small_partition();
    let ahead = spawn_lod(&mut store, Vec3::new(5.0, 0.0, -25.0));
    let behind = spawn_lod(&mut store, Vec3::new(5.0, 0.0, 35.0));
    partition.add(ahead, &store);
    partition.add(behind, &store);

    partition.set_camera(forward_camera());
    partition.enable_frustum_culling(&mut store);

    assert_eq!(partition.grid(5, 2).unwrap().detail_level(), DetailLevel::Mid);
    assert_eq!(partition.grid(5, 8).unwrap().detail_level(), DetailLevel::None);
    assert_eq!(store.detail_level(ahead), Some(DetailLevel::Mid));
    assert_eq!(store.detail_level(behind), Some(DetailLevel::None));
}

#[test]
fn test_enable_culling_leaves_empty_visible_cells_alone() {
    let mut store = Store::with_key();
    let mut partition = small_partition();
    partition.set_camera(forward_camera());
    partition.enable_frustum_culling(&mut store);
    assert_eq!(partition.grid(5, 3).unwrap().detail_level(), DetailLevel::None);
}

#[test]
fn test_classify_without_camera_only_scans() {
    let mut store = Store::with_key();
    let mut partition = small_partition();
    let key = spawn_lod(&mut store, Vec3::new(5.0, 0.0, 5.0));
    partition.add(key, &store);
    store[key].set_position(Vec3::new(15.0, 0.0, 5.0));

    partition.disable_frustum_culling(&mut store);

    assert_eq!(partition.grid(5, 5).unwrap().detail_level(), DetailLevel::None);
    assert_eq!(store.detail_level(key), Some(DetailLevel::High));
    assert_eq!(partition.pending_migrations(), &[key]);
}

#[test]
fn test_classify_queues_migrations_until_update() {
    let mut store = Store::with_key();
    let mut partition = small_partition();
    let key = spawn(&mut store, Vec3::new(5.0, 0.0, 5.0));
    partition.add(key, &store);
    store[key].set_position(Vec3::new(15.0, 0.0, 5.0));

    partition.set_camera(forward_camera());
    partition.enable_frustum_culling(&mut store);
    assert_eq!(partition.pending_migrations(), &[key]);
    assert_eq!(total_occupants(&partition), 0);

    partition.update(&mut store);
    assert!(partition.grid(6, 5).unwrap().contains(key));
    assert!(partition.pending_migrations().is_empty());
}

#[test]
fn test_remove_camera() {
    let mut partition = small_partition();
    partition.set_camera(forward_camera());
    assert!(partition.camera().is_some());
    assert!(partition.frustum().frustum().is_some());
    partition.remove_camera();
    assert!(partition.camera().is_none());
}

#[test]
fn test_is_visible() {
    let partition = small_partition();
    let (position, direction) = (Vec3::ZERO, Vec3::NEG_Z);
    // In front
    assert!(partition.is_visible(position, direction, 5, 2));
    // Behind and far
    assert!(!partition.is_visible(position, direction, 5, 9));
    // Behind but within the cell radius
    assert!(partition.is_visible(position, direction, 5, 5));
}

// ============================================================================
// Rendering
// ============================================================================

#[test]
fn test_render_draws_occupied_visible_cells() {
    let mut store = Store::with_key();
    let mut partition = small_partition();
    let ahead = spawn(&mut store, Vec3::new(5.0, 0.0, -25.0));
    let behind = spawn(&mut store, Vec3::new(5.0, 0.0, 35.0));
    partition.add(ahead, &store);
    partition.add(behind, &store);

    let mut renderer = MockRenderer::new();
    partition.render(&mut renderer, &forward_camera());

    let cells = renderer.cell_draws();
    assert_eq!(cells.len(), 1);
    let (draw, world) = cells[0];
    assert_eq!(draw.index, GridIndex::new(5, 2));
    assert_eq!(draw.occupancy, CellOccupancy::Light);

    let origin = world.transform_point3(Vec3::ZERO);
    assert!((origin - Vec3::new(5.0, -9.9, -25.0)).length() < 1e-4);
    // Unit quad in the xy plane is laid flat over the 10 x 10 footprint
    let corner = world.transform_point3(Vec3::new(0.5, 0.5, 0.0));
    assert!((corner - Vec3::new(10.0, -9.9, -30.0)).length() < 1e-4);

    assert!(renderer.is_balanced());
}

#[test]
fn test_render_skips_empty_world() {
    let mut partition = small_partition();
    let mut renderer = MockRenderer::new();
    partition.render(&mut renderer, &forward_camera());
    assert!(renderer.cell_draws().is_empty());
    assert!(renderer.is_balanced());
}

#[test]
fn test_mesh_render_mode_applies_to_all_cells() {
    let mut partition = small_partition();
    assert_eq!(partition.mesh_render_mode(), MeshRenderMode::Fill);
    partition.set_mesh_render_mode(MeshRenderMode::Wire);
    assert_eq!(partition.mesh_render_mode(), MeshRenderMode::Wire);
    assert!(partition.grids().iter().all(|g| g.mesh_render_mode() == MeshRenderMode::Wire));
}

#[test]
fn test_debug_dump_does_not_panic() {
    let mut store = Store::with_key();
    let mut partition = small_partition();
    let key = spawn_lod(&mut store, Vec3::ONE);
    partition.add(key, &store);
    partition.debug_dump(&store);
}
