/// World - the per-game context owning every engine subsystem.
///
/// One `World` replaces the process-wide scene graph, spatial partition
/// and entity manager: all three are fields here and borrow each other
/// only for the duration of a call.
///
/// # Example
///
/// ```no_run
/// use grid_3d_engine::grid3d::{World, WorldConfig};
/// use grid_3d_engine::grid3d::entity::Entity;
/// use grid_3d_engine::grid3d::scene::NodeId;
/// use grid_3d_engine::glam::Vec3;
///
/// let mut world = World::new(WorldConfig::default())?;
/// world.spawn_in_scene(Entity::new("crate", Vec3::new(10.0, 0.0, 10.0)), NodeId::ROOT)?;
/// world.update(1.0 / 60.0)?;
/// # Ok::<(), grid_3d_engine::grid3d::Error>(())
/// ```

use crate::engine_bail;
use crate::engine_config_err;
use crate::engine_debug;
use crate::engine_info;
use crate::error::{Error, Result};
use crate::camera::{CameraPose, FrustumConfig};
use crate::entity::{Entity, EntityCategory, EntityKey, EntityManager};
use crate::render::Renderer;
use crate::scene::{NodeId, SceneGraph};
use crate::spatial::{SpatialPartition, SpatialPartitionConfig};
use crate::utils::FpsCounter;

/// Radius around a projectile searched for collision candidates
pub const DEFAULT_COLLISION_QUERY_RADIUS: f32 = 20.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorldConfig {
    pub partition: SpatialPartitionConfig,
    pub frustum: FrustumConfig,
    pub collision_query_radius: f32,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            partition: SpatialPartitionConfig::default(),
            frustum: FrustumConfig::default(),
            collision_query_radius: DEFAULT_COLLISION_QUERY_RADIUS,
        }
    }
}

#[derive(Debug)]
pub struct World {
    entities: EntityManager,
    scene_graph: SceneGraph,
    spatial_partition: SpatialPartition,
    frustum_culling_enabled: bool,
    fps: FpsCounter,
    collision_query_radius: f32,
    shut_down: bool,
}

impl World {
    /// Build a world from `config`.
    ///
    /// Fails with `Error::InvalidConfiguration` when the partition layout
    /// or the collision radius is invalid.
    pub fn new(config: WorldConfig) -> Result<Self> {
        if !config.collision_query_radius.is_finite() || config.collision_query_radius < 0.0 {
            return Err(engine_config_err!(
                "grid3d::World",
                "Collision query radius must be finite and non-negative, got {}",
                config.collision_query_radius
            ));
        }
        let spatial_partition = SpatialPartition::with_frustum(config.partition, config.frustum)?;

        engine_info!("grid3d::World", "World created");

        Ok(Self {
            entities: EntityManager::new(),
            scene_graph: SceneGraph::new(),
            spatial_partition,
            frustum_culling_enabled: true,
            fps: FpsCounter::new(),
            collision_query_radius: config.collision_query_radius,
            shut_down: false,
        })
    }

    // ===== ACCESSORS =====

    pub fn entities(&self) -> &EntityManager {
        &self.entities
    }

    pub fn entities_mut(&mut self) -> &mut EntityManager {
        &mut self.entities
    }

    pub fn scene_graph(&self) -> &SceneGraph {
        &self.scene_graph
    }

    pub fn scene_graph_mut(&mut self) -> &mut SceneGraph {
        &mut self.scene_graph
    }

    pub fn spatial_partition(&self) -> &SpatialPartition {
        &self.spatial_partition
    }

    pub fn spatial_partition_mut(&mut self) -> &mut SpatialPartition {
        &mut self.spatial_partition
    }

    pub fn fps(&self) -> &FpsCounter {
        &self.fps
    }

    pub fn collision_query_radius(&self) -> f32 {
        self.collision_query_radius
    }

    pub fn is_frustum_culling_enabled(&self) -> bool {
        self.frustum_culling_enabled
    }

    /// Choose the classify pass run by `update`
    pub fn set_frustum_culling(&mut self, enabled: bool) {
        self.frustum_culling_enabled = enabled;
    }

    /// Camera used for LOD classification and culling
    pub fn set_camera(&mut self, camera: CameraPose) {
        self.spatial_partition.set_camera(camera);
    }

    pub fn is_shut_down(&self) -> bool {
        self.shut_down
    }

    // ===== SPAWNING =====

    /// Hand an entity to the entity manager
    pub fn add_entity(&mut self, entity: Entity, category: EntityCategory) -> Result<EntityKey> {
        self.ensure_running()?;
        Ok(self.entities.add_entity(entity, category))
    }

    /// Add a scene-driven entity under `parent` and register it with the
    /// spatial partition.
    ///
    /// Entities outside the world stay in the scene graph but are not
    /// partitioned. Fails with `Error::NotFound` if `parent` does not
    /// exist; the entity is dropped in that case.
    pub fn spawn_in_scene(&mut self, entity: Entity, parent: NodeId) -> Result<(EntityKey, NodeId)> {
        self.ensure_running()?;

        let key = self.entities.add_entity(entity, EntityCategory::Graph);
        let Some(node) = self.scene_graph.add_child_node(parent, key, &self.entities) else {
            self.entities.remove_entity(key);
            return Err(Error::NotFound(format!("Scene node {}", parent)));
        };
        self.spatial_partition.add(key, &self.entities);
        Ok((key, node))
    }

    /// Grow every first-tier scene entity's AABB over its subtree
    pub fn recalculate_aabb(&mut self) {
        self.scene_graph.recalculate_aabb(&mut self.entities);
    }

    // ===== FRAME =====

    /// Advance the world by `dt` seconds.
    ///
    /// Runs the frame counter, the entity manager, the scene graph, the
    /// classify pass, migrations, collisions and finally removes every
    /// done entity.
    pub fn update(&mut self, dt: f64) -> Result<()> {
        self.ensure_running()?;

        self.fps.update(dt);
        self.entities.update(dt);
        self.scene_graph.update(dt, &mut self.entities);

        if self.frustum_culling_enabled {
            self.spatial_partition.enable_frustum_culling(&mut self.entities);
        } else {
            self.spatial_partition.disable_frustum_culling(&mut self.entities);
        }
        self.spatial_partition.update(&mut self.entities);

        let hits = self.entities.check_for_collision(
            &mut self.spatial_partition,
            &mut self.scene_graph,
            self.collision_query_radius,
        );
        let removed = self.entities.remove_done();
        if hits > 0 || removed > 0 {
            engine_debug!("grid3d::World", "{} hits, {} entities removed", hits, removed);
        }
        Ok(())
    }

    /// Draw the scene graph, then the manager's entities (fixed, then
    /// projectiles), then the partition cells seen from `camera`.
    pub fn render(&mut self, renderer: &mut dyn Renderer, camera: &CameraPose) -> Result<()> {
        self.ensure_running()?;

        self.scene_graph.render(renderer, &self.entities);
        self.entities.render(renderer);
        self.spatial_partition.render(renderer, camera);
        Ok(())
    }

    /// Tear the world down: scene graph, then partition, then entities.
    ///
    /// Every later call fails with `Error::InvalidState`.
    pub fn shutdown(&mut self) -> Result<()> {
        self.ensure_running()?;

        self.scene_graph.destroy(&mut self.entities);
        self.spatial_partition.clear();
        self.entities.clear();
        self.shut_down = true;

        engine_info!("grid3d::World", "World shut down");
        Ok(())
    }

    /// Log the scene graph, partition and frame counter at DEBUG
    pub fn debug_dump(&self) {
        self.scene_graph.debug_dump(&self.entities);
        self.spatial_partition.debug_dump(&self.entities);
        self.fps.debug_dump();
    }

    fn ensure_running(&self) -> Result<()> {
        if self.shut_down {
            engine_bail!("grid3d::World", "World has been shut down");
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "world_tests.rs"]
mod tests;
