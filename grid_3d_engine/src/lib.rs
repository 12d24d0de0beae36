/*!
# Grid 3D Engine

Scene graph and uniform-grid spatial partitioning for real-time 3D scenes.

The crate owns no graphics backend. It keeps the entity hierarchy, sorts
entities into grid cells over the x/z plane, picks a level of detail per
cell from the camera distance and view frustum, and drives any
`Renderer` implementation through a scoped matrix-stack protocol.

## Architecture

- **World**: per-game context owning every subsystem below
- **EntityManager**: entity storage, per-tick updates and projectile collisions
- **SceneGraph**: entity hierarchy with per-node transforms and bound aggregation
- **SpatialPartition**: grid of cells, migration, LOD and frustum culling
- **FrustumCulling**: view frustum rebuilt from a `CameraPose`
- **Renderer**: drawing collaborator implemented by the host application

Entities are addressed by `EntityKey`; a key whose entity has been removed
resolves to nothing instead of dangling.
*/

// Internal modules
mod error;
mod engine;
pub mod log;
pub mod camera;
pub mod entity;
pub mod render;
pub mod scene;
pub mod spatial;
pub mod utils;
mod world;

// Main grid3d namespace module
pub mod grid3d {
    // Error types
    pub use crate::error::{Error, Result};

    // Logging facade
    pub use crate::engine::Engine;

    // Per-game context
    pub use crate::world::{World, WorldConfig, DEFAULT_COLLISION_QUERY_RADIUS};

    // Logging sub-module (types only, NOT macros)
    pub mod log {
        pub use crate::log::{Logger, LogEntry, LogSeverity, DefaultLogger};
        // Note: engine_* macros are NOT re-exported here - they are internal only
    }

    pub mod camera {
        pub use crate::camera::*;
    }

    pub mod entity {
        pub use crate::entity::*;
    }

    pub mod render {
        pub use crate::render::*;
    }

    pub mod scene {
        pub use crate::scene::*;
    }

    pub mod spatial {
        pub use crate::spatial::*;
    }

    pub mod utils {
        pub use crate::utils::*;
    }
}

// Re-export math library at crate root
pub use glam;
