//! Camera module - camera pose, frustum planes and frustum culling.
//!
//! The engine does not own the camera. Callers pass a `CameraPose`
//! each frame; the spatial partition keeps its own `FrustumCulling`
//! refreshed from that pose.

mod camera;
mod frustum;

pub use camera::CameraPose;
pub use frustum::{
    Frustum, FrustumTest, FrustumCulling, FrustumConfig,
    PLANE_LEFT, PLANE_RIGHT, PLANE_BOTTOM, PLANE_TOP, PLANE_NEAR, PLANE_FAR,
};
