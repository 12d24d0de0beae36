/// Camera pose - the three vectors the spatial partition needs.
///
/// Position drives LOD distances, and the full pose
/// (position, target, up) rebuilds the frustum planes.

use glam::{Mat4, Vec3};

/// World-space camera pose
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraPose {
    /// Eye position
    pub position: Vec3,
    /// Point the camera looks at
    pub target: Vec3,
    /// Up vector
    pub up: Vec3,
}

impl CameraPose {
    pub fn new(position: Vec3, target: Vec3, up: Vec3) -> Self {
        Self { position, target, up }
    }

    /// Normalized viewing direction (`target - position`).
    ///
    /// Returns `Vec3::ZERO` when target and position coincide.
    pub fn direction(&self) -> Vec3 {
        (self.target - self.position).normalize_or_zero()
    }

    /// Right-handed view matrix
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, self.up)
    }
}

impl Default for CameraPose {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            target: Vec3::NEG_Z,
            up: Vec3::Y,
        }
    }
}

#[cfg(test)]
#[path = "camera_tests.rs"]
mod tests;
