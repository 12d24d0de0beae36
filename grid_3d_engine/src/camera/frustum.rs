/// Frustum - six clipping planes and the culling helper built on them.
///
/// Each plane is a Vec4 (A, B, C, D) with an inward-pointing unit
/// normal (A, B, C). A point P is inside when `dot(plane, (P, 1)) >= 0`
/// holds for all six planes.
///
/// `FrustumCulling` is what the spatial partition talks to: it owns a
/// projection configuration, rebuilds the planes from a camera pose and
/// answers column-box queries for grid cells.

use glam::{Mat4, Vec3, Vec4};
use crate::scene::AABB;

/// Result of a 3-way frustum/AABB classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrustumTest {
    /// AABB is entirely outside the frustum
    Outside,
    /// AABB is entirely inside the frustum
    Inside,
    /// AABB straddles at least one plane
    Partial,
}

/// Frustum plane indices
pub const PLANE_LEFT: usize = 0;
pub const PLANE_RIGHT: usize = 1;
pub const PLANE_BOTTOM: usize = 2;
pub const PLANE_TOP: usize = 3;
pub const PLANE_NEAR: usize = 4;
pub const PLANE_FAR: usize = 5;

/// Six frustum planes: left, right, bottom, top, near, far
#[derive(Debug, Clone, Copy)]
pub struct Frustum {
    pub planes: [Vec4; 6],
}

/// Corner of `aabb` furthest along `normal` (the "positive vertex").
fn positive_vertex(aabb: &AABB, normal: Vec3) -> Vec3 {
    Vec3::select(normal.cmpge(Vec3::ZERO), aabb.max, aabb.min)
}

/// Corner of `aabb` furthest against `normal`.
fn negative_vertex(aabb: &AABB, normal: Vec3) -> Vec3 {
    Vec3::select(normal.cmpge(Vec3::ZERO), aabb.min, aabb.max)
}

fn signed_distance(plane: Vec4, point: Vec3) -> f32 {
    plane.truncate().dot(point) + plane.w
}

impl Frustum {
    /// Extract the planes of a view-projection matrix (Gribb & Hartmann).
    ///
    /// Valid for perspective and orthographic projections.
    pub fn from_view_projection(vp: &Mat4) -> Self {
        let (r0, r1, r2, r3) = (vp.row(0), vp.row(1), vp.row(2), vp.row(3));
        let mut planes = [r3 + r0, r3 - r0, r3 + r1, r3 - r1, r3 + r2, r3 - r2];

        for plane in &mut planes {
            let len = plane.truncate().length();
            if len > 0.0 {
                *plane /= len;
            }
        }

        Self { planes }
    }

    /// Conservative AABB test: `false` only when the box is fully outside.
    pub fn intersects_aabb(&self, aabb: &AABB) -> bool {
        self.planes
            .iter()
            .all(|&plane| signed_distance(plane, positive_vertex(aabb, plane.truncate())) >= 0.0)
    }

    /// Classify an AABB as `Outside`, `Inside` or `Partial`.
    pub fn classify_aabb(&self, aabb: &AABB) -> FrustumTest {
        let mut all_inside = true;

        for &plane in &self.planes {
            let normal = plane.truncate();
            if signed_distance(plane, positive_vertex(aabb, normal)) < 0.0 {
                return FrustumTest::Outside;
            }
            if signed_distance(plane, negative_vertex(aabb, normal)) < 0.0 {
                all_inside = false;
            }
        }

        if all_inside { FrustumTest::Inside } else { FrustumTest::Partial }
    }

    /// Point-in-frustum test
    pub fn contains_point(&self, point: Vec3) -> bool {
        self.planes.iter().all(|&plane| signed_distance(plane, point) >= 0.0)
    }
}

// ===== FRUSTUM CULLING =====

/// Projection parameters used to rebuild the culling frustum
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrustumConfig {
    /// Vertical field of view in degrees
    pub fov_y_degrees: f32,
    /// Width / height
    pub aspect_ratio: f32,
    /// Near plane distance
    pub near: f32,
    /// Far plane distance
    pub far: f32,
    /// Half height of the column box tested for each grid cell
    pub box_half_height: f32,
}

impl Default for FrustumConfig {
    fn default() -> Self {
        Self {
            fov_y_degrees: 45.0,
            aspect_ratio: 4.0 / 3.0,
            near: 0.1,
            far: 10000.0,
            box_half_height: 50.0,
        }
    }
}

/// Frustum planes kept in sync with a camera pose
#[derive(Debug, Clone)]
pub struct FrustumCulling {
    config: FrustumConfig,
    frustum: Option<Frustum>,
}

impl FrustumCulling {
    pub fn new(config: FrustumConfig) -> Self {
        Self { config, frustum: None }
    }

    pub fn config(&self) -> &FrustumConfig {
        &self.config
    }

    /// Current planes (`None` until the first `update`)
    pub fn frustum(&self) -> Option<&Frustum> {
        self.frustum.as_ref()
    }

    /// Projection matrix built from the configuration
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(
            self.config.fov_y_degrees.to_radians(),
            self.config.aspect_ratio,
            self.config.near,
            self.config.far,
        )
    }

    /// Rebuild the planes from a camera pose
    pub fn update(&mut self, position: Vec3, target: Vec3, up: Vec3) {
        let view = Mat4::look_at_rh(position, target, up);
        let vp = self.projection_matrix() * view;
        self.frustum = Some(Frustum::from_view_projection(&vp));
    }

    /// Test the column box `center ± (width/2, box_half_height, depth/2)`.
    ///
    /// Every box is visible until the planes have been built once.
    pub fn is_box_in_frustum(&self, center: Vec3, width: f32, depth: f32) -> bool {
        let Some(frustum) = &self.frustum else {
            return true;
        };
        let half = Vec3::new(width * 0.5, self.config.box_half_height, depth * 0.5);
        frustum.intersects_aabb(&AABB::new(center - half, center + half))
    }
}

impl Default for FrustumCulling {
    fn default() -> Self {
        Self::new(FrustumConfig::default())
    }
}

#[cfg(test)]
#[path = "frustum_tests.rs"]
mod tests;
