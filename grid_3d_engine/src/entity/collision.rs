/// Collision primitives used by `EntityManager::check_for_collision`.
///
/// Boxes are passed either in world space (`&AABB`, `min`/`max`) or as
/// a position plus a box local to that position.

use glam::Vec3;
use crate::scene::AABB;

/// Axis whose face plane a segment crossed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
    Z,
}

/// `true` when two world-space boxes share at least one point
pub fn check_overlap(a: &AABB, b: &AABB) -> bool {
    a.intersects(b)
}

/// Coarse bounding-sphere pre-test.
///
/// Passes when the sum of both squared box diagonals exceeds twice the
/// squared distance between the two positions.
pub fn check_sphere_collision(a_position: Vec3, a_local: &AABB, b_position: Vec3, b_local: &AABB) -> bool {
    let a_diagonal = a_local.min.distance_squared(a_local.max);
    let b_diagonal = b_local.min.distance_squared(b_local.max);
    a_diagonal + b_diagonal > a_position.distance_squared(b_position) * 2.0
}

/// Overlap test of two position-relative boxes
pub fn check_aabb_collision(a_position: Vec3, a_local: &AABB, b_position: Vec3, b_local: &AABB) -> bool {
    check_overlap(&a_local.translated(a_position), &b_local.translated(b_position))
}

/// Point where `p1 -> p2` crosses a plane, given the signed distances
/// of both endpoints to it.
///
/// `None` when both endpoints lie on the same side (or one touches it).
pub fn get_intersection(distance1: f32, distance2: f32, p1: Vec3, p2: Vec3) -> Option<Vec3> {
    if distance1 * distance2 >= 0.0 || distance1 == distance2 {
        return None;
    }
    Some(p1 + (p2 - p1) * (-distance1 / (distance2 - distance1)))
}

/// `true` when `hit`, lying on a face plane perpendicular to `axis`,
/// is strictly inside that face.
pub fn in_box(hit: Vec3, min: Vec3, max: Vec3, axis: Axis) -> bool {
    let (u, v) = match axis {
        Axis::X => ((hit.z, min.z, max.z), (hit.y, min.y, max.y)),
        Axis::Y => ((hit.z, min.z, max.z), (hit.x, min.x, max.x)),
        Axis::Z => ((hit.x, min.x, max.x), (hit.y, min.y, max.y)),
    };
    u.0 > u.1 && u.0 < u.2 && v.0 > v.1 && v.0 < v.2
}

/// First face crossing of the segment `start -> end` with the box `[min, max]`.
///
/// Faces are tried min-x, min-y, min-z, then max-x, max-y, max-z. A
/// segment that crosses no face but starts inside the box hits at `start`.
pub fn check_line_segment_aabb(start: Vec3, end: Vec3, min: Vec3, max: Vec3) -> Option<Vec3> {
    const AXES: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    for plane in [min, max] {
        for axis in AXES {
            let i = axis as usize;
            let crossing = get_intersection(start[i] - plane[i], end[i] - plane[i], start, end)
                .filter(|&hit| in_box(hit, min, max, axis));
            if crossing.is_some() {
                return crossing;
            }
        }
    }

    AABB::new(min, max).contains_point(start).then_some(start)
}

#[cfg(test)]
#[path = "collision_tests.rs"]
mod tests;
