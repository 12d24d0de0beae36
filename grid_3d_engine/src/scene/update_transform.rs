/// Per-tick transform rules for scene nodes.
///
/// A node with a rule post-multiplies the rule's matrix onto its local
/// transform at the start of every update, before its entity and its
/// children are updated.

use std::fmt::Debug;
use glam::{Mat4, Quat, Vec3};

/// Produces the incremental transform applied to a node each tick.
pub trait TransformRule: Debug {
    /// Transform to apply for a tick of `dt` seconds
    fn next_transform(&mut self, dt: f64) -> Mat4;
}

/// Oscillating step transform.
///
/// Applies the same step every tick while a step counter walks between
/// `min_steps` and `max_steps`. Each time the counter hits a bound the
/// step is inverted, so the node swings back and forth.
///
/// # Example
///
/// ```ignore
/// let mut rule = UpdateTransformation::new();
/// rule.apply_rotation(1.0, Vec3::Y);
/// rule.set_steps(-60, 60);
/// node.set_update_rule(Box::new(rule));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateTransformation {
    step: Mat4,
    current_steps: i32,
    delta_steps: i32,
    min_steps: i32,
    max_steps: i32,
}

impl UpdateTransformation {
    /// Identity step, unbounded counter
    pub fn new() -> Self {
        Self {
            step: Mat4::IDENTITY,
            current_steps: 0,
            delta_steps: 1,
            min_steps: i32::MIN,
            max_steps: i32::MAX,
        }
    }

    /// Add a rotation of `degrees` around `axis` to the step
    pub fn apply_rotation(&mut self, degrees: f32, axis: Vec3) {
        let axis = axis.normalize_or_zero();
        if axis == Vec3::ZERO {
            return;
        }
        self.step *= Mat4::from_quat(Quat::from_axis_angle(axis, degrees.to_radians()));
    }

    /// Add a translation to the step
    pub fn apply_translation(&mut self, offset: Vec3) {
        self.step *= Mat4::from_translation(offset);
    }

    /// Bound the step counter; the counter restarts at 0
    pub fn set_steps(&mut self, min_steps: i32, max_steps: i32) {
        self.min_steps = min_steps;
        self.max_steps = max_steps;
        self.current_steps = 0;
        self.delta_steps = 1;
    }

    pub fn steps(&self) -> (i32, i32) {
        (self.min_steps, self.max_steps)
    }

    pub fn current_steps(&self) -> i32 {
        self.current_steps
    }

    /// Current step matrix
    pub fn step_transform(&self) -> Mat4 {
        self.step
    }

    fn advance(&mut self) {
        self.current_steps = self.current_steps.saturating_add(self.delta_steps);
        if self.current_steps >= self.max_steps || self.current_steps <= self.min_steps {
            self.step = self.step.inverse();
            self.delta_steps = -self.delta_steps;
        }
    }
}

impl Default for UpdateTransformation {
    fn default() -> Self {
        Self::new()
    }
}

impl TransformRule for UpdateTransformation {
    fn next_transform(&mut self, _dt: f64) -> Mat4 {
        let step = self.step;
        self.advance();
        step
    }
}

#[cfg(test)]
#[path = "update_transform_tests.rs"]
mod tests;
