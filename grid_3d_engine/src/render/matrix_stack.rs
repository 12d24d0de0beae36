/// Model matrix stack.
///
/// Always holds at least one matrix; popping the base entry is refused.

use glam::{Mat4, Quat, Vec3};

#[derive(Debug, Clone)]
pub struct MatrixStack {
    stack: Vec<Mat4>,
}

impl MatrixStack {
    /// Stack holding a single identity matrix
    pub fn new() -> Self {
        Self { stack: vec![Mat4::IDENTITY] }
    }

    /// Current matrix
    pub fn top(&self) -> Mat4 {
        self.stack.last().copied().unwrap_or(Mat4::IDENTITY)
    }

    /// Number of entries (1 when balanced)
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    pub fn push(&mut self) {
        let top = self.top();
        self.stack.push(top);
    }

    /// Pop the current matrix. Returns `false` on an attempt to pop the base.
    pub fn pop(&mut self) -> bool {
        if self.stack.len() <= 1 {
            return false;
        }
        self.stack.pop();
        true
    }

    /// Replace the current matrix with identity
    pub fn load_identity(&mut self) {
        self.set_top(Mat4::IDENTITY);
    }

    /// Post-multiply the current matrix
    pub fn mult(&mut self, matrix: &Mat4) {
        let top = self.top() * *matrix;
        self.set_top(top);
    }

    pub fn translate(&mut self, offset: Vec3) {
        self.mult(&Mat4::from_translation(offset));
    }

    pub fn scale(&mut self, factor: Vec3) {
        self.mult(&Mat4::from_scale(factor));
    }

    /// Rotate by `degrees` around `axis` (normalized internally)
    pub fn rotate(&mut self, degrees: f32, axis: Vec3) {
        let axis = axis.normalize_or_zero();
        if axis == Vec3::ZERO {
            return;
        }
        self.mult(&Mat4::from_quat(Quat::from_axis_angle(axis, degrees.to_radians())));
    }

    fn set_top(&mut self, matrix: Mat4) {
        match self.stack.last_mut() {
            Some(top) => *top = matrix,
            None => self.stack.push(matrix),
        }
    }
}

impl Default for MatrixStack {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "matrix_stack_tests.rs"]
mod tests;
