/// Recording renderer (no graphics backend required).
///
/// Every call is appended to `calls`; draw calls also capture the model
/// matrix they were issued under, so tests can check both ordering and
/// the composed transform.

use glam::{Mat4, Vec3};
use super::matrix_stack::MatrixStack;
use super::renderer::{Renderer, CellDraw};

/// One recorded renderer call
#[derive(Debug, Clone, PartialEq)]
pub enum RenderCall {
    Push,
    Pop,
    Translate(Vec3),
    Scale(Vec3),
    Rotate(f32, Vec3),
    MultMatrix(Mat4),
    Mesh { name: String, world: Mat4 },
    Cell { cell: CellDraw, world: Mat4 },
}

#[derive(Debug)]
pub struct MockRenderer {
    pub calls: Vec<RenderCall>,
    stack: MatrixStack,
    max_depth: usize,
    unbalanced_pops: usize,
}

impl MockRenderer {
    pub fn new() -> Self {
        Self {
            calls: Vec::new(),
            stack: MatrixStack::new(),
            max_depth: 1,
            unbalanced_pops: 0,
        }
    }

    /// Current stack depth (1 when every push has been popped)
    pub fn depth(&self) -> usize {
        self.stack.depth()
    }

    /// Deepest stack depth reached
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Pops issued with nothing left to pop
    pub fn unbalanced_pops(&self) -> usize {
        self.unbalanced_pops
    }

    /// `true` when pushes and pops matched exactly
    pub fn is_balanced(&self) -> bool {
        self.stack.depth() == 1 && self.unbalanced_pops == 0
    }

    /// Names of drawn meshes, in draw order
    pub fn mesh_names(&self) -> Vec<&str> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                RenderCall::Mesh { name, .. } => Some(name.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Drawn meshes with their model matrix
    pub fn mesh_draws(&self) -> Vec<(&str, Mat4)> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                RenderCall::Mesh { name, world } => Some((name.as_str(), *world)),
                _ => None,
            })
            .collect()
    }

    /// Drawn grid cells with their model matrix
    pub fn cell_draws(&self) -> Vec<(CellDraw, Mat4)> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                RenderCall::Cell { cell, world } => Some((*cell, *world)),
                _ => None,
            })
            .collect()
    }

    /// Forget recorded calls and reset the stack
    pub fn clear(&mut self) {
        self.calls.clear();
        self.stack = MatrixStack::new();
        self.max_depth = 1;
        self.unbalanced_pops = 0;
    }
}

impl Default for MockRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer for MockRenderer {
    fn push_matrix(&mut self) {
        self.stack.push();
        self.max_depth = self.max_depth.max(self.stack.depth());
        self.calls.push(RenderCall::Push);
    }

    fn pop_matrix(&mut self) {
        if !self.stack.pop() {
            self.unbalanced_pops += 1;
        }
        self.calls.push(RenderCall::Pop);
    }

    fn translate(&mut self, offset: Vec3) {
        self.stack.translate(offset);
        self.calls.push(RenderCall::Translate(offset));
    }

    fn scale(&mut self, factor: Vec3) {
        self.stack.scale(factor);
        self.calls.push(RenderCall::Scale(factor));
    }

    fn rotate(&mut self, degrees: f32, axis: Vec3) {
        self.stack.rotate(degrees, axis);
        self.calls.push(RenderCall::Rotate(degrees, axis));
    }

    fn mult_matrix(&mut self, matrix: &Mat4) {
        self.stack.mult(matrix);
        self.calls.push(RenderCall::MultMatrix(*matrix));
    }

    fn render_mesh(&mut self, mesh: &str) {
        self.calls.push(RenderCall::Mesh { name: mesh.to_string(), world: self.stack.top() });
    }

    fn render_cell(&mut self, cell: &CellDraw) {
        self.calls.push(RenderCall::Cell { cell: *cell, world: self.stack.top() });
    }
}

#[cfg(test)]
#[path = "mock_renderer_tests.rs"]
mod tests;
