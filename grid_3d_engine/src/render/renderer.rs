/// Renderer trait - the narrow drawing interface consumed by the engine.

use glam::{Mat4, Vec3};
use crate::spatial::{GridIndex, CellOccupancy, MeshRenderMode, DetailLevel};

/// Everything a backend needs to draw one grid cell.
///
/// The cell is issued under a unit-square transform already scaled to
/// the cell footprint, so backends only pick a mesh and a color.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellDraw {
    pub index: GridIndex,
    pub occupancy: CellOccupancy,
    pub mode: MeshRenderMode,
    pub detail_level: DetailLevel,
}

/// Scoped matrix-stack drawing interface.
///
/// Transform calls compose onto the top of the model stack, in the
/// order they are issued. Every `push_matrix` is matched by exactly one
/// `pop_matrix` from the same caller.
pub trait Renderer {
    /// Duplicate the current model matrix
    fn push_matrix(&mut self);

    /// Restore the model matrix saved by the matching `push_matrix`
    fn pop_matrix(&mut self);

    fn translate(&mut self, offset: Vec3);

    fn scale(&mut self, factor: Vec3);

    /// Rotate by `degrees` around `axis`
    fn rotate(&mut self, degrees: f32, axis: Vec3);

    /// Post-multiply the current model matrix
    fn mult_matrix(&mut self, matrix: &Mat4);

    /// Draw a named mesh under the current model matrix
    fn render_mesh(&mut self, mesh: &str);

    /// Draw a grid cell quad under the current model matrix
    fn render_cell(&mut self, cell: &CellDraw);
}
