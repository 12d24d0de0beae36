//! Rendering collaborator
//!
//! The engine never issues drawing primitives. Scene nodes, entities and
//! grid cells only drive a `Renderer` through a scoped matrix-stack
//! protocol (push / transform / draw / pop). Backends implement the
//! trait; `MockRenderer` records the calls for tests and tools.

mod renderer;
mod matrix_stack;
pub mod mock_renderer;

pub use renderer::{Renderer, CellDraw};
pub use matrix_stack::MatrixStack;
pub use mock_renderer::{MockRenderer, RenderCall};
