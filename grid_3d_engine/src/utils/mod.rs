//! Small helpers shared by the engine subsystems

mod id_generator;
mod fps_counter;

pub use id_generator::IdGenerator;
pub use fps_counter::{FpsCounter, FPS_WINDOW};
