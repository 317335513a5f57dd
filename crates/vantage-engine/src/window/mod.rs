//! Window + runtime loop.
//!
//! Owns the `winit` EventLoop and Window, and wires keyboard input, resize and
//! redraw to the scene and the GPU layer.

mod runtime;

pub use runtime::{Runtime, RuntimeConfig};
