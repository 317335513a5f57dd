//! Vantage engine crate.
//!
//! A minimal scene runtime: one window, one scene, a camera and meshes, and a
//! per-scene key tracker fed from window keyboard events and read by the
//! per-frame application callback.

pub mod core;
pub mod device;
pub mod input;
pub mod logging;
pub mod render;
pub mod scene;
pub mod time;
pub mod window;
