//! Keyboard input subsystem.
//!
//! Public API is platform-agnostic and does not expose winit types.
//! The runtime translates platform events into `KeyboardInfo`s (see `platform`).

mod action_map;
pub mod platform;
mod tracker;
mod types;

pub use action_map::{ActionMap, UnknownAction};
pub use tracker::KeyTracker;
pub use types::{Key, KeyboardEvent, KeyboardEventKind, KeyboardInfo};
