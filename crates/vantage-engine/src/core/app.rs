use crate::scene::Scene;

use super::ctx::FrameCtx;

/// Control directive returned by app callbacks.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum AppControl {
    Continue,
    Exit,
}

/// Application contract implemented by binaries.
pub trait App {
    /// Called once after the scene is created and its key tracker attached.
    ///
    /// Typical work: set the camera, add meshes and lights.
    fn on_scene_ready(&mut self, scene: &mut Scene) {
        let _ = scene;
    }

    /// Called once per rendered frame, before the scene is drawn.
    fn on_frame(&mut self, ctx: &mut FrameCtx<'_>) -> AppControl;

    /// Called when the scene is torn down, after its key tracker is detached.
    fn on_scene_disposed(&mut self, scene: &mut Scene) {
        let _ = scene;
    }
}
