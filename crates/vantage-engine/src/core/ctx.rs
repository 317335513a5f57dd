use winit::window::{Window, WindowId};

use crate::input::KeyTracker;
use crate::scene::{Camera, Scene};
use crate::time::FrameTime;

/// Per-window handles.
pub struct WindowCtx<'a> {
    pub id: WindowId,
    pub window: &'a Window,
}

impl<'a> WindowCtx<'a> {
    /// Logical window size as `(width, height)`.
    pub fn logical_size(&self) -> (f32, f32) {
        let phys = self.window.inner_size();
        let logi: winit::dpi::LogicalSize<f64> = phys.to_logical(self.window.scale_factor());
        (logi.width as f32, logi.height as f32)
    }
}

/// Per-frame context passed to `core::App::on_frame`.
///
/// `keys` is the scene's key tracker; it is read-only here, the runtime feeds it
/// from window events between frames.
pub struct FrameCtx<'a> {
    pub window: WindowCtx<'a>,
    pub scene: &'a mut Scene,
    pub keys: &'a KeyTracker,
    pub time: FrameTime,
}

impl<'a> FrameCtx<'a> {
    /// The scene's active camera, if one was set.
    pub fn camera(&self) -> Option<&Camera> {
        self.scene.camera()
    }

    pub fn camera_mut(&mut self) -> Option<&mut Camera> {
        self.scene.camera_mut()
    }
}
