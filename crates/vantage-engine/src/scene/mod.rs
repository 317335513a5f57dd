//! Scene graph.
//!
//! A `Scene` is the unit that owns a keyboard event source, the active camera,
//! meshes and lights. The runtime creates one scene per window.

mod camera;
mod keyboard;
mod light;
mod mesh;

pub use camera::Camera;
pub use keyboard::{KeyboardEventMask, KeyboardObservable, ObserverId, SourceId};
pub use light::HemisphericLight;
pub use mesh::{Mesh, MeshVertex};

/// Default clear color (dark blue-grey).
pub const DEFAULT_CLEAR_COLOR: [f32; 4] = [0.2, 0.2, 0.3, 1.0];

pub struct Scene {
    keyboard: KeyboardObservable,
    camera: Option<Camera>,
    meshes: Vec<Mesh>,
    lights: Vec<HemisphericLight>,
    pub clear_color: [f32; 4],
}

impl Scene {
    pub fn new() -> Self {
        Self {
            keyboard: KeyboardObservable::new(),
            camera: None,
            meshes: Vec::new(),
            lights: Vec::new(),
            clear_color: DEFAULT_CLEAR_COLOR,
        }
    }

    /// Keyboard notifications for this scene.
    pub fn keyboard(&self) -> &KeyboardObservable {
        &self.keyboard
    }

    pub fn keyboard_mut(&mut self) -> &mut KeyboardObservable {
        &mut self.keyboard
    }

    /// Sets the active camera, replacing any previous one.
    pub fn set_camera(&mut self, camera: Camera) {
        log::debug!("scene camera set: {}", camera.name);
        self.camera = Some(camera);
    }

    pub fn camera(&self) -> Option<&Camera> {
        self.camera.as_ref()
    }

    pub fn camera_mut(&mut self) -> Option<&mut Camera> {
        self.camera.as_mut()
    }

    pub fn add_mesh(&mut self, mesh: Mesh) {
        log::debug!("scene mesh added: {}", mesh.name);
        self.meshes.push(mesh);
    }

    pub fn meshes(&self) -> &[Mesh] {
        &self.meshes
    }

    pub fn add_light(&mut self, light: HemisphericLight) {
        self.lights.push(light);
    }

    pub fn lights(&self) -> &[HemisphericLight] {
        &self.lights
    }

    /// Propagates a surface resize to the active camera.
    pub fn resize(&mut self, width: u32, height: u32) {
        if let Some(camera) = self.camera.as_mut() {
            camera.set_viewport(width, height);
        }
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec3;

    use super::*;
    use crate::input::{KeyTracker, KeyboardInfo};

    #[test]
    fn scene_keyboard_drives_tracker() {
        let mut scene = Scene::new();
        let mut tracker = KeyTracker::new();
        tracker.attach(scene.keyboard_mut());

        scene.keyboard_mut().notify(&KeyboardInfo::key_down(" ", 32));
        assert!(tracker.is_held(32));

        tracker.detach(scene.keyboard_mut());
        assert_eq!(scene.keyboard().observer_count(), 0);
    }

    #[test]
    fn resize_updates_camera_aspect() {
        let mut scene = Scene::new();
        scene.resize(100, 100);
        assert!(scene.camera().is_none());

        scene.set_camera(Camera::new("camera", Vec3::new(0.0, 0.0, -10.0)));
        scene.resize(300, 150);
        assert_eq!(scene.camera().map(|c| c.aspect), Some(2.0));
    }

    #[test]
    fn meshes_accumulate() {
        let mut scene = Scene::new();
        scene.add_mesh(Mesh::cuboid("box", 1.0));
        scene.add_light(HemisphericLight::default());
        assert_eq!(scene.meshes().len(), 1);
        assert_eq!(scene.meshes()[0].name, "box");
        assert_eq!(scene.lights().len(), 1);
    }
}
