use glam::{Mat4, Vec3};

/// Free-flying first-person camera.
///
/// Orientation is yaw (around +Y) and pitch (around the camera's right axis).
/// Yaw 0 looks down +Z. The world is left-handed in the sense that +X is to the
/// right of a camera looking down +Z, matching the default scene layout where the
/// camera starts at negative Z and looks at the origin.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    pub name: String,
    pub position: Vec3,
    /// Radians.
    pub yaw: f32,
    /// Radians, clamped to just under ±90°.
    pub pitch: f32,
    /// Vertical field of view in radians.
    pub fov_y: f32,
    pub near: f32,
    pub far: f32,
    pub aspect: f32,
}

const PITCH_LIMIT: f32 = 89.9_f32 * std::f32::consts::PI / 180.0;

impl Camera {
    pub fn new(name: impl Into<String>, position: Vec3) -> Self {
        Self {
            name: name.into(),
            position,
            yaw: 0.0,
            pitch: 0.0,
            fov_y: 0.8,
            near: 0.1,
            far: 1000.0,
            aspect: 16.0 / 9.0,
        }
    }

    /// Points the camera at `target`. No-op when `target` equals the position.
    pub fn look_at(&mut self, target: Vec3) {
        let dir = target - self.position;
        if dir.length_squared() <= f32::EPSILON {
            return;
        }
        let dir = dir.normalize();
        self.yaw = dir.x.atan2(dir.z);
        self.pitch = dir.y.asin().clamp(-PITCH_LIMIT, PITCH_LIMIT);
    }

    pub fn rotate(&mut self, d_yaw: f32, d_pitch: f32) {
        self.yaw += d_yaw;
        self.pitch = (self.pitch + d_pitch).clamp(-PITCH_LIMIT, PITCH_LIMIT);
    }

    pub fn forward(&self) -> Vec3 {
        Vec3::new(
            self.pitch.cos() * self.yaw.sin(),
            self.pitch.sin(),
            self.pitch.cos() * self.yaw.cos(),
        )
    }

    /// Horizontal right vector (ignores pitch).
    pub fn right(&self) -> Vec3 {
        Vec3::new(self.yaw.cos(), 0.0, -self.yaw.sin())
    }

    /// Moves in camera space: `forward` along the horizontal view direction,
    /// `right` sideways and `up` along world +Y.
    pub fn translate_local(&mut self, forward: f32, right: f32, up: f32) {
        let flat_forward = Vec3::new(self.yaw.sin(), 0.0, self.yaw.cos());
        self.position += flat_forward * forward + self.right() * right + Vec3::Y * up;
    }

    /// Updates the aspect ratio from a surface size. Zero sizes are ignored.
    pub fn set_viewport(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.aspect = width as f32 / height as f32;
        }
    }

    pub fn view(&self) -> Mat4 {
        Mat4::look_to_lh(self.position, self.forward(), Vec3::Y)
    }

    /// Perspective projection with a `[0, 1]` depth range.
    pub fn projection(&self) -> Mat4 {
        Mat4::perspective_lh(self.fov_y, self.aspect, self.near, self.far)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection() * self.view()
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec4;

    use super::*;

    fn approx(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-4
    }

    #[test]
    fn look_at_origin_from_negative_z() {
        let mut cam = Camera::new("camera", Vec3::new(0.0, 0.0, -10.0));
        cam.look_at(Vec3::ZERO);
        assert!(approx(cam.forward(), Vec3::Z));
    }

    #[test]
    fn target_projects_to_clip_center() {
        let mut cam = Camera::new("camera", Vec3::new(3.0, 2.0, -10.0));
        cam.look_at(Vec3::ZERO);
        let clip = cam.view_projection() * Vec4::new(0.0, 0.0, 0.0, 1.0);
        let ndc = clip.truncate() / clip.w;
        assert!(ndc.x.abs() < 1e-4);
        assert!(ndc.y.abs() < 1e-4);
        assert!(ndc.z > 0.0 && ndc.z < 1.0);
    }

    #[test]
    fn right_is_screen_right() {
        let cam = Camera::new("camera", Vec3::new(0.0, 0.0, -10.0));
        let clip = cam.view_projection() * Vec4::new(1.0, 0.0, 0.0, 1.0);
        assert!(clip.x / clip.w > 0.0);
        assert!(approx(cam.right(), Vec3::X));
    }

    #[test]
    fn forward_motion_ignores_pitch() {
        let mut cam = Camera::new("camera", Vec3::ZERO);
        cam.rotate(0.0, 0.5);
        cam.translate_local(2.0, 0.0, 0.0);
        assert!(approx(cam.position, Vec3::new(0.0, 0.0, 2.0)));

        cam.translate_local(0.0, -1.0, 0.5);
        assert!(approx(cam.position, Vec3::new(-1.0, 0.5, 2.0)));
    }

    #[test]
    fn pitch_is_clamped() {
        let mut cam = Camera::new("camera", Vec3::ZERO);
        cam.rotate(0.0, 10.0);
        assert!(cam.pitch < std::f32::consts::FRAC_PI_2);
        cam.rotate(0.0, -20.0);
        assert!(cam.pitch > -std::f32::consts::FRAC_PI_2);
    }

    #[test]
    fn zero_viewport_keeps_aspect() {
        let mut cam = Camera::new("camera", Vec3::ZERO);
        cam.set_viewport(800, 400);
        assert_eq!(cam.aspect, 2.0);
        cam.set_viewport(0, 400);
        assert_eq!(cam.aspect, 2.0);
    }
}
