use glam::Vec3;

/// Sky/ground ambient light.
///
/// Surfaces facing `direction` receive `sky`; surfaces facing away blend toward
/// `ground`.
#[derive(Debug, Clone, PartialEq)]
pub struct HemisphericLight {
    pub name: String,
    pub direction: Vec3,
    pub intensity: f32,
    pub sky: [f32; 3],
    pub ground: [f32; 3],
}

impl HemisphericLight {
    pub fn new(name: impl Into<String>, direction: Vec3) -> Self {
        Self {
            name: name.into(),
            direction: direction.normalize_or(Vec3::Y),
            intensity: 1.0,
            sky: [1.0, 1.0, 1.0],
            ground: [0.0, 0.0, 0.0],
        }
    }

    pub fn with_intensity(mut self, intensity: f32) -> Self {
        self.intensity = intensity;
        self
    }
}

impl Default for HemisphericLight {
    fn default() -> Self {
        Self::new("light", Vec3::Y).with_intensity(0.7)
    }
}
