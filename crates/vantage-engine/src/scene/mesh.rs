use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};

/// Vertex layout shared by all scene meshes.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct MeshVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

/// CPU-side triangle mesh plus its world placement.
#[derive(Debug, Clone)]
pub struct Mesh {
    pub name: String,
    pub vertices: Vec<MeshVertex>,
    pub indices: Vec<u16>,
    pub position: Vec3,
    pub scale: f32,
    pub color: [f32; 3],
}

impl Mesh {
    /// Axis-aligned box centered on the origin, `size` units on each side.
    ///
    /// Each face has its own four vertices so normals stay flat.
    pub fn cuboid(name: impl Into<String>, size: f32) -> Self {
        let h = size * 0.5;
        // (normal, tangent u, tangent v) per face; u × v == normal.
        let faces: [([f32; 3], [f32; 3], [f32; 3]); 6] = [
            ([1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]),
            ([-1.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, 1.0, 0.0]),
            ([0.0, 1.0, 0.0], [0.0, 0.0, 1.0], [1.0, 0.0, 0.0]),
            ([0.0, -1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]),
            ([0.0, 0.0, 1.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
            ([0.0, 0.0, -1.0], [0.0, 1.0, 0.0], [1.0, 0.0, 0.0]),
        ];

        let mut vertices = Vec::with_capacity(24);
        let mut indices = Vec::with_capacity(36);

        for (normal, u, v) in faces {
            let n = Vec3::from(normal);
            let (u, v) = (Vec3::from(u), Vec3::from(v));
            let base = vertices.len() as u16;

            for (su, sv) in [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)] {
                let p = (n + u * su + v * sv) * h;
                vertices.push(MeshVertex {
                    position: p.to_array(),
                    normal,
                });
            }

            indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
        }

        Self {
            name: name.into(),
            vertices,
            indices,
            position: Vec3::ZERO,
            scale: 1.0,
            color: [0.8, 0.7, 0.6],
        }
    }

    pub fn with_position(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }

    pub fn with_color(mut self, color: [f32; 3]) -> Self {
        self.color = color;
        self
    }

    pub fn model(&self) -> Mat4 {
        Mat4::from_translation(self.position) * Mat4::from_scale(Vec3::splat(self.scale))
    }
}
