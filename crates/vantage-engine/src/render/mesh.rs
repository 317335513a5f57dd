use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;

use crate::device::DEPTH_FORMAT;
use crate::render::{RenderCtx, RenderTarget};
use crate::scene::{HemisphericLight, Mesh, MeshVertex, Scene};

/// Draws every mesh of a scene through its active camera.
///
/// GPU buffers are created lazily the first time a mesh is seen. Geometry is
/// assumed immutable after `Scene::add_mesh`; placement and color are uploaded
/// every frame. Meshes without vertices or indices keep their slot but are
/// never drawn.
#[derive(Default)]
pub struct MeshRenderer {
    pipeline_format: Option<wgpu::TextureFormat>,
    pipeline: Option<wgpu::RenderPipeline>,

    frame_bgl: Option<wgpu::BindGroupLayout>,
    mesh_bgl: Option<wgpu::BindGroupLayout>,

    frame_ubo: Option<wgpu::Buffer>,
    frame_bind_group: Option<wgpu::BindGroup>,

    meshes: Vec<GpuMesh>,
}

struct GpuMesh {
    /// `None` for empty geometry; wgpu cannot bind a zero-sized buffer slice.
    geometry: Option<MeshBuffers>,
    ubo: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

struct MeshBuffers {
    vbo: wgpu::Buffer,
    ibo: wgpu::Buffer,
    index_count: u32,
}

fn has_geometry(mesh: &Mesh) -> bool {
    !mesh.vertices.is_empty() && !mesh.indices.is_empty()
}

impl MeshRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clears color and depth, then draws `scene`.
    ///
    /// Without an active camera only the clear happens.
    pub fn render(&mut self, ctx: &RenderCtx<'_>, target: &mut RenderTarget<'_>, scene: &Scene) {
        self.ensure_pipeline(ctx);
        self.ensure_frame_bindings(ctx);
        self.sync_meshes(ctx, scene.meshes());

        let camera = scene.camera();
        if let Some(camera) = camera {
            self.write_frame_uniform(ctx, camera.view_projection(), scene.lights());
            for (gpu, mesh) in self.meshes.iter().zip(scene.meshes()) {
                let u = MeshUniform {
                    model: mesh.model().to_cols_array_2d(),
                    color: [mesh.color[0], mesh.color[1], mesh.color[2], 1.0],
                };
                ctx.queue.write_buffer(&gpu.ubo, 0, bytemuck::bytes_of(&u));
            }
        }

        let [r, g, b, a] = scene.clear_color;
        let mut rpass = target.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("vantage mesh pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target.color_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color {
                        r: r as f64,
                        g: g as f64,
                        b: b as f64,
                        a: a as f64,
                    }),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: target.depth_view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        if camera.is_none() {
            return;
        }

        let Some(pipeline) = self.pipeline.as_ref() else { return };
        let Some(frame_bind_group) = self.frame_bind_group.as_ref() else { return };

        rpass.set_pipeline(pipeline);
        rpass.set_bind_group(0, frame_bind_group, &[]);

        for gpu in &self.meshes {
            let Some(geometry) = gpu.geometry.as_ref() else { continue };
            rpass.set_bind_group(1, &gpu.bind_group, &[]);
            rpass.set_vertex_buffer(0, geometry.vbo.slice(..));
            rpass.set_index_buffer(geometry.ibo.slice(..), wgpu::IndexFormat::Uint16);
            rpass.draw_indexed(0..geometry.index_count, 0, 0..1);
        }
    }

    fn ensure_pipeline(&mut self, ctx: &RenderCtx<'_>) {
        if self.pipeline_format == Some(ctx.surface_format) && self.pipeline.is_some() {
            return;
        }

        let shader = ctx.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("vantage mesh shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/mesh.wgsl").into()),
        });

        let frame_bgl = uniform_layout(ctx.device, "vantage mesh frame bgl", std::mem::size_of::<FrameUniform>());
        let mesh_bgl = uniform_layout(ctx.device, "vantage mesh model bgl", std::mem::size_of::<MeshUniform>());

        let pipeline_layout = ctx.device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("vantage mesh pipeline layout"),
            bind_group_layouts: &[&frame_bgl, &mesh_bgl],
            immediate_size: 0,
        });

        let pipeline = ctx.device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("vantage mesh pipeline"),
            layout: Some(&pipeline_layout),

            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[vertex_layout()],
            },

            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: ctx.surface_format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),

            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },

            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),

            multiview_mask: None,
            cache: None,
        });

        self.pipeline_format = Some(ctx.surface_format);
        self.pipeline = Some(pipeline);
        self.frame_bgl = Some(frame_bgl);
        self.mesh_bgl = Some(mesh_bgl);

        // Bind groups reference the old layouts.
        self.frame_ubo = None;
        self.frame_bind_group = None;
        self.meshes.clear();
    }

    fn ensure_frame_bindings(&mut self, ctx: &RenderCtx<'_>) {
        if self.frame_bind_group.is_some() && self.frame_ubo.is_some() {
            return;
        }
        let Some(bgl) = self.frame_bgl.as_ref() else { return };

        let ubo = ctx.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("vantage mesh frame ubo"),
            size: std::mem::size_of::<FrameUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("vantage mesh frame bind group"),
            layout: bgl,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: ubo.as_entire_binding(),
            }],
        });

        self.frame_ubo = Some(ubo);
        self.frame_bind_group = Some(bind_group);
    }

    /// Uploads meshes added since the last frame. A shrinking mesh list
    /// (not produced by `Scene` today) triggers a full re-upload.
    fn sync_meshes(&mut self, ctx: &RenderCtx<'_>, meshes: &[Mesh]) {
        if meshes.len() < self.meshes.len() {
            self.meshes.clear();
        }
        let Some(bgl) = self.mesh_bgl.as_ref() else { return };

        for mesh in &meshes[self.meshes.len()..] {
            let geometry = if has_geometry(mesh) {
                Some(upload_geometry(ctx.device, mesh))
            } else {
                log::warn!("mesh {} has no geometry; it will not be drawn", mesh.name);
                None
            };

            let ubo = ctx.device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("vantage mesh model ubo"),
                size: std::mem::size_of::<MeshUniform>() as u64,
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            });

            let bind_group = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("vantage mesh model bind group"),
                layout: bgl,
                entries: &[wgpu::BindGroupEntry {
                    binding: 0,
                    resource: ubo.as_entire_binding(),
                }],
            });

            log::debug!(
                "uploaded mesh {} ({} vertices, {} indices)",
                mesh.name,
                mesh.vertices.len(),
                mesh.indices.len()
            );

            self.meshes.push(GpuMesh {
                geometry,
                ubo,
                bind_group,
            });
        }
    }

    fn write_frame_uniform(&self, ctx: &RenderCtx<'_>, view_proj: glam::Mat4, lights: &[HemisphericLight]) {
        let Some(ubo) = self.frame_ubo.as_ref() else { return };
        let u = FrameUniform::new(view_proj, lights.first());
        ctx.queue.write_buffer(ubo, 0, bytemuck::bytes_of(&u));
    }
}

fn upload_geometry(device: &wgpu::Device, mesh: &Mesh) -> MeshBuffers {
    let vbo = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some("vantage mesh vbo"),
        contents: bytemuck::cast_slice(&mesh.vertices),
        usage: wgpu::BufferUsages::VERTEX,
    });

    let ibo = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some("vantage mesh ibo"),
        contents: bytemuck::cast_slice(&mesh.indices),
        usage: wgpu::BufferUsages::INDEX,
    });

    MeshBuffers {
        vbo,
        ibo,
        index_count: mesh.indices.len() as u32,
    }
}

fn uniform_layout(device: &wgpu::Device, label: &str, size: usize) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some(label),
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: wgpu::BufferSize::new(size as u64),
            },
            count: None,
        }],
    })
}

fn vertex_layout() -> wgpu::VertexBufferLayout<'static> {
    const ATTRS: [wgpu::VertexAttribute; 2] = wgpu::vertex_attr_array![
        0 => Float32x3, // position
        1 => Float32x3  // normal
    ];

    wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<MeshVertex>() as u64,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &ATTRS,
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
struct FrameUniform {
    view_proj: [[f32; 4]; 4],
    light_dir: [f32; 4],
    sky: [f32; 4],
    ground: [f32; 4],
}

impl FrameUniform {
    /// Only the first light is used. With no light the scene renders unlit.
    fn new(view_proj: glam::Mat4, light: Option<&HemisphericLight>) -> Self {
        let (light_dir, sky, ground) = match light {
            Some(l) => (
                l.direction.extend(l.intensity).to_array(),
                [l.sky[0], l.sky[1], l.sky[2], 1.0],
                [l.ground[0], l.ground[1], l.ground[2], 1.0],
            ),
            None => ([0.0, 1.0, 0.0, 1.0], [1.0; 4], [1.0; 4]),
        };

        Self {
            view_proj: view_proj.to_cols_array_2d(),
            light_dir,
            sky,
            ground,
        }
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
struct MeshUniform {
    model: [[f32; 4]; 4],
    color: [f32; 4],
}

#[cfg(test)]
mod tests {
    use glam::{Mat4, Vec3};

    use super::*;

    fn attachment(device: &wgpu::Device, format: wgpu::TextureFormat) -> wgpu::TextureView {
        device
            .create_texture(&wgpu::TextureDescriptor {
                label: Some("test attachment"),
                size: wgpu::Extent3d {
                    width: 64,
                    height: 64,
                    depth_or_array_layers: 1,
                },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format,
                usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
                view_formats: &[],
            })
            .create_view(&wgpu::TextureViewDescriptor::default())
    }

    /// Headless device, or `None` on machines without an adapter.
    fn headless_device() -> Option<(wgpu::Device, wgpu::Queue)> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());
        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions::default())).ok()?;
        pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor::default())).ok()
    }

    #[test]
    fn empty_geometry_is_not_drawable() {
        let mut mesh = Mesh::cuboid("box", 1.0);
        assert!(has_geometry(&mesh));

        mesh.indices.clear();
        assert!(!has_geometry(&mesh));

        let mut mesh = Mesh::cuboid("box", 1.0);
        mesh.vertices.clear();
        assert!(!has_geometry(&mesh));
    }

    #[test]
    fn renders_scene_with_empty_mesh() {
        let Some((device, queue)) = headless_device() else {
            eprintln!("no GPU adapter; skipping");
            return;
        };

        let mut scene = Scene::new();
        scene.set_camera(crate::scene::Camera::new("camera", Vec3::new(0.0, 0.0, -10.0)));
        let mut empty = Mesh::cuboid("empty", 2.0);
        empty.vertices.clear();
        empty.indices.clear();
        scene.add_mesh(empty);
        scene.add_mesh(Mesh::cuboid("box", 2.0));

        let format = wgpu::TextureFormat::Rgba8UnormSrgb;
        let color = attachment(&device, format);
        let depth = attachment(&device, DEPTH_FORMAT);
        let ctx = RenderCtx::new(&device, &queue, format);

        let mut renderer = MeshRenderer::new();
        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor::default());
        {
            let mut target = RenderTarget::new(&mut encoder, &color, &depth);
            renderer.render(&ctx, &mut target, &scene);
        }
        queue.submit(std::iter::once(encoder.finish()));

        assert_eq!(renderer.meshes.len(), 2);
        assert!(renderer.meshes[0].geometry.is_none());
        assert_eq!(renderer.meshes[1].geometry.as_ref().map(|g| g.index_count), Some(36));
    }

    #[test]
    fn uniform_sizes_are_16_byte_aligned() {
        assert_eq!(std::mem::size_of::<FrameUniform>() % 16, 0);
        assert_eq!(std::mem::size_of::<MeshUniform>() % 16, 0);
        assert_eq!(std::mem::size_of::<MeshVertex>(), 24);
    }

    #[test]
    fn unlit_frame_uniform_is_white() {
        let u = FrameUniform::new(Mat4::IDENTITY, None);
        assert_eq!(u.sky, [1.0; 4]);
        assert_eq!(u.ground, [1.0; 4]);
        assert_eq!(u.light_dir[3], 1.0);
    }

    #[test]
    fn frame_uniform_carries_light() {
        let light = HemisphericLight::new("light", Vec3::new(0.0, 2.0, 0.0)).with_intensity(0.7);
        let u = FrameUniform::new(Mat4::IDENTITY, Some(&light));
        assert_eq!(u.light_dir, [0.0, 1.0, 0.0, 0.7]);
        assert_eq!(u.ground, [0.0, 0.0, 0.0, 1.0]);
    }
}
