use super::context::{DEPTH_FORMAT, SCENE_FORMAT};
use super::shaders::create_quad_shader_module;
use bytemuck::{Pod, Zeroable};
use glam::Mat4;
use wgpu::util::DeviceExt;

/// Per-draw MVP slots are spaced at the conservative uniform-offset
/// alignment so dynamic offsets work on every backend.
pub const MVP_STRIDE: u64 = 256;

const MVP_SIZE: u64 = std::mem::size_of::<[f32; 16]>() as u64;

#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
pub struct QuadVertex {
    pub pos: [f32; 2],
    pub color: [f32; 4],
    pub uv: [f32; 2],
}

fn vertex_layout() -> wgpu::VertexBufferLayout<'static> {
    wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<QuadVertex>() as u64,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &[
            wgpu::VertexAttribute {
                offset: 0,
                shader_location: 0,
                format: wgpu::VertexFormat::Float32x2,
            },
            wgpu::VertexAttribute {
                offset: 8,
                shader_location: 1,
                format: wgpu::VertexFormat::Float32x4,
            },
            wgpu::VertexAttribute {
                offset: 24,
                shader_location: 2,
                format: wgpu::VertexFormat::Float32x2,
            },
        ],
    }
}

/// The one quad program in its three target configurations: off-screen
/// frame targets (no depth), the 3D composite pass (depth tested), and the
/// present blit (surface format; absent when headless).
pub struct QuadPipelines {
    pub mvp_layout: wgpu::BindGroupLayout,
    pub offscreen: wgpu::RenderPipeline,
    pub composite: wgpu::RenderPipeline,
    pub present: Option<wgpu::RenderPipeline>,
}

impl QuadPipelines {
    pub fn new(
        device: &wgpu::Device,
        texture_layout: &wgpu::BindGroupLayout,
        surface_format: Option<wgpu::TextureFormat>,
    ) -> Self {
        let shader = create_quad_shader_module(device);
        let mvp_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("vitrina_mvp_bgl"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: true,
                    min_binding_size: Some(
                        std::num::NonZeroU64::new(MVP_SIZE)
                            .expect("mvp uniform size must be non-zero"),
                    ),
                },
                count: None,
            }],
        });

        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("vitrina_quad_pipeline_layout"),
            bind_group_layouts: &[&mvp_layout, texture_layout],
            immediate_size: 0,
        });

        let offscreen = create_quad_pipeline(device, &layout, &shader, SCENE_FORMAT, false);
        let composite = create_quad_pipeline(device, &layout, &shader, SCENE_FORMAT, true);
        let present =
            surface_format.map(|format| create_quad_pipeline(device, &layout, &shader, format, false));

        Self {
            mvp_layout,
            offscreen,
            composite,
            present,
        }
    }
}

fn create_quad_pipeline(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    shader: &wgpu::ShaderModule,
    format: wgpu::TextureFormat,
    depth: bool,
) -> wgpu::RenderPipeline {
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("vitrina_quad_pipeline"),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: Some("vs_main"),
            buffers: &[vertex_layout()],
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState::default(),
        depth_stencil: depth.then(|| wgpu::DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled: true,
            depth_compare: wgpu::CompareFunction::LessEqual,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState::default(),
        multiview_mask: None,
        cache: None,
    })
}

/// Growable uniform buffer holding one MVP per draw at `MVP_STRIDE` spacing,
/// bound once with a dynamic offset per draw. Growth recreates buffer and
/// bind group, so it must happen before a frame's passes are recorded.
pub struct MvpArena {
    buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    capacity: usize,
}

impl MvpArena {
    pub fn new(device: &wgpu::Device, layout: &wgpu::BindGroupLayout) -> Self {
        let capacity = 256usize;
        let (buffer, bind_group) = Self::create(device, layout, capacity);
        Self {
            buffer,
            bind_group,
            capacity,
        }
    }

    fn create(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        capacity: usize,
    ) -> (wgpu::Buffer, wgpu::BindGroup) {
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("vitrina_mvp_arena"),
            size: capacity as u64 * MVP_STRIDE,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("vitrina_mvp_bg"),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: &buffer,
                    offset: 0,
                    size: std::num::NonZeroU64::new(MVP_SIZE),
                }),
            }],
        });
        (buffer, bind_group)
    }

    pub fn bind_group(&self) -> &wgpu::BindGroup {
        &self.bind_group
    }

    pub fn upload(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        layout: &wgpu::BindGroupLayout,
        mvps: &[Mat4],
    ) {
        if mvps.is_empty() {
            return;
        }
        if mvps.len() > self.capacity {
            let mut capacity = self.capacity.max(1);
            while capacity < mvps.len() {
                capacity *= 2;
            }
            let (buffer, bind_group) = Self::create(device, layout, capacity);
            self.buffer = buffer;
            self.bind_group = bind_group;
            self.capacity = capacity;
        }

        let mut staged = vec![0u8; mvps.len() * MVP_STRIDE as usize];
        for (i, mvp) in mvps.iter().enumerate() {
            let offset = i * MVP_STRIDE as usize;
            let cols = mvp.to_cols_array();
            let bytes = bytemuck::bytes_of(&cols);
            staged[offset..offset + bytes.len()].copy_from_slice(bytes);
        }
        queue.write_buffer(&self.buffer, 0, &staged);
    }
}

/// Growable vertex buffer refilled each `render_scene` submission.
pub struct VertexArena {
    buffer: wgpu::Buffer,
    capacity: usize,
}

impl VertexArena {
    pub fn new(device: &wgpu::Device) -> Self {
        let capacity = 1024usize;
        Self {
            buffer: Self::create(device, capacity),
            capacity,
        }
    }

    fn create(device: &wgpu::Device, capacity: usize) -> wgpu::Buffer {
        device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("vitrina_quad_vertices"),
            size: (capacity * std::mem::size_of::<QuadVertex>()) as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        })
    }

    pub fn buffer(&self) -> &wgpu::Buffer {
        &self.buffer
    }

    pub fn upload(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, vertices: &[QuadVertex]) {
        if vertices.is_empty() {
            return;
        }
        if vertices.len() > self.capacity {
            let mut capacity = self.capacity.max(1);
            while capacity < vertices.len() {
                capacity *= 2;
            }
            self.buffer = Self::create(device, capacity);
            self.capacity = capacity;
        }
        queue.write_buffer(&self.buffer, 0, bytemuck::cast_slice(vertices));
    }
}

/// Static resources for the present blit: a full-screen clip-space quad and
/// an identity MVP in its own single-slot uniform.
pub struct BlitResources {
    pub vertices: wgpu::Buffer,
    pub mvp_bind_group: wgpu::BindGroup,
}

impl BlitResources {
    pub fn new(device: &wgpu::Device, queue: &wgpu::Queue, layout: &wgpu::BindGroupLayout) -> Self {
        let quad = fullscreen_quad();
        let vertices = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("vitrina_blit_vertices"),
            contents: bytemuck::cast_slice(&quad),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let mvp_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("vitrina_blit_mvp"),
            size: MVP_STRIDE,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        queue.write_buffer(
            &mvp_buffer,
            0,
            bytemuck::bytes_of(&Mat4::IDENTITY.to_cols_array()),
        );
        let mvp_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("vitrina_blit_mvp_bg"),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: &mvp_buffer,
                    offset: 0,
                    size: std::num::NonZeroU64::new(MVP_SIZE),
                }),
            }],
        });

        Self {
            vertices,
            mvp_bind_group,
        }
    }
}

const WHITE: [f32; 4] = [1.0, 1.0, 1.0, 1.0];

/// Quad with top-left-origin geometry (0..w, 0..h), UV v = 0 at the top.
pub fn rect_vertices(width: f32, height: f32, color: [f32; 4]) -> [QuadVertex; 6] {
    let tl = QuadVertex {
        pos: [0.0, 0.0],
        color,
        uv: [0.0, 0.0],
    };
    let tr = QuadVertex {
        pos: [width, 0.0],
        color,
        uv: [1.0, 0.0],
    };
    let bl = QuadVertex {
        pos: [0.0, height],
        color,
        uv: [0.0, 1.0],
    };
    let br = QuadVertex {
        pos: [width, height],
        color,
        uv: [1.0, 1.0],
    };
    [tl, tr, bl, tr, br, bl]
}

/// Quad centered at the origin with Y up, half extents per axis; the top
/// edge samples the texture's first row.
pub fn centered_vertices(half_width: f32, half_height: f32) -> [QuadVertex; 6] {
    let bl = QuadVertex {
        pos: [-half_width, -half_height],
        color: WHITE,
        uv: [0.0, 1.0],
    };
    let br = QuadVertex {
        pos: [half_width, -half_height],
        color: WHITE,
        uv: [1.0, 1.0],
    };
    let tl = QuadVertex {
        pos: [-half_width, half_height],
        color: WHITE,
        uv: [0.0, 0.0],
    };
    let tr = QuadVertex {
        pos: [half_width, half_height],
        color: WHITE,
        uv: [1.0, 0.0],
    };
    [bl, br, tl, br, tr, tl]
}

fn fullscreen_quad() -> [QuadVertex; 6] {
    centered_vertices(1.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quad_vertex_is_tightly_packed() {
        assert_eq!(std::mem::size_of::<QuadVertex>(), 32);
    }

    #[test]
    fn rect_vertices_span_size() {
        let verts = rect_vertices(50.0, 40.0, WHITE);
        let xs: Vec<f32> = verts.iter().map(|v| v.pos[0]).collect();
        let ys: Vec<f32> = verts.iter().map(|v| v.pos[1]).collect();
        assert_eq!(xs.iter().cloned().fold(f32::MIN, f32::max), 50.0);
        assert_eq!(ys.iter().cloned().fold(f32::MIN, f32::max), 40.0);
        assert_eq!(xs.iter().cloned().fold(f32::MAX, f32::min), 0.0);
        assert_eq!(ys.iter().cloned().fold(f32::MAX, f32::min), 0.0);
    }

    #[test]
    fn rect_uv_top_left_is_origin() {
        let verts = rect_vertices(10.0, 10.0, WHITE);
        let top_left = verts
            .iter()
            .find(|v| v.pos == [0.0, 0.0])
            .expect("quad has a top-left corner");
        assert_eq!(top_left.uv, [0.0, 0.0]);
    }

    #[test]
    fn centered_quad_top_samples_first_row() {
        let verts = centered_vertices(100.0, 75.0);
        for v in verts.iter().filter(|v| v.pos[1] > 0.0) {
            assert_eq!(v.uv[1], 0.0);
        }
        for v in verts.iter().filter(|v| v.pos[1] < 0.0) {
            assert_eq!(v.uv[1], 1.0);
        }
    }
}
