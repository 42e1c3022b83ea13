//! wgpu backend: executes flattened scene plans against the GPU.
//!
//! Pass structure per frame: one clear pass (`begin_frame`), then per
//! `render_scene` call one off-screen pass per visible `Frame3D` followed
//! by the depth-tested composite pass, and finally the present blit
//! (`end_frame`, windowed only). All scene content lands in an internal
//! screen-sized color target so capture always has a readable source.

pub mod capture;
pub mod context;
pub mod pipeline;
pub mod shaders;
pub mod textures;
pub mod window;

use crate::flatten::{ClipRect, Draw2D, TextureKey, flatten_scene};
use crate::stats::FrameStats;
use crate::{FrameCapture, Renderer, encode_capture};
use context::GpuContext;
use glam::Mat4;
use log::{debug, error, warn};
use pipeline::{BlitResources, MVP_STRIDE, MvpArena, QuadPipelines, QuadVertex, VertexArena};
use std::ops::Range;
use std::path::Path;
use textures::{ColorTarget, TextureCache, create_texture_bind_group_layout};
use vitrina_assets::AssetStore;
use vitrina_ids::NodeID;
use vitrina_scene::Scene;
use window::WindowHost;

// Linear-space clear color matching sRGB 0.2/0.2/0.3 blue-gray.
const CLEAR_R: f64 = 0.033104766565152086;
const CLEAR_G: f64 = 0.033104766565152086;
const CLEAR_B: f64 = 0.07323896587839581;

const CLEAR_COLOR: wgpu::Color = wgpu::Color {
    r: CLEAR_R,
    g: CLEAR_G,
    b: CLEAR_B,
    a: 1.0,
};

/// Renderer backend on wgpu. Construct windowed (`new`) or headless
/// (`headless`); the rest of the lifecycle is identical, headless simply
/// skips the swapchain.
pub struct WgpuRenderer {
    headless: bool,
    active: Option<Active>,
}

struct Active {
    window: Option<WindowHost>,
    gpu: GpuContext,
    pipelines: QuadPipelines,
    cache: TextureCache,
    mvp_arena: MvpArena,
    vertex_arena: VertexArena,
    blit: BlitResources,
    screen: ScreenTargets,
    stats: FrameStats,
    frame: Option<FrameInFlight>,
    pending_resize: Option<(u32, u32)>,
    text_notice_logged: bool,
}

struct ScreenTargets {
    color: ColorTarget,
    depth_view: wgpu::TextureView,
    size: (u32, u32),
}

struct FrameInFlight {
    surface_frame: Option<wgpu::SurfaceTexture>,
}

struct RecordedDraw {
    vertices: Range<u32>,
    mvp: u32,
    key: TextureKey,
    scissor: Option<ClipRect>,
}

impl WgpuRenderer {
    pub fn new() -> Self {
        Self {
            headless: false,
            active: None,
        }
    }

    /// Backend without a window: rendering and capture only. `poll_events`
    /// is a no-op and `should_close` never fires.
    pub fn headless() -> Self {
        Self {
            headless: true,
            active: None,
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.active.is_some()
    }

    fn create_screen_targets(
        device: &wgpu::Device,
        cache: &TextureCache,
        width: u32,
        height: u32,
    ) -> ScreenTargets {
        let color = cache.create_screen_target(device, width, height);
        let depth = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("vitrina_screen_depth"),
            size: wgpu::Extent3d {
                width: width.max(1),
                height: height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: context::DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let depth_view = depth.create_view(&wgpu::TextureViewDescriptor::default());
        ScreenTargets {
            color,
            depth_view,
            size: (width.max(1), height.max(1)),
        }
    }
}

impl Default for WgpuRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer for WgpuRenderer {
    fn initialize(&mut self, width: u32, height: u32, title: &str) -> bool {
        if self.active.is_some() {
            warn!("renderer already initialized");
            return true;
        }

        let (window, gpu) = if self.headless {
            let Some(gpu) = GpuContext::headless() else {
                error!("no gpu adapter available");
                return false;
            };
            (None, gpu)
        } else {
            let Some(host) = WindowHost::create(width, height, title) else {
                return false;
            };
            let Some(window) = host.window() else {
                return false;
            };
            let Some(gpu) = GpuContext::for_window(window) else {
                return false;
            };
            (Some(host), gpu)
        };

        let texture_layout = create_texture_bind_group_layout(&gpu.device);
        let pipelines = QuadPipelines::new(&gpu.device, &texture_layout, gpu.surface_format());
        let cache = TextureCache::new(&gpu.device, &gpu.queue, texture_layout);
        let mvp_arena = MvpArena::new(&gpu.device, &pipelines.mvp_layout);
        let vertex_arena = VertexArena::new(&gpu.device);
        let blit = BlitResources::new(&gpu.device, &gpu.queue, &pipelines.mvp_layout);

        let (sw, sh) = gpu.surface_size().unwrap_or((width.max(1), height.max(1)));
        let screen = Self::create_screen_targets(&gpu.device, &cache, sw, sh);

        self.active = Some(Active {
            window,
            gpu,
            pipelines,
            cache,
            mvp_arena,
            vertex_arena,
            blit,
            screen,
            stats: FrameStats::new(),
            frame: None,
            pending_resize: None,
            text_notice_logged: false,
        });
        true
    }

    fn shutdown(&mut self) {
        // Dropping the active state releases every cached GPU resource,
        // the surface, and the window. Idempotent.
        self.active = None;
    }

    fn begin_frame(&mut self) -> bool {
        let Some(active) = &mut self.active else {
            return false;
        };
        if active.frame.is_some() {
            warn!("begin_frame called with a frame already in flight");
            active.frame = None;
        }

        if let Some((width, height)) = active.pending_resize.take() {
            if width > 0 && height > 0 {
                active.gpu.resize(width, height);
                let (sw, sh) = active.gpu.surface_size().unwrap_or((width, height));
                active.screen =
                    Self::create_screen_targets(&active.gpu.device, &active.cache, sw, sh);
            }
        }

        active.cache.begin_frame();

        let surface_frame = if active.gpu.is_windowed() {
            match active.gpu.acquire_frame() {
                Some(frame) => Some(frame),
                None => return false,
            }
        } else {
            None
        };

        let mut encoder = active
            .gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("vitrina_clear_encoder"),
            });
        {
            let _pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("vitrina_clear_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &active.screen.color.view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(CLEAR_COLOR),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &active.screen.depth_view,
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
        }
        active.gpu.queue.submit(Some(encoder.finish()));

        active.frame = Some(FrameInFlight { surface_frame });
        true
    }

    fn end_frame(&mut self) {
        let Some(active) = &mut self.active else {
            warn!("end_frame on uninitialized renderer");
            return;
        };
        let Some(frame) = active.frame.take() else {
            warn!("end_frame without begin_frame");
            return;
        };

        if let Some(surface_frame) = frame.surface_frame {
            if let Some(present_pipeline) = &active.pipelines.present {
                let view = surface_frame
                    .texture
                    .create_view(&wgpu::TextureViewDescriptor::default());
                let mut encoder =
                    active
                        .gpu
                        .device
                        .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                            label: Some("vitrina_present_encoder"),
                        });
                {
                    let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                        label: Some("vitrina_present_pass"),
                        color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                            view: &view,
                            resolve_target: None,
                            ops: wgpu::Operations {
                                load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                                store: wgpu::StoreOp::Store,
                            },
                            depth_slice: None,
                        })],
                        depth_stencil_attachment: None,
                        timestamp_writes: None,
                        occlusion_query_set: None,
                        multiview_mask: None,
                    });
                    pass.set_pipeline(present_pipeline);
                    pass.set_vertex_buffer(0, active.blit.vertices.slice(..));
                    pass.set_bind_group(0, &active.blit.mvp_bind_group, &[0]);
                    pass.set_bind_group(1, &active.screen.color.bind_group, &[]);
                    pass.draw(0..6, 0..1);
                }
                active.gpu.queue.submit(Some(encoder.finish()));
                surface_frame.present();
            }
        }

        // Synchronous uploads this frame: wait for the GPU so memory use
        // from back-to-back uploads stays bounded.
        if active.cache.uploaded_this_frame() {
            if let Err(err) = active.gpu.device.poll(wgpu::PollType::wait_indefinitely()) {
                warn!("post-upload sync failed: {err:?}");
            }
        }

        active.stats.frame_presented();
    }

    fn render_scene(&mut self, scene: &Scene, assets: &AssetStore) {
        let Some(active) = &mut self.active else {
            warn!("render_scene on uninitialized renderer");
            return;
        };
        if active.frame.is_none() {
            warn!("render_scene outside begin_frame/end_frame");
            return;
        }

        let plan = flatten_scene(scene);
        if plan.batches.is_empty() && plan.composites.is_empty() {
            return;
        }

        let device = &active.gpu.device;
        let queue = &active.gpu.queue;

        // Resolve every texture and target up front so pass recording only
        // performs immutable cache lookups.
        for batch in &plan.batches {
            active.cache.ensure_target(device, batch.frame, batch.target_size);
            for draw in &batch.draws {
                if let Draw2D::Rect {
                    texture: TextureKey::Image(id),
                    ..
                } = draw
                {
                    active.cache.ensure_image(device, queue, *id, assets);
                }
            }
        }

        let mut mvps: Vec<Mat4> = Vec::new();
        let mut vertices: Vec<QuadVertex> = Vec::new();
        let mut offscreen_passes: Vec<(NodeID, Vec<RecordedDraw>)> = Vec::new();
        let mut composite_draws: Vec<RecordedDraw> = Vec::new();

        for batch in &plan.batches {
            let mut records = Vec::new();
            for draw in &batch.draws {
                match draw {
                    Draw2D::Rect {
                        mvp,
                        size,
                        color,
                        texture,
                        clip,
                    } => {
                        if clip.is_empty() {
                            continue;
                        }
                        let start = vertices.len() as u32;
                        vertices.extend_from_slice(&pipeline::rect_vertices(
                            size.x, size.y, *color,
                        ));
                        let mvp_index = mvps.len() as u32;
                        mvps.push(*mvp);
                        records.push(RecordedDraw {
                            vertices: start..start + 6,
                            mvp: mvp_index,
                            key: *texture,
                            scissor: Some(*clip),
                        });
                    }
                    Draw2D::Text { .. } => {
                        // Glyph rasterization is an external service; until
                        // one is wired in, text draws are recorded upstream
                        // and skipped here.
                        if !active.text_notice_logged {
                            debug!("text rendering requires a glyph service; skipping text draws");
                            active.text_notice_logged = true;
                        }
                    }
                }
            }
            offscreen_passes.push((batch.frame, records));
        }

        for composite in &plan.composites {
            let start = vertices.len() as u32;
            vertices.extend_from_slice(&pipeline::centered_vertices(
                composite.half_size.x,
                composite.half_size.y,
            ));
            let mvp_index = mvps.len() as u32;
            mvps.push(composite.mvp);
            composite_draws.push(RecordedDraw {
                vertices: start..start + 6,
                mvp: mvp_index,
                key: TextureKey::Target(composite.frame),
                scissor: None,
            });
        }

        // Grow and fill buffers before any pass references them.
        active
            .mvp_arena
            .upload(device, queue, &active.pipelines.mvp_layout, &mvps);
        active.vertex_arena.upload(device, queue, &vertices);

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("vitrina_scene_encoder"),
        });

        for (frame_id, records) in &offscreen_passes {
            let Some(target) = active.cache.target(*frame_id) else {
                // A missing target skips this frame's content, not the scene.
                warn!("render target missing for frame {frame_id}");
                continue;
            };
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("vitrina_offscreen_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &target.view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });
            pass.set_pipeline(&active.pipelines.offscreen);
            pass.set_vertex_buffer(0, active.vertex_arena.buffer().slice(..));
            for record in records {
                if let Some(clip) = record.scissor {
                    pass.set_scissor_rect(clip.x, clip.y, clip.width, clip.height);
                }
                pass.set_bind_group(
                    0,
                    active.mvp_arena.bind_group(),
                    &[record.mvp * MVP_STRIDE as u32],
                );
                pass.set_bind_group(1, active.cache.bind_group(record.key), &[]);
                pass.draw(record.vertices.clone(), 0..1);
            }
        }

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("vitrina_composite_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &active.screen.color.view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &active.screen.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });
            pass.set_pipeline(&active.pipelines.composite);
            pass.set_vertex_buffer(0, active.vertex_arena.buffer().slice(..));
            for record in &composite_draws {
                pass.set_bind_group(
                    0,
                    active.mvp_arena.bind_group(),
                    &[record.mvp * MVP_STRIDE as u32],
                );
                pass.set_bind_group(1, active.cache.bind_group(record.key), &[]);
                pass.draw(record.vertices.clone(), 0..1);
            }
        }

        queue.submit(Some(encoder.finish()));
    }

    fn should_close(&self) -> bool {
        let Some(active) = &self.active else {
            return true;
        };
        active
            .window
            .as_ref()
            .map(|w| w.close_requested())
            .unwrap_or(false)
    }

    fn poll_events(&mut self) {
        let Some(active) = &mut self.active else {
            return;
        };
        if let Some(window) = &mut active.window {
            window.pump();
            if let Some(size) = window.take_resize() {
                active.pending_resize = Some(size);
            }
        }
    }

    fn capture_frame(&mut self) -> Option<FrameCapture> {
        let Some(active) = &self.active else {
            warn!("capture_frame on uninitialized renderer");
            return None;
        };
        let (width, height) = active.screen.size;
        let pixels = capture::read_texture_rgba8(
            &active.gpu.device,
            &active.gpu.queue,
            &active.screen.color.texture,
            width,
            height,
        )?;
        Some(FrameCapture {
            pixels,
            width,
            height,
        })
    }

    fn save_capture(&mut self, path: &Path) -> bool {
        match self.capture_frame() {
            Some(capture) => encode_capture(path, &capture),
            None => false,
        }
    }

    fn fps(&self) -> f64 {
        self.active.as_ref().map(|a| a.stats.fps()).unwrap_or(0.0)
    }

    fn frame_count(&self) -> u64 {
        self.active.as_ref().map(|a| a.stats.total()).unwrap_or(0)
    }
}
