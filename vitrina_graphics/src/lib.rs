//! Renderer contract, the scene-flattening traversal, and the backends.
//!
//! The data model (`vitrina_scene`) knows nothing about drawing; this crate
//! walks it. [`flatten`] turns a scene into plain draw batches, the wgpu
//! backend executes them, and [`Renderer`] is the lifecycle every backend
//! satisfies: `initialize` → (`begin_frame` → `render_scene` →
//! `end_frame`)* → `shutdown`.

pub mod flatten;
pub mod gpu;
pub mod null;
pub mod stats;

pub use flatten::{ClipRect, ClipStack, Draw2D, FrameBatch, ScenePlan, TextureKey, flatten_scene};
pub use gpu::WgpuRenderer;
pub use null::NullRenderer;

use log::error;
use std::path::Path;
use vitrina_assets::AssetStore;
use vitrina_scene::Scene;

/// A read-back frame: tightly packed RGBA8, row-major, top-to-bottom.
#[derive(Debug, Clone)]
pub struct FrameCapture {
    pub pixels: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

/// Lifecycle and traversal contract every backend satisfies. Failure stays
/// boolean-or-`Option` plus a log line; nothing panics across this
/// boundary.
pub trait Renderer {
    fn initialize(&mut self, width: u32, height: u32, title: &str) -> bool;
    fn shutdown(&mut self);
    fn begin_frame(&mut self) -> bool;
    fn end_frame(&mut self);
    fn render_scene(&mut self, scene: &Scene, assets: &AssetStore);
    fn should_close(&self) -> bool;
    fn poll_events(&mut self);
    fn capture_frame(&mut self) -> Option<FrameCapture>;
    fn save_capture(&mut self, path: &Path) -> bool;
    fn fps(&self) -> f64;
    fn frame_count(&self) -> u64;
}

/// Backend selection for [`create_renderer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RendererKind {
    Wgpu,
    Null,
}

pub fn create_renderer(kind: RendererKind) -> Box<dyn Renderer> {
    match kind {
        RendererKind::Wgpu => Box::new(WgpuRenderer::new()),
        RendererKind::Null => Box::new(NullRenderer::new()),
    }
}

/// Encode a capture to disk; the format follows the file extension.
pub(crate) fn encode_capture(path: &Path, capture: &FrameCapture) -> bool {
    match image::save_buffer(
        path,
        &capture.pixels,
        capture.width,
        capture.height,
        image::ColorType::Rgba8,
    ) {
        Ok(()) => true,
        Err(err) => {
            error!("failed to save capture to {}: {err}", path.display());
            false
        }
    }
}
