//! Host-side wiring: owns a renderer, a scene, and the asset store, and
//! drives the canonical frame loop (poll → begin → render → end).

use log::info;
use vitrina_assets::AssetStore;
use vitrina_graphics::{Renderer, RendererKind, create_renderer};
use vitrina_scene::Scene;

pub struct App {
    pub renderer: Box<dyn Renderer>,
    pub scene: Scene,
    pub assets: AssetStore,
}

impl App {
    pub fn new(kind: RendererKind) -> Self {
        Self::with_renderer(create_renderer(kind))
    }

    pub fn with_renderer(renderer: Box<dyn Renderer>) -> Self {
        Self {
            renderer,
            scene: Scene::new(),
            assets: AssetStore::new(),
        }
    }

    pub fn initialize(&mut self, width: u32, height: u32, title: &str) -> bool {
        self.renderer.initialize(width, height, title)
    }

    /// One frame of the host loop. Returns false once the renderer reports
    /// a close request (checked between frames, never mid-frame) or a
    /// failed frame begin.
    pub fn frame(&mut self) -> bool {
        self.renderer.poll_events();
        if self.renderer.should_close() {
            return false;
        }
        if !self.renderer.begin_frame() {
            return false;
        }
        self.renderer.render_scene(&self.scene, &self.assets);
        self.renderer.end_frame();
        true
    }

    /// Run until close is requested, then shut the renderer down.
    pub fn run(&mut self) {
        while self.frame() {}
        info!(
            "exiting after {} frames ({:.1} fps)",
            self.renderer.frame_count(),
            self.renderer.fps()
        );
        self.renderer.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_loop_runs_on_null_backend() {
        let mut app = App::new(RendererKind::Null);
        assert!(app.initialize(320, 240, "test"));
        assert!(app.frame());
        assert!(app.frame());
        assert_eq!(app.renderer.frame_count(), 2);
    }

    #[test]
    fn frame_fails_without_initialize() {
        let mut app = App::new(RendererKind::Null);
        assert!(!app.frame());
    }
}
