use crate::stats::FrameStats;
use crate::{FrameCapture, Renderer, encode_capture};
use std::path::Path;
use vitrina_assets::AssetStore;
use vitrina_scene::Scene;

/// Backend that draws nothing but honors the whole contract: lifecycle
/// states, frame counting, and blank captures at the configured size.
/// Useful for tests and hosts that only need traversal timing.
pub struct NullRenderer {
    initialized: bool,
    size: (u32, u32),
    frame_open: bool,
    stats: FrameStats,
}

impl NullRenderer {
    pub fn new() -> Self {
        Self {
            initialized: false,
            size: (0, 0),
            frame_open: false,
            stats: FrameStats::new(),
        }
    }
}

impl Default for NullRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer for NullRenderer {
    fn initialize(&mut self, width: u32, height: u32, _title: &str) -> bool {
        self.initialized = true;
        self.size = (width.max(1), height.max(1));
        self.stats = FrameStats::new();
        true
    }

    fn shutdown(&mut self) {
        self.initialized = false;
        self.frame_open = false;
    }

    fn begin_frame(&mut self) -> bool {
        if !self.initialized {
            return false;
        }
        self.frame_open = true;
        true
    }

    fn end_frame(&mut self) {
        if self.frame_open {
            self.frame_open = false;
            self.stats.frame_presented();
        }
    }

    fn render_scene(&mut self, _scene: &Scene, _assets: &AssetStore) {}

    fn should_close(&self) -> bool {
        false
    }

    fn poll_events(&mut self) {}

    fn capture_frame(&mut self) -> Option<FrameCapture> {
        if !self.initialized {
            return None;
        }
        let (width, height) = self.size;
        Some(FrameCapture {
            pixels: vec![0; (width * height * 4) as usize],
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
        self.stats.fps()
    }

    fn frame_count(&self) -> u64 {
        self.stats.total()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lifecycle_gates_frames() {
        let mut renderer = NullRenderer::new();
        assert!(!renderer.begin_frame());
        assert_eq!(renderer.frame_count(), 0);

        assert!(renderer.initialize(64, 64, "null"));
        assert!(renderer.begin_frame());
        renderer.end_frame();
        assert_eq!(renderer.frame_count(), 1);

        // end_frame without begin_frame does not count.
        renderer.end_frame();
        assert_eq!(renderer.frame_count(), 1);

        renderer.shutdown();
        assert!(!renderer.begin_frame());
        // Shutdown twice is fine.
        renderer.shutdown();
    }

    #[test]
    fn capture_matches_configured_size() {
        let mut renderer = NullRenderer::new();
        assert!(renderer.capture_frame().is_none());
        renderer.initialize(8, 4, "null");
        let capture = renderer.capture_frame().unwrap();
        assert_eq!((capture.width, capture.height), (8, 4));
        assert_eq!(capture.pixels.len(), 8 * 4 * 4);
    }
}
