use std::time::{Duration, Instant};

/// FPS estimate recompute window.
const FPS_WINDOW: Duration = Duration::from_millis(500);

/// Frame counters: a monotonic total (never reset while the renderer is
/// alive) and a windowed counter/timestamp pair for the FPS estimate.
pub struct FrameStats {
    total: u64,
    window_frames: u32,
    window_start: Instant,
    fps: f64,
}

impl FrameStats {
    pub fn new() -> Self {
        Self {
            total: 0,
            window_frames: 0,
            window_start: Instant::now(),
            fps: 0.0,
        }
    }

    pub fn frame_presented(&mut self) {
        self.frame_presented_at(Instant::now());
    }

    fn frame_presented_at(&mut self, now: Instant) {
        self.total += 1;
        self.window_frames += 1;
        let elapsed = now.duration_since(self.window_start);
        if elapsed >= FPS_WINDOW {
            self.fps = f64::from(self.window_frames) / elapsed.as_secs_f64();
            self.window_frames = 0;
            self.window_start = now;
        }
    }

    /// Completed frames since the renderer was initialized.
    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn fps(&self) -> f64 {
        self.fps
    }
}

impl Default for FrameStats {
    fn default() -> Self {
        Self::new()
    }
}
