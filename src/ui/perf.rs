/// Rolling frame-rate meter over the last 60 frames.

use std::time::Instant;

const WINDOW: usize = 60;

pub struct FpsCounter {
    /// Frame timestamps in seconds since `start`, as a ring buffer.
    frame_times: [f64; WINDOW],
    frame_index: usize,
    filled: usize,
    start: Instant,
    fps: f32,
}

impl FpsCounter {
    pub fn new() -> Self {
        FpsCounter {
            frame_times: [0.0; WINDOW],
            frame_index: 0,
            filled: 0,
            start: Instant::now(),
            fps: 0.0,
        }
    }

    /// Record a frame at the current instant.
    pub fn tick(&mut self) {
        let t = self.start.elapsed().as_secs_f64();
        self.record(t);
    }

    /// Record a frame at `time` seconds. Times must not decrease.
    pub fn record(&mut self, time: f64) {
        self.frame_times[self.frame_index] = time;
        self.frame_index = (self.frame_index + 1) % WINDOW;
        self.filled = (self.filled + 1).min(WINDOW);

        // Oldest sample still in the window.
        let oldest_idx = if self.filled < WINDOW { 0 } else { self.frame_index };
        let elapsed = time - self.frame_times[oldest_idx];
        let frames = self.filled.saturating_sub(1);
        if frames > 0 && elapsed > 0.0 {
            self.fps = (frames as f64 / elapsed) as f32;
        }
    }

    pub fn fps(&self) -> f32 {
        self.fps
    }
}
