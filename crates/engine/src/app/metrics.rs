use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub(crate) struct LoopMetrics {
    pub(crate) fps: f32,
    /// Zero while the loop is stopped.
    pub(crate) ups: f32,
    pub(crate) frame_time_ms: f32,
    pub(crate) slowest_frame_ms: f32,
}

/// Counts presented frames and scene updates over a fixed reporting window.
#[derive(Debug)]
pub(crate) struct FrameStats {
    window_start: Instant,
    window: Duration,
    frames: u32,
    updates: u32,
    frame_time_sum: Duration,
    slowest_frame: Duration,
}

impl FrameStats {
    pub(crate) fn new(window: Duration, now: Instant) -> Self {
        Self {
            window_start: now,
            window,
            frames: 0,
            updates: 0,
            frame_time_sum: Duration::ZERO,
            slowest_frame: Duration::ZERO,
        }
    }

    pub(crate) fn record_frame(&mut self, frame_dt: Duration) {
        self.frames = self.frames.saturating_add(1);
        self.frame_time_sum = self.frame_time_sum.saturating_add(frame_dt);
        self.slowest_frame = self.slowest_frame.max(frame_dt);
    }

    pub(crate) fn record_update(&mut self) {
        self.updates = self.updates.saturating_add(1);
    }

    /// Closes the window once it has elapsed and starts the next one at `now`.
    pub(crate) fn take_if_due(&mut self, now: Instant) -> Option<LoopMetrics> {
        let elapsed = now.saturating_duration_since(self.window_start);
        if elapsed < self.window {
            return None;
        }

        let seconds = elapsed.as_secs_f32().max(f32::EPSILON);
        let frame_time_ms = match self.frames {
            0 => 0.0,
            frames => self.frame_time_sum.as_secs_f32() * 1000.0 / frames as f32,
        };
        let metrics = LoopMetrics {
            fps: self.frames as f32 / seconds,
            ups: self.updates as f32 / seconds,
            frame_time_ms,
            slowest_frame_ms: self.slowest_frame.as_secs_f32() * 1000.0,
        };

        *self = Self::new(self.window, now);
        Some(metrics)
    }
}
