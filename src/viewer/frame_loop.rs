//! Frame scheduling for the viewer loop.

use web_time::{Duration, Instant};

/// Per-frame scheduling state: whether the loop still runs, whether a frame
/// is in progress, and a smoothed frame rate.
///
/// A frame is bracketed by [`begin`](Self::begin) and [`end`](Self::end).
/// `begin` refuses while another frame is open or after
/// [`stop`](Self::stop), so display-refresh callbacks that arrive late or
/// after teardown do nothing.
#[derive(Debug)]
pub struct FrameLoop {
    stopped: bool,
    in_frame: bool,
    frame_start: Instant,
    last_dt: Duration,
    /// Smoothed FPS using exponential moving average
    smoothed_fps: f32,
    /// Smoothing factor (lower = smoother, 0.0-1.0)
    smoothing: f32,
    frames: u64,
}

impl Default for FrameLoop {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameLoop {
    /// A running loop with no frame open.
    #[must_use]
    pub fn new() -> Self {
        Self {
            stopped: false,
            in_frame: false,
            frame_start: Instant::now(),
            last_dt: Duration::ZERO,
            smoothed_fps: 60.0,
            smoothing: 0.05,
            frames: 0,
        }
    }

    /// Open a frame. Returns `false` (and opens nothing) if the loop is
    /// stopped or a frame is already open.
    pub fn begin(&mut self) -> bool {
        if self.stopped || self.in_frame {
            return false;
        }
        self.in_frame = true;
        let now = Instant::now();
        self.last_dt = now.duration_since(self.frame_start);
        self.frame_start = now;
        true
    }

    /// Close the current frame and fold its duration into the FPS estimate.
    pub fn end(&mut self) {
        if !self.in_frame {
            return;
        }
        self.in_frame = false;
        self.frames += 1;
        let frame_time = self.last_dt.as_secs_f32();
        if frame_time > 0.0 {
            self.smoothed_fps = self.smoothed_fps * (1.0 - self.smoothing)
                + self.smoothing / frame_time;
        }
    }

    /// Stop for good. A stopped loop never opens another frame.
    pub fn stop(&mut self) {
        self.stopped = true;
        self.in_frame = false;
    }

    /// Whether [`stop`](Self::stop) has been called.
    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    /// Whether a frame is open.
    #[must_use]
    pub fn in_frame(&self) -> bool {
        self.in_frame
    }

    /// Time between the starts of the last two frames.
    #[must_use]
    pub fn delta(&self) -> Duration {
        self.last_dt
    }

    /// Smoothed frames per second.
    #[must_use]
    pub fn fps(&self) -> f32 {
        self.smoothed_fps
    }

    /// Frames completed.
    #[must_use]
    pub fn frame_count(&self) -> u64 {
        self.frames
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frames_do_not_overlap() {
        let mut frames = FrameLoop::new();
        assert!(frames.begin());
        assert!(!frames.begin());
        frames.end();
        assert!(frames.begin());
        frames.end();
        assert_eq!(frames.frame_count(), 2);
    }

    #[test]
    fn stopped_loop_stays_stopped() {
        let mut frames = FrameLoop::new();
        assert!(frames.begin());
        frames.stop();
        assert!(!frames.in_frame());
        frames.end();
        assert!(!frames.begin());
        assert_eq!(frames.frame_count(), 0);
    }

    #[test]
    fn unmatched_end_is_ignored() {
        let mut frames = FrameLoop::new();
        frames.end();
        assert_eq!(frames.frame_count(), 0);
        assert_eq!(frames.fps(), 60.0);
    }
}
