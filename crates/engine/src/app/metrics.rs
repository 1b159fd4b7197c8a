use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};

use tracing::warn;

static FRAME_STATS_POISON_WARNED: AtomicBool = AtomicBool::new(false);

fn warn_poison_once(operation: &'static str) {
    if !FRAME_STATS_POISON_WARNED.swap(true, Ordering::Relaxed) {
        warn!(operation, "frame_stats_lock_poisoned");
    }
}

/// Rolling frame statistics shown by the debug overlay.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameStats {
    pub fps: f32,
    pub steps_per_second: f32,
    pub frame_time_ms: f32,
}

/// Shared read side of the latest [`FrameStats`]. Cloning is cheap; every
/// clone observes the same published value.
#[derive(Clone, Debug, Default)]
pub struct FrameStatsHandle {
    latest: Arc<RwLock<FrameStats>>,
}

impl FrameStatsHandle {
    pub fn latest(&self) -> FrameStats {
        match self.latest.read() {
            Ok(guard) => *guard,
            Err(poisoned) => {
                warn_poison_once("read");
                *poisoned.into_inner()
            }
        }
    }

    pub(crate) fn publish(&self, stats: FrameStats) {
        let mut guard = match self.latest.write() {
            Ok(guard) => guard,
            Err(poisoned) => {
                warn_poison_once("write");
                poisoned.into_inner()
            }
        };
        *guard = stats;
    }
}

#[derive(Debug)]
pub(crate) struct FrameStatsWindow {
    started: Instant,
    length: Duration,
    frames: u32,
    steps: u32,
    busy: Duration,
}

impl FrameStatsWindow {
    pub(crate) fn new(started: Instant, length: Duration) -> Self {
        Self {
            started,
            length,
            frames: 0,
            steps: 0,
            busy: Duration::ZERO,
        }
    }

    /// One rendered frame and how long it took to build.
    pub(crate) fn record_frame(&mut self, frame_time: Duration) {
        self.frames = self.frames.saturating_add(1);
        self.busy = self.busy.saturating_add(frame_time);
    }

    pub(crate) fn record_step(&mut self) {
        self.steps = self.steps.saturating_add(1);
    }

    /// Closes the window once `length` has elapsed and starts a new one.
    pub(crate) fn roll(&mut self, now: Instant) -> Option<FrameStats> {
        let elapsed = now.saturating_duration_since(self.started);
        if elapsed < self.length {
            return None;
        }

        let seconds = elapsed.as_secs_f32().max(f32::EPSILON);
        let frame_time_ms = match self.frames {
            0 => 0.0,
            frames => self.busy.as_secs_f32() * 1000.0 / frames as f32,
        };
        let stats = FrameStats {
            fps: self.frames as f32 / seconds,
            steps_per_second: self.steps as f32 / seconds,
            frame_time_ms,
        };

        *self = Self::new(now, self.length);
        Some(stats)
    }
}
