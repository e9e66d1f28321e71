//! Playback configuration.

use std::rc::Rc;
use std::time::Duration;

use crate::clock::Clock;
use crate::scheduler::{Scheduler, SchedulerKind, DEFAULT_FRAME_INTERVAL};

/// Default delay between two steps.
pub const DEFAULT_SPEED_MS: u64 = 500;

/// How a controller paces itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaybackConfig {
    /// Milliseconds between two advances while playing. Must be positive.
    pub speed_ms: u64,

    /// Scheduling strategy for the advances.
    pub scheduler: SchedulerKind,

    /// Frame length for [`SchedulerKind::Frame`].
    pub frame_interval: Duration,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            speed_ms: DEFAULT_SPEED_MS,
            scheduler: SchedulerKind::Timer,
            frame_interval: DEFAULT_FRAME_INTERVAL,
        }
    }
}

impl PlaybackConfig {
    #[must_use]
    pub fn with_speed_ms(mut self, speed_ms: u64) -> Self {
        self.speed_ms = speed_ms;
        self
    }

    #[must_use]
    pub fn with_scheduler(mut self, scheduler: SchedulerKind) -> Self {
        self.scheduler = scheduler;
        self
    }

    #[must_use]
    pub fn with_frame_interval(mut self, interval: Duration) -> Self {
        self.frame_interval = interval;
        self
    }

    /// Build the configured scheduler on `clock`.
    pub fn build_scheduler(&self, clock: Rc<dyn Clock>) -> Rc<dyn Scheduler> {
        self.scheduler.build(clock, self.frame_interval)
    }
}
