//! Session configuration.

use algoviz_playback::PlaybackConfig;
use algoviz_trace::ValidationLimits;

/// Everything a session needs to know up front.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SessionConfig {
    /// Pacing and scheduling strategy.
    pub playback: PlaybackConfig,

    /// Bounds applied to user-supplied problem instances.
    pub limits: ValidationLimits,

    /// Starting one controller pauses every other one on the session.
    pub exclusive: bool,
}

impl SessionConfig {
    #[must_use]
    pub fn with_playback(mut self, playback: PlaybackConfig) -> Self {
        self.playback = playback;
        self
    }

    #[must_use]
    pub fn with_limits(mut self, limits: ValidationLimits) -> Self {
        self.limits = limits;
        self
    }

    #[must_use]
    pub fn with_exclusive(mut self, exclusive: bool) -> Self {
        self.exclusive = exclusive;
        self
    }
}
