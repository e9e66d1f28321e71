//! Error types for algoviz-playback.

use std::any::Any;

use thiserror::Error;

use crate::controller::PlaybackStatus;

/// Result type for playback operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by a playback controller.
///
/// `Clone` so a failure can be fanned out to every error subscriber.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// A controller needs at least one step to show.
    #[error("cannot play an empty trace")]
    EmptyTrace,

    /// Speeds are milliseconds per step and must be positive.
    #[error("invalid speed {0} ms: must be greater than zero")]
    InvalidSpeed(u64),

    /// The operation is not allowed in the current status.
    #[error("cannot {action} while {status}")]
    InvalidState {
        action: &'static str,
        status: PlaybackStatus,
    },

    /// The step consumer failed; playback was paused.
    #[error("step consumer failed at step {cursor}: {message}")]
    Callback { cursor: usize, message: String },
}

/// Text of a caught panic payload.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "panicked".to_string()
    }
}
