//! Error types for algoviz-vis.

use algoviz_trace::ValidationError;
use thiserror::Error;

/// Result type for session operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by a playback session.
#[derive(Debug, Error)]
pub enum Error {
    /// The requested problem could not be turned into a trace.
    #[error(transparent)]
    Trace(#[from] algoviz_trace::Error),

    /// The controller refused the command.
    #[error(transparent)]
    Playback(#[from] algoviz_playback::Error),

    /// The session thread or its runtime could not be started.
    #[error("failed to start session: {0}")]
    Io(#[from] std::io::Error),

    /// The session thread is gone.
    #[error("playback session has shut down")]
    Closed,
}

impl From<ValidationError> for Error {
    fn from(e: ValidationError) -> Self {
        Error::Trace(e.into())
    }
}
