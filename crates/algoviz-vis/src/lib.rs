//! Algorithm Trace Visualization
//!
//! Serves step traces of graph and search algorithms over HTTP, with
//! playback controls and live WebSocket updates.
//!
//! # Architecture
//!
//! - **Session**: Owns the trace and its playback controller on a dedicated thread
//! - **REST API**: Load traces, control playback, read the current step
//! - **WebSocket**: Streams `{status, step}` updates and accepts commands
//!
//! # Usage
//!
//! ```no_run
//! use algoviz_trace::{presets, Algorithm};
//! use algoviz_vis::{SessionConfig, SessionHandle, VisServer};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let session = SessionHandle::spawn(SessionConfig::default(), presets::demo(Algorithm::Prim))?;
//! VisServer::new(session).serve(3000).await?;
//! # Ok(())
//! # }
//! ```

mod config;
mod error;
mod server;
mod session;

pub use config::SessionConfig;
pub use error::{Error, Result};
pub use server::VisServer;
pub use session::{Control, SessionHandle, SessionState};
