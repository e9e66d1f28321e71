//! Cancellable, speed-controlled playback of step traces.
//!
//! A [`PlaybackController`] moves a cursor over a trace under user control
//! (`start`, `pause`, `reset`, `step_forward`, `step_backward`, `seek`,
//! `set_speed`). While playing, a [`Scheduler`] paces the advances; two
//! strategies are available, selected by [`SchedulerKind`]. A
//! [`PlaybackRegistry`] shared by several controllers can pause them all.
//!
//! Everything here is single-threaded: state lives in `Rc`/`Cell`/`RefCell`
//! and is driven from one thread, typically a current-thread tokio runtime
//! inside a `LocalSet`.
//!
//! # Example
//!
//! ```
//! use std::rc::Rc;
//! use algoviz_playback::{
//!     run_until_idle, PlaybackConfig, PlaybackController, PlaybackRegistry, PlaybackStatus,
//!     TokioClock,
//! };
//!
//! # tokio_test::block_on(async {
//! let config = PlaybackConfig::default().with_speed_ms(10);
//! let scheduler = config.build_scheduler(Rc::new(TokioClock::new()));
//! let registry = Rc::new(PlaybackRegistry::new());
//!
//! let controller =
//!     PlaybackController::new(vec!["a", "b", "c"], scheduler.clone(), registry, &config)?;
//! controller.start()?;
//! run_until_idle(scheduler.as_ref()).await;
//! assert_eq!(controller.status(), PlaybackStatus::Complete);
//! # Ok::<(), algoviz_playback::Error>(())
//! # }).unwrap();
//! ```

pub mod clock;
pub mod config;
pub mod controller;
pub mod error;
pub mod registry;
pub mod scheduler;

pub use clock::{Clock, ManualClock, TokioClock};
pub use config::{PlaybackConfig, DEFAULT_SPEED_MS};
pub use controller::{PlaybackController, PlaybackSnapshot, PlaybackStatus};
pub use error::{Error, Result};
pub use registry::{ControllerId, Pausable, PlaybackRegistry};
pub use scheduler::{
    run_until_idle, Callback, FrameScheduler, Scheduler, SchedulerKind, TimerHandle,
    TimerScheduler, DEFAULT_FRAME_INTERVAL,
};
