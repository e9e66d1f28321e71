//! Delayed callbacks behind one interface.
//!
//! Two strategies share the [`Scheduler`] trait:
//!
//! - [`TimerScheduler`] fires each callback once its delay has elapsed.
//! - [`FrameScheduler`] only looks at its queue on frame ticks. Each frame it
//!   re-derives the elapsed time of every pending callback and re-queues the
//!   ones that are not due yet.
//!
//! Both are single-threaded and driven by [`Scheduler::tick`]; in production
//! [`run_until_idle`] (or an actor loop) sleeps on tokio until
//! [`Scheduler::next_wakeup`]. A cancelled handle never fires, even if its
//! callback was already due in the tick that is running. A callback that
//! returns an error or panics is logged and dropped; it never unwinds into
//! the loop.

mod frame;
mod timer;

pub use frame::{FrameScheduler, DEFAULT_FRAME_INTERVAL};
pub use timer::TimerScheduler;

use std::cell::{Cell, RefCell};
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::rc::Rc;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{trace, warn};

use crate::clock::Clock;
use crate::error::panic_message;

/// Work to run once a delay has passed.
pub type Callback = Box<dyn FnOnce() -> anyhow::Result<()>>;

/// Identifies one scheduled callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerHandle(u64);

impl fmt::Display for TimerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

pub trait Scheduler {
    /// Run `callback` once `delay` has passed.
    fn schedule_after(&self, delay: Duration, callback: Callback) -> TimerHandle;

    /// Drop a pending callback. Returns `false` if it already ran or was
    /// cancelled before.
    fn cancel(&self, handle: TimerHandle) -> bool;

    /// Run every callback that is due now. Returns how many ran.
    fn tick(&self) -> usize;

    /// Earliest time at which [`tick`](Self::tick) has work to do.
    fn next_wakeup(&self) -> Option<Duration>;

    /// Number of callbacks waiting to run.
    fn pending(&self) -> usize;

    /// Current time on this scheduler's clock.
    fn now(&self) -> Duration;

    /// How long to sleep before the next tick, if anything is pending.
    fn time_to_wakeup(&self) -> Option<Duration> {
        let now = self.now();
        self.next_wakeup().map(|at| at.saturating_sub(now))
    }
}

/// Which scheduling strategy to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchedulerKind {
    #[default]
    Timer,
    Frame,
}

impl SchedulerKind {
    /// Build a scheduler of this kind on `clock`.
    ///
    /// `frame_interval` is only used by the frame strategy.
    pub fn build(self, clock: Rc<dyn Clock>, frame_interval: Duration) -> Rc<dyn Scheduler> {
        match self {
            SchedulerKind::Timer => Rc::new(TimerScheduler::new(clock)),
            SchedulerKind::Frame => Rc::new(FrameScheduler::new(clock, frame_interval)),
        }
    }
}

impl fmt::Display for SchedulerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchedulerKind::Timer => f.write_str("timer"),
            SchedulerKind::Frame => f.write_str("frame"),
        }
    }
}

impl FromStr for SchedulerKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "timer" => Ok(SchedulerKind::Timer),
            "frame" => Ok(SchedulerKind::Frame),
            other => Err(format!("unknown scheduler '{}', expected timer or frame", other)),
        }
    }
}

struct Pending {
    handle: TimerHandle,
    scheduled_at: Duration,
    delay: Duration,
    callback: Callback,
}

impl Pending {
    fn due_at(&self) -> Duration {
        self.scheduled_at + self.delay
    }
}

/// Pending callbacks shared by both strategies.
///
/// Callbacks are taken out one at a time while firing, so a callback may
/// schedule or cancel others without hitting a `RefCell` borrow.
#[derive(Default)]
struct Queue {
    next_id: Cell<u64>,
    entries: RefCell<Vec<Pending>>,
}

impl Queue {
    fn push(&self, now: Duration, delay: Duration, callback: Callback) -> TimerHandle {
        let id = self.next_id.get() + 1;
        self.next_id.set(id);
        let handle = TimerHandle(id);
        self.entries.borrow_mut().push(Pending {
            handle,
            scheduled_at: now,
            delay,
            callback,
        });
        handle
    }

    fn take(&self, handle: TimerHandle) -> Option<Callback> {
        let mut entries = self.entries.borrow_mut();
        let pos = entries.iter().position(|p| p.handle == handle)?;
        Some(entries.remove(pos).callback)
    }

    fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    fn earliest_due(&self) -> Option<Duration> {
        self.entries.borrow().iter().map(Pending::due_at).min()
    }

    /// `(handle, elapsed, delay)` for every pending callback, oldest first.
    fn elapsed(&self, now: Duration) -> Vec<(TimerHandle, Duration, Duration)> {
        let mut out: Vec<_> = self
            .entries
            .borrow()
            .iter()
            .map(|p| (p.handle, now.saturating_sub(p.scheduled_at), p.delay))
            .collect();
        out.sort_by_key(|&(handle, _, _)| handle);
        out
    }

    /// Handles whose delay has passed, in due order.
    fn due(&self, now: Duration) -> Vec<TimerHandle> {
        let mut due: Vec<_> = self
            .entries
            .borrow()
            .iter()
            .filter(|p| p.due_at() <= now)
            .map(|p| (p.due_at(), p.handle))
            .collect();
        due.sort();
        due.into_iter().map(|(_, handle)| handle).collect()
    }

    /// Run `handle` if it is still pending.
    fn fire(&self, handle: TimerHandle) -> bool {
        let Some(callback) = self.take(handle) else {
            trace!(%handle, "Skipping cancelled callback");
            return false;
        };
        match catch_unwind(AssertUnwindSafe(callback)) {
            Ok(Ok(())) => {}
            Ok(Err(err)) => {
                warn!(%handle, error = %format!("{:#}", err), "Scheduled callback failed");
            }
            Err(payload) => {
                warn!(%handle, panic = %panic_message(payload.as_ref()), "Scheduled callback panicked");
            }
        }
        true
    }
}

/// Tick `scheduler` until nothing is pending, sleeping on tokio in between.
///
/// Returns the number of callbacks that ran.
pub async fn run_until_idle(scheduler: &dyn Scheduler) -> usize {
    let mut fired = 0;
    while let Some(wait) = scheduler.time_to_wakeup() {
        if !wait.is_zero() {
            tokio::time::sleep(wait).await;
        }
        fired += scheduler.tick();
    }
    fired
}
