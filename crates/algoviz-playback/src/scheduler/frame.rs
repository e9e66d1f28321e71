//! Frame-driven scheduling.

use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

use tracing::trace;

use super::{Callback, Queue, Scheduler, TimerHandle};
use crate::clock::Clock;

/// Default frame interval, roughly 60 frames per second.
pub const DEFAULT_FRAME_INTERVAL: Duration = Duration::from_millis(16);

/// Looks at pending callbacks once per frame.
///
/// On every frame each callback's elapsed time is recomputed from the clock.
/// Callbacks whose delay has passed run; the rest are re-queued for the next
/// frame. A callback therefore runs on the first frame at or after its due
/// time, never between frames.
pub struct FrameScheduler {
    clock: Rc<dyn Clock>,
    interval: Duration,
    next_frame: Cell<Duration>,
    queue: Queue,
}

impl FrameScheduler {
    pub fn new(clock: Rc<dyn Clock>, interval: Duration) -> Self {
        let interval = if interval.is_zero() {
            DEFAULT_FRAME_INTERVAL
        } else {
            interval
        };
        Self {
            next_frame: Cell::new(clock.now() + interval),
            clock,
            interval,
            queue: Queue::default(),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }
}

impl Scheduler for FrameScheduler {
    fn schedule_after(&self, delay: Duration, callback: Callback) -> TimerHandle {
        let now = self.clock.now();
        if self.queue.is_empty() {
            // Idle: the next paint is one interval away
            self.next_frame.set(now + self.interval);
        }
        self.queue.push(now, delay, callback)
    }

    fn cancel(&self, handle: TimerHandle) -> bool {
        self.queue.take(handle).is_some()
    }

    fn tick(&self) -> usize {
        let now = self.clock.now();
        if now < self.next_frame.get() {
            return 0;
        }
        self.next_frame.set(now + self.interval);

        let mut fired = 0;
        for (handle, elapsed, delay) in self.queue.elapsed(now) {
            if elapsed >= delay {
                if self.queue.fire(handle) {
                    fired += 1;
                }
            } else {
                trace!(%handle, ?elapsed, ?delay, "Not due yet, requeued for next frame");
            }
        }
        fired
    }

    fn next_wakeup(&self) -> Option<Duration> {
        if self.queue.is_empty() {
            None
        } else {
            Some(self.next_frame.get())
        }
    }

    fn pending(&self) -> usize {
        self.queue.len()
    }

    fn now(&self) -> Duration {
        self.clock.now()
    }
}
