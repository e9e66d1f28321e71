//! One delayed callback per handle.

use std::rc::Rc;
use std::time::Duration;

use super::{Callback, Queue, Scheduler, TimerHandle};
use crate::clock::Clock;

/// Fires each callback on the first tick at or after its due time.
pub struct TimerScheduler {
    clock: Rc<dyn Clock>,
    queue: Queue,
}

impl TimerScheduler {
    pub fn new(clock: Rc<dyn Clock>) -> Self {
        Self {
            clock,
            queue: Queue::default(),
        }
    }
}

impl Scheduler for TimerScheduler {
    fn schedule_after(&self, delay: Duration, callback: Callback) -> TimerHandle {
        self.queue.push(self.clock.now(), delay, callback)
    }

    fn cancel(&self, handle: TimerHandle) -> bool {
        self.queue.take(handle).is_some()
    }

    fn tick(&self) -> usize {
        let due = self.queue.due(self.clock.now());
        due.into_iter().filter(|&handle| self.queue.fire(handle)).count()
    }

    fn next_wakeup(&self) -> Option<Duration> {
        self.queue.earliest_due()
    }

    fn pending(&self) -> usize {
        self.queue.len()
    }

    fn now(&self) -> Duration {
        self.clock.now()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use std::cell::RefCell;

    fn record(log: &Rc<RefCell<Vec<&'static str>>>, label: &'static str) -> Callback {
        let log = log.clone();
        Box::new(move || {
            log.borrow_mut().push(label);
            Ok(())
        })
    }

    #[test]
    fn fires_in_due_order_once_delay_passes() {
        let clock = Rc::new(ManualClock::new());
        let scheduler = TimerScheduler::new(clock.clone());
        let log = Rc::new(RefCell::new(Vec::new()));

        scheduler.schedule_after(Duration::from_millis(30), record(&log, "b"));
        scheduler.schedule_after(Duration::from_millis(10), record(&log, "a"));
        assert_eq!(scheduler.next_wakeup(), Some(Duration::from_millis(10)));

        clock.advance(Duration::from_millis(9));
        assert_eq!(scheduler.tick(), 0);

        clock.advance(Duration::from_millis(25));
        assert_eq!(scheduler.tick(), 2);
        assert_eq!(*log.borrow(), vec!["a", "b"]);
        assert_eq!(scheduler.pending(), 0);
    }

    #[test]
    fn callbacks_scheduled_during_a_tick_wait_for_the_next() {
        let clock = Rc::new(ManualClock::new());
        let scheduler = Rc::new(TimerScheduler::new(clock.clone()));
        let log = Rc::new(RefCell::new(Vec::new()));

        let inner = scheduler.clone();
        let again = record(&log, "second");
        let first = record(&log, "first");
        scheduler.schedule_after(
            Duration::ZERO,
            Box::new(move || {
                first()?;
                inner.schedule_after(Duration::ZERO, again);
                Ok(())
            }),
        );

        assert_eq!(scheduler.tick(), 1);
        assert_eq!(scheduler.pending(), 1);
        assert_eq!(scheduler.tick(), 1);
        assert_eq!(*log.borrow(), vec!["first", "second"]);
    }
}
