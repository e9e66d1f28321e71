//! Playback controls for step traces.
//!
//! A [`PlaybackController`] walks a cursor over an immutable sequence of
//! steps. While playing, each scheduler callback moves the cursor forward by
//! one; at most one callback is outstanding at any time, and pausing,
//! resetting or dropping the controller cancels it synchronously.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::rc::{Rc, Weak};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, watch};
use tracing::{debug, trace, warn};

use crate::config::PlaybackConfig;
use crate::error::{panic_message, Error, Result};
use crate::registry::{ControllerId, Pausable, PlaybackRegistry};
use crate::scheduler::{Scheduler, TimerHandle};

/// Buffered consumer failures per error subscriber.
const ERROR_CAPACITY: usize = 16;

/// Current state of playback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaybackStatus {
    /// At the first step, never started or reset
    Idle,
    /// The scheduler is advancing the cursor
    Playing,
    /// Cursor frozen, no callback outstanding
    Paused,
    /// Cursor at the last step
    Complete,
}

impl fmt::Display for PlaybackStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PlaybackStatus::Idle => "idle",
            PlaybackStatus::Playing => "playing",
            PlaybackStatus::Paused => "paused",
            PlaybackStatus::Complete => "complete",
        };
        f.write_str(name)
    }
}

/// Playback state for observers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaybackSnapshot {
    pub cursor: usize,
    pub len: usize,
    pub status: PlaybackStatus,
    pub speed_ms: u64,
}

impl PlaybackSnapshot {
    /// Fraction of the trace shown so far (0.0 - 1.0).
    pub fn progress(&self) -> f64 {
        if self.len <= 1 {
            if self.status == PlaybackStatus::Complete {
                1.0
            } else {
                0.0
            }
        } else {
            self.cursor as f64 / (self.len - 1) as f64
        }
    }
}

type Consumer<S> = Box<dyn FnMut(usize, &S) -> anyhow::Result<()>>;

struct Inner<S> {
    id: ControllerId,
    steps: RefCell<Rc<[S]>>,
    cursor: Cell<usize>,
    status: Cell<PlaybackStatus>,
    speed_ms: Cell<u64>,
    handle: Cell<Option<TimerHandle>>,
    scheduler: Rc<dyn Scheduler>,
    registry: Rc<PlaybackRegistry>,
    consumer: RefCell<Option<Consumer<S>>>,
    snapshots: watch::Sender<PlaybackSnapshot>,
    errors: broadcast::Sender<Error>,
    this: Weak<Inner<S>>,
}

impl<S: 'static> Inner<S> {
    fn len(&self) -> usize {
        self.steps.borrow().len()
    }

    fn snapshot(&self) -> PlaybackSnapshot {
        PlaybackSnapshot {
            cursor: self.cursor.get(),
            len: self.len(),
            status: self.status.get(),
            speed_ms: self.speed_ms.get(),
        }
    }

    fn publish(&self) {
        self.snapshots.send_replace(self.snapshot());
    }

    fn ensure_not_playing(&self, action: &'static str) -> Result<()> {
        match self.status.get() {
            PlaybackStatus::Playing => Err(Error::InvalidState {
                action,
                status: PlaybackStatus::Playing,
            }),
            _ => Ok(()),
        }
    }

    fn cancel_pending(&self) {
        if let Some(handle) = self.handle.take() {
            self.scheduler.cancel(handle);
            trace!(id = %self.id, %handle, "Cancelled pending advance");
        }
    }

    fn schedule_next(&self) {
        self.cancel_pending();
        let this = self.this.clone();
        let delay = Duration::from_millis(self.speed_ms.get());
        let handle = self.scheduler.schedule_after(
            delay,
            Box::new(move || match this.upgrade() {
                Some(inner) => inner.advance(),
                None => Ok(()),
            }),
        );
        self.handle.set(Some(handle));
    }

    /// Hand step `index` to the consumer, if there is one.
    fn deliver(&self, index: usize) -> Result<()> {
        let steps = self.steps.borrow().clone();
        // A consumer that moves the cursor itself does not see its own move
        let Ok(mut consumer) = self.consumer.try_borrow_mut() else {
            return Ok(());
        };
        let Some(consumer) = consumer.as_mut() else {
            return Ok(());
        };
        // A panicking consumer is treated like a failing one
        match catch_unwind(AssertUnwindSafe(|| consumer(index, &steps[index]))) {
            Ok(Ok(())) => Ok(()),
            Ok(Err(err)) => Err(Error::Callback {
                cursor: index,
                message: format!("{:#}", err),
            }),
            Err(payload) => Err(Error::Callback {
                cursor: index,
                message: format!("consumer panicked: {}", panic_message(payload.as_ref())),
            }),
        }
    }

    fn report(&self, err: &Error) {
        // No subscribers is fine
        let _ = self.errors.send(err.clone());
    }

    /// Move the cursor outside of playback, rolling back if delivery fails.
    fn move_to(&self, index: usize, status: PlaybackStatus) -> Result<()> {
        let previous = (self.cursor.get(), self.status.get());
        self.cursor.set(index);
        self.status.set(status);

        if let Err(err) = self.deliver(index) {
            self.cursor.set(previous.0);
            self.status.set(previous.1);
            warn!(id = %self.id, error = %err, "Step consumer failed");
            self.report(&err);
            self.publish();
            return Err(err);
        }
        self.publish();
        Ok(())
    }

    /// One scheduler tick while playing.
    fn advance(&self) -> anyhow::Result<()> {
        self.handle.set(None);
        if self.status.get() != PlaybackStatus::Playing {
            return Ok(());
        }

        let len = self.len();
        let previous = self.cursor.get();
        let next = previous + 1;
        if next >= len {
            self.status.set(PlaybackStatus::Complete);
            self.publish();
            return Ok(());
        }

        self.cursor.set(next);
        if let Err(err) = self.deliver(next) {
            self.cursor.set(previous);
            self.status.set(PlaybackStatus::Paused);
            self.report(&err);
            self.publish();
            return Err(err.into());
        }
        trace!(id = %self.id, cursor = next, len, "Advanced");

        // The consumer may have paused, reset or reloaded us
        if self.status.get() == PlaybackStatus::Playing && self.cursor.get() == next {
            if next == len - 1 {
                self.status.set(PlaybackStatus::Complete);
                debug!(id = %self.id, len, "Playback complete");
            } else {
                self.schedule_next();
            }
        }
        self.publish();
        Ok(())
    }

    fn halt(&self, status: PlaybackStatus) {
        self.cancel_pending();
        self.status.set(status);
        self.publish();
    }
}

impl<S: 'static> Pausable for Inner<S> {
    fn pause_playback(&self) -> bool {
        if self.status.get() == PlaybackStatus::Playing {
            self.halt(PlaybackStatus::Paused);
            debug!(id = %self.id, cursor = self.cursor.get(), "Paused by registry");
            true
        } else {
            false
        }
    }

    fn is_playing(&self) -> bool {
        self.status.get() == PlaybackStatus::Playing
    }
}

/// Playback controller for a step trace.
///
/// Single-threaded: the controller, its scheduler and its registry live on
/// one thread (a current-thread runtime with a `LocalSet` in production).
pub struct PlaybackController<S: 'static> {
    inner: Rc<Inner<S>>,
}

impl<S: 'static> PlaybackController<S> {
    /// Create a controller over `steps` and register it with `registry`.
    pub fn new(
        steps: impl Into<Rc<[S]>>,
        scheduler: Rc<dyn Scheduler>,
        registry: Rc<PlaybackRegistry>,
        config: &PlaybackConfig,
    ) -> Result<Self> {
        let steps = steps.into();
        if steps.is_empty() {
            return Err(Error::EmptyTrace);
        }
        if config.speed_ms == 0 {
            return Err(Error::InvalidSpeed(config.speed_ms));
        }

        let id = registry.allocate_id();
        let (snapshots, _) = watch::channel(PlaybackSnapshot {
            cursor: 0,
            len: steps.len(),
            status: PlaybackStatus::Idle,
            speed_ms: config.speed_ms,
        });
        let (errors, _) = broadcast::channel(ERROR_CAPACITY);
        let len = steps.len();

        let inner = Rc::new_cyclic(|this| Inner {
            id,
            steps: RefCell::new(steps),
            cursor: Cell::new(0),
            status: Cell::new(PlaybackStatus::Idle),
            speed_ms: Cell::new(config.speed_ms),
            handle: Cell::new(None),
            scheduler,
            registry: registry.clone(),
            consumer: RefCell::new(None),
            snapshots,
            errors,
            this: this.clone(),
        });
        let weak: Weak<dyn Pausable> = Rc::downgrade(&inner) as Weak<dyn Pausable>;
        registry.register(id, weak);
        debug!(%id, len, speed_ms = config.speed_ms, "Created playback controller");

        Ok(Self { inner })
    }

    pub fn id(&self) -> ControllerId {
        self.inner.id
    }

    /// Get the current cursor position.
    pub fn cursor(&self) -> usize {
        self.inner.cursor.get()
    }

    /// Get the total number of steps.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Always `false`: a controller never holds an empty trace.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Get the current playback status.
    pub fn status(&self) -> PlaybackStatus {
        self.inner.status.get()
    }

    pub fn is_playing(&self) -> bool {
        self.status() == PlaybackStatus::Playing
    }

    /// Get the delay between two advances.
    pub fn speed_ms(&self) -> u64 {
        self.inner.speed_ms.get()
    }

    pub fn snapshot(&self) -> PlaybackSnapshot {
        self.inner.snapshot()
    }

    /// Calculate progress as a fraction (0.0 - 1.0).
    pub fn progress(&self) -> f64 {
        self.snapshot().progress()
    }

    /// The whole trace.
    pub fn steps(&self) -> Rc<[S]> {
        self.inner.steps.borrow().clone()
    }

    /// Get the step under the cursor.
    pub fn current_step(&self) -> S
    where
        S: Clone,
    {
        self.inner.steps.borrow()[self.cursor()].clone()
    }

    /// Watch every state change.
    pub fn subscribe(&self) -> watch::Receiver<PlaybackSnapshot> {
        self.inner.snapshots.subscribe()
    }

    /// Receive consumer failures.
    pub fn errors(&self) -> broadcast::Receiver<Error> {
        self.inner.errors.subscribe()
    }

    /// Install the consumer that receives each delivered step.
    ///
    /// Must not be called from inside the consumer itself.
    pub fn on_step(&self, consumer: impl FnMut(usize, &S) -> anyhow::Result<()> + 'static) {
        *self.inner.consumer.borrow_mut() = Some(Box::new(consumer));
    }

    /// Start playback. From `Complete`, the cursor goes back to 0 first.
    pub fn start(&self) -> Result<()> {
        let inner = &self.inner;
        let status = inner.status.get();
        if status == PlaybackStatus::Playing {
            return Err(Error::InvalidState {
                action: "start",
                status,
            });
        }

        inner.registry.before_start(inner.id);
        if status == PlaybackStatus::Complete {
            inner.move_to(0, PlaybackStatus::Paused)?;
        }

        if inner.cursor.get() + 1 >= inner.len() {
            inner.halt(PlaybackStatus::Complete);
            return Ok(());
        }

        inner.status.set(PlaybackStatus::Playing);
        inner.schedule_next();
        debug!(
            id = %inner.id,
            cursor = inner.cursor.get(),
            speed_ms = inner.speed_ms.get(),
            "Playback started"
        );
        inner.publish();
        Ok(())
    }

    /// Pause playback, cancelling the pending advance.
    pub fn pause(&self) -> Result<()> {
        let status = self.status();
        if status != PlaybackStatus::Playing {
            return Err(Error::InvalidState {
                action: "pause",
                status,
            });
        }
        self.inner.halt(PlaybackStatus::Paused);
        debug!(id = %self.inner.id, cursor = self.cursor(), "Playback paused");
        Ok(())
    }

    /// Stop playback and return to the first step.
    ///
    /// Always succeeds; a consumer failure is only reported.
    pub fn reset(&self) {
        let inner = &self.inner;
        inner.cancel_pending();
        inner.cursor.set(0);
        inner.status.set(PlaybackStatus::Idle);
        inner.publish();
        if let Err(err) = inner.deliver(0) {
            warn!(id = %inner.id, error = %err, "Step consumer failed on reset");
            inner.report(&err);
        }
        debug!(id = %inner.id, "Playback reset");
    }

    /// Step forward one step. Reaching the last step completes playback.
    pub fn step_forward(&self) -> Result<usize> {
        let inner = &self.inner;
        inner.ensure_not_playing("step forward")?;
        let last = inner.len() - 1;
        let cursor = inner.cursor.get();
        if cursor >= last {
            return Ok(cursor);
        }
        let next = cursor + 1;
        let status = if next == last {
            PlaybackStatus::Complete
        } else {
            PlaybackStatus::Paused
        };
        inner.move_to(next, status)?;
        Ok(next)
    }

    /// Step backward one step.
    pub fn step_backward(&self) -> Result<usize> {
        let inner = &self.inner;
        inner.ensure_not_playing("step backward")?;
        let cursor = inner.cursor.get();
        if cursor == 0 {
            return Ok(0);
        }
        inner.move_to(cursor - 1, PlaybackStatus::Paused)?;
        Ok(cursor - 1)
    }

    /// Jump to `index`, clamped to the last step.
    pub fn seek(&self, index: usize) -> Result<usize> {
        let inner = &self.inner;
        inner.ensure_not_playing("seek")?;
        let last = inner.len() - 1;
        let target = index.min(last);
        if target == inner.cursor.get() {
            return Ok(target);
        }
        let status = if target == last {
            PlaybackStatus::Complete
        } else {
            PlaybackStatus::Paused
        };
        inner.move_to(target, status)?;
        Ok(target)
    }

    /// Set the delay used from the next scheduled advance on.
    pub fn set_speed(&self, speed_ms: u64) -> Result<()> {
        if speed_ms == 0 {
            return Err(Error::InvalidSpeed(speed_ms));
        }
        self.inner.speed_ms.set(speed_ms);
        self.inner.publish();
        debug!(id = %self.inner.id, speed_ms, "Playback speed changed");
        Ok(())
    }

    /// Replace the trace. Playback stops and returns to `Idle`.
    pub fn load(&self, steps: impl Into<Rc<[S]>>) -> Result<()> {
        let steps = steps.into();
        if steps.is_empty() {
            return Err(Error::EmptyTrace);
        }
        let inner = &self.inner;
        inner.cancel_pending();
        let len = steps.len();
        *inner.steps.borrow_mut() = steps;
        debug!(id = %inner.id, len, "Loaded new trace");
        self.reset();
        Ok(())
    }
}

impl<S: 'static> Drop for PlaybackController<S> {
    fn drop(&mut self) {
        self.inner.cancel_pending();
        self.inner.registry.unregister(self.inner.id);
    }
}

impl<S: 'static> From<&PlaybackController<S>> for PlaybackSnapshot {
    fn from(controller: &PlaybackController<S>) -> Self {
        controller.snapshot()
    }
}

impl<S: 'static> fmt::Debug for PlaybackController<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlaybackController")
            .field("id", &self.inner.id)
            .field("snapshot", &self.snapshot())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::{Clock, ManualClock};
    use crate::scheduler::TimerScheduler;

    struct Rig {
        clock: Rc<ManualClock>,
        scheduler: Rc<dyn Scheduler>,
        registry: Rc<PlaybackRegistry>,
    }

    impl Rig {
        fn new() -> Self {
            let clock = Rc::new(ManualClock::new());
            let scheduler: Rc<dyn Scheduler> = Rc::new(TimerScheduler::new(clock.clone()));
            Self {
                clock,
                scheduler,
                registry: Rc::new(PlaybackRegistry::new()),
            }
        }

        fn controller(&self, len: usize, speed_ms: u64) -> PlaybackController<usize> {
            PlaybackController::new(
                (0..len).collect::<Vec<_>>(),
                self.scheduler.clone(),
                self.registry.clone(),
                &PlaybackConfig::default().with_speed_ms(speed_ms),
            )
            .unwrap()
        }

        /// Jump from wakeup to wakeup until the scheduler is idle.
        fn run(&self) {
            while let Some(at) = self.scheduler.next_wakeup() {
                self.clock.set(at);
                self.scheduler.tick();
            }
        }
    }

    fn recorder(controller: &PlaybackController<usize>) -> Rc<RefCell<Vec<usize>>> {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let log = seen.clone();
        controller.on_step(move |index, step| {
            assert_eq!(index, *step);
            log.borrow_mut().push(index);
            Ok(())
        });
        seen
    }

    #[test]
    fn playback_starts_idle_at_zero() {
        let rig = Rig::new();
        let c = rig.controller(5, 100);
        assert_eq!(c.cursor(), 0);
        assert_eq!(c.status(), PlaybackStatus::Idle);
        assert_eq!(c.current_step(), 0);
        assert_eq!(c.progress(), 0.0);
    }

    #[test]
    fn plays_every_step_in_order() {
        let rig = Rig::new();
        let c = rig.controller(5, 100);
        let seen = recorder(&c);

        c.start().unwrap();
        assert_eq!(c.status(), PlaybackStatus::Playing);
        assert_eq!(rig.scheduler.pending(), 1);
        rig.run();

        assert_eq!(*seen.borrow(), vec![1, 2, 3, 4]);
        assert_eq!(c.status(), PlaybackStatus::Complete);
        assert_eq!(c.cursor(), 4);
        assert_eq!(c.progress(), 1.0);
        assert_eq!(rig.clock.now(), Duration::from_millis(400));
        assert_eq!(rig.scheduler.pending(), 0);
    }

    #[test]
    fn pause_cancels_the_pending_advance() {
        let rig = Rig::new();
        let c = rig.controller(5, 100);
        c.start().unwrap();
        rig.clock.set(Duration::from_millis(100));
        rig.scheduler.tick();
        assert_eq!(c.cursor(), 1);

        c.pause().unwrap();
        assert_eq!(rig.scheduler.pending(), 0);
        rig.clock.set(Duration::from_secs(10));
        rig.scheduler.tick();
        assert_eq!(c.cursor(), 1);
        assert_eq!(c.status(), PlaybackStatus::Paused);

        assert_eq!(
            c.pause(),
            Err(Error::InvalidState {
                action: "pause",
                status: PlaybackStatus::Paused
            })
        );
    }

    #[test]
    fn reset_returns_to_idle() {
        let rig = Rig::new();
        let c = rig.controller(5, 100);
        c.start().unwrap();
        rig.clock.set(Duration::from_millis(200));
        rig.scheduler.tick();

        c.reset();
        assert_eq!(c.cursor(), 0);
        assert_eq!(c.status(), PlaybackStatus::Idle);
        assert_eq!(rig.scheduler.pending(), 0);
    }

    #[test]
    fn start_from_complete_rewinds() {
        let rig = Rig::new();
        let c = rig.controller(3, 50);
        c.start().unwrap();
        rig.run();
        assert_eq!(c.status(), PlaybackStatus::Complete);

        let seen = recorder(&c);
        c.start().unwrap();
        assert_eq!(c.cursor(), 0);
        rig.run();
        assert_eq!(*seen.borrow(), vec![0, 1, 2]);
    }

    #[test]
    fn single_step_trace_completes_immediately() {
        let rig = Rig::new();
        let c = rig.controller(1, 50);
        c.start().unwrap();
        assert_eq!(c.status(), PlaybackStatus::Complete);
        assert_eq!(rig.scheduler.pending(), 0);
        assert_eq!(c.progress(), 1.0);
    }

    #[test]
    fn manual_steps_clamp_and_track_completion() {
        let rig = Rig::new();
        let c = rig.controller(3, 100);

        assert_eq!(c.step_backward(), Ok(0));
        assert_eq!(c.step_forward(), Ok(1));
        assert_eq!(c.status(), PlaybackStatus::Paused);
        assert_eq!(c.step_forward(), Ok(2));
        assert_eq!(c.status(), PlaybackStatus::Complete);
        assert_eq!(c.step_forward(), Ok(2));
        assert_eq!(c.step_backward(), Ok(1));
        assert_eq!(c.status(), PlaybackStatus::Paused);

        c.start().unwrap();
        assert!(matches!(
            c.step_forward(),
            Err(Error::InvalidState { action: "step forward", .. })
        ));
        assert!(c.seek(0).is_err());
    }

    #[test]
    fn seek_clamps_to_bounds() {
        let rig = Rig::new();
        let c = rig.controller(10, 100);
        assert_eq!(c.seek(5), Ok(5));
        assert_eq!(c.status(), PlaybackStatus::Paused);
        assert_eq!(c.seek(100), Ok(9));
        assert_eq!(c.status(), PlaybackStatus::Complete);
        assert_eq!(c.seek(0), Ok(0));
        assert_eq!(c.status(), PlaybackStatus::Paused);
    }

    #[test]
    fn speed_change_applies_to_the_next_advance() {
        let rig = Rig::new();
        let c = rig.controller(5, 100);
        c.start().unwrap();
        c.set_speed(300).unwrap();
        assert_eq!(rig.scheduler.next_wakeup(), Some(Duration::from_millis(100)));

        rig.clock.set(Duration::from_millis(100));
        rig.scheduler.tick();
        assert_eq!(rig.scheduler.next_wakeup(), Some(Duration::from_millis(400)));

        assert_eq!(c.set_speed(0), Err(Error::InvalidSpeed(0)));
        assert_eq!(c.speed_ms(), 300);
    }

    #[test]
    fn consumer_failure_pauses_and_reports() {
        let rig = Rig::new();
        let c = rig.controller(5, 100);
        let mut errors = c.errors();
        c.on_step(|index, _| {
            if index == 2 {
                anyhow::bail!("renderer lost its canvas");
            }
            Ok(())
        });

        c.start().unwrap();
        rig.run();

        assert_eq!(c.status(), PlaybackStatus::Paused);
        assert_eq!(c.cursor(), 1);
        assert_eq!(rig.scheduler.pending(), 0);
        match errors.try_recv() {
            Ok(Error::Callback { cursor, message }) => {
                assert_eq!(cursor, 2);
                assert!(message.contains("canvas"));
            }
            other => panic!("expected callback error, got {:?}", other),
        }
    }

    #[test]
    fn panicking_consumer_pauses_without_unwinding_the_scheduler() {
        let rig = Rig::new();
        let c = rig.controller(5, 100);
        let mut errors = c.errors();
        c.on_step(|index, _| {
            if index == 3 {
                panic!("index out of bounds in renderer");
            }
            Ok(())
        });

        c.start().unwrap();
        rig.run();

        assert_eq!(c.status(), PlaybackStatus::Paused);
        assert_eq!(c.cursor(), 2);
        match errors.try_recv() {
            Ok(Error::Callback { cursor, message }) => {
                assert_eq!(cursor, 3);
                assert!(message.contains("panicked"));
                assert!(message.contains("renderer"));
            }
            other => panic!("expected callback error, got {:?}", other),
        }

        // The consumer and scheduler are still usable afterwards
        c.on_step(|_, _| Ok(()));
        c.start().unwrap();
        rig.run();
        assert_eq!(c.status(), PlaybackStatus::Complete);
        assert_eq!(c.cursor(), 4);
    }

    #[test]
    fn failed_manual_step_rolls_back() {
        let rig = Rig::new();
        let c = rig.controller(3, 100);
        c.on_step(|_, _| anyhow::bail!("nope"));
        assert!(matches!(c.step_forward(), Err(Error::Callback { cursor: 1, .. })));
        assert_eq!(c.cursor(), 0);
        assert_eq!(c.status(), PlaybackStatus::Idle);
    }

    #[test]
    fn consumer_can_pause_from_inside() {
        let rig = Rig::new();
        let c = Rc::new(rig.controller(5, 100));
        let weak = Rc::downgrade(&c);
        c.on_step(move |index, _| {
            if index == 2 {
                if let Some(c) = weak.upgrade() {
                    c.pause()?;
                }
            }
            Ok(())
        });

        c.start().unwrap();
        rig.run();
        assert_eq!(c.cursor(), 2);
        assert_eq!(c.status(), PlaybackStatus::Paused);
    }

    #[test]
    fn subscribers_see_state_changes() {
        let rig = Rig::new();
        let c = rig.controller(3, 100);
        let mut rx = c.subscribe();
        assert_eq!(rx.borrow_and_update().status, PlaybackStatus::Idle);

        c.start().unwrap();
        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().status, PlaybackStatus::Playing);

        rig.run();
        let last = *rx.borrow_and_update();
        assert_eq!(
            last,
            PlaybackSnapshot {
                cursor: 2,
                len: 3,
                status: PlaybackStatus::Complete,
                speed_ms: 100
            }
        );
    }

    #[test]
    fn load_replaces_the_trace() {
        let rig = Rig::new();
        let c = rig.controller(3, 100);
        c.start().unwrap();
        c.load(vec![10, 11, 12, 13, 14, 15]).unwrap();
        assert_eq!(c.len(), 6);
        assert_eq!(c.status(), PlaybackStatus::Idle);
        assert_eq!(c.current_step(), 10);
        assert_eq!(rig.scheduler.pending(), 0);

        assert_eq!(c.load(Vec::new()), Err(Error::EmptyTrace));
    }

    #[test]
    fn empty_trace_and_zero_speed_are_rejected() {
        let rig = Rig::new();
        let empty = PlaybackController::<u8>::new(
            Vec::new(),
            rig.scheduler.clone(),
            rig.registry.clone(),
            &PlaybackConfig::default(),
        );
        assert!(matches!(empty, Err(Error::EmptyTrace)));

        let stalled = PlaybackController::new(
            vec![1u8],
            rig.scheduler.clone(),
            rig.registry.clone(),
            &PlaybackConfig::default().with_speed_ms(0),
        );
        assert!(matches!(stalled, Err(Error::InvalidSpeed(0))));
        assert!(rig.registry.is_empty());
    }

    #[test]
    fn drop_unregisters_and_cancels() {
        let rig = Rig::new();
        let c = rig.controller(5, 100);
        let id = c.id();
        c.start().unwrap();
        assert!(rig.registry.contains(id));

        drop(c);
        assert!(!rig.registry.contains(id));
        assert_eq!(rig.scheduler.pending(), 0);
    }

    #[test]
    fn exclusive_registry_allows_one_player() {
        let rig = Rig::new();
        rig.registry.set_exclusive(true);
        let a = rig.controller(5, 100);
        let b = rig.controller(5, 100);

        a.start().unwrap();
        b.start().unwrap();
        assert_eq!(a.status(), PlaybackStatus::Paused);
        assert_eq!(b.status(), PlaybackStatus::Playing);
        assert_eq!(rig.scheduler.pending(), 1);

        assert_eq!(rig.registry.pause_all(), 1);
        assert!(!b.is_playing());
    }
}
