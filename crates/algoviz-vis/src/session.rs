//! A playback session: one trace, one controller, one thread.
//!
//! Controllers and schedulers are single-threaded, so they live on a
//! dedicated thread running a current-thread runtime. The rest of the
//! program talks to that thread through a [`SessionHandle`], which is cheap
//! to clone and can be shared across tasks.

use std::rc::Rc;
use std::thread;

use algoviz_playback::{
    PlaybackController, PlaybackRegistry, PlaybackSnapshot, PlaybackStatus, Scheduler, TokioClock,
};
use algoviz_trace::{generate, Algorithm, Problem, Step, Trace};
use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, mpsc, oneshot, watch};
use tokio::task::LocalSet;
use tokio::time::sleep;
use tracing::{debug, error, info, trace};

use crate::config::SessionConfig;
use crate::error::{Error, Result};

/// Commands queued for the session thread before senders wait.
const COMMAND_BUFFER: usize = 64;

/// A user command for the playback controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Control {
    Play,
    Pause,
    Reset,
    StepForward,
    StepBackward,
    Speed { speed_ms: u64 },
    Seek { index: usize },
}

/// What observers see of a session.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionState {
    pub algorithm: Algorithm,
    /// Incremented each time a new trace is loaded.
    pub generation: u64,
    pub status: PlaybackSnapshot,
    pub progress: f64,
    /// The step under the cursor.
    pub step: Step,
    /// Most recent consumer failure since the trace was loaded.
    pub last_error: Option<String>,
}

impl SessionState {
    fn initial(algorithm: Algorithm, trace: &Trace, speed_ms: u64) -> Self {
        let status = PlaybackSnapshot {
            cursor: 0,
            len: trace.len(),
            status: PlaybackStatus::Idle,
            speed_ms,
        };
        Self {
            algorithm,
            generation: 0,
            status,
            progress: status.progress(),
            step: trace.initial().clone(),
            last_error: None,
        }
    }
}

enum Command {
    Load {
        problem: Problem,
        reply: oneshot::Sender<Result<SessionState>>,
    },
    Control {
        control: Control,
        reply: oneshot::Sender<Result<PlaybackSnapshot>>,
    },
}

/// Handle to a running session.
///
/// The session thread stops once every handle has been dropped.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    commands: mpsc::Sender<Command>,
    state: watch::Receiver<SessionState>,
    config: SessionConfig,
}

impl SessionHandle {
    /// Generate the trace for `problem` and start a session playing it.
    pub fn spawn(config: SessionConfig, problem: Problem) -> Result<Self> {
        if config.playback.speed_ms == 0 {
            return Err(algoviz_playback::Error::InvalidSpeed(0).into());
        }

        let algorithm = problem.algorithm();
        let trace = generate(&problem)?;
        let initial = SessionState::initial(algorithm, &trace, config.playback.speed_ms);

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        let (commands, inbox) = mpsc::channel(COMMAND_BUFFER);
        let (publisher, state) = watch::channel(initial);

        thread::Builder::new()
            .name("algoviz-session".into())
            .spawn(move || {
                let local = LocalSet::new();
                local.block_on(&runtime, async move {
                    match Session::new(config, algorithm, trace, publisher) {
                        Ok(session) => session.run(inbox).await,
                        Err(err) => error!(error = %err, "Failed to start playback session"),
                    }
                });
            })?;

        Ok(Self {
            commands,
            state,
            config,
        })
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// The latest published state.
    pub fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    /// Watch every state change.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.clone()
    }

    /// Replace the trace with one generated from `problem`.
    pub async fn load(&self, problem: Problem) -> Result<SessionState> {
        self.request(|reply| Command::Load { problem, reply }).await
    }

    /// Validate raw JSON input against the session limits, then load it.
    pub async fn load_json(
        &self,
        algorithm: Algorithm,
        input: serde_json::Value,
    ) -> Result<SessionState> {
        let problem = Problem::from_value(algorithm, input, &self.config.limits)?;
        self.load(problem).await
    }

    /// Apply a playback command.
    pub async fn control(&self, control: Control) -> Result<PlaybackSnapshot> {
        self.request(|reply| Command::Control { control, reply })
            .await
    }

    async fn request<T>(
        &self,
        command: impl FnOnce(oneshot::Sender<Result<T>>) -> Command,
    ) -> Result<T> {
        let (reply, response) = oneshot::channel();
        self.commands
            .send(command(reply))
            .await
            .map_err(|_| Error::Closed)?;
        response.await.map_err(|_| Error::Closed)?
    }
}

/// State owned by the session thread.
struct Session {
    algorithm: Algorithm,
    generation: u64,
    scheduler: Rc<dyn Scheduler>,
    registry: Rc<PlaybackRegistry>,
    controller: PlaybackController<Step>,
    errors: broadcast::Receiver<algoviz_playback::Error>,
    last_error: Option<String>,
    publisher: watch::Sender<SessionState>,
}

impl Session {
    fn new(
        config: SessionConfig,
        algorithm: Algorithm,
        trace: Trace,
        publisher: watch::Sender<SessionState>,
    ) -> algoviz_playback::Result<Self> {
        let scheduler = config.playback.build_scheduler(Rc::new(TokioClock::new()));
        let registry = Rc::new(if config.exclusive {
            PlaybackRegistry::exclusive()
        } else {
            PlaybackRegistry::new()
        });
        let controller = PlaybackController::new(
            trace.into_steps(),
            scheduler.clone(),
            registry.clone(),
            &config.playback,
        )?;
        controller.on_step(|index, step: &Step| {
            trace!(index, description = %step.description, "Step delivered");
            Ok(())
        });
        let errors = controller.errors();

        Ok(Self {
            algorithm,
            generation: 0,
            scheduler,
            registry,
            controller,
            errors,
            last_error: None,
            publisher,
        })
    }

    async fn run(mut self, mut inbox: mpsc::Receiver<Command>) {
        info!(
            algorithm = %self.algorithm,
            steps = self.controller.len(),
            "Playback session started"
        );

        loop {
            let wakeup = self.scheduler.time_to_wakeup();
            tokio::select! {
                command = inbox.recv() => match command {
                    Some(command) => self.handle(command),
                    None => break,
                },
                _ = sleep(wakeup.unwrap_or_default()), if wakeup.is_some() => {
                    let fired = self.scheduler.tick();
                    trace!(fired, "Scheduler tick");
                }
            }
            self.publish();
        }

        let paused = self.registry.pause_all();
        info!(paused, "Playback session stopped");
    }

    fn handle(&mut self, command: Command) {
        match command {
            Command::Load { problem, reply } => {
                let result = match self.load(problem) {
                    Ok(()) => {
                        self.publish();
                        Ok(self.publisher.borrow().clone())
                    }
                    Err(err) => Err(err),
                };
                let _ = reply.send(result);
            }
            Command::Control { control, reply } => {
                let result = self.apply(control);
                if let Err(err) = &result {
                    debug!(?control, error = %err, "Rejected playback command");
                }
                self.publish();
                let _ = reply.send(result.map_err(Error::from));
            }
        }
    }

    fn load(&mut self, problem: Problem) -> Result<()> {
        let algorithm = problem.algorithm();
        let trace = generate(&problem)?;
        self.controller.load(trace.into_steps())?;

        self.algorithm = algorithm;
        self.generation += 1;
        self.last_error = None;
        info!(
            %algorithm,
            steps = self.controller.len(),
            generation = self.generation,
            "Loaded trace"
        );
        Ok(())
    }

    fn apply(&self, control: Control) -> algoviz_playback::Result<PlaybackSnapshot> {
        let controller = &self.controller;
        match control {
            Control::Play => controller.start()?,
            Control::Pause => controller.pause()?,
            Control::Reset => controller.reset(),
            Control::StepForward => {
                controller.step_forward()?;
            }
            Control::StepBackward => {
                controller.step_backward()?;
            }
            Control::Speed { speed_ms } => controller.set_speed(speed_ms)?,
            Control::Seek { index } => {
                controller.seek(index)?;
            }
        }
        Ok(controller.snapshot())
    }

    /// Push the controller state to observers if it changed.
    fn publish(&mut self) {
        loop {
            match self.errors.try_recv() {
                Ok(err) => self.last_error = Some(err.to_string()),
                Err(broadcast::error::TryRecvError::Lagged(missed)) => {
                    debug!(missed, "Skipped playback errors");
                }
                Err(_) => break,
            }
        }

        let snapshot = self.controller.snapshot();
        let algorithm = self.algorithm;
        let generation = self.generation;
        let controller = &self.controller;
        let last_error = &self.last_error;
        self.publisher.send_if_modified(|state| {
            if state.status == snapshot
                && state.generation == generation
                && state.last_error == *last_error
            {
                return false;
            }
            *state = SessionState {
                algorithm,
                generation,
                status: snapshot,
                progress: snapshot.progress(),
                step: controller.current_step(),
                last_error: last_error.clone(),
            };
            true
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use algoviz_playback::{PlaybackConfig, SchedulerKind};
    use algoviz_trace::presets;
    use std::time::Duration;
    use tokio::time::timeout;

    fn spawn(algorithm: Algorithm, kind: SchedulerKind) -> SessionHandle {
        let config = SessionConfig::default().with_playback(
            PlaybackConfig::default()
                .with_speed_ms(2)
                .with_scheduler(kind)
                .with_frame_interval(Duration::from_millis(1)),
        );
        SessionHandle::spawn(config, presets::demo(algorithm)).unwrap()
    }

    async fn until_complete(handle: &SessionHandle) -> SessionState {
        let mut updates = handle.subscribe();
        let wait = updates.wait_for(|s| s.status.status == PlaybackStatus::Complete);
        let state = timeout(Duration::from_secs(10), wait).await.unwrap().unwrap();
        state.clone()
    }

    #[tokio::test]
    async fn plays_a_trace_to_completion() {
        for kind in [SchedulerKind::Timer, SchedulerKind::Frame] {
            let handle = spawn(Algorithm::Kruskal, kind);
            let initial = handle.state();
            assert_eq!(initial.status.status, PlaybackStatus::Idle);
            assert_eq!(initial.status.cursor, 0);

            let snapshot = handle.control(Control::Play).await.unwrap();
            assert_eq!(snapshot.status, PlaybackStatus::Playing);

            let done = until_complete(&handle).await;
            assert_eq!(done.status.cursor, done.status.len - 1);
            assert_eq!(done.progress, 1.0);
            assert!(done.step.description.contains("38"), "{}", done.step.description);
        }
    }

    #[tokio::test]
    async fn rejects_commands_in_the_wrong_state() {
        let handle = spawn(Algorithm::Prim, SchedulerKind::Timer);
        let err = handle.control(Control::Pause).await.unwrap_err();
        assert!(matches!(
            err,
            Error::Playback(algoviz_playback::Error::InvalidState { action: "pause", .. })
        ));

        let err = handle
            .control(Control::Speed { speed_ms: 0 })
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Playback(algoviz_playback::Error::InvalidSpeed(0))
        ));
    }

    #[tokio::test]
    async fn manual_stepping_updates_the_published_step() {
        let handle = spawn(Algorithm::WordLadder, SchedulerKind::Timer);
        let first = handle.state().step;

        let snapshot = handle.control(Control::StepForward).await.unwrap();
        assert_eq!(snapshot.cursor, 1);
        assert_eq!(snapshot.status, PlaybackStatus::Paused);

        let mut updates = handle.subscribe();
        let state = updates.wait_for(|s| s.status.cursor == 1).await.unwrap().clone();
        assert_ne!(state.step, first);

        let snapshot = handle.control(Control::Seek { index: usize::MAX }).await.unwrap();
        assert_eq!(snapshot.status, PlaybackStatus::Complete);

        let snapshot = handle.control(Control::Reset).await.unwrap();
        assert_eq!(snapshot.cursor, 0);
        assert_eq!(snapshot.status, PlaybackStatus::Idle);
    }

    #[tokio::test]
    async fn loading_replaces_the_trace() {
        let handle = spawn(Algorithm::Kruskal, SchedulerKind::Timer);
        handle.control(Control::Play).await.unwrap();

        let state = handle
            .load(presets::demo(Algorithm::DirectedCycle))
            .await
            .unwrap();
        assert_eq!(state.algorithm, Algorithm::DirectedCycle);
        assert_eq!(state.generation, 1);
        assert_eq!(state.status.status, PlaybackStatus::Idle);
        assert_eq!(state.status.cursor, 0);
    }

    #[tokio::test]
    async fn invalid_json_is_rejected_before_loading() {
        let handle = spawn(Algorithm::Kruskal, SchedulerKind::Timer);
        let input = serde_json::json!({
            "vertices": [{"id": 0, "x": 0.0, "y": 0.0}],
            "edges": [{"source": 0, "target": 7, "weight": 1.0}]
        });
        let err = handle
            .load_json(Algorithm::Kruskal, input)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Trace(algoviz_trace::Error::Validation(_))
        ));
        assert_eq!(handle.state().generation, 0);
    }

    #[test]
    fn zero_speed_is_refused_up_front() {
        let config = SessionConfig::default()
            .with_playback(PlaybackConfig::default().with_speed_ms(0));
        let err = SessionHandle::spawn(config, presets::demo(Algorithm::Tsp)).unwrap_err();
        assert!(matches!(
            err,
            Error::Playback(algoviz_playback::Error::InvalidSpeed(0))
        ));
    }
}
