//! The countdown engine that drives every phase.
//!
//! A `TimerEngine` is a cheap, cloneable handle to a single background task.
//! That task exclusively owns one [`TimerState`] and serializes everything
//! that touches it: control commands sent through the handle, state queries,
//! and the once-per-second clock tick. Because only the task ever reads or
//! writes the state, no locks are involved and a query can never observe a
//! half-applied command.

use crate::events::TimerEvent;
use crate::phase::Phase;
use std::fmt;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, info, trace, warn};

/// How far the countdown advances on each clock tick.
pub const TICK_INTERVAL: Duration = Duration::from_secs(1);

const EVENT_CHANNEL_CAPACITY: usize = 64;

/// A point-in-time copy of the engine's state.
///
/// Invariants: `remaining <= total_duration`, and an `Idle` state has
/// nothing remaining.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerState {
    pub phase: Phase,
    pub remaining: Duration,
    pub total_duration: Duration,
}

impl TimerState {
    pub const fn idle() -> Self {
        Self {
            phase: Phase::Idle,
            remaining: Duration::ZERO,
            total_duration: Duration::ZERO,
        }
    }

    /// True for any phase other than `Idle`, paused or not.
    pub fn is_running(&self) -> bool {
        self.phase != Phase::Idle
    }

    pub fn is_paused(&self) -> bool {
        self.phase.is_paused()
    }

    /// Time already counted down in the current phase.
    pub fn elapsed(&self) -> Duration {
        self.total_duration.saturating_sub(self.remaining)
    }
}

impl Default for TimerState {
    fn default() -> Self {
        Self::idle()
    }
}

/// Renders the status line shown to the user, e.g. `Break: 4m0s (Paused)`.
impl fmt::Display for TimerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.is_running() {
            return f.write_str("Idle");
        }
        let label = match self.phase.active_form() {
            Phase::Break => "Break",
            _ => "Work",
        };
        let paused = if self.is_paused() { " (Paused)" } else { "" };
        write!(
            f,
            "{}: {}{}",
            label,
            crate::common::format_duration(self.remaining),
            paused
        )
    }
}

/// A phase the completion handler wants started in place of the finished one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseRequest {
    pub phase: Phase,
    pub duration: Duration,
}

/// Called from inside the engine task whenever a countdown reaches zero.
///
/// It receives the state as it was right before the reset to idle. A returned
/// request is applied before the engine looks at its queue again, so no other
/// caller can slip a command in between the completion and the next phase.
///
/// The handler runs synchronously on the engine task and may block: the
/// session's handler writes the history file to disk while holding its lock.
/// Ticks and queued commands wait until it returns.
pub type CompletionHandler = Box<dyn FnMut(TimerState) -> Option<PhaseRequest> + Send>;

/// The messages that make up the engine's only way in.
#[derive(Debug)]
enum Command {
    Start { duration: Duration, phase: Phase },
    Pause,
    Resume,
    Stop,
    Get(oneshot::Sender<TimerState>),
}

/// A handle to a running timer engine.
///
/// All methods may be called concurrently from any number of tasks or threads.
/// `start`, `pause`, `resume` and `stop` are fire-and-forget; `state` waits
/// for the engine to reply. Commands from one caller are applied in the order
/// they were sent. The engine task shuts down once every handle is dropped.
#[derive(Clone)]
pub struct TimerEngine {
    command_sender: mpsc::UnboundedSender<Command>,
    event_sender: broadcast::Sender<TimerEvent>,
}

/// The state owned by the engine task.
struct EngineLoop {
    state: TimerState,
    event_sender: broadcast::Sender<TimerEvent>,
    on_complete: CompletionHandler,
}

// Core implementation block for the engine task.
impl EngineLoop {
    #[doc(hidden)]
    async fn run(mut self, mut command_rx: mpsc::UnboundedReceiver<Command>) {
        debug!("Timer engine task started.");
        let mut ticker = time::interval_at(Instant::now() + TICK_INTERVAL, TICK_INTERVAL);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                command = command_rx.recv() => match command {
                    Some(command) => self.handle_command(command),
                    None => break,
                },
                _ = ticker.tick() => self.tick(),
            }
        }
        debug!("All timer handles dropped. Engine task exiting.");
    }

    #[doc(hidden)]
    fn handle_command(&mut self, command: Command) {
        match command {
            Command::Start { duration, phase } => self.begin(duration, phase),
            Command::Pause => {
                let paused = self.state.phase.paused_form();
                if paused != self.state.phase {
                    self.state.phase = paused;
                    self.emit(TimerEvent::Paused {
                        phase: paused,
                        remaining: self.state.remaining,
                    });
                }
            }
            Command::Resume => {
                let resumed = self.state.phase.resumed_form();
                if resumed != self.state.phase {
                    self.state.phase = resumed;
                    self.emit(TimerEvent::Resumed {
                        phase: resumed,
                        remaining: self.state.remaining,
                    });
                }
            }
            Command::Stop => {
                let previous = self.state;
                self.state = TimerState::idle();
                if previous.is_running() {
                    self.emit(TimerEvent::Stopped {
                        phase: previous.phase,
                        remaining: previous.remaining,
                    });
                }
            }
            Command::Get(reply) => {
                // The caller may have given up waiting.
                reply.send(self.state).ok();
            }
        }
    }

    #[doc(hidden)]
    fn begin(&mut self, duration: Duration, phase: Phase) {
        if phase == Phase::Idle {
            self.state = TimerState::idle();
            return;
        }
        self.state = TimerState {
            phase,
            remaining: duration,
            total_duration: duration,
        };
        self.emit(TimerEvent::PhaseStarted { phase, duration });
    }

    #[doc(hidden)]
    fn tick(&mut self) {
        if self.state.phase == Phase::Idle || self.state.is_paused() {
            return;
        }
        self.state.remaining = self.state.remaining.saturating_sub(TICK_INTERVAL);
        trace!("{} remaining: {:?}", self.state.phase, self.state.remaining);
        if !self.state.remaining.is_zero() {
            return;
        }

        let finished = self.state;
        self.state = TimerState::idle();
        info!(
            "{} phase complete after {:?}.",
            finished.phase, finished.total_duration
        );
        self.emit(TimerEvent::PhaseCompleted {
            phase: finished.phase,
            total_duration: finished.total_duration,
        });
        if let Some(next) = (self.on_complete)(finished) {
            self.begin(next.duration, next.phase);
        }
    }

    fn emit(&self, event: TimerEvent) {
        // Having no subscribers is normal.
        self.event_sender.send(event).ok();
    }
}

// Public API implementation block.
impl TimerEngine {
    /// Spawns the engine task on the current Tokio runtime.
    ///
    /// The engine starts `Idle`. `on_complete` is registered once here and
    /// invoked on every natural phase completion.
    ///
    /// # Panics
    /// Panics if called outside a Tokio runtime.
    pub fn spawn(
        on_complete: impl FnMut(TimerState) -> Option<PhaseRequest> + Send + 'static,
    ) -> Self {
        let (command_sender, command_rx) = mpsc::unbounded_channel();
        let (event_sender, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);

        let engine_loop = EngineLoop {
            state: TimerState::idle(),
            event_sender: event_sender.clone(),
            on_complete: Box::new(on_complete),
        };
        tokio::spawn(engine_loop.run(command_rx));

        Self {
            command_sender,
            event_sender,
        }
    }

    /// Spawns an engine that simply goes idle when a phase completes.
    pub fn without_chaining() -> Self {
        Self::spawn(|_| None)
    }

    /// Replaces the current state with a fresh countdown, discarding
    /// whatever was running or paused.
    pub fn start(&self, duration: Duration, phase: Phase) {
        self.send(Command::Start { duration, phase });
    }

    /// Pauses an active phase. No-op when idle or already paused.
    pub fn pause(&self) {
        self.send(Command::Pause);
    }

    /// Resumes a paused phase. No-op otherwise.
    pub fn resume(&self) {
        self.send(Command::Resume);
    }

    /// Resets to idle without notifying the completion handler.
    pub fn stop(&self) {
        self.send(Command::Stop);
    }

    /// Returns a snapshot taken after every command sent before this call
    /// has been applied.
    pub async fn state(&self) -> TimerState {
        let (reply, response) = oneshot::channel();
        self.send(Command::Get(reply));
        response.await.unwrap_or_default()
    }

    pub async fn is_running(&self) -> bool {
        self.state().await.is_running()
    }

    pub async fn is_paused(&self) -> bool {
        self.state().await.is_paused()
    }

    /// Subscribes to the `TimerEvent` stream.
    pub fn subscribe_events(&self) -> broadcast::Receiver<TimerEvent> {
        self.event_sender.subscribe()
    }

    fn send(&self, command: Command) {
        if self.command_sender.send(command).is_err() {
            warn!("Timer engine is no longer running. Command dropped.");
        }
    }
}
