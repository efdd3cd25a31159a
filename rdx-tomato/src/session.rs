//! The session orchestrator: duration policy, phase chaining and history.
//!
//! `Session` wraps a [`TimerEngine`] with the rules of a Pomodoro run:
//!
//! - `start` refuses to discard a paused phase and ignores a repeated start.
//! - When a phase runs out on its own, the finished phase is logged at its
//!   full length and the complementary phase starts straight away, so work
//!   and break alternate until the run is cancelled.
//! - `cancel` logs the part of the phase that was actually spent.
//! - `next` skips ahead. A skipped work phase is logged at its full length;
//!   a skipped break is not logged at all.

use crate::common::minutes;
use crate::config::{ConfigStore, TimerConfig};
use crate::engine::{PhaseRequest, TimerEngine, TimerState};
use crate::error::{SessionError, StoreError};
use crate::events::TimerEvent;
use crate::history::{HistoryStore, SessionRecord};
use crate::phase::Phase;
use chrono::{DateTime, Local};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tracing::{debug, error, info};

/// The work and break lengths in effect for the current run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhasePlan {
    pub work_duration: Duration,
    pub break_duration: Duration,
}

impl From<TimerConfig> for PhasePlan {
    fn from(config: TimerConfig) -> Self {
        Self {
            work_duration: config.work_duration,
            break_duration: config.break_duration,
        }
    }
}

/// What a call to [`Session::start`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    /// A work phase began with these durations.
    Started(PhasePlan),
    /// A phase was already counting down; nothing changed.
    AlreadyRunning,
}

/// Bookkeeping shared by callers and the engine's completion handler.
struct Ledger {
    config: ConfigStore,
    history: HistoryStore,
    plan: PhasePlan,
    phase_started_at: DateTime<Local>,
}

impl Ledger {
    fn record(&mut self, phase: Phase, duration: Duration) -> Result<(), StoreError> {
        let record = SessionRecord {
            start_time: self.phase_started_at,
            end_time: Local::now(),
            duration,
            phase: phase.active_form(),
        };
        debug!("Recording {} session of {:?}", record.phase, duration);
        self.history.add(record)
    }

    /// The step that follows `phase` in the work/break cycle.
    fn follow_up(&mut self, phase: Phase) -> Option<PhaseRequest> {
        let next = match phase.active_form() {
            Phase::Work => PhaseRequest {
                phase: Phase::Break,
                duration: self.plan.break_duration,
            },
            Phase::Break => PhaseRequest {
                phase: Phase::Work,
                duration: self.plan.work_duration,
            },
            _ => return None,
        };
        self.phase_started_at = Local::now();
        Some(next)
    }

    fn on_phase_complete(&mut self, finished: TimerState) -> Option<PhaseRequest> {
        let phase = finished.phase.active_form();
        if !finished.total_duration.is_zero() {
            if let Err(e) = self.record(phase, finished.total_duration) {
                error!("Failed to record completed {} session: {}", phase, e);
            }
        }
        let next = self.follow_up(phase)?;
        info!("Chaining into {} for {:?}", next.phase, next.duration);
        Some(next)
    }
}

/// A Pomodoro run driven by a timer engine.
///
/// Must be created inside a Tokio runtime, since it spawns the engine.
pub struct Session {
    engine: TimerEngine,
    ledger: Arc<Mutex<Ledger>>,
}

impl Session {
    pub fn new(config: ConfigStore, history: HistoryStore) -> Self {
        let plan = PhasePlan::from(config.get());
        let ledger = Arc::new(Mutex::new(Ledger {
            config,
            history,
            plan,
            phase_started_at: Local::now(),
        }));

        let chain = Arc::clone(&ledger);
        let engine = TimerEngine::spawn(move |finished| chain.lock().on_phase_complete(finished));

        Self { engine, ledger }
    }

    /// Starts a work phase.
    ///
    /// Positive minute arguments override the configured durations for this
    /// run; zero or negative ones fall back to the config.
    pub async fn start(
        &self,
        work_minutes: i64,
        break_minutes: i64,
    ) -> Result<StartOutcome, SessionError> {
        let state = self.engine.state().await;
        if state.is_paused() {
            return Err(SessionError::TimerBusyPaused);
        }
        if state.is_running() {
            debug!("Start ignored, {} already running", state.phase);
            return Ok(StartOutcome::AlreadyRunning);
        }

        let plan = {
            let mut ledger = self.ledger.lock();
            let defaults = ledger.config.get();
            let plan = PhasePlan {
                work_duration: minutes(work_minutes).unwrap_or(defaults.work_duration),
                break_duration: minutes(break_minutes).unwrap_or(defaults.break_duration),
            };
            ledger.plan = plan;
            ledger.phase_started_at = Local::now();
            plan
        };

        self.engine.start(plan.work_duration, Phase::Work);
        info!(
            "Pomodoro started: {:?} work, {:?} break",
            plan.work_duration, plan.break_duration
        );
        Ok(StartOutcome::Started(plan))
    }

    pub async fn pause(&self) -> Result<(), SessionError> {
        if !self.engine.is_running().await {
            debug!("Pause ignored, timer is idle");
            return Ok(());
        }
        self.engine.pause();
        Ok(())
    }

    pub async fn resume(&self) -> Result<(), SessionError> {
        self.engine.resume();
        Ok(())
    }

    /// Skips to the complementary phase.
    ///
    /// The timer advances even if logging the skipped work phase fails; the
    /// write error is returned afterwards.
    pub async fn next(&self) -> Result<(), SessionError> {
        // A tick can finish the phase after this snapshot and before the
        // start below lands; that phase is then logged by the completion
        // handler as well as here.
        let state = self.engine.state().await;
        if !state.is_running() {
            debug!("Next ignored, timer is idle");
            return Ok(());
        }

        let phase = state.phase.active_form();
        let (recorded, next) = {
            let mut ledger = self.ledger.lock();
            let recorded = match phase {
                Phase::Work => ledger.record(Phase::Work, state.total_duration),
                _ => Ok(()),
            };
            (recorded, ledger.follow_up(phase))
        };

        if let Some(next) = next {
            info!("Skipping {} and starting {}", phase, next.phase);
            self.engine.start(next.duration, next.phase);
        }
        recorded.map_err(SessionError::from)
    }

    /// Stops the run and logs the elapsed part of the current phase.
    pub async fn cancel(&self) -> Result<(), SessionError> {
        // Same window as `next`: a phase that completes before the stop lands
        // gets both its full record and this partial one.
        let state = self.engine.state().await;
        if !state.is_running() {
            debug!("Cancel ignored, timer is idle");
            return Ok(());
        }

        self.engine.stop();
        info!("Cancelled {} after {:?}", state.phase.active_form(), state.elapsed());
        self.ledger
            .lock()
            .record(state.phase, state.elapsed())
            .map_err(SessionError::from)
    }

    pub async fn state(&self) -> TimerState {
        self.engine.state().await
    }

    pub async fn is_running(&self) -> bool {
        self.engine.is_running().await
    }

    /// A one-line status such as `Idle` or `Work: 24m59s (Paused)`.
    pub async fn status(&self) -> String {
        self.engine.state().await.to_string()
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<TimerEvent> {
        self.engine.subscribe_events()
    }

    pub fn config(&self) -> TimerConfig {
        self.ledger.lock().config.get()
    }

    /// Changes the configured work length. Takes effect on the next `start`.
    pub fn set_work_duration(&self, duration: Duration) -> Result<(), SessionError> {
        Ok(self.ledger.lock().config.set_work_duration(duration)?)
    }

    /// Changes the configured break length. Takes effect on the next `start`.
    pub fn set_break_duration(&self, duration: Duration) -> Result<(), SessionError> {
        Ok(self.ledger.lock().config.set_break_duration(duration)?)
    }

    pub fn total_completed(&self) -> usize {
        self.ledger.lock().history.total_completed()
    }

    pub fn today_completed(&self) -> usize {
        self.ledger.lock().history.today_completed()
    }

    /// A copy of every record in the history.
    pub fn sessions(&self) -> Vec<SessionRecord> {
        self.ledger.lock().history.sessions().to_vec()
    }

    pub fn clear_stats(&self) -> Result<(), SessionError> {
        Ok(self.ledger.lock().history.clear()?)
    }
}
