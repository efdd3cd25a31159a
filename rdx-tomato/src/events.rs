//! Events broadcast by the timer engine.
//!
//! Every event describes a transition that actually happened; commands that
//! turn out to be no-ops (pausing an idle timer, resuming a running one)
//! produce nothing.

use crate::phase::Phase;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimerEvent {
    /// A new countdown began, replacing whatever was running.
    PhaseStarted { phase: Phase, duration: Duration },
    /// The countdown was frozen. `phase` is the paused variant.
    Paused { phase: Phase, remaining: Duration },
    /// The countdown continues. `phase` is the active variant.
    Resumed { phase: Phase, remaining: Duration },
    /// The timer was reset to idle before the countdown reached zero.
    Stopped { phase: Phase, remaining: Duration },
    /// The countdown reached zero on its own.
    PhaseCompleted { phase: Phase, total_duration: Duration },
}
