//! The phase model and its transition rules.
//!
//! A running pomodoro is always in exactly one `Phase`. `Work` and `Break`
//! each have a paused overlay; the four methods on `Phase` are the only place
//! that maps between the two, so the rest of the crate never matches on the
//! paused variants by hand.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One segment of the Pomodoro cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// No countdown is running. Carries no duration.
    #[default]
    Idle,
    Work,
    WorkPaused,
    Break,
    BreakPaused,
}

impl Phase {
    /// `Work -> WorkPaused`, `Break -> BreakPaused`, identity otherwise.
    pub fn paused_form(self) -> Self {
        match self {
            Phase::Work => Phase::WorkPaused,
            Phase::Break => Phase::BreakPaused,
            other => other,
        }
    }

    /// Inverse of [`Phase::paused_form`].
    pub fn resumed_form(self) -> Self {
        match self {
            Phase::WorkPaused => Phase::Work,
            Phase::BreakPaused => Phase::Break,
            other => other,
        }
    }

    /// Collapses a paused variant onto the phase it overlays.
    ///
    /// Use this whenever the question is "which kind of phase is this"
    /// regardless of whether the countdown is currently paused.
    pub fn active_form(self) -> Self {
        match self {
            Phase::WorkPaused => Phase::Work,
            Phase::BreakPaused => Phase::Break,
            other => other,
        }
    }

    pub fn is_paused(self) -> bool {
        matches!(self, Phase::WorkPaused | Phase::BreakPaused)
    }

    /// The lowercase name used in persisted records.
    pub fn as_str(self) -> &'static str {
        match self {
            Phase::Idle => "idle",
            Phase::Work => "work",
            Phase::WorkPaused => "work_paused",
            Phase::Break => "break",
            Phase::BreakPaused => "break_paused",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
