//! # Tomato
//!
//! A command-driven Pomodoro timer engine for Rust.
//!
//! Tomato alternates fixed-length work and break phases, driven by
//! asynchronous control commands, and keeps a persisted history of the
//! phases that were completed.
//!
//! ## Core Concepts
//!
//! - **Phase**: `Idle`, `Work`, `Break` and the paused overlays of the latter
//!   two. The whole phase algebra lives in [`phase::Phase`].
//! - **TimerEngine**: a dedicated task that owns the countdown and advances it
//!   once per second. Every mutation and query is a message on one channel, so
//!   the state is never shared and never torn.
//! - **Session**: the policy layer. It resolves phase durations, chains
//!   `Work -> Break -> Work ...` when the engine reports a natural completion,
//!   and writes each finished phase to the history store.
//! - **Stores**: JSON files in the user's config directory holding the default
//!   durations (`config.json`) and the session history (`stats.json`).
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use tomato::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     // 1. Open the stores in the default application directory.
//!     let dir = tomato::storage::app_dir()?;
//!     let config = ConfigStore::open(&dir, TimerConfig::DEFAULT)?;
//!     let history = HistoryStore::open(&dir)?;
//!
//!     // 2. Create the session. This spawns the timer engine.
//!     let session = Session::new(config, history);
//!
//!     // 3. Listen for phase transitions.
//!     let mut events = session.subscribe_events();
//!     tokio::spawn(async move {
//!         while let Ok(event) = events.recv().await {
//!             println!("Timer event: {:?}", event);
//!         }
//!     });
//!
//!     // 4. Start a pomodoro with the configured durations.
//!     session.start(0, 0).await?;
//!     println!("{}", session.status().await);
//!     Ok(())
//! }
//! ```

pub const ENGINE_NAME: &str = "Tomato Engine";
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod common;
pub mod config;
pub mod engine;
pub mod error;
pub mod events;
pub mod history;
pub mod phase;
pub mod session;
pub mod storage;

/// A prelude module for easy importing of the most common Tomato types.
pub mod prelude {
    pub use crate::config::{ConfigStore, TimerConfig};
    pub use crate::engine::{PhaseRequest, TimerEngine, TimerState};
    pub use crate::error::{SessionError, StoreError};
    pub use crate::events::TimerEvent;
    pub use crate::history::{HistoryStore, SessionRecord};
    pub use crate::phase::Phase;
    pub use crate::session::{PhasePlan, Session, StartOutcome};
}
