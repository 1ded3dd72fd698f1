//! # game-updater-drain
//!
//! Update detection and player drain for the game server updater.
//!
//! This crate provides:
//! - Session tracking (who is connected, who has been told)
//! - Countdown notices and the shutdown policy
//! - The drain state machine (Idle → UpdatePending → Draining → Terminating)
//! - The cooperative runtime loop that drives polling and timers
//!
//! ## Architecture
//!
//! This is Layer 2 in the architecture - it depends on game-updater-core
//! and game-updater-probe.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod notification;
pub mod policy;
pub mod runtime;
pub mod scheduler;
pub mod state;
pub mod testing;
pub mod tracker;

// Re-export commonly used types
pub use notification::{countdown_phrase, remaining_seconds, NotificationPolicy};
pub use policy::{drain_delay, should_shutdown_now};
pub use runtime::UpdaterRuntime;
pub use scheduler::{DrainPhase, DrainScheduler};
pub use state::VersionState;
pub use tracker::{SessionTracker, TrackedSession};
