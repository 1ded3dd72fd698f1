//! # game-updater-core
//!
//! Core types for the game server updater.
//!
//! This crate contains all fundamental types with **no internal dependencies**
//! on other game-updater crates. It provides:
//!
//! - Configuration loading and validation
//! - Session and player types (SessionId, PlayerInfo, Team, ConnectionState)
//! - The host capability trait and the events a host delivers
//! - The result of a single update check
//! - Error types
//!
//! ## Architecture
//!
//! This is Layer 0 in the architecture - all other crates depend on this one,
//! but this crate has no dependencies on other game-updater crates.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod error;
pub mod host;
pub mod session;
pub mod update;

// Re-export commonly used types
pub use config::{UpdaterConfig, CURRENT_CONFIG_VERSION};
pub use error::{Error, Result};
pub use host::{GameHost, HostEvent};
pub use session::{ConnectionState, PlayerInfo, SessionId, Team};
pub use update::UpdateCheck;
