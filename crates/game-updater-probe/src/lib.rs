//! # game-updater-probe
//!
//! Answers one question: is there a newer server release than the one
//! installed?
//!
//! This crate provides:
//! - Reading the installed patch version from `steam.inf`
//! - The remote up-to-date check over HTTP
//! - The [`VersionProbe`] trait the scheduler polls, with a Steam-backed
//!   implementation
//!
//! ## Architecture
//!
//! This is Layer 1 in the architecture - it depends only on game-updater-core.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod probe;
pub mod remote;
pub mod steam_inf;

// Re-export commonly used types
pub use probe::{SteamVersionProbe, VersionProbe};
pub use remote::{RemoteVersionClient, UpToDateCheck, UpToDateCheckResponse};
pub use steam_inf::{parse_patch_version, SteamInf};
