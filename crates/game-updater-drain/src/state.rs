//! Update bookkeeping owned by the drain scheduler.

use chrono::{DateTime, Utc};
use tokio::time::Instant;

/// What the updater knows about a pending update.
#[derive(Debug, Clone, Default)]
pub struct VersionState {
    /// An update has been detected on the current map
    pub update_available: bool,
    /// Version the remote service requires
    pub required_version: i64,
    /// When the update was first detected; set once per process
    pub update_found_at: Option<Instant>,
    /// Wall-clock time of the first detection, for logs
    pub update_found_at_utc: Option<DateTime<Utc>>,
    /// A drain has started; never cleared
    pub restart_required: bool,
}

impl VersionState {
    /// Create an empty state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a positive probe result.
    ///
    /// Returns true when `update_available` flips from false to true.
    pub fn record_update(&mut self, required_version: i64, now: Instant) -> bool {
        self.required_version = required_version;
        if self.update_available {
            return false;
        }

        self.update_available = true;
        if self.update_found_at.is_none() {
            self.update_found_at = Some(now);
            self.update_found_at_utc = Some(Utc::now());
        }
        true
    }

    /// Forget the pending update at a map boundary.
    ///
    /// `update_found_at` and `restart_required` are kept.
    pub fn clear_update(&mut self) {
        self.update_available = false;
    }
}
