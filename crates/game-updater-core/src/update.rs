//! Outcome of a single version check.

use serde::{Deserialize, Serialize};

/// Result of asking the remote service about the installed version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UpdateCheck {
    /// A newer version than the installed one exists
    pub available: bool,
    /// Version the service requires; 0 when not reported
    pub required_version: i64,
}

impl UpdateCheck {
    /// No update available.
    pub fn up_to_date() -> Self {
        Self::default()
    }

    /// A newer version is available.
    pub fn available(required_version: i64) -> Self {
        Self {
            available: true,
            required_version,
        }
    }
}
