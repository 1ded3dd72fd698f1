//! Countdown notices shown to players while the server drains.

use std::time::Duration;

use tokio::time::Instant;

use game_updater_core::UpdaterConfig;

/// Whole seconds left before the restart, never below one.
pub fn remaining_seconds(now: Instant, update_found_at: Instant, shutdown_delay: Duration) -> u64 {
    let elapsed = now.saturating_duration_since(update_found_at).as_secs();
    shutdown_delay.as_secs().saturating_sub(elapsed).max(1)
}

/// Human phrase for a countdown, e.g. "50 seconds" or "3 minutes".
///
/// Below a minute the count is in seconds, otherwise in whole minutes
/// (remainder dropped). The unit is plural unless the displayed count is 1.
pub fn countdown_phrase(remaining: u64) -> String {
    let (count, unit) = if remaining >= 60 {
        (remaining / 60, "minute")
    } else {
        (remaining, "second")
    };
    let suffix = if count != 1 || remaining > 120 { "s" } else { "" };

    format!("{count} {unit}{suffix}")
}

/// Builds the chat notice telling a player when the server restarts.
#[derive(Debug, Clone)]
pub struct NotificationPolicy {
    prefix: String,
    shutdown_delay: Duration,
}

impl NotificationPolicy {
    /// Create a policy with a chat prefix and the configured drain delay.
    pub fn new(prefix: impl Into<String>, shutdown_delay: Duration) -> Self {
        Self {
            prefix: prefix.into(),
            shutdown_delay,
        }
    }

    /// Create a policy from configuration.
    pub fn from_config(config: &UpdaterConfig) -> Self {
        Self::new(config.chat_prefix.clone(), config.drain_delay())
    }

    /// Notice for a player at `now`, given when the update was found.
    pub fn message_for(&self, now: Instant, update_found_at: Instant, required_version: i64) -> String {
        let remaining = remaining_seconds(now, update_found_at, self.shutdown_delay);
        format!(
            "{} New game update released (Version: {}), the server will restart in {}",
            self.prefix,
            required_version,
            countdown_phrase(remaining)
        )
    }
}
