//! When to start draining, and how long to wait.

use std::time::Duration;

use game_updater_core::UpdaterConfig;

/// Whether the drain should start now for the given population.
///
/// True when the server is emptier than the configured fraction, or holds no
/// more than the instant-shutdown player count. A non-positive maximum always
/// allows the shutdown.
pub fn should_shutdown_now(
    current_population: usize,
    max_population: i32,
    config: &UpdaterConfig,
) -> bool {
    if max_population <= 0 {
        return true;
    }

    let fraction = current_population as f64 / f64::from(max_population);
    fraction < config.min_player_percentage_shutdown_allowed
        || current_population <= config.min_players_instant_shutdown as usize
}

/// Drain timer length: one second for a near-empty server, the configured
/// delay otherwise.
pub fn drain_delay(current_population: usize, config: &UpdaterConfig) -> Duration {
    if current_population <= config.min_players_instant_shutdown as usize {
        Duration::from_secs(1)
    } else {
        config.drain_delay()
    }
}
