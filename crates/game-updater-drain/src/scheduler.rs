//! The drain state machine.
//!
//! [`DrainScheduler`] owns all updater state and is driven from a single
//! loop (see [`crate::runtime`]). Every method takes the current instant so
//! the machine itself never reads a clock or sleeps.

use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, info, warn};

use game_updater_core::{GameHost, HostEvent, PlayerInfo, Result, SessionId, UpdateCheck, UpdaterConfig};

use crate::notification::NotificationPolicy;
use crate::policy::{drain_delay, should_shutdown_now};
use crate::state::VersionState;
use crate::tracker::SessionTracker;

/// Delay between kicking players and quitting.
const TERMINATE_DELAY: Duration = Duration::from_secs(1);

/// Phase of the drain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DrainPhase {
    /// No update known
    Idle,
    /// Update found, waiting for the population to allow a drain
    UpdatePending,
    /// Players notified, drain timer running
    Draining,
    /// Players kicked, quit timer running
    Terminating,
    /// Quit issued
    Terminated,
}

/// A one-shot deadline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PendingTimer {
    deadline: Instant,
    stop_on_map_change: bool,
}

impl PendingTimer {
    fn is_due(&self, now: Instant) -> bool {
        self.deadline <= now
    }
}

/// Update detection and player drain state machine.
pub struct DrainScheduler<H> {
    config: UpdaterConfig,
    host: H,
    notifications: NotificationPolicy,
    state: VersionState,
    tracker: SessionTracker,
    phase: DrainPhase,
    /// Between map end and the next map start
    server_loading: bool,
    drain_timer: Option<PendingTimer>,
    terminate_timer: Option<PendingTimer>,
}

impl<H: GameHost> DrainScheduler<H> {
    /// Create a scheduler in the Idle phase.
    pub fn new(config: UpdaterConfig, host: H) -> Self {
        let notifications = NotificationPolicy::from_config(&config);
        Self {
            config,
            host,
            notifications,
            state: VersionState::new(),
            tracker: SessionTracker::new(),
            phase: DrainPhase::Idle,
            server_loading: false,
            drain_timer: None,
            terminate_timer: None,
        }
    }

    /// Current phase.
    pub fn phase(&self) -> DrainPhase {
        self.phase
    }

    /// Update bookkeeping.
    pub fn state(&self) -> &VersionState {
        &self.state
    }

    /// Tracked sessions.
    pub fn tracker(&self) -> &SessionTracker {
        &self.tracker
    }

    /// The host capability.
    pub fn host(&self) -> &H {
        &self.host
    }

    /// Configuration in use.
    pub fn config(&self) -> &UpdaterConfig {
        &self.config
    }

    /// Whether the map is loading (between map end and map start).
    pub fn is_server_loading(&self) -> bool {
        self.server_loading
    }

    /// Quit has been issued; nothing else will happen.
    pub fn is_finished(&self) -> bool {
        self.phase == DrainPhase::Terminated
    }

    /// Whether a poll tick should run the probe.
    pub fn wants_probe(&self) -> bool {
        !self.state.restart_required && !self.is_finished()
    }

    /// Earliest pending timer deadline.
    pub fn next_deadline(&self) -> Option<Instant> {
        [self.drain_timer, self.terminate_timer]
            .into_iter()
            .flatten()
            .map(|t| t.deadline)
            .min()
    }

    /// Apply the result of a probe that ran off-loop.
    ///
    /// Failures are logged and change nothing; the next poll retries.
    pub fn apply_probe_result(&mut self, result: Result<UpdateCheck>, now: Instant) {
        let check = match result {
            Ok(check) => check,
            Err(e) if e.is_probe_failure() => {
                warn!("Update check failed, retrying next poll: {}", e);
                return;
            }
            Err(e) => {
                warn!("An error occurred checking the server for updates: {}", e);
                return;
            }
        };

        // A drain may have started while the probe was in flight.
        if !self.wants_probe() {
            debug!("Ignoring probe result, restart already scheduled");
            return;
        }

        if !check.available {
            debug!("Server is up to date");
            return;
        }

        self.manage_update(check.required_version, now);
    }

    /// Dispatch a host event.
    pub fn handle_event(&mut self, event: HostEvent, now: Instant) {
        if self.is_finished() {
            debug!("Ignoring {:?}, server is shutting down", event);
            return;
        }

        match event {
            HostEvent::ClientConnected { player } => self.on_connect(&player),
            HostEvent::ClientDisconnected { slot } => self.on_disconnect(slot),
            HostEvent::PlayerSpawned { player } => self.on_spawn(&player, now),
            HostEvent::MapStart { map } => self.on_map_start(&map),
            HostEvent::MapEnd => self.on_map_end(now),
            HostEvent::SteamApiActivated => info!("Checking for updates..."),
            HostEvent::HibernationChanged { hibernating } => {
                if hibernating {
                    warn!("Server hibernation is enabled. Updates may go unnoticed while the server hibernates.");
                }
            }
        }
    }

    /// A client connected.
    pub fn on_connect(&mut self, player: &PlayerInfo) {
        if self.tracker.on_connect(player) {
            debug!("Tracking player slot {} ({})", player.slot, player.name);
        }
    }

    /// A client disconnected.
    pub fn on_disconnect(&mut self, slot: SessionId) {
        if self.tracker.on_disconnect(slot) {
            debug!("Player slot {} left", slot);
        }
    }

    /// A player spawned; late arrivals learn about the pending restart here.
    pub fn on_spawn(&mut self, player: &PlayerInfo, now: Instant) {
        if self.tracker.on_spawn(player, self.state.update_available) {
            self.notify(player.slot, now);
        }
    }

    /// A new map finished loading.
    pub fn on_map_start(&mut self, map: &str) {
        self.server_loading = false;
        self.tracker.reset_for_new_map();

        if !self.state.restart_required {
            self.state.clear_update();
            self.phase = DrainPhase::Idle;
        }
        debug!("Map {} started in phase {:?}", map, self.phase);
    }

    /// The current map is ending.
    pub fn on_map_end(&mut self, now: Instant) {
        self.server_loading = true;

        if !self.config.shutdown_on_map_change_if_pending_update {
            return;
        }

        if self.drain_timer.is_some_and(|t| t.stop_on_map_change) {
            self.drain_timer = None;
        }

        if self.state.restart_required && self.phase == DrainPhase::Draining {
            info!("Map is changing with an update pending, shutting down now");
            self.enter_terminating(now);
        }
    }

    /// Fire every timer whose deadline has passed.
    pub fn fire_due_timers(&mut self, now: Instant) {
        if self.drain_timer.is_some_and(|t| t.is_due(now)) {
            self.drain_timer = None;
            self.enter_terminating(now);
        }

        if self.terminate_timer.is_some_and(|t| t.is_due(now)) {
            self.terminate_timer = None;
            self.terminate();
        }
    }

    fn manage_update(&mut self, required_version: i64, now: Instant) {
        if self.state.record_update(required_version, now) {
            info!(
                "New game update released (Version: {}). The server is preparing for a shutdown.",
                required_version
            );
            if let Some(found) = self.state.update_found_at_utc {
                debug!("Update first detected at {}", found.to_rfc3339());
            }
        }
        if self.phase == DrainPhase::Idle {
            self.phase = DrainPhase::UpdatePending;
        }

        let players = self.current_players();
        if self.server_loading {
            debug!("Map is loading, deferring drain to the next poll");
            return;
        }

        let max_players = self.host.max_players();
        if !should_shutdown_now(players.len(), max_players, &self.config) {
            info!(
                "Server too busy to restart ({}/{} players), waiting for the next poll",
                players.len(),
                max_players
            );
            return;
        }

        self.enter_draining(&players, now);
    }

    fn enter_draining(&mut self, players: &[PlayerInfo], now: Instant) {
        for player in players {
            self.notify(player.slot, now);
            self.tracker.mark_notified(player.slot);
        }

        let delay = drain_delay(players.len(), &self.config);
        self.drain_timer = Some(PendingTimer {
            deadline: now + delay,
            stop_on_map_change: self.config.shutdown_on_map_change_if_pending_update,
        });
        self.state.restart_required = true;
        self.phase = DrainPhase::Draining;

        info!(
            "Draining {} player(s), server restarts in {}s",
            players.len(),
            delay.as_secs()
        );
    }

    fn enter_terminating(&mut self, now: Instant) {
        let reason = format!(
            "Due to the game update (Version: {}), the server is now restarting.",
            self.state.required_version
        );

        for player in self.host.players() {
            if player.is_bot || !player.connection.is_kickable() {
                continue;
            }
            self.run_command(&format!("kickid {} {}", player.user_id, reason));
        }

        self.drain_timer = None;
        self.terminate_timer = Some(PendingTimer {
            deadline: now + TERMINATE_DELAY,
            stop_on_map_change: false,
        });
        self.phase = DrainPhase::Terminating;
    }

    fn terminate(&mut self) {
        info!("Shutting down the server for the update");
        self.run_command("quit");
        self.phase = DrainPhase::Terminated;
    }

    fn notify(&self, slot: SessionId, now: Instant) {
        let found_at = self.state.update_found_at.unwrap_or(now);
        let message = self
            .notifications
            .message_for(now, found_at, self.state.required_version);
        if let Err(e) = self.host.send_chat(slot, &message) {
            warn!("Could not notify player slot {}: {}", slot, e);
        }
    }

    fn run_command(&self, command: &str) {
        if let Err(e) = self.host.execute_command(command) {
            warn!("{}", e);
        }
    }

    fn current_players(&self) -> Vec<PlayerInfo> {
        self.host
            .players()
            .into_iter()
            .filter(PlayerInfo::is_eligible)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingHost;
    use game_updater_core::{ConnectionState, Error, Team};
    use std::sync::Arc;

    fn players(count: u32) -> Vec<PlayerInfo> {
        (1..=count)
            .map(|slot| PlayerInfo::new(slot, slot as i32 + 100, format!("p{slot}")))
            .collect()
    }

    fn scheduler(host: &Arc<RecordingHost>) -> DrainScheduler<Arc<RecordingHost>> {
        DrainScheduler::new(UpdaterConfig::default(), Arc::clone(host))
    }

    #[test]
    fn test_starts_idle() {
        let host = Arc::new(RecordingHost::new(10));
        let sched = scheduler(&host);
        assert_eq!(sched.phase(), DrainPhase::Idle);
        assert!(sched.wants_probe());
        assert_eq!(sched.next_deadline(), None);
    }

    #[test]
    fn test_up_to_date_changes_nothing() {
        let host = Arc::new(RecordingHost::with_players(players(1), 10));
        let mut sched = scheduler(&host);

        sched.apply_probe_result(Ok(UpdateCheck::up_to_date()), Instant::now());
        assert_eq!(sched.phase(), DrainPhase::Idle);
        assert!(!sched.state().update_available);
    }

    #[test]
    fn test_probe_failure_changes_nothing() {
        let host = Arc::new(RecordingHost::with_players(players(1), 10));
        let mut sched = scheduler(&host);

        let err = Error::LocalVersionUnavailable("steam.inf not found".to_string());
        sched.apply_probe_result(Err(err), Instant::now());

        assert_eq!(sched.phase(), DrainPhase::Idle);
        assert!(!sched.state().update_available);
        assert!(sched.state().update_found_at.is_none());
        assert!(sched.wants_probe());
    }

    #[test]
    fn test_single_player_drains_in_one_second() {
        let host = Arc::new(RecordingHost::with_players(players(1), 10));
        let mut sched = scheduler(&host);
        let now = Instant::now();

        sched.apply_probe_result(Ok(UpdateCheck::available(14006)), now);

        assert_eq!(sched.phase(), DrainPhase::Draining);
        assert!(sched.state().restart_required);
        assert_eq!(sched.next_deadline(), Some(now + Duration::from_secs(1)));
        assert!(sched.tracker().is_notified(SessionId::new(1)));
        assert_eq!(host.chats_for(SessionId::new(1)).len(), 1);
        assert!(!sched.wants_probe());
    }

    #[test]
    fn test_busy_server_waits_with_full_delay_later() {
        let host = Arc::new(RecordingHost::with_players(players(20), 20));
        let mut sched = scheduler(&host);
        let now = Instant::now();

        sched.apply_probe_result(Ok(UpdateCheck::available(14006)), now);
        assert_eq!(sched.phase(), DrainPhase::UpdatePending);
        assert!(sched.state().update_available);
        assert!(!sched.state().restart_required);
        assert_eq!(sched.next_deadline(), None);
        assert!(host.chats().is_empty());

        // Population drops to 10/20 = 0.5 before the next poll
        host.set_players(players(10));
        let later = now + Duration::from_secs(1800);
        sched.apply_probe_result(Ok(UpdateCheck::available(14006)), later);

        assert_eq!(sched.phase(), DrainPhase::Draining);
        assert_eq!(sched.next_deadline(), Some(later + Duration::from_secs(120)));
        assert_eq!(host.chats().len(), 10);
    }

    #[test]
    fn test_loading_window_defers_drain() {
        let host = Arc::new(RecordingHost::with_players(players(1), 10));
        let mut sched = scheduler(&host);
        let now = Instant::now();

        sched.handle_event(HostEvent::MapEnd, now);
        assert!(sched.is_server_loading());

        sched.apply_probe_result(Ok(UpdateCheck::available(3)), now);
        assert_eq!(sched.phase(), DrainPhase::UpdatePending);
        assert_eq!(sched.next_deadline(), None);
    }

    #[test]
    fn test_full_drain_sequence() {
        let mut list = players(3);
        list.push(PlayerInfo::new(9, 109, "BOT").bot());
        let mut gone = PlayerInfo::new(8, 108, "gone");
        gone.connection = ConnectionState::Disconnected;
        list.push(gone);
        let host = Arc::new(RecordingHost::with_players(list, 10));
        let mut sched = scheduler(&host);
        let now = Instant::now();

        sched.apply_probe_result(Ok(UpdateCheck::available(14006)), now);
        assert_eq!(sched.phase(), DrainPhase::Draining);

        // Not yet due
        sched.fire_due_timers(now + Duration::from_secs(119));
        assert_eq!(sched.phase(), DrainPhase::Draining);

        let kick_at = now + Duration::from_secs(120);
        sched.fire_due_timers(kick_at);
        assert_eq!(sched.phase(), DrainPhase::Terminating);
        let commands = host.commands();
        assert_eq!(commands.len(), 3);
        assert!(commands.iter().all(|c| c.starts_with("kickid 10")));
        assert!(commands[0].ends_with(
            "Due to the game update (Version: 14006), the server is now restarting."
        ));

        sched.fire_due_timers(kick_at + Duration::from_secs(1));
        assert_eq!(sched.phase(), DrainPhase::Terminated);
        assert_eq!(host.commands().last().map(String::as_str), Some("quit"));
        assert!(sched.is_finished());
        assert!(!sched.wants_probe());
    }

    #[test]
    fn test_map_end_with_pending_update_terminates_immediately() {
        let host = Arc::new(RecordingHost::with_players(players(4), 10));
        let mut sched = scheduler(&host);
        let now = Instant::now();

        sched.apply_probe_result(Ok(UpdateCheck::available(5)), now);
        assert_eq!(sched.phase(), DrainPhase::Draining);

        let map_end = now + Duration::from_secs(30);
        sched.handle_event(HostEvent::MapEnd, map_end);
        assert_eq!(sched.phase(), DrainPhase::Terminating);
        assert_eq!(sched.next_deadline(), Some(map_end + Duration::from_secs(1)));
        assert_eq!(host.commands().len(), 4);

        sched.fire_due_timers(map_end + Duration::from_secs(1));
        assert!(sched.is_finished());
    }

    #[test]
    fn test_map_end_without_option_keeps_timer() {
        let host = Arc::new(RecordingHost::with_players(players(4), 10));
        let config = UpdaterConfig {
            shutdown_on_map_change_if_pending_update: false,
            ..Default::default()
        };
        let mut sched = DrainScheduler::new(config, Arc::clone(&host));
        let now = Instant::now();

        sched.apply_probe_result(Ok(UpdateCheck::available(5)), now);
        sched.handle_event(HostEvent::MapEnd, now + Duration::from_secs(10));
        sched.handle_event(
            HostEvent::MapStart {
                map: "de_inferno".to_string(),
            },
            now + Duration::from_secs(20),
        );

        assert_eq!(sched.phase(), DrainPhase::Draining);
        assert!(sched.state().update_available);
        assert_eq!(sched.next_deadline(), Some(now + Duration::from_secs(120)));
        assert!(host.commands().is_empty());
    }

    #[test]
    fn test_map_start_resets_pending_update() {
        let host = Arc::new(RecordingHost::with_players(players(20), 20));
        let mut sched = scheduler(&host);
        let now = Instant::now();

        sched.apply_probe_result(Ok(UpdateCheck::available(5)), now);
        assert_eq!(sched.phase(), DrainPhase::UpdatePending);

        sched.handle_event(HostEvent::MapEnd, now);
        sched.handle_event(
            HostEvent::MapStart {
                map: "de_nuke".to_string(),
            },
            now,
        );
        assert_eq!(sched.phase(), DrainPhase::Idle);
        assert!(!sched.state().update_available);
        assert!(!sched.is_server_loading());
        assert_eq!(sched.state().update_found_at, Some(now));
    }

    #[test]
    fn test_spawn_after_drain_start_notifies_late_joiner() {
        let host = Arc::new(RecordingHost::with_players(players(4), 10));
        let mut sched = scheduler(&host);
        let now = Instant::now();
        sched.apply_probe_result(Ok(UpdateCheck::available(14006)), now);

        let late = PlayerInfo::new(7, 107, "late").with_team(Team::Terrorist);
        host.upsert_player(late.clone());
        sched.handle_event(HostEvent::ClientConnected { player: late.clone() }, now);
        sched.handle_event(
            HostEvent::PlayerSpawned { player: late.clone() },
            now + Duration::from_secs(70),
        );
        sched.handle_event(
            HostEvent::PlayerSpawned { player: late.clone() },
            now + Duration::from_secs(80),
        );

        let chats = host.chats_for(late.slot);
        assert_eq!(chats.len(), 1);
        assert!(chats[0].ends_with("restart in 50 seconds"));
    }

    #[test]
    fn test_spawn_before_update_is_silent() {
        let host = Arc::new(RecordingHost::new(10));
        let mut sched = scheduler(&host);
        let p = PlayerInfo::new(1, 101, "early").with_team(Team::CounterTerrorist);

        sched.handle_event(HostEvent::ClientConnected { player: p.clone() }, Instant::now());
        sched.handle_event(HostEvent::PlayerSpawned { player: p }, Instant::now());
        assert!(host.chats().is_empty());
        assert_eq!(sched.tracker().len(), 1);
    }

    #[test]
    fn test_failed_commands_do_not_stop_the_drain() {
        let host = Arc::new(RecordingHost::with_players(players(1), 10));
        host.reject_commands(true);
        let mut sched = scheduler(&host);
        let now = Instant::now();

        sched.apply_probe_result(Ok(UpdateCheck::available(1)), now);
        sched.fire_due_timers(now + Duration::from_secs(1));
        sched.fire_due_timers(now + Duration::from_secs(2));

        assert!(sched.is_finished());
        assert_eq!(host.commands().len(), 2);
    }

    #[test]
    fn test_events_after_quit_are_ignored() {
        let host = Arc::new(RecordingHost::with_players(players(1), 10));
        let mut sched = scheduler(&host);
        let now = Instant::now();
        sched.apply_probe_result(Ok(UpdateCheck::available(1)), now);
        sched.fire_due_timers(now + Duration::from_secs(1));
        sched.fire_due_timers(now + Duration::from_secs(2));

        sched.handle_event(
            HostEvent::MapStart {
                map: "de_mirage".to_string(),
            },
            now + Duration::from_secs(3),
        );
        assert_eq!(sched.phase(), DrainPhase::Terminated);
    }
}
