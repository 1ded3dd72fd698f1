//! Tracker for connected player sessions and their notification state.

use std::collections::HashMap;

use tracing::debug;

use game_updater_core::{PlayerInfo, SessionId};

/// One tracked session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackedSession {
    /// Session ID (player slot)
    pub id: SessionId,

    /// Whether the player has seen the update notice on this map
    pub notified: bool,
}

/// Set of connected real players and whether each has been notified.
#[derive(Debug, Default)]
pub struct SessionTracker {
    sessions: HashMap<SessionId, TrackedSession>,
}

impl SessionTracker {
    /// Create an empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Track a newly connected player.
    ///
    /// Bots and observer feeds are ignored. Connecting an already tracked
    /// session keeps the existing entry. Returns true when a session was added.
    pub fn on_connect(&mut self, player: &PlayerInfo) -> bool {
        if !player.is_eligible() {
            debug!("Ignoring connect of non-player slot {}", player.slot);
            return false;
        }

        if self.sessions.contains_key(&player.slot) {
            return false;
        }

        self.sessions.insert(
            player.slot,
            TrackedSession {
                id: player.slot,
                notified: false,
            },
        );
        true
    }

    /// Forget a session. No-op if it is not tracked.
    pub fn on_disconnect(&mut self, id: SessionId) -> bool {
        self.sessions.remove(&id).is_some()
    }

    /// Decide whether a spawning player must be told about the update now.
    ///
    /// Returns true, and marks the session notified, when an update is
    /// available, the player is a real player on a playing team, and has not
    /// been notified on this map yet.
    pub fn on_spawn(&mut self, player: &PlayerInfo, update_available: bool) -> bool {
        if !update_available || !player.is_eligible() || !player.team.is_playing() {
            return false;
        }

        let session = self.sessions.entry(player.slot).or_insert(TrackedSession {
            id: player.slot,
            notified: false,
        });
        if session.notified {
            return false;
        }

        session.notified = true;
        true
    }

    /// Mark a session as notified, tracking it if needed.
    pub fn mark_notified(&mut self, id: SessionId) {
        self.sessions
            .entry(id)
            .or_insert(TrackedSession {
                id,
                notified: false,
            })
            .notified = true;
    }

    /// Whether a session has been notified.
    pub fn is_notified(&self, id: SessionId) -> bool {
        self.sessions.get(&id).map(|s| s.notified).unwrap_or(false)
    }

    /// Clear every notified flag; called when a new map starts.
    pub fn reset_for_new_map(&mut self) {
        for session in self.sessions.values_mut() {
            session.notified = false;
        }
    }

    /// Whether a session is tracked.
    pub fn contains(&self, id: SessionId) -> bool {
        self.sessions.contains_key(&id)
    }

    /// Get a tracked session.
    pub fn get(&self, id: SessionId) -> Option<&TrackedSession> {
        self.sessions.get(&id)
    }

    /// Number of tracked sessions.
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Whether no sessions are tracked.
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Iterate over tracked sessions.
    pub fn sessions(&self) -> impl Iterator<Item = &TrackedSession> {
        self.sessions.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use game_updater_core::Team;

    fn player(slot: u32) -> PlayerInfo {
        PlayerInfo::new(slot, slot as i32 + 100, format!("player{slot}"))
    }

    #[test]
    fn test_tracker_create() {
        let tracker = SessionTracker::new();
        assert!(tracker.is_empty());
        assert_eq!(tracker.len(), 0);
    }

    #[test]
    fn test_connect_adds_unnotified_session() {
        let mut tracker = SessionTracker::new();
        assert!(tracker.on_connect(&player(1)));
        assert_eq!(tracker.len(), 1);
        assert!(!tracker.is_notified(SessionId::new(1)));
    }

    #[test]
    fn test_connect_is_idempotent() {
        let mut tracker = SessionTracker::new();
        tracker.on_connect(&player(1));
        tracker.mark_notified(SessionId::new(1));

        assert!(!tracker.on_connect(&player(1)));
        assert_eq!(tracker.len(), 1);
        // The second connect does not wipe the notified flag
        assert!(tracker.is_notified(SessionId::new(1)));
    }

    #[test]
    fn test_connect_ignores_bots_and_hltv() {
        let mut tracker = SessionTracker::new();
        assert!(!tracker.on_connect(&player(1).bot()));
        assert!(!tracker.on_connect(&player(2).hltv()));
        assert!(tracker.is_empty());
    }

    #[test]
    fn test_disconnect() {
        let mut tracker = SessionTracker::new();
        tracker.on_connect(&player(1));

        assert!(tracker.on_disconnect(SessionId::new(1)));
        assert!(tracker.is_empty());
        // Absent session is a no-op
        assert!(!tracker.on_disconnect(SessionId::new(1)));
    }

    #[test]
    fn test_spawn_without_update_does_nothing() {
        let mut tracker = SessionTracker::new();
        let p = player(1).with_team(Team::Terrorist);
        tracker.on_connect(&p);

        assert!(!tracker.on_spawn(&p, false));
        assert!(!tracker.is_notified(p.slot));
    }

    #[test]
    fn test_spawn_notifies_once() {
        let mut tracker = SessionTracker::new();
        let p = player(1).with_team(Team::CounterTerrorist);
        tracker.on_connect(&p);

        assert!(tracker.on_spawn(&p, true));
        assert!(!tracker.on_spawn(&p, true));
        assert!(tracker.is_notified(p.slot));
    }

    #[test]
    fn test_spawn_skips_spectators_and_bots() {
        let mut tracker = SessionTracker::new();
        let spectator = player(1).with_team(Team::Spectator);
        let bot = player(2).with_team(Team::Terrorist).bot();

        assert!(!tracker.on_spawn(&spectator, true));
        assert!(!tracker.on_spawn(&bot, true));
    }

    #[test]
    fn test_spawn_tracks_unknown_player() {
        let mut tracker = SessionTracker::new();
        let p = player(5).with_team(Team::Terrorist);

        assert!(tracker.on_spawn(&p, true));
        assert!(tracker.contains(p.slot));
    }

    #[test]
    fn test_reset_for_new_map() {
        let mut tracker = SessionTracker::new();
        let p = player(1).with_team(Team::Terrorist);
        tracker.on_connect(&p);
        tracker.mark_notified(p.slot);

        tracker.reset_for_new_map();
        assert!(tracker.contains(p.slot));
        assert!(!tracker.is_notified(p.slot));

        // Exactly one notification after the reset
        assert!(tracker.on_spawn(&p, true));
        assert!(!tracker.on_spawn(&p, true));
    }
}
