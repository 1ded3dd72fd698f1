//! Session and player types.

use serde::{Deserialize, Serialize};

/// Identifier of a connected player session.
///
/// This is the host's player slot, which stays stable for the lifetime of one
/// connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(u32);

impl SessionId {
    /// Create a session ID from a host slot.
    pub fn new(slot: u32) -> Self {
        Self(slot)
    }

    /// Get the underlying slot.
    pub fn slot(&self) -> u32 {
        self.0
    }
}

impl From<u32> for SessionId {
    fn from(slot: u32) -> Self {
        Self(slot)
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Team a player is assigned to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Team {
    /// Not on any team yet
    #[default]
    Unassigned,
    /// Spectating
    Spectator,
    /// Terrorists
    Terrorist,
    /// Counter-terrorists
    CounterTerrorist,
}

impl Team {
    /// Whether the team actually plays (above spectator).
    pub fn is_playing(&self) -> bool {
        *self > Team::Spectator
    }
}

/// Connection state reported by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionState {
    /// Slot is not connected
    NotConnected,
    /// Fully connected
    #[default]
    Connected,
    /// Still connecting
    Connecting,
    /// Reconnecting after a map change or timeout
    Reconnecting,
    /// Disconnecting
    Disconnecting,
    /// Disconnected
    Disconnected,
    /// Reserved slot
    Reserved,
}

impl ConnectionState {
    /// Whether a kick command can reach this player.
    pub fn is_kickable(&self) -> bool {
        matches!(
            self,
            ConnectionState::Connected
                | ConnectionState::Connecting
                | ConnectionState::Reconnecting
        )
    }
}

/// Host-side view of one player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerInfo {
    /// Player slot
    pub slot: SessionId,
    /// User id used by `kickid`
    pub user_id: i32,
    /// Display name
    #[serde(default)]
    pub name: String,
    /// Automated bot
    #[serde(default)]
    pub is_bot: bool,
    /// Observer feed (SourceTV/HLTV)
    #[serde(default)]
    pub is_hltv: bool,
    /// Current team
    #[serde(default)]
    pub team: Team,
    /// Connection state
    #[serde(default)]
    pub connection: ConnectionState,
}

impl PlayerInfo {
    /// Create a connected, human player on no team.
    pub fn new(slot: u32, user_id: i32, name: impl Into<String>) -> Self {
        Self {
            slot: SessionId::new(slot),
            user_id,
            name: name.into(),
            is_bot: false,
            is_hltv: false,
            team: Team::Unassigned,
            connection: ConnectionState::Connected,
        }
    }

    /// Set the team.
    pub fn with_team(mut self, team: Team) -> Self {
        self.team = team;
        self
    }

    /// Mark as bot.
    pub fn bot(mut self) -> Self {
        self.is_bot = true;
        self
    }

    /// Mark as observer feed.
    pub fn hltv(mut self) -> Self {
        self.is_hltv = true;
        self
    }

    /// A real player: neither a bot nor an observer feed.
    pub fn is_eligible(&self) -> bool {
        !self.is_bot && !self.is_hltv
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_id_display() {
        let id = SessionId::new(7);
        assert_eq!(format!("{id}"), "7");
        assert_eq!(id.slot(), 7);
        assert_eq!(SessionId::from(7), id);
    }

    #[test]
    fn test_team_is_playing() {
        assert!(!Team::Unassigned.is_playing());
        assert!(!Team::Spectator.is_playing());
        assert!(Team::Terrorist.is_playing());
        assert!(Team::CounterTerrorist.is_playing());
    }

    #[test]
    fn test_kickable_states() {
        assert!(ConnectionState::Connected.is_kickable());
        assert!(ConnectionState::Connecting.is_kickable());
        assert!(ConnectionState::Reconnecting.is_kickable());
        assert!(!ConnectionState::Disconnected.is_kickable());
        assert!(!ConnectionState::NotConnected.is_kickable());
    }

    #[test]
    fn test_eligibility() {
        assert!(PlayerInfo::new(1, 10, "alice").is_eligible());
        assert!(!PlayerInfo::new(2, 11, "BOT Bob").bot().is_eligible());
        assert!(!PlayerInfo::new(3, 12, "SourceTV").hltv().is_eligible());
    }

    #[test]
    fn test_player_deserialization_defaults() {
        let json = r#"{"slot": 4, "user_id": 21}"#;
        let player: PlayerInfo = serde_json::from_str(json).unwrap();
        assert_eq!(player.slot, SessionId::new(4));
        assert!(!player.is_bot);
        assert_eq!(player.team, Team::Unassigned);
        assert_eq!(player.connection, ConnectionState::Connected);
    }

    #[test]
    fn test_player_serialization() {
        let player = PlayerInfo::new(1, 2, "carol").with_team(Team::CounterTerrorist);
        let json = serde_json::to_string(&player).unwrap();
        assert!(json.contains("\"team\":\"counter_terrorist\""));

        let back: PlayerInfo = serde_json::from_str(&json).unwrap();
        assert_eq!(back, player);
    }
}
