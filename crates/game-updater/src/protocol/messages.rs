//! Wire message types.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use game_updater_core::{Error, HostEvent, PlayerInfo, Result, SessionId};

// =============================================================================
// Inbound (host -> updater)
// =============================================================================

/// Full player snapshot pushed by the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterUpdate {
    /// Every player in a slot, bots included
    #[serde(default)]
    pub players: Vec<PlayerInfo>,

    /// Server default maximum population
    pub max_players: i32,

    /// `sv_visiblemaxplayers`, when set
    #[serde(default)]
    pub visible_max_players: Option<i32>,
}

impl RosterUpdate {
    /// Population limit to judge fullness against: the visible maximum when
    /// it is set and positive, the default maximum otherwise.
    pub fn effective_max_players(&self) -> i32 {
        self.visible_max_players
            .filter(|max| *max > 0)
            .unwrap_or(self.max_players)
    }
}

/// One inbound line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostMessage {
    /// Player snapshot (`"type": "roster"`)
    Roster(RosterUpdate),
    /// Any other typed event
    Event(HostEvent),
}

/// Parse one inbound line.
pub fn parse_line(line: &str) -> Result<HostMessage> {
    let value: Value = serde_json::from_str(line)?;
    match value.get("type").and_then(Value::as_str) {
        Some("roster") => Ok(HostMessage::Roster(serde_json::from_value(value)?)),
        Some(_) => Ok(HostMessage::Event(serde_json::from_value(value)?)),
        None => Err(Error::Protocol("message has no \"type\" field".to_string())),
    }
}

// =============================================================================
// Outbound (updater -> host)
// =============================================================================

/// Action the host must perform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HostAction {
    /// Print a chat line to one player
    Chat {
        /// Target slot
        slot: SessionId,
        /// Text to print
        message: String,
    },
    /// Run a server console command
    Command {
        /// Command line, e.g. `quit`
        command: String,
    },
}

impl HostAction {
    /// Encode as a single protocol line, without the newline.
    pub fn to_line(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}
