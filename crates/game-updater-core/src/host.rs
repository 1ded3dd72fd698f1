//! Host capability interface.
//!
//! The updater never reaches into the game server directly. The host hands it
//! a [`GameHost`] for reading players and issuing actions, and delivers
//! [`HostEvent`]s as things happen on the server.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::{PlayerInfo, Result, SessionId};

/// Actions and queries the updater may perform against the game server.
///
/// Implementations must not block: they are called from the updater's
/// scheduling loop.
pub trait GameHost {
    /// Players currently known to the server, bots included.
    fn players(&self) -> Vec<PlayerInfo>;

    /// Visible maximum population, or the server default when unset.
    fn max_players(&self) -> i32;

    /// Print a chat line to one player.
    fn send_chat(&self, slot: SessionId, message: &str) -> Result<()>;

    /// Run a server console command (`kickid ...`, `quit`).
    fn execute_command(&self, command: &str) -> Result<()>;
}

impl<T: GameHost + ?Sized> GameHost for Arc<T> {
    fn players(&self) -> Vec<PlayerInfo> {
        (**self).players()
    }

    fn max_players(&self) -> i32 {
        (**self).max_players()
    }

    fn send_chat(&self, slot: SessionId, message: &str) -> Result<()> {
        (**self).send_chat(slot, message)
    }

    fn execute_command(&self, command: &str) -> Result<()> {
        (**self).execute_command(command)
    }
}

/// Events the host delivers to the updater.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HostEvent {
    /// A client occupied a slot
    ClientConnected {
        /// The connecting player
        player: PlayerInfo,
    },
    /// A client left
    ClientDisconnected {
        /// Slot that was freed
        slot: SessionId,
    },
    /// A player spawned into the world
    PlayerSpawned {
        /// The spawning player, with current team
        player: PlayerInfo,
    },
    /// A new map finished loading
    MapStart {
        /// Map name
        map: String,
    },
    /// The current map is ending
    MapEnd,
    /// The server's Steam API connection became active
    SteamApiActivated,
    /// Hibernation was switched on or off
    HibernationChanged {
        /// Whether the server now hibernates
        hibernating: bool,
    },
}
