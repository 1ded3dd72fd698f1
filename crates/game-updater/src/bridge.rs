//! Stdio host bridge.
//!
//! [`StdioHost`] implements the host capability on top of the line protocol.
//! Reads are served from the last roster the host pushed (kept current by
//! connect/disconnect/spawn events); actions are queued for a writer task so
//! the updater loop never waits on stdout.

use std::sync::{Arc, PoisonError, RwLock};

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use game_updater_core::{Error, GameHost, HostEvent, PlayerInfo, Result, SessionId};

use crate::protocol::{parse_line, HostAction, HostMessage, RosterUpdate};

#[derive(Debug, Default)]
struct Roster {
    players: Vec<PlayerInfo>,
    max_players: i32,
}

/// Host capability backed by the stdio protocol.
#[derive(Debug)]
pub struct StdioHost {
    roster: RwLock<Roster>,
    outbound: mpsc::UnboundedSender<HostAction>,
}

impl StdioHost {
    /// Create a host that queues actions on `outbound`.
    pub fn new(outbound: mpsc::UnboundedSender<HostAction>) -> Self {
        Self {
            roster: RwLock::new(Roster::default()),
            outbound,
        }
    }

    /// Replace the known players with a snapshot.
    pub fn apply_roster(&self, update: RosterUpdate) {
        let max_players = update.effective_max_players();
        let mut roster = self.roster.write().unwrap_or_else(PoisonError::into_inner);
        debug!(
            "Roster: {} players, max {}",
            update.players.len(),
            max_players
        );
        roster.players = update.players;
        roster.max_players = max_players;
    }

    /// Keep the roster in step with an event.
    pub fn observe(&self, event: &HostEvent) {
        let mut roster = self.roster.write().unwrap_or_else(PoisonError::into_inner);
        match event {
            HostEvent::ClientConnected { player } | HostEvent::PlayerSpawned { player } => {
                roster.players.retain(|p| p.slot != player.slot);
                roster.players.push(player.clone());
            }
            HostEvent::ClientDisconnected { slot } => {
                roster.players.retain(|p| p.slot != *slot);
            }
            _ => {}
        }
    }

    fn queue(&self, action: HostAction) -> Result<()> {
        self.outbound
            .send(action)
            .map_err(|e| Error::HostActionFailed(format!("host bridge closed, dropped {:?}", e.0)))
    }
}

impl GameHost for StdioHost {
    fn players(&self) -> Vec<PlayerInfo> {
        self.roster
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .players
            .clone()
    }

    fn max_players(&self) -> i32 {
        self.roster
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .max_players
    }

    fn send_chat(&self, slot: SessionId, message: &str) -> Result<()> {
        self.queue(HostAction::Chat {
            slot,
            message: message.to_string(),
        })
    }

    fn execute_command(&self, command: &str) -> Result<()> {
        self.queue(HostAction::Command {
            command: command.to_string(),
        })
    }
}

/// Read inbound lines until EOF, updating `host` and forwarding events.
///
/// Malformed lines are logged and skipped. Stops early when the event
/// receiver is gone.
pub async fn read_host_messages<R>(
    reader: R,
    host: Arc<StdioHost>,
    events: mpsc::Sender<HostEvent>,
) -> Result<()>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match parse_line(line) {
            Ok(HostMessage::Roster(update)) => host.apply_roster(update),
            Ok(HostMessage::Event(event)) => {
                host.observe(&event);
                if events.send(event).await.is_err() {
                    debug!("Updater stopped, no longer reading host messages");
                    return Ok(());
                }
            }
            Err(e) => warn!("Skipping malformed host message: {}", e),
        }
    }

    info!("Host closed its end of the bridge");
    Ok(())
}

/// Write queued actions as lines until every sender is dropped.
///
/// Returns the writer once the queue is drained.
pub async fn write_host_actions<W>(
    mut writer: W,
    mut actions: mpsc::UnboundedReceiver<HostAction>,
) -> Result<W>
where
    W: AsyncWrite + Unpin,
{
    while let Some(action) = actions.recv().await {
        let mut line = action.to_line()?;
        line.push('\n');
        writer.write_all(line.as_bytes()).await?;
        writer.flush().await?;
    }

    Ok(writer)
}
