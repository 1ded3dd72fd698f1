//! Test doubles for the host and the version probe.
//!
//! Used by this crate's tests and by integration tests of the binary.

use std::collections::VecDeque;
use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use game_updater_core::{Error, GameHost, PlayerInfo, Result, SessionId, UpdateCheck};
use game_updater_probe::VersionProbe;

/// In-memory host that records every action.
#[derive(Debug)]
pub struct RecordingHost {
    players: Mutex<Vec<PlayerInfo>>,
    max_players: Mutex<i32>,
    chats: Mutex<Vec<(SessionId, String)>>,
    commands: Mutex<Vec<String>>,
    reject_commands: AtomicBool,
}

impl RecordingHost {
    /// Create an empty host with a maximum population.
    pub fn new(max_players: i32) -> Self {
        Self {
            players: Mutex::new(Vec::new()),
            max_players: Mutex::new(max_players),
            chats: Mutex::new(Vec::new()),
            commands: Mutex::new(Vec::new()),
            reject_commands: AtomicBool::new(false),
        }
    }

    /// Create a host already holding players.
    pub fn with_players(players: Vec<PlayerInfo>, max_players: i32) -> Self {
        let host = Self::new(max_players);
        host.set_players(players);
        host
    }

    /// Replace the player list.
    pub fn set_players(&self, players: Vec<PlayerInfo>) {
        *self.players.lock().unwrap() = players;
    }

    /// Add or replace one player.
    pub fn upsert_player(&self, player: PlayerInfo) {
        let mut players = self.players.lock().unwrap();
        players.retain(|p| p.slot != player.slot);
        players.push(player);
    }

    /// Remove a player.
    pub fn remove_player(&self, slot: SessionId) {
        self.players.lock().unwrap().retain(|p| p.slot != slot);
    }

    /// Change the maximum population.
    pub fn set_max_players(&self, max_players: i32) {
        *self.max_players.lock().unwrap() = max_players;
    }

    /// Make every console command fail.
    pub fn reject_commands(&self, reject: bool) {
        self.reject_commands.store(reject, Ordering::SeqCst);
    }

    /// All chat lines sent so far.
    pub fn chats(&self) -> Vec<(SessionId, String)> {
        self.chats.lock().unwrap().clone()
    }

    /// Chat lines sent to one slot.
    pub fn chats_for(&self, slot: SessionId) -> Vec<String> {
        self.chats
            .lock()
            .unwrap()
            .iter()
            .filter(|(s, _)| *s == slot)
            .map(|(_, m)| m.clone())
            .collect()
    }

    /// All console commands attempted so far.
    pub fn commands(&self) -> Vec<String> {
        self.commands.lock().unwrap().clone()
    }
}

impl GameHost for RecordingHost {
    fn players(&self) -> Vec<PlayerInfo> {
        self.players.lock().unwrap().clone()
    }

    fn max_players(&self) -> i32 {
        *self.max_players.lock().unwrap()
    }

    fn send_chat(&self, slot: SessionId, message: &str) -> Result<()> {
        self.chats.lock().unwrap().push((slot, message.to_string()));
        Ok(())
    }

    fn execute_command(&self, command: &str) -> Result<()> {
        self.commands.lock().unwrap().push(command.to_string());
        if self.reject_commands.load(Ordering::SeqCst) {
            return Err(Error::HostActionFailed(command.to_string()));
        }
        Ok(())
    }
}

/// Canned probe outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// A newer version is required
    Update(i64),
    /// Installed version is current
    UpToDate,
    /// `steam.inf` missing
    LocalMissing,
    /// Remote service failed
    RemoteDown,
    /// The check itself panics
    Panic,
}

impl ProbeOutcome {
    fn into_result(self) -> Result<UpdateCheck> {
        match self {
            ProbeOutcome::Update(version) => Ok(UpdateCheck::available(version)),
            ProbeOutcome::UpToDate => Ok(UpdateCheck::up_to_date()),
            ProbeOutcome::LocalMissing => Err(Error::LocalVersionUnavailable(
                "steam.inf not found".to_string(),
            )),
            ProbeOutcome::RemoteDown => Err(Error::RemoteUnavailable(
                "HTTP request failed with status code: 503".to_string(),
            )),
            ProbeOutcome::Panic => panic!("update check panicked"),
        }
    }
}

/// Probe replaying a script; the last outcome repeats once the script runs out.
#[derive(Debug)]
pub struct ScriptedProbe {
    script: Mutex<VecDeque<ProbeOutcome>>,
    last: Mutex<ProbeOutcome>,
    calls: AtomicUsize,
}

impl ScriptedProbe {
    /// Create a probe from a script of outcomes.
    pub fn new(script: impl IntoIterator<Item = ProbeOutcome>) -> Self {
        Self {
            script: Mutex::new(script.into_iter().collect()),
            last: Mutex::new(ProbeOutcome::UpToDate),
            calls: AtomicUsize::new(0),
        }
    }

    /// Probe that always returns the same outcome.
    pub fn always(outcome: ProbeOutcome) -> Self {
        Self::new([outcome])
    }

    /// How many checks have run.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn next_outcome(&self) -> ProbeOutcome {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut last = self.last.lock().unwrap();
        if let Some(outcome) = self.script.lock().unwrap().pop_front() {
            *last = outcome;
        }
        *last
    }
}

impl VersionProbe for ScriptedProbe {
    fn check_for_update(&self) -> impl Future<Output = Result<UpdateCheck>> + Send {
        let outcome = self.next_outcome();
        async move { outcome.into_result() }
    }
}
