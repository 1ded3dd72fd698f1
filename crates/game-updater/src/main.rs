//! # Game Updater
//!
//! Watches for a new release of the game server binary and drains the server
//! before it restarts.
//!
//! ## Overview
//!
//! The binary runs next to the game server and talks to a small plugin shim
//! over stdin/stdout:
//! - Polls the Steam up-to-date endpoint with the installed patch version
//! - Warns players with a countdown once an update is out
//! - Kicks everyone and sends `quit` when the countdown ends
//!
//! ## Architecture
//!
//! This is Layer 3 - the binary that ties together:
//! - game-updater-core: Core types and configuration
//! - game-updater-probe: Version checks
//! - game-updater-drain: Drain state machine and loop

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tokio::io::BufReader;
use tokio::sync::mpsc;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use game_updater::{logging, read_host_messages, write_host_actions, CliArgs, StdioHost};
use game_updater_core::UpdaterConfig;
use game_updater_drain::{DrainScheduler, UpdaterRuntime};
use game_updater_probe::{SteamInf, SteamVersionProbe};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse command line arguments
    let args = CliArgs::parse();

    // Initialize logging; stdout carries the host protocol
    let (subscriber, log_level) =
        logging::subscriber(std::io::stderr, EnvFilter::try_from_default_env().ok());
    subscriber.init();

    let config = UpdaterConfig::load_or_create(&args.config_path).with_context(|| {
        format!(
            "failed to load configuration from {}",
            args.config_path.display()
        )
    })?;
    log_level.apply_config_level(&config.log_level)?;

    tracing::info!(
        "Game Updater v{} starting with configuration {}",
        env!("CARGO_PKG_VERSION"),
        args.config_path.display()
    );

    let steam_inf = match args.steam_inf {
        Some(path) => SteamInf::new(path),
        None => SteamInf::in_game_dir(&args.game_dir),
    };
    let probe = SteamVersionProbe::from_config(&config, steam_inf)?;

    let (action_tx, action_rx) = mpsc::unbounded_channel();
    let (event_tx, event_rx) = mpsc::channel(256);
    let host = Arc::new(StdioHost::new(action_tx));

    let writer = tokio::spawn(write_host_actions(tokio::io::stdout(), action_rx));
    let reader = tokio::spawn(read_host_messages(
        BufReader::new(tokio::io::stdin()),
        Arc::clone(&host),
        event_tx,
    ));

    let scheduler = DrainScheduler::new(config, Arc::clone(&host));
    let finished = UpdaterRuntime::new(scheduler, probe).run(event_rx).await;

    tracing::info!("Game Updater stopped in phase {:?}", finished.phase());

    // Dropping every host handle closes the action queue so the writer can
    // flush and exit.
    drop(finished);
    reader.abort();
    let _ = reader.await;
    drop(host);
    writer.await??;

    Ok(())
}
