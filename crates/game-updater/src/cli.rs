//! Command line arguments.

use std::path::PathBuf;

use clap::Parser;

/// Parsed command line.
#[derive(Debug, Clone, PartialEq, Eq, Parser)]
#[command(name = "game-updater", version)]
#[command(about = "Watches for game server releases and drains players before restarting")]
pub struct CliArgs {
    /// Configuration file (.json or .yaml)
    #[arg(long = "config", value_name = "PATH", default_value = "game-updater.json")]
    pub config_path: PathBuf,

    /// Game install directory containing csgo/steam.inf
    #[arg(long, value_name = "PATH", default_value = ".")]
    pub game_dir: PathBuf,

    /// Explicit steam.inf path, overrides --game-dir
    #[arg(long, value_name = "PATH")]
    pub steam_inf: Option<PathBuf>,
}
