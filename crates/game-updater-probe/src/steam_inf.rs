//! Installed version lookup from `steam.inf`.

use std::path::{Path, PathBuf};

use lazy_static::lazy_static;
use regex::Regex;
use tracing::debug;

use game_updater_core::{Error, Result};

lazy_static! {
    static ref PATCH_VERSION: Regex = Regex::new(r"PatchVersion=(\d+)").unwrap();
}

/// Extract the `PatchVersion` value from `steam.inf` content.
pub fn parse_patch_version(content: &str) -> Option<&str> {
    PATCH_VERSION
        .captures(content)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Location of the game's `steam.inf`.
#[derive(Debug, Clone)]
pub struct SteamInf {
    path: PathBuf,
}

impl SteamInf {
    /// Use an explicit `steam.inf` path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Standard location below a game install: `<game_dir>/csgo/steam.inf`.
    pub fn in_game_dir(game_dir: impl AsRef<Path>) -> Self {
        Self::new(game_dir.as_ref().join("csgo").join("steam.inf"))
    }

    /// Path being read.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the installed patch version.
    ///
    /// Fails with [`Error::LocalVersionUnavailable`] when the file is missing,
    /// unreadable, or has no `PatchVersion` key.
    pub async fn patch_version(&self) -> Result<String> {
        let content = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            Error::LocalVersionUnavailable(format!(
                "cannot read {}: {e}",
                self.path.display()
            ))
        })?;

        let version = parse_patch_version(&content).ok_or_else(|| {
            Error::LocalVersionUnavailable(format!(
                "no PatchVersion key in {}",
                self.path.display()
            ))
        })?;

        debug!("Installed patch version: {}", version);
        Ok(version.to_string())
    }
}
