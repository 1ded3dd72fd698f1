//! Configuration types for the game server updater.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use tracing::{info, warn};

use crate::{Error, Result};

/// Schema version written into freshly generated configuration files.
pub const CURRENT_CONFIG_VERSION: u32 = 2;

/// Default version-check endpoint. `{version}` is replaced with the installed
/// patch version.
pub const DEFAULT_VERSION_CHECK_URL: &str =
    "https://api.steampowered.com/ISteamApps/UpToDateCheck/v0001/?appid=730&version={version}";

/// Updater configuration loaded from a JSON or YAML file.
///
/// Immutable once loaded; changing a value requires restarting the updater.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct UpdaterConfig {
    /// Schema version of the file
    pub config_version: u32,
    /// Seconds between two version checks
    pub update_check_interval: u64,
    /// Seconds players get between the first notice and the kick
    pub shutdown_delay: u64,
    /// At or below this many players the drain delay collapses to one second
    pub min_players_instant_shutdown: u32,
    /// Below this population fraction the drain starts right away
    pub min_player_percentage_shutdown_allowed: f64,
    /// Shut down at map end when an update is pending
    pub shutdown_on_map_change_if_pending_update: bool,
    /// Version-check URL template containing `{version}`
    pub version_check_url: String,
    /// HTTP timeout for one version check, in seconds
    pub request_timeout: u64,
    /// Prefix put in front of every chat notice
    pub chat_prefix: String,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
}

impl Default for UpdaterConfig {
    fn default() -> Self {
        Self {
            config_version: CURRENT_CONFIG_VERSION,
            update_check_interval: 1800,
            shutdown_delay: 120,
            min_players_instant_shutdown: 1,
            min_player_percentage_shutdown_allowed: 0.6,
            shutdown_on_map_change_if_pending_update: true,
            version_check_url: DEFAULT_VERSION_CHECK_URL.to_string(),
            request_timeout: 10,
            chat_prefix: "[AutoUpdater]".to_string(),
            log_level: "info".to_string(),
        }
    }
}

impl UpdaterConfig {
    /// Load configuration from a file.
    ///
    /// Files ending in `.json` are parsed as JSON, anything else as YAML.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let is_json = path
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("json"))
            .unwrap_or(false);

        let config = if is_json {
            Self::from_json(&content)?
        } else {
            Self::from_yaml(&content)?
        };

        if config.config_version < CURRENT_CONFIG_VERSION {
            warn!(
                "Configuration {} uses ConfigVersion {} (current is {}); missing keys use defaults",
                path.display(),
                config.config_version,
                CURRENT_CONFIG_VERSION
            );
        }

        Ok(config)
    }

    /// Load configuration from a file, writing the defaults there first if
    /// the file does not exist yet.
    pub fn load_or_create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            return Self::from_file(path);
        }

        let config = Self::default();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, config.to_json()?)?;
        info!("Wrote default configuration to {}", path.display());

        Ok(config)
    }

    /// Parse configuration from a JSON string.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: UpdaterConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: UpdaterConfig =
            serde_yaml::from_str(yaml).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Render the configuration as pretty JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<()> {
        if self.update_check_interval == 0 {
            return Err(Error::Config("UpdateCheckInterval must be > 0".into()));
        }

        let fraction = self.min_player_percentage_shutdown_allowed;
        if !fraction.is_finite() || !(0.0..=1.0).contains(&fraction) {
            return Err(Error::Config(format!(
                "MinPlayerPercentageShutdownAllowed must be within 0..=1, got {fraction}"
            )));
        }

        if !self.version_check_url.contains("{version}") {
            return Err(Error::Config(
                "VersionCheckUrl must contain a {version} placeholder".into(),
            ));
        }

        if self.request_timeout == 0 {
            return Err(Error::Config("RequestTimeout must be > 0".into()));
        }

        Ok(())
    }

    /// Interval between two version checks.
    pub fn check_interval(&self) -> Duration {
        Duration::from_secs(self.update_check_interval)
    }

    /// Full drain delay used when the server is busy.
    pub fn drain_delay(&self) -> Duration {
        Duration::from_secs(self.shutdown_delay)
    }

    /// Timeout for one HTTP version check.
    pub fn request_timeout_duration(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }
}
