//! The version probe polled by the scheduler.

use std::future::Future;

use tracing::{debug, info};

use game_updater_core::{Result, UpdateCheck, UpdaterConfig};

use crate::remote::RemoteVersionClient;
use crate::steam_inf::SteamInf;

/// A single "is there a newer version?" check.
///
/// Implementations perform I/O only; they never touch updater state. The
/// returned future runs off the scheduling loop and its result is handed back
/// to the loop afterwards.
pub trait VersionProbe: Send + Sync + 'static {
    /// Check whether a newer version than the installed one exists.
    fn check_for_update(&self) -> impl Future<Output = Result<UpdateCheck>> + Send;
}

/// Probe that reads `steam.inf` and asks the Steam up-to-date endpoint.
#[derive(Debug, Clone)]
pub struct SteamVersionProbe {
    local: SteamInf,
    remote: RemoteVersionClient,
}

impl SteamVersionProbe {
    /// Create a probe from its two halves.
    pub fn new(local: SteamInf, remote: RemoteVersionClient) -> Self {
        Self { local, remote }
    }

    /// Create a probe using the configured endpoint and timeout.
    pub fn from_config(config: &UpdaterConfig, local: SteamInf) -> Result<Self> {
        let remote = RemoteVersionClient::new(
            config.version_check_url.clone(),
            config.request_timeout_duration(),
        )?;
        info!(
            "Version probe reading {} and querying {}",
            local.path().display(),
            config.version_check_url
        );
        Ok(Self::new(local, remote))
    }
}

impl VersionProbe for SteamVersionProbe {
    fn check_for_update(&self) -> impl Future<Output = Result<UpdateCheck>> + Send {
        async move {
            let version = self.local.patch_version().await?;
            let check = self.remote.check(&version).await?;
            debug!(
                "Installed {} -> available={}, required={}",
                version, check.available, check.required_version
            );
            Ok(check)
        }
    }
}
