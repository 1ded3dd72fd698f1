//! Log subscriber setup.
//!
//! The subscriber is installed before the configuration is read so that
//! config loading can log. Its filter starts from `RUST_LOG` (or `info`) and
//! is swapped for the configured `LogLevel` afterwards, unless `RUST_LOG`
//! was set.

use tracing::Subscriber;
use tracing_subscriber::fmt::{self, MakeWriter};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{reload, EnvFilter, Registry};

use game_updater_core::{Error, Result};

/// Filter used until the configuration is loaded.
pub const BOOTSTRAP_LOG_LEVEL: &str = "info";

/// Handle for replacing the active filter once the configuration is known.
#[derive(Debug)]
pub struct LogLevelHandle {
    handle: reload::Handle<EnvFilter, Registry>,
    from_env: bool,
}

impl LogLevelHandle {
    /// Apply the configured level. Returns `false` when `RUST_LOG` takes
    /// precedence and nothing changed.
    pub fn apply_config_level(&self, level: &str) -> Result<bool> {
        if self.from_env {
            return Ok(false);
        }

        let filter = EnvFilter::try_new(level)
            .map_err(|e| Error::Config(format!("invalid LogLevel {level:?}: {e}")))?;
        self.handle
            .reload(filter)
            .map_err(|e| Error::Other(format!("failed to apply LogLevel: {e}")))?;

        Ok(true)
    }
}

/// Build the subscriber writing to `make_writer`.
///
/// `env_filter` is the filter from `RUST_LOG`, if any.
pub fn subscriber<W>(
    make_writer: W,
    env_filter: Option<EnvFilter>,
) -> (impl Subscriber + Send + Sync, LogLevelHandle)
where
    W: for<'a> MakeWriter<'a> + Send + Sync + 'static,
{
    let from_env = env_filter.is_some();
    let (filter, handle) =
        reload::Layer::new(env_filter.unwrap_or_else(|| EnvFilter::new(BOOTSTRAP_LOG_LEVEL)));

    let subscriber = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(make_writer));

    (subscriber, LogLevelHandle { handle, from_env })
}
