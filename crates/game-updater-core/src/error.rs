//! Error types for the game server updater.

use thiserror::Error;

/// Main error type for updater operations.
#[derive(Debug, Error)]
pub enum Error {
    /// The installed version tag could not be read (file or key missing)
    #[error("Local version unavailable: {0}")]
    LocalVersionUnavailable(String),

    /// The remote version-check service failed or returned a bad body
    #[error("Remote version check unavailable: {0}")]
    RemoteUnavailable(String),

    /// The host rejected a chat, kick or quit action
    #[error("Host action failed: {0}")]
    HostActionFailed(String),

    /// Malformed message on the host bridge
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Generic error with custom message
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Whether this error belongs to a single probe cycle and should simply
    /// be retried on the next poll.
    pub fn is_probe_failure(&self) -> bool {
        matches!(
            self,
            Error::LocalVersionUnavailable(_) | Error::RemoteUnavailable(_)
        )
    }
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;
