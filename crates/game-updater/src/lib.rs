//! Game Updater Library
//!
//! This library contains the host bridge: the line protocol spoken with the
//! game server plugin shim, the [`StdioHost`] capability built on it, and
//! command line and logging setup. The actual binary is in main.rs.

pub mod bridge;
pub mod cli;
pub mod logging;
pub mod protocol;

// Re-export commonly used types
pub use bridge::{read_host_messages, write_host_actions, StdioHost};
pub use cli::CliArgs;
pub use logging::LogLevelHandle;
pub use protocol::{HostAction, HostMessage, RosterUpdate};
