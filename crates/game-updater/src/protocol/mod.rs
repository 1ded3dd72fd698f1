//! Host Bridge Protocol
//!
//! Line-delimited JSON spoken with the plugin shim running inside the game
//! server: events and roster snapshots come in on stdin, chat lines and
//! console commands go out on stdout.

pub mod messages;

pub use messages::{parse_line, HostAction, HostMessage, RosterUpdate};
