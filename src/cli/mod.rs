//! Command-line interface for track-resolver.
//!
//! Resolves audio files against the catalog and prints the result, plus a
//! few helpers for checking the fingerprint tooling and the config file.

mod commands;

pub use commands::{Cli, Commands, run_command};
