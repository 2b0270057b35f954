//! vulnsync CLI library
//!
//! The `vulnsync` binary is a thin wrapper over these modules so that
//! command handlers can be driven from integration tests.
//!
//! # Module Structure
//!
//! - [`cli`]: clap argument definitions
//! - [`commands`]: one handler per subcommand
//! - [`error`]: `CliError` and exit codes
//! - [`logging`]: tracing subscriber setup
//! - [`output`]: text / JSON rendering

pub mod cli;
pub mod commands;
pub mod error;
pub mod logging;
pub mod output;
