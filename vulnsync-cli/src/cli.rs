//! CLI argument parsing using clap derive API
//!
//! Purely declarative: no side effects or I/O.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// vulnsync -- keep a Jira epic in step with `yarn audit` findings.
///
/// Runs against the same tracking store concurrently are not supported;
/// serialise them in CI.
#[derive(Parser, Debug)]
#[command(name = "vulnsync", version, about, long_about = None)]
pub struct Cli {
    /// Path to the vulnsync.toml configuration file.
    ///
    /// When omitted, ./vulnsync.toml is used if present, otherwise
    /// defaults plus VULNSYNC_* environment variables.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Override log level.
    #[arg(
        long,
        global = true,
        value_parser = ["trace", "debug", "info", "warn", "error"]
    )]
    pub log_level: Option<String>,

    /// Output format.
    #[arg(long, global = true, default_value = "text")]
    pub output: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Supported output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table / text output.
    Text,
    /// Machine-readable JSON.
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Reconcile the tracking store with the epic, then file tickets for new findings.
    Sync(SyncArgs),

    /// Run the scanner (or read a captured report) and print the parsed findings.
    Scan(ScanArgs),

    /// Show tracked entries next to the epic's current children.
    Status,

    /// Manage configuration.
    Config(ConfigArgs),
}

// ---- sync ----

/// Reconcile and create tickets.
#[derive(Args, Debug, Default)]
pub struct SyncArgs {
    /// Report what would change without creating tickets or writing the store.
    #[arg(long)]
    pub dry_run: bool,

    #[command(flatten)]
    pub source: AuditSourceArgs,
}

// ---- scan ----

/// Parse-only scan.
#[derive(Args, Debug, Default)]
pub struct ScanArgs {
    #[command(flatten)]
    pub source: AuditSourceArgs,
}

/// Where audit output comes from.
#[derive(Args, Debug, Default, Clone)]
pub struct AuditSourceArgs {
    /// Read captured audit output from a file instead of running the scanner ("-" for stdin).
    #[arg(long)]
    pub input: Option<PathBuf>,

    /// Force the output format family (classic, berry, modern).
    #[arg(long)]
    pub format: Option<String>,
}

// ---- config ----

/// Manage vulnsync configuration.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Validate the configuration and report errors.
    Validate,
    /// Show the effective configuration (file + env overrides + defaults).
    Show {
        /// Show only a specific section (general, jira, scanner, tracking).
        #[arg(long)]
        section: Option<String>,
    },
}
