//! `vulnsync` binary entry point.

use clap::Parser;
use tracing::{debug, error};

use vulnsync_cli::cli::{Cli, Commands};
use vulnsync_cli::commands::{self, ConfigSource};
use vulnsync_cli::error::CliError;
use vulnsync_cli::logging::init_tracing;
use vulnsync_cli::output::OutputWriter;
use vulnsync_core::config::GeneralConfig;

#[tokio::main]
async fn main() {
    // A missing .env is normal; anything set in the real environment wins.
    let dotenv = dotenvy::dotenv();

    let cli = Cli::parse();
    let writer = OutputWriter::new(cli.output);

    let code = match run(cli, &writer, dotenv.is_ok()).await {
        Ok(()) => 0,
        Err(e) => {
            error!(error = %e, "command failed");
            eprintln!("error: {e}");
            e.exit_code()
        }
    };
    std::process::exit(code);
}

async fn run(cli: Cli, writer: &OutputWriter, dotenv_loaded: bool) -> Result<(), CliError> {
    let source = ConfigSource::resolve(cli.config.as_deref());
    let loaded = source.load().await;

    let mut general = match &loaded {
        Ok(config) => config.general.clone(),
        Err(_) => GeneralConfig::default(),
    };
    if let Some(level) = cli.log_level {
        general.log_level = level;
    }
    init_tracing(&general).map_err(|e| CliError::Config(e.to_string()))?;
    vulnsync_core::metrics::describe_all();
    debug!(source = %source, dotenv_loaded, "configuration resolved");

    // `config` reports load failures itself.
    match cli.command {
        Commands::Config(args) => commands::config::execute(args, &source, writer).await,
        Commands::Sync(args) => commands::sync::execute(args, &loaded?, writer).await,
        Commands::Scan(args) => commands::scan::execute(args, &loaded?, writer).await,
        Commands::Status => commands::status::execute(&loaded?, writer).await,
    }
}
