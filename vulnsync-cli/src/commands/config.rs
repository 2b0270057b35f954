//! `vulnsync config` command handler

use std::io::Write;

use serde::Serialize;
use tracing::info;

use vulnsync_core::config::VulnsyncConfig;
use vulnsync_tracker::DescriptionTemplate;

use crate::cli::{ConfigAction, ConfigArgs};
use crate::commands::ConfigSource;
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Replacement text for secrets in `config show`.
const REDACTED: &str = "***REDACTED***";

/// Known top-level sections.
const SECTIONS: &[&str] = &["general", "jira", "scanner", "tracking"];

/// Execute the `config` command.
pub async fn execute(
    args: ConfigArgs,
    source: &ConfigSource,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    match args.action {
        ConfigAction::Validate => execute_validate(source, writer).await,
        ConfigAction::Show { section } => execute_show(source, section, writer).await,
    }
}

/// Load the configuration and check everything `sync` needs before it
/// talks to Jira: value ranges, required Jira settings, and the template.
///
/// # Errors
///
/// Returns `CliError::Config` if any check fails (after rendering the report).
async fn execute_validate(source: &ConfigSource, writer: &OutputWriter) -> Result<(), CliError> {
    info!(source = %source, "validating configuration");

    let report = validation_report(source).await;
    writer.render(&report)?;

    if !report.valid {
        return Err(CliError::Config("configuration is invalid".to_owned()));
    }
    Ok(())
}

async fn validation_report(source: &ConfigSource) -> ConfigValidationReport {
    let mut errors = Vec::new();
    match source.load().await {
        Ok(config) => {
            if let Err(e) = config.validate_tracker() {
                errors.push(e.to_string());
            }
            if let Err(e) = DescriptionTemplate::load(&config.tracking.template_path).await {
                errors.push(e.to_string());
            }
        }
        Err(e) => errors.push(e.to_string()),
    }

    ConfigValidationReport {
        source: source.to_string(),
        valid: errors.is_empty(),
        errors,
    }
}

/// Display the effective configuration (file + env overrides + defaults)
/// with the API token redacted.
///
/// # Errors
///
/// Returns a configuration error if loading fails or `CliError::Command` if
/// the section name is unknown.
async fn execute_show(
    source: &ConfigSource,
    section: Option<String>,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    info!(source = %source, "loading configuration");

    let mut config = source.load().await?;
    redact_credentials(&mut config);

    let config_toml = match section.as_deref() {
        None => to_toml(&config),
        Some("general") => to_toml(&config.general),
        Some("jira") => to_toml(&config.jira),
        Some("scanner") => to_toml(&config.scanner),
        Some("tracking") => to_toml(&config.tracking),
        Some(other) => {
            return Err(CliError::Command(format!(
                "unknown section: {} (expected: {})",
                other,
                SECTIONS.join(", ")
            )));
        }
    };

    writer.render(&ConfigReport {
        source: source.to_string(),
        section,
        config_toml,
    })?;
    Ok(())
}

fn to_toml<T: Serialize>(value: &T) -> String {
    toml::to_string_pretty(value).unwrap_or_else(|e| format!("(serialization error: {})", e))
}

/// Blank out the API token. An unset token stays empty so the output shows it is missing.
fn redact_credentials(config: &mut VulnsyncConfig) {
    if !config.jira.api_token.is_empty() {
        config.jira.api_token = REDACTED.to_owned();
    }
}

/// Configuration display report.
///
/// `config_toml` is only used for text rendering.
#[derive(Serialize)]
pub struct ConfigReport {
    /// Where the configuration came from
    pub source: String,
    /// Optional section name (None = full config)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
    /// Serialized TOML configuration (with redacted credentials)
    #[serde(skip)]
    pub config_toml: String,
}

impl Render for ConfigReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        if let Some(ref section) = self.section {
            let section_label = format!("[{}]", section);
            writeln!(
                w,
                "Configuration {} (source: {})",
                section_label.bold(),
                self.source
            )?;
        } else {
            writeln!(w, "Configuration (source: {})", self.source.bold())?;
        }

        writeln!(w)?;
        write!(w, "{}", self.config_toml)?;
        Ok(())
    }
}

/// Configuration validation report.
#[derive(Serialize)]
pub struct ConfigValidationReport {
    pub source: String,
    pub valid: bool,
    /// Validation error messages (empty if valid)
    pub errors: Vec<String>,
}

impl Render for ConfigValidationReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        writeln!(w, "Config Validation: {}", self.source.bold())?;
        if self.valid {
            writeln!(w, "  Result: {}", "VALID".green().bold())?;
        } else {
            writeln!(w, "  Result: {}", "INVALID".red().bold())?;
            for err in &self.errors {
                writeln!(w, "  Error: {}", err.red())?;
            }
        }
        Ok(())
    }
}
