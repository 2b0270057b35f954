//! `vulnsync scan` command handler

use std::io::Write;
use std::path::Path;

use serde::Serialize;
use tracing::info;

use vulnsync_audit::format::resolve_configured;
use vulnsync_audit::{AuditParser, ParseOutcome, ScannerRunner, read_captured};
use vulnsync_core::config::{ScannerConfig, VulnsyncConfig};

use crate::cli::{AuditSourceArgs, ScanArgs};
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Execute the `scan` command.
pub async fn execute(
    args: ScanArgs,
    config: &VulnsyncConfig,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    let (source, outcome) = collect(&config.scanner, &args.source).await?;
    writer.render(&ScanReport { source, outcome })?;
    Ok(())
}

/// Obtain audit output and parse it into normalised records.
///
/// With `--input` the family must be known up front (`--format` or
/// `scanner.format`); otherwise `auto` asks the scanner for its version.
/// Returns a label for where the lines came from alongside the outcome.
///
/// # Errors
///
/// - Unknown family or version detection failure: configuration error
/// - Scanner cannot be started: `CliError::ScannerUnavailable`
/// - Captured input unreadable: IO error
pub(crate) async fn collect(
    scanner: &ScannerConfig,
    source: &AuditSourceArgs,
) -> Result<(String, ParseOutcome), CliError> {
    let configured = source.format.as_deref().unwrap_or(&scanner.format);

    let (label, family, lines) = match source.input.as_deref() {
        Some(path) => {
            let family = resolve_configured(configured)?.ok_or_else(|| {
                CliError::Config(
                    "--input requires --format or scanner.format to name a family".to_owned(),
                )
            })?;
            let lines = read_captured(path).await?;
            (input_label(path), family, lines)
        }
        None => {
            let runner = ScannerRunner::from_config(scanner);
            let family = runner.resolve_family(configured).await?;
            let lines = runner.run_audit(family).await?;
            (format!("{} ({})", runner.command(), family), family, lines)
        }
    };

    let outcome = AuditParser::new().parse_lines(family, &lines)?;
    info!(
        source = %label,
        format = %outcome.family,
        records = outcome.records.len(),
        lines_skipped = outcome.lines_skipped,
        "audit output parsed"
    );
    Ok((label, outcome))
}

fn input_label(path: &Path) -> String {
    if path == Path::new("-") {
        "<stdin>".to_owned()
    } else {
        path.display().to_string()
    }
}

/// Parse-only scan result.
#[derive(Serialize)]
pub struct ScanReport {
    /// Where the audit lines came from
    pub source: String,
    #[serde(flatten)]
    pub outcome: ParseOutcome,
}

impl Render for ScanReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        writeln!(w, "Scan: {}", self.source.bold())?;
        writeln!(w, "Format: {}", self.outcome.family)?;
        writeln!(
            w,
            "Lines: {} ({} skipped, {} duplicates replaced)",
            self.outcome.lines_total, self.outcome.lines_skipped, self.outcome.duplicates_replaced
        )?;
        writeln!(w)?;

        if self.outcome.records.is_empty() {
            writeln!(w, "{}", "No vulnerabilities found.".green())?;
            return Ok(());
        }

        writeln!(
            w,
            "{}",
            format!("{} vulnerabilities", self.outcome.records.len())
                .red()
                .bold()
        )?;
        writeln!(w, "{:<22} {:<10} {:<25} Title", "ID", "Severity", "Module")?;
        writeln!(w, "{}", "-".repeat(80))?;

        for r in &self.outcome.records {
            let severity = match r.severity.to_ascii_lowercase().as_str() {
                "critical" => r.severity.red().bold(),
                "high" => r.severity.red(),
                "moderate" | "medium" => r.severity.yellow(),
                "info" => r.severity.dimmed(),
                _ => r.severity.normal(),
            };
            writeln!(
                w,
                "{:<22} {:<10} {:<25} {}",
                r.id, severity, r.module_name, r.title
            )?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use vulnsync_audit::FormatFamily;
    use vulnsync_core::types::VulnerabilityRecord;

    fn record(id: &str, module: &str, severity: &str) -> VulnerabilityRecord {
        VulnerabilityRecord {
            id: id.to_owned(),
            module_name: module.to_owned(),
            title: "Prototype Pollution".to_owned(),
            url: String::new(),
            severity: severity.to_owned(),
            vulnerable_version_range: None,
            affected_versions: Vec::new(),
            dependency_paths: Vec::new(),
        }
    }

    fn report(records: Vec<VulnerabilityRecord>) -> ScanReport {
        ScanReport {
            source: "audit.jsonl".to_owned(),
            outcome: ParseOutcome {
                family: FormatFamily::Berry,
                lines_total: 3,
                lines_skipped: 1,
                duplicates_replaced: 0,
                records,
            },
        }
    }

    #[test]
    fn test_scan_report_render_text_lists_records() {
        let mut buffer = Vec::new();
        report(vec![record("GHSA-1", "lodash", "high")])
            .render_text(&mut buffer)
            .expect("render should succeed");
        let output = String::from_utf8(buffer).expect("valid UTF-8");
        assert!(output.contains("audit.jsonl"));
        assert!(output.contains("berry"));
        assert!(output.contains("GHSA-1"));
        assert!(output.contains("lodash"));
        assert!(output.contains("1 skipped"));
    }

    #[test]
    fn test_scan_report_render_text_empty() {
        let mut buffer = Vec::new();
        report(Vec::new())
            .render_text(&mut buffer)
            .expect("render should succeed");
        let output = String::from_utf8(buffer).expect("valid UTF-8");
        assert!(output.contains("No vulnerabilities found."));
    }

    #[test]
    fn test_scan_report_json_flattens_outcome() {
        let json = serde_json::to_value(report(vec![record("GHSA-1", "qs", "low")]))
            .expect("serialize");
        assert_eq!(json["source"], "audit.jsonl");
        assert_eq!(json["family"], "berry");
        assert_eq!(json["records"][0]["id"], "GHSA-1");
    }

    #[tokio::test]
    async fn test_collect_input_requires_family() {
        let scanner = ScannerConfig::default();
        let source = AuditSourceArgs {
            input: Some(PathBuf::from("audit.jsonl")),
            format: None,
        };
        let err = collect(&scanner, &source).await.unwrap_err();
        assert!(matches!(err, CliError::Config(_)));
        assert_eq!(err.exit_code(), 2);
    }

    #[tokio::test]
    async fn test_collect_unknown_format_is_config_error() {
        let scanner = ScannerConfig::default();
        let source = AuditSourceArgs {
            input: Some(PathBuf::from("audit.jsonl")),
            format: Some("pnpm".to_owned()),
        };
        let err = collect(&scanner, &source).await.unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[tokio::test]
    async fn test_collect_missing_scanner_binary() {
        let scanner = ScannerConfig {
            command: "vulnsync-no-such-scanner".to_owned(),
            ..ScannerConfig::default()
        };
        let err = collect(&scanner, &AuditSourceArgs::default())
            .await
            .unwrap_err();
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn test_input_label_stdin() {
        assert_eq!(input_label(Path::new("-")), "<stdin>");
        assert_eq!(input_label(Path::new("a.jsonl")), "a.jsonl");
    }
}
