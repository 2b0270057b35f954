//! `vulnsync sync` command handler

use std::io::Write;

use serde::Serialize;
use tracing::{info, warn};

use vulnsync_core::config::VulnsyncConfig;
use vulnsync_core::error::VulnsyncError;
use vulnsync_reconciler::{ReconciliationEngine, SyncReport};
use vulnsync_tracker::{DescriptionTemplate, JiraClient, TicketComposer};

use crate::cli::SyncArgs;
use crate::commands::scan;
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Execute the `sync` command.
///
/// Every configuration check (required Jira settings, template, format
/// family) happens before the first remote call. Per-ticket creation
/// failures are reported but do not fail the command.
pub async fn execute(
    args: SyncArgs,
    config: &VulnsyncConfig,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    config.validate_tracker()?;

    let template = DescriptionTemplate::load(&config.tracking.template_path)
        .await
        .map_err(VulnsyncError::from)?;
    let composer = TicketComposer::from_config(&config.jira, template);
    let client = JiraClient::from_config(&config.jira)?;

    let (source, outcome) = scan::collect(&config.scanner, &args.source).await?;

    let engine = ReconciliationEngine::new(client, composer, &config.tracking.store_path);
    let report = engine.run(&outcome.records, args.dry_run).await?;

    if report.has_failures() {
        warn!(
            run_id = %report.run_id,
            failed = report.failed.len(),
            "some tickets could not be created, they will be retried next run"
        );
    }
    info!(
        run_id = %report.run_id,
        created = report.created.len(),
        dropped = report.dropped.len(),
        adopted = report.adopted.len(),
        "sync finished"
    );

    writer.render(&SyncOutput {
        source,
        store_path: config.tracking.store_path.clone(),
        epic_key: config.jira.epic_key.clone(),
        report,
    })?;
    Ok(())
}

/// `sync` command output.
#[derive(Serialize)]
pub struct SyncOutput {
    pub source: String,
    pub store_path: String,
    pub epic_key: String,
    #[serde(flatten)]
    pub report: SyncReport,
}

impl Render for SyncOutput {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        let r = &self.report;
        let title = if r.dry_run { "Sync (dry run)" } else { "Sync" };
        writeln!(w, "{}: {} -> {}", title.bold(), self.source, self.epic_key.bold())?;
        writeln!(w, "Run: {}", r.run_id)?;
        writeln!(w, "Store: {}", self.store_path)?;
        writeln!(w)?;

        if r.pass_a_skipped {
            writeln!(
                w,
                "{}",
                "Epic children unavailable, drift correction skipped".yellow()
            )?;
        }
        writeln!(w, "Kept: {}", r.kept)?;
        for d in &r.dropped {
            writeln!(
                w,
                "  {} {} ({}, {})",
                "dropped".yellow(),
                d.entry.vulnerability_id,
                d.entry.ticket_key,
                d.reason
            )?;
        }
        for a in &r.adopted {
            writeln!(w, "  {} {}", "adopted".cyan(), a.ticket_key)?;
        }
        writeln!(w, "Already tracked: {}", r.already_tracked)?;

        if r.dry_run {
            writeln!(w, "Would create: {}", r.planned.len())?;
            for p in &r.planned {
                writeln!(
                    w,
                    "  {:<22} {:<10} {}",
                    p.vulnerability_id, p.priority, p.summary
                )?;
            }
        } else {
            writeln!(w, "Created: {}", r.created.len().to_string().green())?;
            for c in &r.created {
                writeln!(
                    w,
                    "  {:<22} {:<25} {}",
                    c.vulnerability_id, c.module_name, c.ticket_key
                )?;
            }
        }

        if r.has_failures() {
            writeln!(w, "Failed: {}", r.failed.len().to_string().red().bold())?;
            for f in &r.failed {
                writeln!(
                    w,
                    "  {:<22} {:<25} {}",
                    f.vulnerability_id,
                    f.module_name,
                    f.reason.red()
                )?;
            }
        }

        Ok(())
    }
}
