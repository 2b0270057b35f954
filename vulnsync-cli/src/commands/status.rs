//! `vulnsync status` command handler

use std::io::Write;

use serde::Serialize;

use vulnsync_core::config::VulnsyncConfig;
use vulnsync_reconciler::{ReconciliationEngine, StatusReport};
use vulnsync_tracker::{DescriptionTemplate, JiraClient, TicketComposer};

use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Execute the `status` command. Read-only: nothing is created or written.
pub async fn execute(config: &VulnsyncConfig, writer: &OutputWriter) -> Result<(), CliError> {
    config.validate_tracker()?;

    let client = JiraClient::from_config(&config.jira)?;
    let composer = TicketComposer::from_config(&config.jira, DescriptionTemplate::default());
    let engine = ReconciliationEngine::new(client, composer, &config.tracking.store_path);

    let report = engine.status().await?;
    writer.render(&StatusOutput {
        store_path: config.tracking.store_path.clone(),
        report,
    })?;
    Ok(())
}

/// `status` command output.
#[derive(Serialize)]
pub struct StatusOutput {
    pub store_path: String,
    #[serde(flatten)]
    pub report: StatusReport,
}

impl Render for StatusOutput {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        writeln!(w, "Epic: {}", self.report.epic_key.bold())?;
        writeln!(w, "Store: {}", self.store_path)?;
        writeln!(w)?;

        if self.report.entries.is_empty() {
            writeln!(w, "No tracked vulnerabilities.")?;
        } else {
            writeln!(
                w,
                "{:<22} {:<25} {:<12} Remote status",
                "Vulnerability", "Module", "Ticket"
            )?;
            writeln!(w, "{}", "-".repeat(80))?;
            for e in &self.report.entries {
                let status = match e.remote_status.as_deref() {
                    Some(s) if vulnsync_core::is_terminal_status(s) => s.dimmed(),
                    Some(s) => s.green(),
                    None => "not in epic".yellow(),
                };
                writeln!(
                    w,
                    "{:<22} {:<25} {:<12} {}",
                    e.entry.vulnerability_id, e.entry.module_name, e.entry.ticket_key, status
                )?;
            }
        }

        if !self.report.untracked_children.is_empty() {
            writeln!(w)?;
            writeln!(w, "Untracked open children (adopted on next sync):")?;
            for c in &self.report.untracked_children {
                writeln!(w, "  {:<12} {:<14} {}", c.key, c.status, c.summary)?;
            }
        }

        Ok(())
    }
}
