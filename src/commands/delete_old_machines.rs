//! `ci-reaper delete-old-machines`: reap stale machines and local processes.

use std::time::Duration;

use anyhow::Result;
use chrono::Utc;
use clap::Args;
use owo_colors::OwoColorize as _;

use crate::app::AppContext;
use crate::application::services::reaper::{ReapReport, Reaper};
use crate::commands::DEFAULT_OLDER_THAN_HOURS;
use crate::domain::{RunMode, Verdict};
use crate::infra::command_runner::TokioCommandRunner;
use crate::infra::pacer::FixedPacer;
use crate::output::{OutputContext, json};

/// Arguments for the delete-old-machines command.
#[derive(Args)]
pub struct DeleteOldMachinesArgs {
    /// Minimum age in hours before a machine or process is reaped
    #[arg(long, default_value_t = DEFAULT_OLDER_THAN_HOURS)]
    pub older_than: u64,

    /// Contact address the deletion request is sent on behalf of
    #[arg(long)]
    pub contact: String,

    /// Seconds to wait between deletes (overrides the config file)
    #[arg(long)]
    pub pause: Option<u64>,
}

/// Run `ci-reaper delete-old-machines`.
///
/// # Errors
///
/// Returns an error if credentials are missing or the reaping pass fails.
pub async fn run(app: &AppContext, args: &DeleteOldMachinesArgs) -> Result<()> {
    let cloud = app.cloud()?;
    let requester = app.requester()?;
    let runner = TokioCommandRunner::default();
    let reporter = app.reporter();
    let pacer = FixedPacer(
        args.pause
            .map_or_else(|| app.config.pause(), Duration::from_secs),
    );

    let reaper = Reaper::new(&cloud, &runner, &requester, &reporter, &pacer, app.mode)
        .with_process_token(&app.config.processes.token);
    let report = reaper
        .delete_old_machines(args.older_than, &args.contact, Utc::now())
        .await?;

    if app.json {
        return json::print(&report);
    }
    if app.mode.verbose {
        app.output.line("");
        print_decisions(&app.output, &report);
    }
    app.output.line("");
    app.output.success(&summary(&report, app.mode));
    Ok(())
}

/// One-line outcome of a reaping pass.
#[must_use]
pub fn summary(report: &ReapReport, mode: RunMode) -> String {
    let deleted = report.hard_deleted().count();
    let queued = report.queued().count();
    let skipped = report
        .decisions
        .iter()
        .filter(|d| matches!(d.verdict, Verdict::Skip(_)))
        .count();
    let killed = report.killed.len();
    let prefix = if mode.dry_run { "would have " } else { "" };
    format!(
        "{prefix}deleted {deleted}, queued {queued} for deletion request, \
         skipped {skipped}, killed {killed} local process(es)"
    )
}

/// Print one line per machine decision.
pub fn print_decisions(out: &OutputContext, report: &ReapReport) {
    for decision in &report.decisions {
        let verdict = match decision.verdict {
            Verdict::HardDelete => "delete".style(out.styles.doomed).to_string(),
            Verdict::QueueDeletion => "queue".to_string(),
            Verdict::Skip(reason) => format!("skip ({})", reason.as_str())
                .style(out.styles.dim)
                .to_string(),
        };
        out.line(&format!(
            "{:<36}  {:>4}h  {verdict}",
            decision.machine.id, decision.age_hours
        ));
    }
}
