//! `ci-reaper kill-old-procs`: kill leftover local test-harness processes only.

use anyhow::Result;
use clap::Args;

use crate::app::AppContext;
use crate::application::services::process_reaper;
use crate::commands::DEFAULT_OLDER_THAN_HOURS;
use crate::infra::command_runner::TokioCommandRunner;
use crate::output::json;

/// Arguments for the kill-old-procs command.
#[derive(Args)]
pub struct KillOldProcsArgs {
    /// Minimum elapsed time in hours before a process is killed
    #[arg(long, default_value_t = DEFAULT_OLDER_THAN_HOURS)]
    pub older_than: u64,
}

/// Run `ci-reaper kill-old-procs`.
///
/// # Errors
///
/// Returns an error if the process table cannot be listed.
pub async fn run(app: &AppContext, args: &KillOldProcsArgs) -> Result<()> {
    let runner = TokioCommandRunner::default();
    let killed = process_reaper::kill_old_procs(
        &runner,
        &app.reporter(),
        app.mode,
        &app.config.processes.token,
        args.older_than,
    )
    .await?;

    if app.json {
        return json::print(&killed);
    }
    let verb = if app.mode.dry_run { "would kill" } else { "killed" };
    app.output
        .success(&format!("{verb} {} local process(es)", killed.len()));
    Ok(())
}
