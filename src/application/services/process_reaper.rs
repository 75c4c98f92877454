//! Application service: kill leftover local test-harness processes.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.

use anyhow::{Context, Result};

use crate::application::ports::{CommandRunner, ProgressReporter};
use crate::domain::RunMode;
use crate::domain::process::{ProcessEntry, harness_processes};

/// `ps` invocation producing `pid etime command...` lines.
pub const PS_ARGS: &[&str] = &["-eo", "pid,etime,command"];

/// Kill harness processes for `token` that have run for `older_than_hours` or more.
///
/// Returns the entries that were killed (or that would have been killed in
/// dry-run mode). A failed kill is reported and left out; a process that has
/// already exited counts as killed.
///
/// # Errors
///
/// Returns an error only if the process table cannot be listed.
pub async fn kill_old_procs(
    runner: &impl CommandRunner,
    reporter: &impl ProgressReporter,
    mode: RunMode,
    token: &str,
    older_than_hours: u64,
) -> Result<Vec<ProcessEntry>> {
    let output = runner
        .run("ps", PS_ARGS)
        .await
        .context("listing local processes")?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        anyhow::bail!("ps exited with {}: {}", output.status, stderr.trim());
    }

    let listing = String::from_utf8_lossy(&output.stdout);
    let stale: Vec<ProcessEntry> = harness_processes(&listing, token)
        .into_iter()
        .filter(|p| p.is_stale(older_than_hours))
        .collect();
    tracing::debug!(token, older_than_hours, stale = stale.len(), "scanned process table");

    let mut killed = Vec::with_capacity(stale.len());
    for entry in stale {
        let summary = format!("{} ({}) {}", entry.pid, entry.etime, entry.command.join(" "));
        if mode.dry_run {
            reporter.step(&format!("would kill process {summary}"));
            killed.push(entry);
            continue;
        }
        reporter.step(&format!("killing process {summary}"));
        if kill(runner, reporter, entry.pid).await {
            killed.push(entry);
        }
    }

    Ok(killed)
}

/// Returns `true` once the process is gone, whether killed now or already exited.
async fn kill(runner: &impl CommandRunner, reporter: &impl ProgressReporter, pid: u32) -> bool {
    let pid_arg = pid.to_string();
    match runner.run("kill", &["-9", &pid_arg]).await {
        Ok(output) if output.status.success() => {
            tracing::debug!(pid, "process killed");
            true
        }
        Ok(output) => {
            let stderr = String::from_utf8_lossy(&output.stderr);
            if stderr.contains("No such process") {
                tracing::debug!(pid, "process already exited");
                return true;
            }
            tracing::warn!(pid, stderr = %stderr.trim(), "kill failed");
            reporter.warn(&format!("could not kill process {pid}: {}", stderr.trim()));
            false
        }
        Err(err) => {
            tracing::warn!(pid, error = %err, "kill failed");
            reporter.warn(&format!("could not kill process {pid}: {err:#}"));
            false
        }
    }
}
