//! Application service: delete or queue stale machines.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::application::ports::{
    CommandRunner, DeletionRequester, MachineInventory, Pacer, ProgressReporter,
};
use crate::application::services::process_reaper;
use crate::domain::config::DEFAULT_PROCESS_TOKEN;
use crate::domain::error::is_not_found;
use crate::domain::{Machine, ProcessEntry, RunMode, SkipReason, Verdict, classify};

/// What the reaper decided for one machine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Decision {
    pub machine: Machine,
    pub age_hours: u64,
    pub verdict: Verdict,
}

/// Outcome of a full reaping pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReapReport {
    pub decisions: Vec<Decision>,
    /// Stale local harness processes that were killed (or would be, in dry-run).
    pub killed: Vec<ProcessEntry>,
}

impl ReapReport {
    /// Ids classified for immediate deletion.
    pub fn hard_deleted(&self) -> impl Iterator<Item = &str> {
        self.with_verdict(Verdict::HardDelete)
    }

    /// Ids forwarded to the deletion requester.
    pub fn queued(&self) -> impl Iterator<Item = &str> {
        self.with_verdict(Verdict::QueueDeletion)
    }

    fn with_verdict(&self, verdict: Verdict) -> impl Iterator<Item = &str> {
        self.decisions
            .iter()
            .filter(move |d| d.verdict == verdict)
            .map(|d| d.machine.id.as_str())
    }
}

/// Deletion policy engine.
///
/// Holds the ports for one run together with the run mode, so dry-run is
/// decided once here rather than at every call site.
pub struct Reaper<'a, C, R, N, P, W> {
    cloud: &'a C,
    runner: &'a R,
    requester: &'a N,
    reporter: &'a P,
    pacer: &'a W,
    mode: RunMode,
    process_token: String,
}

impl<'a, C, R, N, P, W> Reaper<'a, C, R, N, P, W>
where
    C: MachineInventory,
    R: CommandRunner,
    N: DeletionRequester,
    P: ProgressReporter,
    W: Pacer,
{
    #[must_use]
    pub fn new(
        cloud: &'a C,
        runner: &'a R,
        requester: &'a N,
        reporter: &'a P,
        pacer: &'a W,
        mode: RunMode,
    ) -> Self {
        Self {
            cloud,
            runner,
            requester,
            reporter,
            pacer,
            mode,
            process_token: DEFAULT_PROCESS_TOKEN.to_string(),
        }
    }

    /// Use a different driver token when matching local harness processes.
    #[must_use]
    pub fn with_process_token(mut self, token: impl Into<String>) -> Self {
        self.process_token = token.into();
        self
    }

    /// Reap machines at least `older_than_hours` old.
    ///
    /// Running machines are deleted directly, stopped and provisioning ones
    /// are sent to the deletion requester in a single batch addressed from
    /// `contact`. Stale local harness processes are killed once per run.
    ///
    /// # Errors
    ///
    /// Returns an error if the inventory, a re-fetch (other than not-found),
    /// a tag lookup, a hard delete, or the deletion request fails.
    pub async fn delete_old_machines(
        &self,
        older_than_hours: u64,
        contact: &str,
        now: DateTime<Utc>,
    ) -> Result<ReapReport> {
        let listed = self
            .cloud
            .list_machines()
            .await
            .context("listing machines")?;
        tracing::debug!(count = listed.len(), older_than_hours, "fetched inventory");

        let killed = self.kill_old_procs(older_than_hours).await;

        let mut report = ReapReport {
            decisions: Vec::with_capacity(listed.len()),
            killed,
        };
        let mut batch = Vec::new();
        let mut deletes = 0usize;

        for snapshot in listed {
            let machine = match self.cloud.get_machine(&snapshot.id).await {
                Ok(machine) => machine,
                Err(err) if is_not_found(&err) => {
                    self.reporter
                        .warn(&format!("{} no longer exists, skipping", snapshot.label()));
                    report.decisions.push(Decision {
                        age_hours: snapshot.age_hours(now),
                        machine: snapshot,
                        verdict: Verdict::Skip(SkipReason::Gone),
                    });
                    continue;
                }
                Err(err) => {
                    return Err(err.context(format!("fetching machine {}", snapshot.id)));
                }
            };
            if machine.state != snapshot.state {
                tracing::debug!(
                    id = %machine.id,
                    listed = %snapshot.state,
                    current = %machine.state,
                    "state changed since listing"
                );
            }

            let tags = self
                .cloud
                .list_machine_tags(&machine.id)
                .await
                .with_context(|| format!("fetching tags for machine {}", machine.id))?;

            let age_hours = machine.age_hours(now);
            let verdict = classify(&machine, &tags, older_than_hours, now);
            match verdict {
                Verdict::HardDelete => {
                    if deletes > 0 && !self.mode.dry_run {
                        self.pacer.pause().await;
                    }
                    self.hard_delete(&machine, age_hours).await?;
                    deletes += 1;
                }
                Verdict::QueueDeletion => {
                    self.reporter.step(&format!(
                        "queueing {} ({}, {age_hours}h old) for deletion request",
                        machine.label(),
                        machine.state
                    ));
                    batch.push(machine.clone());
                }
                Verdict::Skip(reason) => self.skip(&machine, age_hours, reason),
            }
            report.decisions.push(Decision {
                machine,
                age_hours,
                verdict,
            });
        }

        if !batch.is_empty() {
            self.request_deletion(&batch, contact).await?;
        }

        Ok(report)
    }

    async fn kill_old_procs(&self, older_than_hours: u64) -> Vec<ProcessEntry> {
        match process_reaper::kill_old_procs(
            self.runner,
            self.reporter,
            self.mode,
            &self.process_token,
            older_than_hours,
        )
        .await
        {
            Ok(killed) => killed,
            Err(err) => {
                tracing::warn!(error = %err, "local process cleanup failed");
                self.reporter
                    .warn(&format!("skipping local process cleanup: {err:#}"));
                Vec::new()
            }
        }
    }

    async fn hard_delete(&self, machine: &Machine, age_hours: u64) -> Result<()> {
        let label = machine.label();
        if self.mode.dry_run {
            self.reporter
                .step(&format!("would delete {label} ({age_hours}h old)"));
            return Ok(());
        }
        self.reporter
            .step(&format!("deleting {label} ({age_hours}h old)"));
        match self.cloud.delete_machine(&machine.id).await {
            Ok(()) => {
                self.reporter.success(&format!("deleted {label}"));
                Ok(())
            }
            Err(err) if is_not_found(&err) => {
                self.reporter
                    .warn(&format!("{label} was already deleted"));
                Ok(())
            }
            Err(err) => Err(err.context(format!("deleting machine {}", machine.id))),
        }
    }

    async fn request_deletion(&self, batch: &[Machine], contact: &str) -> Result<()> {
        if self.mode.dry_run {
            self.reporter.step(&format!(
                "would request deletion of {} machine(s) on behalf of {contact}",
                batch.len()
            ));
            return Ok(());
        }
        self.reporter.step(&format!(
            "requesting deletion of {} machine(s) on behalf of {contact}",
            batch.len()
        ));
        self.requester
            .request_deletion(batch, contact)
            .await
            .context("sending deletion request")?;
        self.reporter.success("deletion request sent");
        Ok(())
    }

    fn skip(&self, machine: &Machine, age_hours: u64, reason: SkipReason) {
        tracing::debug!(id = %machine.id, ?reason, age_hours, "skipping machine");
        if !self.mode.verbose {
            return;
        }
        let why = match reason {
            SkipReason::Permanent => "tagged permanent".to_string(),
            SkipReason::TooYoung => format!("{age_hours}h old"),
            SkipReason::UnknownState => format!("state {}", machine.state),
            SkipReason::Gone => "no longer exists".to_string(),
        };
        self.reporter
            .step(&format!("skipping {} ({why})", machine.label()));
    }
}
