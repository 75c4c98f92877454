//! Port trait definitions for the Application layer.
//!
//! Ports are the interfaces (contracts) that infrastructure must fulfill.
//! This file imports only from `crate::domain`, never from `crate::infra`,
//! `crate::commands`, or `crate::output`.

use std::path::PathBuf;
use std::process::Output;
use std::time::Duration;

use anyhow::Result;

use crate::domain::{Machine, ReaperConfig, TagMap};

// ── Cloud Port ────────────────────────────────────────────────────────────────

/// Machine inventory and the hard-delete primitive of the cloud provider.
///
/// `list_machines` and `get_machine` are deliberately separate calls: the bulk
/// listing may lag behind state transitions, so callers re-read each machine
/// before acting on it.
#[allow(async_fn_in_trait)]
pub trait MachineInventory {
    /// List every machine visible to the account, in provider order.
    async fn list_machines(&self) -> Result<Vec<Machine>>;
    /// Fetch the current record of a single machine.
    async fn get_machine(&self, id: &str) -> Result<Machine>;
    /// Fetch a machine's tags. A machine without tags yields an empty map.
    async fn list_machine_tags(&self, id: &str) -> Result<TagMap>;
    /// Delete a machine immediately.
    async fn delete_machine(&self, id: &str) -> Result<()>;
}

// ── Deletion Request Port ─────────────────────────────────────────────────────

/// Forwards machines that cannot be deleted directly to a human channel.
///
/// Not idempotent: every call produces one notification.
#[allow(async_fn_in_trait)]
pub trait DeletionRequester {
    async fn request_deletion(&self, machines: &[Machine], contact: &str) -> Result<()>;
}

// ── Command Runner Port ───────────────────────────────────────────────────────

/// Abstracts process execution so infrastructure can be swapped or mocked.
#[allow(async_fn_in_trait)]
pub trait CommandRunner {
    /// Run a program and capture its output.
    ///
    /// Implementations should delegate to `run_with_timeout` using the
    /// instance's configured default timeout.
    async fn run(&self, program: &str, args: &[&str]) -> Result<Output>;
    /// Run a program with a custom timeout override.
    ///
    /// # Errors
    ///
    /// Returns an error if the process cannot be spawned or exceeds `timeout`.
    /// On timeout, the child process must be killed (not left orphaned).
    async fn run_with_timeout(
        &self,
        program: &str,
        args: &[&str],
        timeout: Duration,
    ) -> Result<Output>;
    /// Run a program with stdin piped from `stdin`.
    async fn run_with_stdin(&self, program: &str, args: &[&str], stdin: &[u8]) -> Result<Output>;
}

// ── Config Port ───────────────────────────────────────────────────────────────

/// Abstracts where the reaper configuration is read from.
pub trait ConfigStore {
    /// Load the configuration, returning defaults if none exists.
    fn load(&self) -> Result<ReaperConfig>;
    /// Location of the configuration file.
    fn path(&self) -> Result<PathBuf>;
}

// ── Pacing Port ───────────────────────────────────────────────────────────────

/// Delay inserted between destructive provider calls.
#[allow(async_fn_in_trait)]
pub trait Pacer {
    async fn pause(&self);
}

// ── Progress Reporting Port ───────────────────────────────────────────────────

/// Abstracts progress reporting so services can emit events without
/// depending on the Presentation layer. Sync trait, no async needed.
pub trait ProgressReporter {
    /// Emit an in-progress step message.
    fn step(&self, message: &str);
    /// Emit a success message.
    fn success(&self, message: &str);
    /// Emit a warning message.
    fn warn(&self, message: &str);
}
