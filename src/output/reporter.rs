//! `TerminalReporter`: Presentation-layer implementation of `ProgressReporter`.
//!
//! Wraps `&OutputContext` so application services can emit progress events
//! without depending on any presentation type directly.

use crate::application::ports::ProgressReporter;
use crate::output::OutputContext;

/// Terminal progress reporter that wraps an `OutputContext`.
///
/// Messages are suppressed when `ctx.quiet`; with `dry_run` every line is
/// prefixed with `[dry-run]` so a preview cannot be mistaken for a live run.
pub struct TerminalReporter<'a> {
    ctx: &'a OutputContext,
    dry_run: bool,
}

impl<'a> TerminalReporter<'a> {
    /// Create a new `TerminalReporter` wrapping the given output context.
    #[must_use]
    pub fn new(ctx: &'a OutputContext, dry_run: bool) -> Self {
        Self { ctx, dry_run }
    }

    fn tag(&self, message: &str) -> String {
        if self.dry_run {
            format!("[dry-run] {message}")
        } else {
            message.to_string()
        }
    }
}

impl ProgressReporter for TerminalReporter<'_> {
    fn step(&self, message: &str) {
        self.ctx.step(&self.tag(message));
    }

    fn success(&self, message: &str) {
        self.ctx.success(&self.tag(message));
    }

    fn warn(&self, message: &str) {
        self.ctx.warn(&self.tag(message));
    }
}
