//! `Pacer` implementations: a fixed sleep between destructive calls.

use std::time::Duration;

use crate::application::ports::Pacer;

/// Sleeps for a fixed interval. Not adaptive; a zero interval returns immediately.
#[derive(Debug, Clone, Copy)]
pub struct FixedPacer(pub Duration);

impl Pacer for FixedPacer {
    async fn pause(&self) {
        if self.0.is_zero() {
            return;
        }
        tracing::debug!(secs = self.0.as_secs_f64(), "pausing before next delete");
        tokio::time::sleep(self.0).await;
    }
}
