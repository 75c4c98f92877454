//! Application context: unified state passed to every command handler.
//!
//! Built once in `Cli::run()` from the global flags and the config file, so
//! dry-run, verbosity and credentials are resolved in exactly one place.

use anyhow::{Context, Result};

use crate::application::ports::ConfigStore;
use crate::domain::{CloudOverrides, ReaperConfig, RunMode};
use crate::infra::cloudapi::CloudApiClient;
use crate::infra::command_runner::TokioCommandRunner;
use crate::infra::mailer::SendmailRequester;
use crate::output::{OutputContext, TerminalReporter};

/// Output rendering flags.
pub struct OutputFlags {
    /// Disable ANSI color output.
    pub no_color: bool,
    /// Emit machine-readable JSON instead of text.
    pub json: bool,
}

/// Flags passed from the top-level CLI to `AppContext::new`.
pub struct AppFlags {
    pub output: OutputFlags,
    pub mode: RunMode,
    pub cloud: CloudOverrides,
}

/// Unified application context passed to every command handler.
pub struct AppContext {
    /// Terminal output context. Quiet when JSON output is requested.
    pub output: OutputContext,
    pub json: bool,
    pub mode: RunMode,
    pub config: ReaperConfig,
}

impl AppContext {
    /// Construct an `AppContext`, loading configuration from `store`.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be read or parsed.
    pub fn new(flags: AppFlags, store: &impl ConfigStore) -> Result<Self> {
        let config = store.load()?.with_overrides(flags.cloud);
        Ok(Self {
            output: OutputContext::new(flags.output.no_color, flags.output.json),
            json: flags.output.json,
            mode: flags.mode,
            config,
        })
    }

    /// Progress reporter for application services.
    #[must_use]
    pub fn reporter(&self) -> TerminalReporter<'_> {
        TerminalReporter::new(&self.output, self.mode.dry_run)
    }

    /// Signed cloud API client for the configured account.
    ///
    /// # Errors
    ///
    /// Returns an error if credentials are incomplete or the key cannot be loaded.
    pub fn cloud(&self) -> Result<CloudApiClient> {
        let creds = self.config.credentials()?;
        tracing::debug!(url = %creds.url, account = %creds.account, "using cloud account");
        CloudApiClient::new(&creds).context("cannot create cloud API client")
    }

    /// Mail-based deletion requester for the configured account.
    ///
    /// # Errors
    ///
    /// Returns an error if the account is not configured.
    pub fn requester(&self) -> Result<SendmailRequester<TokioCommandRunner>> {
        let creds = self.config.credentials()?;
        Ok(SendmailRequester::new(
            TokioCommandRunner::default(),
            &self.config.notify.sendmail,
            &self.config.notify.support_address,
            &creds.account,
        ))
    }
}
