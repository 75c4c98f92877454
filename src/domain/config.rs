//! Domain types for reaper configuration.
//!
//! Pure functions only: no I/O, no async, no filesystem access.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::domain::error::ConfigError;

// ── Constants ────────────────────────────────────────────────────────────────

pub const DEFAULT_CLOUD_URL: &str = "https://us-east-1.api.joyentcloud.com";
pub const DEFAULT_PROCESS_TOKEN: &str = "joyent";
pub const DEFAULT_SUPPORT_ADDRESS: &str = "support@joyent.com";
pub const DEFAULT_SENDMAIL: &str = "/usr/sbin/sendmail";
pub const DEFAULT_PAUSE_SECS: u64 = 3;

// ── Config schema ────────────────────────────────────────────────────────────

/// Top-level configuration stored in `~/.ci-reaper/config.yaml`.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct ReaperConfig {
    pub cloud: CloudConfig,
    pub processes: ProcessConfig,
    pub notify: NotifyConfig,
    /// Seconds to wait between hard deletes.
    pub pause_secs: Option<u64>,
}

/// Cloud account settings. Credentials may also come from flags or env vars.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct CloudConfig {
    pub url: String,
    pub account: Option<String>,
    pub key_id: Option<String>,
    pub key_path: Option<PathBuf>,
}

impl Default for CloudConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_CLOUD_URL.to_string(),
            account: None,
            key_id: None,
            key_path: None,
        }
    }
}

/// Local test-harness process matching.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ProcessConfig {
    /// Token identifying this cloud driver in harness executable paths.
    pub token: String,
}

impl Default for ProcessConfig {
    fn default() -> Self {
        Self {
            token: DEFAULT_PROCESS_TOKEN.to_string(),
        }
    }
}

/// Deletion-request mail settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct NotifyConfig {
    pub support_address: String,
    pub sendmail: String,
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            support_address: DEFAULT_SUPPORT_ADDRESS.to_string(),
            sendmail: DEFAULT_SENDMAIL.to_string(),
        }
    }
}

impl ReaperConfig {
    /// Pause between hard deletes.
    #[must_use]
    pub fn pause(&self) -> Duration {
        Duration::from_secs(self.pause_secs.unwrap_or(DEFAULT_PAUSE_SECS))
    }

    /// Apply command-line overrides on top of the file values.
    #[must_use]
    pub fn with_overrides(mut self, overrides: CloudOverrides) -> Self {
        if let Some(url) = overrides.url {
            self.cloud.url = url;
        }
        self.cloud.account = overrides.account.or(self.cloud.account);
        self.cloud.key_id = overrides.key_id.or(self.cloud.key_id);
        self.cloud.key_path = overrides.key_path.or(self.cloud.key_path);
        self
    }

    /// Resolve the signing credentials, failing on the first missing one.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Missing` if account, key id or key path is unset,
    /// or `ConfigError::InvalidValue` if the URL is not http(s).
    pub fn credentials(&self) -> Result<Credentials, ConfigError> {
        let url = self.cloud.url.trim_end_matches('/').to_string();
        if !(url.starts_with("https://") || url.starts_with("http://")) {
            return Err(ConfigError::InvalidValue {
                key: "cloud.url".to_string(),
                value: self.cloud.url.clone(),
            });
        }
        let account = self.cloud.account.clone().ok_or(ConfigError::Missing {
            key: "cloud.account",
            flag: "--account",
            env: "SDC_ACCOUNT",
        })?;
        let key_id = self.cloud.key_id.clone().ok_or(ConfigError::Missing {
            key: "cloud.key_id",
            flag: "--key-id",
            env: "SDC_KEY_ID",
        })?;
        let key_path = self.cloud.key_path.clone().ok_or(ConfigError::Missing {
            key: "cloud.key_path",
            flag: "--key-path",
            env: "SDC_KEY_PATH",
        })?;
        Ok(Credentials {
            url,
            account,
            key_id,
            key_path,
        })
    }
}

/// Cloud settings given on the command line or via environment.
#[derive(Debug, Clone, Default)]
pub struct CloudOverrides {
    pub url: Option<String>,
    pub account: Option<String>,
    pub key_id: Option<String>,
    pub key_path: Option<PathBuf>,
}

/// Fully resolved signing credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Base URL without a trailing slash.
    pub url: String,
    pub account: String,
    pub key_id: String,
    pub key_path: PathBuf,
}

// ── Run mode ─────────────────────────────────────────────────────────────────

/// Cross-cutting execution mode, fixed for a whole run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunMode {
    /// Perform every read but replace delete, kill and notify with a message.
    pub dry_run: bool,
    pub verbose: bool,
}
