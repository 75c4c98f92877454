//! Typed domain error enums.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, `std::process`, or `std::net`.
//! All error types implement `thiserror::Error` and convert to `anyhow::Error`
//! via the `?` operator.

use thiserror::Error;

// ── Cloud API errors ──────────────────────────────────────────────────────────

/// Errors raised by the signed request layer.
#[derive(Debug, Error)]
pub enum CloudApiError {
    #[error("request to {path} failed: {message}")]
    Transport { path: String, message: String },

    #[error("cloud API returned HTTP {status}: {body}")]
    Api { status: u16, body: String },

    #[error("invalid API path '{0}': expected a path starting with '/', not a full URL")]
    InvalidPath(String),

    #[error("unexpected response from {path}: {message}")]
    InvalidResponse { path: String, message: String },
}

impl CloudApiError {
    /// Returns `true` when the provider reported the resource as missing.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Api { status: 404 | 410, .. })
    }
}

/// Returns `true` if any error in the chain is a not-found [`CloudApiError`].
#[must_use]
pub fn is_not_found(err: &anyhow::Error) -> bool {
    err.chain()
        .filter_map(|e| e.downcast_ref::<CloudApiError>())
        .any(CloudApiError::is_not_found)
}

// ── Signing errors ────────────────────────────────────────────────────────────

/// Errors loading the private key or producing a request signature.
#[derive(Debug, Error)]
pub enum SigningError {
    #[error("cannot read private key {path}: {message}")]
    ReadKey { path: String, message: String },

    #[error("cannot parse private key {path}: expected an RSA key in PKCS#1 or PKCS#8 PEM")]
    ParseKey { path: String },

    #[error("cannot sign request: {0}")]
    Sign(String),
}

// ── Config errors ─────────────────────────────────────────────────────────────

/// Errors related to configuration resolution.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing setting: {key}\n\nSet it with {flag} or the {env} environment variable.")]
    Missing {
        key: &'static str,
        flag: &'static str,
        env: &'static str,
    },

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },
}

// ── Notification errors ───────────────────────────────────────────────────────

/// Errors from the deletion-request channel.
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("deletion request for {count} machine(s) was not sent (exit {status}): {stderr}")]
    Failed {
        count: usize,
        status: String,
        stderr: String,
    },

    #[error("invalid contact address {0:?}: control characters are not allowed")]
    InvalidContact(String),
}
