//! Unit tests for the YAML config store.
//!
//! Each test points `CI_REAPER_CONFIG` at a temporary file, so they run
//! serially.

#![allow(clippy::expect_used, unsafe_code)]

use std::path::Path;

use serial_test::serial;
use tempfile::TempDir;

use ci_reaper::application::ports::ConfigStore;
use ci_reaper::domain::ReaperConfig;
use ci_reaper::domain::config::DEFAULT_CLOUD_URL;
use ci_reaper::infra::config::{CONFIG_ENV, YamlConfigStore};

fn with_config_path<T>(path: &Path, f: impl FnOnce() -> T) -> T {
    // SAFETY: callers are #[serial], no other thread reads the environment.
    unsafe { std::env::set_var(CONFIG_ENV, path) };
    let out = f();
    unsafe { std::env::remove_var(CONFIG_ENV) };
    out
}

#[test]
#[serial]
fn env_var_selects_config_path() {
    let dir = TempDir::new().expect("tempdir");
    let path = dir.path().join("reaper.yaml");

    let resolved = with_config_path(&path, || YamlConfigStore.path().expect("path"));

    assert_eq!(resolved, path);
}

#[test]
#[serial]
fn missing_file_yields_defaults() {
    let dir = TempDir::new().expect("tempdir");
    let path = dir.path().join("absent.yaml");

    let config = with_config_path(&path, || YamlConfigStore.load().expect("load"));

    assert_eq!(config, ReaperConfig::default());
    assert_eq!(config.cloud.url, DEFAULT_CLOUD_URL);
}

#[test]
#[serial]
fn partial_file_fills_remaining_defaults() {
    let dir = TempDir::new().expect("tempdir");
    let path = dir.path().join("reaper.yaml");
    std::fs::write(
        &path,
        "cloud:\n  account: ci\n  key_id: aa:bb\n  key_path: /keys/ci\npause_secs: 0\n",
    )
    .expect("write");

    let config = with_config_path(&path, || YamlConfigStore.load().expect("load"));

    assert_eq!(config.cloud.url, DEFAULT_CLOUD_URL);
    assert_eq!(config.cloud.account.as_deref(), Some("ci"));
    assert_eq!(config.pause(), std::time::Duration::ZERO);
    assert_eq!(config.processes.token, "joyent");
    let creds = config.credentials().expect("credentials");
    assert_eq!(creds.key_id, "aa:bb");
}

#[test]
#[serial]
fn malformed_file_is_an_error_naming_the_path() {
    let dir = TempDir::new().expect("tempdir");
    let path = dir.path().join("broken.yaml");
    std::fs::write(&path, "cloud: [not, a, map]\n").expect("write");

    let err = with_config_path(&path, || YamlConfigStore.load().expect_err("parse error"));

    assert!(err.to_string().contains("broken.yaml"), "{err:#}");
}
