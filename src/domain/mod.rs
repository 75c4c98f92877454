//! Domain layer: pure business logic, types, and validation.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, `std::process`, or `std::net`.
//! All functions are synchronous and take data in, returning data out.

pub mod config;
pub mod error;
pub mod machine;
pub mod policy;
pub mod process;

pub use config::{CloudOverrides, Credentials, ReaperConfig, RunMode};
pub use error::{CloudApiError, ConfigError, NotifyError, SigningError};
pub use machine::{Machine, MachineState, PERMANENT_TAG, TagMap};
pub use policy::{SkipReason, Verdict, classify};
pub use process::{Elapsed, ProcessEntry};
