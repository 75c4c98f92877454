//! Infrastructure layer: concrete implementations of application port traits.
//!
//! This module contains all I/O-performing code: signed HTTP calls to the
//! cloud API, local process execution, mail delivery, and config loading.
//!
//! Imports from `crate::domain` and `crate::application::ports` are allowed.
//! Imports from `crate::commands` or `crate::output` are forbidden.

pub mod cloudapi;
pub mod command_runner;
pub mod config;
pub mod mailer;
pub mod pacer;
pub mod signing;
