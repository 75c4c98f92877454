//! Integration tests for the CI reaper
//!
//! These tests spawn the actual binary or talk HTTP to a local mock
//! server. They are slower and should be run separately from unit tests.

mod cloudapi_client;
