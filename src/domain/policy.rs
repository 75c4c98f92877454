//! Deletion policy: decides what happens to a machine.
//!
//! Pure functions only: no I/O, no async.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::machine::{Machine, MachineState, TagMap};

/// Why a machine was left alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// Tagged `permanent=true`.
    Permanent,
    /// Younger than the cutoff.
    TooYoung,
    /// Provider reported a state the reaper does not act on.
    UnknownState,
    /// Machine disappeared between the bulk listing and the re-fetch.
    Gone,
}

impl SkipReason {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Permanent => "permanent",
            Self::TooYoung => "too_young",
            Self::UnknownState => "unknown_state",
            Self::Gone => "gone",
        }
    }
}

/// Outcome of classifying a single machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    /// Delete immediately through the provider API.
    HardDelete,
    /// Add to the batch forwarded to the deletion requester.
    QueueDeletion,
    Skip(SkipReason),
}

/// Classify `machine` for a run with the given cutoff.
///
/// The permanent tag wins over everything, then age, then state.
#[must_use]
pub fn classify(
    machine: &Machine,
    tags: &TagMap,
    older_than_hours: u64,
    now: DateTime<Utc>,
) -> Verdict {
    if tags.is_permanent() {
        return Verdict::Skip(SkipReason::Permanent);
    }
    if machine.age_hours(now) < older_than_hours {
        return Verdict::Skip(SkipReason::TooYoung);
    }
    match machine.state {
        MachineState::Running => Verdict::HardDelete,
        MachineState::Stopped | MachineState::Provisioning => Verdict::QueueDeletion,
        MachineState::Unknown(_) => Verdict::Skip(SkipReason::UnknownState),
    }
}
