//! Property-based tests for the elapsed-time parser and the deletion policy.
//!
//! Uses `proptest` to verify invariants across many random inputs.

#![allow(clippy::expect_used)]

use proptest::prelude::*;

use ci_reaper::domain::process::{Elapsed, ProcessEntry};
use ci_reaper::domain::{MachineState, SkipReason, TagMap, Verdict, classify};

use crate::helpers::{machine, now, permanent_tags};

fn entry(etime: &str) -> ProcessEntry {
    ProcessEntry::parse_line(&format!("100 {etime} /ci/joyent/python ./run.py"))
        .expect("process line")
}

fn any_state() -> impl Strategy<Value = MachineState> {
    prop_oneof![
        Just(MachineState::Running),
        Just(MachineState::Stopped),
        Just(MachineState::Provisioning),
        "[a-z]{3,12}".prop_map(MachineState::from),
    ]
}

// ============================================================================
// Elapsed-time staleness
// ============================================================================

proptest! {
    /// `HH:MM:SS` is stale exactly when the hour field reaches the cutoff.
    #[test]
    fn prop_hours_stale_iff_at_or_past_cutoff(
        h in 0u64..100,
        m in 0u64..60,
        s in 0u64..60,
        cutoff in 1u64..48,
    ) {
        let e = entry(&format!("{h:02}:{m:02}:{s:02}"));
        prop_assert_eq!(e.is_stale(cutoff), h >= cutoff);
    }

    /// `MM:SS` never reaches any cutoff.
    #[test]
    fn prop_minutes_only_never_stale(m in 0u64..60, s in 0u64..60, cutoff in 0u64..48) {
        let etime = format!("{m:02}:{s:02}");
        prop_assert!(!entry(&etime).is_stale(cutoff));
    }

    /// Days always fold into whole hours.
    #[test]
    fn prop_days_fold_into_hours(d in 0u64..30, h in 0u64..24) {
        let parsed = Elapsed::parse(&format!("{d}-{h:02}:00:00")).expect("etime");
        prop_assert_eq!(parsed.total_hours(), Some(d * 24 + h));
    }
}

// ============================================================================
// classify()
// ============================================================================

proptest! {
    /// A permanent machine is skipped whatever its age or state.
    #[test]
    fn prop_permanent_always_skipped(
        state in any_state(),
        age in 0i64..100_000,
        cutoff in 0u64..1_000,
    ) {
        let m = machine("m", state, age);
        prop_assert_eq!(
            classify(&m, &permanent_tags(), cutoff, now()),
            Verdict::Skip(SkipReason::Permanent)
        );
    }

    /// A machine younger than the cutoff is skipped whatever its state.
    #[test]
    fn prop_young_always_skipped(state in any_state(), cutoff in 1u64..1_000, under in 1u64..1_000) {
        let age = cutoff.saturating_sub(under);
        prop_assume!(age < cutoff);
        let m = machine("m", state, i64::try_from(age).expect("small age"));
        prop_assert_eq!(
            classify(&m, &TagMap::new(), cutoff, now()),
            Verdict::Skip(SkipReason::TooYoung)
        );
    }

    /// Only running machines are ever hard-deleted.
    #[test]
    fn prop_hard_delete_only_when_running(state in any_state(), age in 0i64..1_000) {
        let m = machine("m", state.clone(), age);
        let verdict = classify(&m, &TagMap::new(), 12, now());
        if verdict == Verdict::HardDelete {
            prop_assert_eq!(state, MachineState::Running);
        }
    }
}
