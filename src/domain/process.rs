//! Local process records parsed from `ps -eo pid,etime,command`.
//!
//! Pure functions only: no I/O, no async, no process spawning.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

/// `ps` elapsed time: `[[DD-]HH:]MM:SS`.
static ETIME_RE: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::expect_used)] // literal pattern
    Regex::new(r"^(?:(?:(\d+)-)?(\d+):)?(\d{1,2}):(\d{2})$").expect("valid etime regex")
});

/// Elapsed run time of a process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Elapsed {
    pub days: u64,
    /// `None` when `ps` printed only `MM:SS`.
    pub hours: Option<u64>,
    pub minutes: u64,
    pub seconds: u64,
}

impl Elapsed {
    /// Parse `MM:SS`, `HH:MM:SS` or `DD-HH:MM:SS`.
    #[must_use]
    pub fn parse(etime: &str) -> Option<Self> {
        let caps = ETIME_RE.captures(etime.trim())?;
        let num = |i: usize| caps.get(i).and_then(|m| m.as_str().parse::<u64>().ok());
        Some(Self {
            days: num(1).unwrap_or(0),
            hours: num(2),
            minutes: num(3)?,
            seconds: num(4)?,
        })
    }

    /// Whole hours elapsed, or `None` if there is no hour component.
    #[must_use]
    pub fn total_hours(&self) -> Option<u64> {
        self.hours.map(|h| self.days * 24 + h)
    }
}

/// One line of the process table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProcessEntry {
    pub pid: u32,
    /// Elapsed time exactly as printed by `ps`.
    pub etime: String,
    pub command: Vec<String>,
}

impl ProcessEntry {
    /// Parse a `pid etime command...` line. Returns `None` for headers and junk.
    #[must_use]
    pub fn parse_line(line: &str) -> Option<Self> {
        let mut fields = line.split_whitespace();
        let pid = fields.next()?.parse().ok()?;
        let etime = fields.next()?.to_string();
        let command: Vec<String> = fields.map(str::to_string).collect();
        if command.is_empty() {
            return None;
        }
        Some(Self {
            pid,
            etime,
            command,
        })
    }

    /// Whether this is a test-harness process for the driver `token`: the
    /// executable path contains the token and the first argument is a
    /// relative script path.
    #[must_use]
    pub fn is_harness(&self, token: &str) -> bool {
        let Some(exe) = self.command.first() else {
            return false;
        };
        let Some(script) = self.command.get(1) else {
            return false;
        };
        exe.contains(token) && !script.starts_with('/') && !script.starts_with('-')
    }

    /// Whether the process has been running for at least `older_than_hours`.
    /// Entries without an hour component are never stale.
    #[must_use]
    pub fn is_stale(&self, older_than_hours: u64) -> bool {
        Elapsed::parse(&self.etime)
            .and_then(|e| e.total_hours())
            .is_some_and(|h| h >= older_than_hours)
    }
}

/// Parse a full `ps` listing, keeping harness processes for `token`.
#[must_use]
pub fn harness_processes(listing: &str, token: &str) -> Vec<ProcessEntry> {
    listing
        .lines()
        .filter(|line| line.contains(token))
        .filter_map(ProcessEntry::parse_line)
        .filter(|entry| entry.is_harness(token))
        .collect()
}
