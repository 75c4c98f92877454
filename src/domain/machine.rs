//! Machine records and tags as reported by the cloud provider.
//!
//! Pure types only: no I/O.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Tag key that exempts a machine from reaping.
pub const PERMANENT_TAG: &str = "permanent";

/// Provisioning state of a machine.
///
/// States the reaper does not know about land in `Unknown` and are never acted on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum MachineState {
    Running,
    Stopped,
    Provisioning,
    Unknown(String),
}

impl MachineState {
    /// Wire representation of the state.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Running => "running",
            Self::Stopped => "stopped",
            Self::Provisioning => "provisioning",
            Self::Unknown(other) => other,
        }
    }
}

impl From<String> for MachineState {
    fn from(value: String) -> Self {
        match value.as_str() {
            "running" => Self::Running,
            "stopped" => Self::Stopped,
            "provisioning" => Self::Provisioning,
            _ => Self::Unknown(value),
        }
    }
}

impl From<&str> for MachineState {
    fn from(value: &str) -> Self {
        Self::from(value.to_string())
    }
}

impl From<MachineState> for String {
    fn from(state: MachineState) -> Self {
        state.as_str().to_string()
    }
}

impl fmt::Display for MachineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A compute instance snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Machine {
    /// Opaque provider identifier.
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub state: MachineState,
    /// Creation time, RFC 3339 on the wire.
    pub created: DateTime<Utc>,
    /// Memory in MiB.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory: Option<u64>,
    #[serde(
        default,
        rename = "primaryIp",
        skip_serializing_if = "Option::is_none"
    )]
    pub primary_ip: Option<String>,
}

impl Machine {
    /// Age in whole hours, truncated toward zero.
    ///
    /// A creation time in the future counts as age 0.
    #[must_use]
    pub fn age_hours(&self, now: DateTime<Utc>) -> u64 {
        u64::try_from((now - self.created).num_hours()).unwrap_or(0)
    }

    /// Display name, falling back to the id.
    #[must_use]
    pub fn label(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }
}

/// Key/value tags attached to a machine.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TagMap(BTreeMap<String, serde_json::Value>);

impl TagMap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.0.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: serde_json::Value) {
        self.0.insert(key.into(), value);
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &serde_json::Value)> {
        self.0.iter()
    }

    /// Whether the `permanent` tag is set to `true` or `"true"` (any case).
    #[must_use]
    pub fn is_permanent(&self) -> bool {
        match self.get(PERMANENT_TAG) {
            Some(serde_json::Value::Bool(b)) => *b,
            Some(serde_json::Value::String(s)) => s.trim().eq_ignore_ascii_case("true"),
            _ => false,
        }
    }
}

impl<K: Into<String>> FromIterator<(K, serde_json::Value)> for TagMap {
    fn from_iter<T: IntoIterator<Item = (K, serde_json::Value)>>(iter: T) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}
