//! Command implementations

pub mod delete_old_machines;
pub mod kill_old_procs;
pub mod list_machines;
pub mod list_tags;
pub mod version;

/// Default age cutoff, in hours, for machines and local processes.
pub const DEFAULT_OLDER_THAN_HOURS: u64 = 12;
