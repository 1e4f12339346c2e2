//! Managed process records and name-derived predicates.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::tier::{lookup, ProcessState, ResourceLimits, Tier};
use crate::util::clock;

/// Marker substring identifying system processes.
pub const SYSTEM_MARKER: &str = "_SYSTEM_";

/// Markers identifying database engines.
pub const DATABASE_MARKERS: [&str; 4] = ["POSTGRES", "MYSQL", "MONGODB", "REDIS"];

/// Whether `name` denotes a system process (pinned to `CRITICAL`).
#[must_use]
pub fn is_system_name(name: &str) -> bool {
    name.to_uppercase().contains(SYSTEM_MARKER)
}

/// Whether `name` denotes a database process (memory limit doubled).
#[must_use]
pub fn is_database_name(name: &str) -> bool {
    let upper = name.to_uppercase();
    DATABASE_MARKERS.iter().any(|marker| upper.contains(marker))
}

/// Externally reported resource usage.
///
/// At most one of the duration counters is nonzero at any time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageSnapshot {
    /// CPU utilisation in percent.
    pub cpu_percent: f64,
    /// Resident memory in megabytes.
    pub memory_mb: u64,
    /// Open file descriptors.
    pub open_file_descriptors: u32,
    /// Processes/threads in the group.
    pub process_count: u32,
    /// Cumulative I/O operations.
    pub io_operations: u64,
    /// Minutes spent in the high CPU band, as last reported.
    pub high_cpu_duration_minutes: u32,
    /// Minutes spent in the low CPU band, as last reported.
    pub low_cpu_duration_minutes: u32,
}

impl Default for UsageSnapshot {
    fn default() -> Self {
        Self {
            cpu_percent: 0.0,
            memory_mb: 0,
            open_file_descriptors: 0,
            process_count: 1,
            io_operations: 0,
            high_cpu_duration_minutes: 0,
            low_cpu_duration_minutes: 0,
        }
    }
}

/// A managed process owned by the registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessRecord {
    /// Opaque identifier.
    pub process_id: String,
    /// Display name; drives the system/database predicates.
    pub name: String,
    /// Command line the process was launched with.
    pub command: String,
    /// Current tier.
    pub resource_class: Tier,
    /// Lifecycle state.
    pub state: ProcessState,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last mutation time; never moves backwards.
    pub last_updated: DateTime<Utc>,
    /// Seconds since creation, refreshed on read while running.
    pub uptime_seconds: i64,
    /// Limits for the current tier.
    pub limits: ResourceLimits,
    /// Last reported usage.
    pub usage: UsageSnapshot,
}

impl ProcessRecord {
    /// Build a fresh running record. System names are forced to `CRITICAL`.
    #[must_use]
    pub fn new(
        process_id: impl Into<String>,
        name: impl Into<String>,
        command: impl Into<String>,
        requested: Tier,
    ) -> Self {
        let name = name.into();
        let resource_class = if is_system_name(&name) {
            Tier::Critical
        } else {
            requested
        };
        let limits = lookup(resource_class, is_database_name(&name));
        let now = clock::now();
        Self {
            process_id: process_id.into(),
            name,
            command: command.into(),
            resource_class,
            state: ProcessState::Running,
            created_at: now,
            last_updated: now,
            uptime_seconds: 0,
            limits,
            usage: UsageSnapshot::default(),
        }
    }

    /// See [`is_system_name`].
    #[must_use]
    pub fn is_system(&self) -> bool {
        is_system_name(&self.name)
    }

    /// See [`is_database_name`].
    #[must_use]
    pub fn is_database(&self) -> bool {
        is_database_name(&self.name)
    }

    /// Move to `tier`, refreshing limits and `last_updated`.
    /// Returns `false` when the record was already in `tier`.
    pub fn set_tier(&mut self, tier: Tier) -> bool {
        if self.resource_class == tier {
            return false;
        }
        self.resource_class = tier;
        self.limits = lookup(tier, self.is_database());
        self.touch();
        true
    }

    /// Advance `last_updated` to now, never backwards.
    pub fn touch(&mut self) {
        self.last_updated = clock::monotonic_after(self.last_updated);
    }

    /// Recompute `uptime_seconds` if the process is running.
    pub fn refresh_uptime(&mut self) {
        if self.state == ProcessState::Running {
            self.uptime_seconds = (clock::now() - self.created_at).num_seconds().max(0);
        }
    }

    /// Whether the record is still live.
    #[must_use]
    pub fn is_live(&self) -> bool {
        self.state != ProcessState::Terminated
    }
}
