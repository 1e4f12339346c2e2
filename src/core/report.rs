//! Read-side projections of the registry.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::core::record::{ProcessRecord, UsageSnapshot};
use crate::core::tier::{ProcessState, ResourceLimits, Tier};
use crate::util::format;

/// Usage as a share of the current limits, each formatted like `"25.0%"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Utilization {
    /// CPU percent as reported.
    pub cpu_utilization: String,
    /// Memory against `memory_limit_mb`.
    pub memory_utilization: String,
    /// Open descriptors against `max_file_descriptors`.
    pub fd_utilization: String,
    /// Process count against `max_processes`.
    pub process_utilization: String,
}

impl Utilization {
    /// Compute utilisation of `usage` against `limits`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn of(usage: &UsageSnapshot, limits: &ResourceLimits) -> Self {
        Self {
            cpu_utilization: format::percent(usage.cpu_percent),
            memory_utilization: format::utilization(usage.memory_mb as f64, limits.memory_limit_mb),
            fd_utilization: format::utilization(
                f64::from(usage.open_file_descriptors),
                u64::from(limits.max_file_descriptors),
            ),
            process_utilization: format::utilization(
                f64::from(usage.process_count),
                u64::from(limits.max_processes),
            ),
        }
    }
}

/// Detailed resource view of a single process.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceReport {
    /// Process identifier.
    pub process_id: String,
    /// Current tier.
    pub resource_class: Tier,
    /// Limits of the current tier.
    pub limits: ResourceLimits,
    /// Last reported usage.
    pub usage: UsageSnapshot,
    /// Usage relative to limits.
    pub utilization: Utilization,
}

impl From<&ProcessRecord> for ResourceReport {
    fn from(record: &ProcessRecord) -> Self {
        Self {
            process_id: record.process_id.clone(),
            resource_class: record.resource_class,
            limits: record.limits,
            usage: record.usage.clone(),
            utilization: Utilization::of(&record.usage, &record.limits),
        }
    }
}

/// Aggregates for one tier.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TierStats {
    /// Live records in the tier.
    pub count: usize,
    /// Sum of reported CPU percent.
    pub total_cpu_usage: f64,
    /// Sum of reported memory.
    pub total_memory_mb: u64,
}

/// Registry-wide statistics. Every tier and state key is always present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineStats {
    /// Live records.
    pub total_processes: usize,
    /// Aggregates keyed by tier.
    pub by_class: BTreeMap<Tier, TierStats>,
    /// Counts keyed by lifecycle state.
    pub by_state: BTreeMap<ProcessState, usize>,
}

impl Default for EngineStats {
    fn default() -> Self {
        Self {
            total_processes: 0,
            by_class: Tier::ALL
                .into_iter()
                .map(|tier| (tier, TierStats::default()))
                .collect(),
            by_state: ProcessState::ALL.into_iter().map(|state| (state, 0)).collect(),
        }
    }
}

impl EngineStats {
    /// Fold one record into the aggregates.
    pub fn add(&mut self, record: &ProcessRecord) {
        self.total_processes += 1;
        let class = self.by_class.entry(record.resource_class).or_default();
        class.count += 1;
        class.total_cpu_usage += record.usage.cpu_percent;
        class.total_memory_mb += record.usage.memory_mb;
        *self.by_state.entry(record.state).or_default() += 1;
    }
}
