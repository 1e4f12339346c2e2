//! Applies externally reported usage to a record.
//!
//! The reporter asserts how long the process has already spent in the band it
//! is reporting; the tracker stores that figure verbatim instead of measuring
//! elapsed time itself. Moving to another band therefore resets the counter of
//! the band being left.

use serde::{Deserialize, Serialize};

use crate::config::PolicyConfig;
use crate::core::record::ProcessRecord;
use crate::core::EngineError;

/// A usage report for a single process.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageReport {
    /// CPU utilisation in percent.
    pub cpu_percent: f64,
    /// Resident memory in megabytes.
    pub memory_mb: u64,
    /// Minutes already spent in the reported band.
    #[serde(default)]
    pub duration_minutes: u32,
}

impl UsageReport {
    /// Convenience constructor.
    #[must_use]
    pub const fn new(cpu_percent: f64, memory_mb: u64, duration_minutes: u32) -> Self {
        Self {
            cpu_percent,
            memory_mb,
            duration_minutes,
        }
    }
}

/// CPU usage band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Band {
    /// Above the overload threshold.
    High,
    /// Below the idle threshold.
    Low,
    /// Anywhere in between, boundaries included.
    Neutral,
}

impl Band {
    /// Classify a CPU figure against the policy thresholds.
    #[must_use]
    pub fn of(cpu_percent: f64, policy: &PolicyConfig) -> Self {
        if cpu_percent > policy.overload_cpu_percent {
            Self::High
        } else if cpu_percent < policy.idle_cpu_percent {
            Self::Low
        } else {
            Self::Neutral
        }
    }
}

/// Apply `report` to `record`.
///
/// The update is all-or-nothing: a report that fails validation or exceeds the
/// current memory limit leaves the record untouched.
///
/// # Errors
///
/// [`EngineError::Validation`] for a non-finite CPU figure and
/// [`EngineError::ResourceLimitViolation`] when `memory_mb` exceeds the
/// record's memory limit.
pub fn apply(
    record: &mut ProcessRecord,
    report: &UsageReport,
    policy: &PolicyConfig,
) -> Result<Band, EngineError> {
    if !report.cpu_percent.is_finite() {
        return Err(EngineError::Validation(format!(
            "cpu_percent must be a finite number, got {}",
            report.cpu_percent
        )));
    }
    let limit_mb = record.limits.memory_limit_mb;
    if report.memory_mb > limit_mb {
        tracing::warn!(
            process_id = %record.process_id,
            memory_mb = report.memory_mb,
            limit_mb,
            "usage report rejected: memory limit exceeded"
        );
        return Err(EngineError::ResourceLimitViolation {
            used_mb: report.memory_mb,
            limit_mb,
        });
    }

    let band = Band::of(report.cpu_percent, policy);
    let usage = &mut record.usage;
    usage.cpu_percent = report.cpu_percent;
    usage.memory_mb = report.memory_mb;
    let (high, low) = match band {
        Band::High => (report.duration_minutes, 0),
        Band::Low => (0, report.duration_minutes),
        Band::Neutral => (0, 0),
    };
    usage.high_cpu_duration_minutes = high;
    usage.low_cpu_duration_minutes = low;
    record.touch();

    tracing::debug!(
        process_id = %record.process_id,
        cpu_percent = report.cpu_percent,
        memory_mb = report.memory_mb,
        ?band,
        "usage applied"
    );
    Ok(band)
}
