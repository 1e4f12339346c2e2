//! Classifier thresholds.

use serde::{Deserialize, Serialize};

/// Thresholds driving tier upgrades and downgrades.
///
/// Percentage comparisons are strict; duration comparisons are inclusive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyConfig {
    /// CPU percent above which a `BEST_EFFORT` process is considered active.
    pub upgrade_cpu_percent: f64,
    /// CPU percent above which a process is in the high band.
    pub overload_cpu_percent: f64,
    /// CPU percent below which a process is in the low band.
    pub idle_cpu_percent: f64,
    /// Minutes in the high band before demotion to `BEST_EFFORT`.
    pub overload_minutes: u32,
    /// Minutes in the low band before demotion by one tier.
    pub idle_minutes: u32,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            upgrade_cpu_percent: 50.0,
            overload_cpu_percent: 80.0,
            idle_cpu_percent: 20.0,
            overload_minutes: 5,
            idle_minutes: 10,
        }
    }
}

impl PolicyConfig {
    /// Validate threshold ordering and ranges.
    pub fn validate(&self) -> Result<(), String> {
        for (name, value) in [
            ("upgrade_cpu_percent", self.upgrade_cpu_percent),
            ("overload_cpu_percent", self.overload_cpu_percent),
            ("idle_cpu_percent", self.idle_cpu_percent),
        ] {
            if !value.is_finite() || !(0.0..=100.0).contains(&value) {
                return Err(format!("{name} must be within 0..=100, got {value}"));
            }
        }
        if self.idle_cpu_percent >= self.upgrade_cpu_percent {
            return Err("idle_cpu_percent must be below upgrade_cpu_percent".into());
        }
        if self.upgrade_cpu_percent >= self.overload_cpu_percent {
            return Err("upgrade_cpu_percent must be below overload_cpu_percent".into());
        }
        if self.overload_minutes == 0 {
            return Err("overload_minutes must be greater than 0".into());
        }
        if self.idle_minutes == 0 {
            return Err("idle_minutes must be greater than 0".into());
        }
        Ok(())
    }
}
