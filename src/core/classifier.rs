//! Tier upgrade/downgrade decisions.

use serde::{Deserialize, Serialize};

use crate::config::PolicyConfig;
use crate::core::record::ProcessRecord;
use crate::core::Tier;

/// Why a tier change was decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionReason {
    /// System process outside `CRITICAL`.
    SystemPin,
    /// `BEST_EFFORT` process above the upgrade threshold.
    Active,
    /// High band held for the overload duration.
    SustainedOverload,
    /// Low band held for the idle duration.
    SustainedIdle,
}

/// Direction of a tier change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Towards `CRITICAL`.
    Upgrade,
    /// Towards `BEST_EFFORT`.
    Downgrade,
}

/// A concrete tier change for one record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TierDecision {
    /// Tier before the change.
    pub from: Tier,
    /// Tier after the change.
    pub to: Tier,
    /// Rule that fired.
    pub reason: DecisionReason,
}

impl TierDecision {
    /// Whether this moves the record up or down.
    #[must_use]
    pub fn direction(&self) -> Direction {
        if self.to < self.from {
            Direction::Upgrade
        } else {
            Direction::Downgrade
        }
    }
}

/// Pure decision function over a record and the configured thresholds.
#[derive(Debug, Clone, Default)]
pub struct Classifier {
    policy: PolicyConfig,
}

impl Classifier {
    /// Create a classifier for `policy`.
    #[must_use]
    pub const fn new(policy: PolicyConfig) -> Self {
        Self { policy }
    }

    /// Thresholds in use.
    #[must_use]
    pub const fn policy(&self) -> &PolicyConfig {
        &self.policy
    }

    /// Only `BEST_EFFORT` records qualify: system processes always, others
    /// when CPU is strictly above the upgrade threshold.
    #[must_use]
    pub fn should_upgrade(&self, record: &ProcessRecord) -> bool {
        if record.resource_class != Tier::BestEffort {
            return false;
        }
        record.is_system() || record.usage.cpu_percent > self.policy.upgrade_cpu_percent
    }

    /// System processes never downgrade.
    #[must_use]
    pub fn should_downgrade(&self, record: &ProcessRecord) -> bool {
        !record.is_system() && (self.is_overloaded(record) || self.is_idle(record))
    }

    fn is_overloaded(&self, record: &ProcessRecord) -> bool {
        record.usage.cpu_percent > self.policy.overload_cpu_percent
            && record.usage.high_cpu_duration_minutes >= self.policy.overload_minutes
    }

    fn is_idle(&self, record: &ProcessRecord) -> bool {
        record.usage.cpu_percent < self.policy.idle_cpu_percent
            && record.usage.low_cpu_duration_minutes >= self.policy.idle_minutes
    }

    /// Decide the tier change for `record`, if any.
    ///
    /// Upgrade is evaluated first and wins over downgrade. Overload demotes
    /// straight to `BEST_EFFORT`; idleness demotes a single tier.
    #[must_use]
    pub fn decide(&self, record: &ProcessRecord) -> Option<TierDecision> {
        let from = record.resource_class;
        let (to, reason) = if self.should_upgrade(record) {
            if record.is_system() {
                (Tier::Critical, DecisionReason::SystemPin)
            } else {
                (Tier::Standard, DecisionReason::Active)
            }
        } else if !self.should_downgrade(record) {
            return None;
        } else if self.is_overloaded(record) {
            (Tier::BestEffort, DecisionReason::SustainedOverload)
        } else {
            (from.lower()?, DecisionReason::SustainedIdle)
        };
        (to != from).then_some(TierDecision { from, to, reason })
    }
}
