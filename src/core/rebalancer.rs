//! Rebalance pass over all live records.

use serde::{Deserialize, Serialize};

use crate::core::classifier::{Classifier, Direction, TierDecision};
use crate::core::record::ProcessRecord;
use crate::core::registry::ProcessRegistry;

/// Aggregate outcome of a single rebalance pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RebalanceReport {
    /// Records whose tier changed.
    pub processes_rebalanced: usize,
    /// Records moved to a higher tier.
    pub upgrades: usize,
    /// Records moved to a lower tier.
    pub downgrades: usize,
}

impl RebalanceReport {
    fn count(&mut self, decision: &TierDecision) {
        match decision.direction() {
            Direction::Upgrade => self.upgrades += 1,
            Direction::Downgrade => self.downgrades += 1,
        }
        self.processes_rebalanced += 1;
    }
}

/// Drives the classifier over every live record and commits tier changes.
#[derive(Debug, Clone, Default)]
pub struct Rebalancer {
    classifier: Classifier,
}

impl Rebalancer {
    /// Create a rebalancer using `classifier`.
    #[must_use]
    pub const fn new(classifier: Classifier) -> Self {
        Self { classifier }
    }

    /// Classifier in use.
    #[must_use]
    pub const fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    /// Run one pass over `registry`.
    pub fn run<G>(&self, registry: &G) -> RebalanceReport
    where
        G: ProcessRegistry + ?Sized,
    {
        self.run_with(registry, |_, _| {})
    }

    /// Run one pass, invoking `on_change` for each committed tier change while
    /// the record's lock is still held.
    ///
    /// Records are visited from a snapshot of handles taken at the start of
    /// the pass. Each record is decided and written under its own lock, so a
    /// change applied concurrently by another actor is observed, not
    /// re-counted. Records terminated mid-pass or carrying unusable usage are
    /// skipped.
    pub fn run_with<G, F>(&self, registry: &G, mut on_change: F) -> RebalanceReport
    where
        G: ProcessRegistry + ?Sized,
        F: FnMut(&ProcessRecord, &TierDecision),
    {
        let mut report = RebalanceReport::default();
        let handles = registry.handles();
        let visited = handles.len();

        for handle in handles {
            let mut record = handle.lock();
            if !record.is_live() {
                continue;
            }
            if !record.usage.cpu_percent.is_finite() {
                tracing::warn!(
                    process_id = %record.process_id,
                    "skipping record with unusable cpu figure"
                );
                continue;
            }
            let Some(decision) = self.classifier.decide(&record) else {
                continue;
            };
            if !record.set_tier(decision.to) {
                continue;
            }
            tracing::info!(
                process_id = %record.process_id,
                from = %decision.from,
                to = %decision.to,
                reason = ?decision.reason,
                "tier changed"
            );
            report.count(&decision);
            on_change(&record, &decision);
        }

        tracing::debug!(
            visited,
            upgrades = report.upgrades,
            downgrades = report.downgrades,
            "rebalance pass complete"
        );
        report
    }
}
