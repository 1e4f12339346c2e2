//! Engine facade composing the registry, classifier, and audit sink.

use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::core::audit::{build_audit_event, AuditAction, AuditSink};
use crate::core::classifier::{Classifier, Direction};
use crate::core::rebalancer::{RebalanceReport, Rebalancer};
use crate::core::record::{ProcessRecord, UsageSnapshot};
use crate::core::registry::{with_live, ProcessRegistry};
use crate::core::report::{EngineStats, ResourceReport};
use crate::core::tier::{ProcessState, Tier};
use crate::core::usage::{self, UsageReport};
use crate::core::EngineError;

/// Source of process identifiers.
pub trait IdGenerator: Send + Sync {
    /// Produce a fresh identifier.
    fn next_id(&self) -> String;
}

/// Random UUID v4 identifiers.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidGenerator;

impl IdGenerator for UuidGenerator {
    fn next_id(&self) -> String {
        uuid::Uuid::new_v4().to_string()
    }
}

/// Request to register a new managed process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateProcessRequest {
    /// Display name.
    pub name: String,
    /// Launch command.
    pub command: String,
    /// Requested tier; `STANDARD` when omitted. Ignored for system names.
    #[serde(default)]
    pub resource_class: Tier,
}

impl CreateProcessRequest {
    /// Convenience constructor.
    pub fn new(name: impl Into<String>, command: impl Into<String>, resource_class: Tier) -> Self {
        Self {
            name: name.into(),
            command: command.into(),
            resource_class,
        }
    }

    fn validate(&self) -> Result<(), EngineError> {
        if self.name.is_empty() {
            return Err(EngineError::Validation("Process name cannot be empty".into()));
        }
        if self.command.is_empty() {
            return Err(EngineError::Validation("Process command cannot be empty".into()));
        }
        Ok(())
    }
}

/// Outcome of an accepted usage report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageUpdate {
    /// Always `"success"`.
    pub status: String,
    /// Process identifier.
    pub process_id: String,
    /// Usage after the update.
    pub usage: UsageSnapshot,
}

type SharedAudit = Arc<Mutex<Box<dyn AuditSink>>>;

/// Tier engine over a registry backend.
pub struct TierEngine<G> {
    registry: Arc<G>,
    rebalancer: Rebalancer,
    ids: Box<dyn IdGenerator>,
    audit: Option<SharedAudit>,
}

impl<G> TierEngine<G>
where
    G: ProcessRegistry,
{
    /// Create an engine over `registry` with default ids and no audit sink.
    pub fn new(registry: Arc<G>, classifier: Classifier) -> Self {
        Self {
            registry,
            rebalancer: Rebalancer::new(classifier),
            ids: Box::new(UuidGenerator),
            audit: None,
        }
    }

    /// Replace the identifier source.
    #[must_use]
    pub fn with_id_generator(mut self, ids: Box<dyn IdGenerator>) -> Self {
        self.ids = ids;
        self
    }

    /// Attach an audit sink.
    #[must_use]
    pub fn with_audit(mut self, audit: Box<dyn AuditSink>) -> Self {
        self.audit = Some(Arc::new(Mutex::new(audit)));
        self
    }

    /// Underlying registry.
    pub fn registry(&self) -> &Arc<G> {
        &self.registry
    }

    /// Classifier in use.
    pub const fn classifier(&self) -> &Classifier {
        self.rebalancer.classifier()
    }

    /// Register a new process.
    ///
    /// # Errors
    ///
    /// [`EngineError::Validation`] for an empty name or command.
    pub fn create(&self, request: CreateProcessRequest) -> Result<ProcessRecord, EngineError> {
        request.validate()?;
        let record = ProcessRecord::new(
            self.ids.next_id(),
            request.name,
            request.command,
            request.resource_class,
        );
        let snapshot = record.clone();
        self.registry.insert(record)?;

        tracing::info!(
            process_id = %snapshot.process_id,
            name = %snapshot.name,
            tier = %snapshot.resource_class,
            "process created"
        );
        self.record_audit(
            &snapshot.process_id,
            AuditAction::Create,
            Some(snapshot.resource_class.to_string()),
        );
        Ok(snapshot)
    }

    /// Current view of a process, with uptime refreshed if running.
    ///
    /// # Errors
    ///
    /// [`EngineError::NotFound`] for an unknown id.
    pub fn get(&self, id: &str) -> Result<ProcessRecord, EngineError> {
        with_live(&*self.registry, id, |record| {
            record.refresh_uptime();
            record.clone()
        })
    }

    /// Limits, usage, and utilisation of a process.
    ///
    /// # Errors
    ///
    /// [`EngineError::NotFound`] for an unknown id.
    pub fn resources(&self, id: &str) -> Result<ResourceReport, EngineError> {
        with_live(&*self.registry, id, |record| ResourceReport::from(&*record))
    }

    /// Terminate and remove a process.
    ///
    /// # Errors
    ///
    /// [`EngineError::NotFound`] if the id is unknown or already removed.
    pub fn terminate(&self, id: &str) -> Result<(), EngineError> {
        let handle = self
            .registry
            .remove(id)
            .ok_or_else(|| EngineError::NotFound(id.to_string()))?;
        {
            let mut record = handle.lock();
            if !record.is_live() {
                return Err(EngineError::NotFound(id.to_string()));
            }
            record.state = ProcessState::Terminated;
            record.touch();
        }
        tracing::info!(process_id = %id, "process terminated");
        self.record_audit(id, AuditAction::Terminate, None);
        Ok(())
    }

    /// Apply a usage report to a process.
    ///
    /// # Errors
    ///
    /// [`EngineError::NotFound`] for an unknown id,
    /// [`EngineError::ResourceLimitViolation`] when memory exceeds the current
    /// limit, and [`EngineError::Validation`] for an unusable CPU figure. The
    /// record is unchanged on error.
    pub fn update_usage(&self, id: &str, report: &UsageReport) -> Result<UsageUpdate, EngineError> {
        let policy = self.classifier().policy();
        let outcome = with_live(&*self.registry, id, |record| {
            usage::apply(record, report, policy).map(|band| (band, record.usage.clone()))
        })?;

        match outcome {
            Ok((band, usage)) => {
                self.record_audit(id, AuditAction::Usage, Some(format!("{band:?}")));
                Ok(UsageUpdate {
                    status: "success".into(),
                    process_id: id.to_string(),
                    usage,
                })
            }
            Err(err) => {
                self.record_audit(id, AuditAction::Reject, Some(err.to_string()));
                Err(err)
            }
        }
    }

    /// Run one rebalance pass.
    pub fn rebalance(&self) -> RebalanceReport {
        let report = self
            .rebalancer
            .run_with(&*self.registry, |record, decision| {
                let action = match decision.direction() {
                    Direction::Upgrade => AuditAction::Upgrade,
                    Direction::Downgrade => AuditAction::Downgrade,
                };
                self.record_audit(
                    &record.process_id,
                    action,
                    Some(format!("{} -> {}", decision.from, decision.to)),
                );
            });
        if report.processes_rebalanced > 0 {
            tracing::info!(
                upgrades = report.upgrades,
                downgrades = report.downgrades,
                "rebalance committed tier changes"
            );
        }
        report
    }

    /// Aggregate statistics over live processes.
    pub fn stats(&self) -> EngineStats {
        let mut stats = EngineStats::default();
        for handle in self.registry.handles() {
            let record = handle.lock();
            if record.is_live() {
                stats.add(&record);
            }
        }
        stats
    }

    fn record_audit(&self, process_id: &str, action: AuditAction, detail: Option<String>) {
        if let Some(audit) = &self.audit {
            audit
                .lock()
                .record(build_audit_event(process_id, action, detail));
        }
    }
}
