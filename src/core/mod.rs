//! Tier policy, classification, and rebalancing.

pub mod audit;
pub mod classifier;
pub mod engine;
pub mod error;
pub mod rebalancer;
pub mod record;
pub mod registry;
pub mod report;
pub mod tier;
pub mod usage;

pub use audit::{build_audit_event, AuditAction, AuditEvent, AuditSink, InMemoryAuditSink};
pub use classifier::{Classifier, DecisionReason, Direction, TierDecision};
pub use engine::{CreateProcessRequest, IdGenerator, TierEngine, UsageUpdate, UuidGenerator};
pub use error::{AppResult, EngineError};
pub use rebalancer::{RebalanceReport, Rebalancer};
pub use record::{is_database_name, is_system_name, ProcessRecord, UsageSnapshot};
pub use registry::{with_live, ProcessRegistry, RecordHandle};
pub use report::{EngineStats, ResourceReport, TierStats, Utilization};
pub use tier::{lookup, ProcessState, ResourceLimits, Tier};
pub use usage::{Band, UsageReport};
