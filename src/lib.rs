//! # Prometheus Process Tiers
//!
//! A resource-class admission and rebalancing policy engine for managed OS
//! processes.
//!
//! Every managed process belongs to one of three tiers (`CRITICAL`,
//! `STANDARD`, `BEST_EFFORT`). The tier determines its resource limits, and a
//! rebalance pass periodically moves processes between tiers based on the CPU
//! usage reported for them.
//!
//! ## Key Features
//!
//! - **Fixed Limit Table**: CPU share, memory, descriptors, process count, and
//!   I/O weight per tier, with doubled memory for database processes
//! - **Name-Derived Pinning**: `_SYSTEM_` processes are always `CRITICAL` and
//!   never downgraded
//! - **Band Tracking**: reported CPU is classified into high/low/neutral bands
//!   with the reporter's asserted time-in-band
//! - **Rebalancing**: upgrade before downgrade, sustained overload demotes to
//!   `BEST_EFFORT`, sustained idleness demotes one tier
//! - **Per-Record Locking**: concurrent usage updates, deletions, and rebalance
//!   passes never lose updates or resurrect removed processes
//! - **HTTP-Shaped API**: transport-agnostic routing with status codes and
//!   JSON bodies
//!
//! ## Example
//!
//! ```rust
//! use prometheus_process_tiers::builders::build_engine;
//! use prometheus_process_tiers::config::EngineConfig;
//! use prometheus_process_tiers::core::{CreateProcessRequest, Tier, UsageReport};
//!
//! let engine = build_engine(&EngineConfig::default()).unwrap();
//! let record = engine
//!     .create(CreateProcessRequest::new("batch-job", "run.sh", Tier::BestEffort))
//!     .unwrap();
//!
//! engine
//!     .update_usage(&record.process_id, &UsageReport::new(65.0, 256, 0))
//!     .unwrap();
//! let report = engine.rebalance();
//!
//! assert_eq!(report.upgrades, 1);
//! assert_eq!(engine.get(&record.process_id).unwrap().resource_class, Tier::Standard);
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Tier policy, classification, rebalancing, and the engine facade.
pub mod core;
/// Configuration models for the policy and the engine.
pub mod config;
/// Builders to construct engines from configuration.
pub mod builders;
/// Infrastructure adapters for registry backends.
pub mod infra;
/// Runtime adapters (periodic ticker) and API surface.
pub mod runtime;
/// Shared utilities.
pub mod util;
