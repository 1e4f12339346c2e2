//! End-to-end tests of the tier engine.
//!
//! These tests validate:
//! 1. Creation rules (system pinning, database memory multiplier)
//! 2. Usage band tracking and limit enforcement
//! 3. Rebalance ordering, thresholds, and idempotence
//! 4. Deletion semantics

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use prometheus_process_tiers::builders::{build_engine, EngineBuilder};
use prometheus_process_tiers::config::EngineConfig;
use prometheus_process_tiers::core::{
    CreateProcessRequest, EngineError, IdGenerator, ProcessRegistry, ProcessState,
    RebalanceReport, Tier, TierEngine, UsageReport,
};
use prometheus_process_tiers::infra::InMemoryRegistry;

// ============================================================================
// HELPER FUNCTIONS
// ============================================================================

fn engine() -> TierEngine<InMemoryRegistry> {
    prometheus_process_tiers::util::init_tracing();
    build_engine(&EngineConfig::default()).expect("default config is valid")
}

fn create(engine: &TierEngine<InMemoryRegistry>, name: &str, tier: Tier) -> String {
    engine
        .create(CreateProcessRequest::new(name, "cmd", tier))
        .expect("create")
        .process_id
}

fn report(engine: &TierEngine<InMemoryRegistry>, id: &str, cpu: f64, memory: u64, minutes: u32) {
    engine
        .update_usage(id, &UsageReport::new(cpu, memory, minutes))
        .expect("usage accepted");
}

fn tier(engine: &TierEngine<InMemoryRegistry>, id: &str) -> Tier {
    engine.get(id).expect("live process").resource_class
}

struct SequentialIds(AtomicU64);

impl IdGenerator for SequentialIds {
    fn next_id(&self) -> String {
        format!("proc-{}", self.0.fetch_add(1, Ordering::Relaxed))
    }
}

// ============================================================================
// CREATION
// ============================================================================

#[test]
fn test_system_process_forced_critical() {
    let engine = engine();
    let record = engine
        .create(CreateProcessRequest::new("OS_SYSTEM_DAEMON", "init", Tier::BestEffort))
        .unwrap();
    assert_eq!(record.resource_class, Tier::Critical);
    assert_eq!(record.limits.cpu_share_percent, 80);
    assert_eq!(record.state, ProcessState::Running);
}

#[test]
fn test_database_memory_multiplier_per_tier() {
    let engine = engine();
    for (name, tier, expected) in [
        ("prod_postgres_db", Tier::Standard, 4096),
        ("cache-redis", Tier::BestEffort, 1024),
        ("MongoDB-primary", Tier::Critical, 16384),
        ("mysql", Tier::Standard, 4096),
    ] {
        let record = engine
            .create(CreateProcessRequest::new(name, "start", tier))
            .unwrap();
        assert_eq!(record.limits.memory_limit_mb, expected, "{name}");
    }
}

#[test]
fn test_custom_id_generator() {
    let engine = EngineBuilder::new(EngineConfig::default(), Arc::new(InMemoryRegistry::new()))
        .with_id_generator(Box::new(SequentialIds(AtomicU64::new(1))))
        .build()
        .unwrap();
    assert_eq!(create(&engine, "a", Tier::Standard), "proc-1");
    assert_eq!(create(&engine, "b", Tier::Standard), "proc-2");
    assert!(engine.get("proc-2").is_ok());
}

// ============================================================================
// USAGE
// ============================================================================

#[test]
fn test_memory_utilization_end_to_end() {
    let engine = engine();
    let id = create(&engine, "web", Tier::Standard);
    report(&engine, &id, 10.0, 512, 0);

    let resources = engine.resources(&id).unwrap();
    assert_eq!(resources.utilization.memory_utilization, "25.0%");
    assert_eq!(resources.utilization.cpu_utilization, "10.0%");
    assert_eq!(resources.limits.max_file_descriptors, 8192);
    assert_eq!(resources.limits.max_processes, 1024);
}

#[test]
fn test_memory_violation_rejected_and_record_unchanged() {
    let engine = engine();
    let id = create(&engine, "fault-proc", Tier::Standard);
    report(&engine, &id, 30.0, 100, 0);
    let before = engine.get(&id).unwrap();

    let err = engine
        .update_usage(&id, &UsageReport::new(10.0, 51200, 1))
        .unwrap_err();
    assert_eq!(
        err,
        EngineError::ResourceLimitViolation {
            used_mb: 51200,
            limit_mb: 2048
        }
    );

    let after = engine.get(&id).unwrap();
    assert_eq!(after.usage, before.usage);
    assert_eq!(after.resource_class, before.resource_class);
    assert_eq!(after.last_updated, before.last_updated);
}

#[test]
fn test_best_effort_memory_limit() {
    let engine = engine();
    let id = create(&engine, "limit-test-proc", Tier::BestEffort);
    let err = engine
        .update_usage(&id, &UsageReport::new(10.0, 600, 1))
        .unwrap_err();
    assert!(err.to_string().to_lowercase().contains("exceeds limit"));
}

#[test]
fn test_update_unknown_process_is_not_found() {
    let engine = engine();
    let err = engine
        .update_usage("0000-0000-0000", &UsageReport::new(50.0, 100, 0))
        .unwrap_err();
    assert!(matches!(err, EngineError::NotFound(_)));
}

#[test]
fn test_last_updated_never_moves_backwards() {
    let engine = engine();
    let id = create(&engine, "clock", Tier::BestEffort);
    let mut previous = engine.get(&id).unwrap().last_updated;
    for cpu in [10.0, 90.0, 65.0] {
        report(&engine, &id, cpu, 10, 1);
        engine.rebalance();
        let current = engine.get(&id).unwrap().last_updated;
        assert!(current >= previous);
        previous = current;
    }
}

// ============================================================================
// REBALANCE
// ============================================================================

#[test]
fn test_upgrade_best_effort_on_activity() {
    let engine = engine();
    let id = create(&engine, "batch", Tier::BestEffort);
    report(&engine, &id, 65.0, 100, 0);

    let result = engine.rebalance();
    assert!(result.upgrades >= 1);
    assert_eq!(tier(&engine, &id), Tier::Standard);
    assert_eq!(engine.get(&id).unwrap().limits.cpu_share_percent, 50);
}

#[test]
fn test_upgrade_boundary_is_strict() {
    let engine = engine();
    let id = create(&engine, "border-proc", Tier::BestEffort);
    report(&engine, &id, 50.0, 0, 0);
    assert_eq!(engine.rebalance(), RebalanceReport::default());
    assert_eq!(tier(&engine, &id), Tier::BestEffort);
}

#[test]
fn test_overload_and_idle_boundaries_are_strict() {
    let engine = engine();
    let hot = create(&engine, "hot", Tier::Critical);
    let cold = create(&engine, "cold", Tier::Critical);
    report(&engine, &hot, 80.0, 0, 60);
    report(&engine, &cold, 20.0, 0, 60);

    assert_eq!(engine.rebalance(), RebalanceReport::default());
    assert_eq!(tier(&engine, &hot), Tier::Critical);
    assert_eq!(tier(&engine, &cold), Tier::Critical);
}

#[test]
fn test_sustained_overload_demotes_to_best_effort() {
    let engine = engine();
    let id = create(&engine, "hive-metastore", Tier::Critical);
    report(&engine, &id, 95.0, 4096, 30);

    let result = engine.rebalance();
    assert_eq!(result.downgrades, 1);
    let record = engine.get(&id).unwrap();
    assert_eq!(record.resource_class, Tier::BestEffort);
    assert_eq!(record.limits.cpu_share_percent, 20);
}

#[test]
fn test_sequential_downgrade_chain() {
    let engine = engine();
    let id = create(&engine, "chain-down-proc", Tier::Critical);

    report(&engine, &id, 5.0, 100, 11);
    engine.rebalance();
    assert_eq!(tier(&engine, &id), Tier::Standard);

    report(&engine, &id, 5.0, 100, 11);
    engine.rebalance();
    assert_eq!(tier(&engine, &id), Tier::BestEffort);

    report(&engine, &id, 5.0, 100, 11);
    assert_eq!(engine.rebalance(), RebalanceReport::default());
    assert_eq!(tier(&engine, &id), Tier::BestEffort);
}

#[test]
fn test_cpu_oscillation_resets_timer() {
    let engine = engine();
    let id = create(&engine, "oscillator", Tier::Standard);

    report(&engine, &id, 90.0, 0, 4);
    engine.rebalance();
    assert_eq!(tier(&engine, &id), Tier::Standard);

    report(&engine, &id, 10.0, 0, 1);
    report(&engine, &id, 90.0, 0, 2);
    engine.rebalance();
    assert_eq!(tier(&engine, &id), Tier::Standard);

    let usage = engine.get(&id).unwrap().usage;
    assert_eq!(usage.high_cpu_duration_minutes, 2);
    assert_eq!(usage.low_cpu_duration_minutes, 0);
}

#[test]
fn test_system_process_immunity() {
    let engine = engine();
    let id = create(&engine, "MY_SYSTEM_SVC", Tier::Critical);
    for (cpu, minutes) in [(5.0, 15), (99.0, 120), (0.0, 1000)] {
        report(&engine, &id, cpu, 100, minutes);
        engine.rebalance();
        assert_eq!(tier(&engine, &id), Tier::Critical);
    }
}

#[test]
fn test_rebalance_twice_is_idempotent() {
    let engine = engine();
    let a = create(&engine, "a", Tier::BestEffort);
    let b = create(&engine, "b", Tier::Standard);
    report(&engine, &a, 70.0, 100, 0);
    report(&engine, &b, 3.0, 100, 15);

    let first = engine.rebalance();
    assert_eq!(first.processes_rebalanced, 2);
    assert_eq!(first.processes_rebalanced, first.upgrades + first.downgrades);
    assert_eq!(engine.rebalance(), RebalanceReport::default());
}

// ============================================================================
// DELETION AND STATS
// ============================================================================

#[test]
fn test_delete_idempotency() {
    let engine = engine();
    let id = create(&engine, "del-test", Tier::Standard);
    assert!(engine.terminate(&id).is_ok());
    assert!(matches!(engine.terminate(&id), Err(EngineError::NotFound(_))));
    assert!(matches!(engine.get(&id), Err(EngineError::NotFound(_))));
    assert!(matches!(engine.resources(&id), Err(EngineError::NotFound(_))));
    assert!(engine.registry().get(&id).is_none());
}

#[test]
fn test_stats_aggregate_live_processes() {
    let engine = engine();
    let a = create(&engine, "a", Tier::Standard);
    let b = create(&engine, "b", Tier::Standard);
    let c = create(&engine, "c", Tier::BestEffort);
    report(&engine, &a, 30.0, 100, 0);
    report(&engine, &b, 40.0, 200, 0);
    engine.terminate(&c).unwrap();

    let stats = engine.stats();
    assert_eq!(stats.total_processes, 2);
    let standard = &stats.by_class[&Tier::Standard];
    assert_eq!(standard.count, 2);
    assert!((standard.total_cpu_usage - 70.0).abs() < 1e-9);
    assert_eq!(standard.total_memory_mb, 300);
    assert_eq!(stats.by_class[&Tier::BestEffort].count, 0);
    assert_eq!(stats.by_state[&ProcessState::Running], 2);
    assert_eq!(stats.by_state[&ProcessState::Terminated], 0);
}
