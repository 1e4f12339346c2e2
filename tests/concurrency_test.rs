//! Concurrency tests for per-record atomicity.
//!
//! These tests validate:
//! - Concurrent usage updates never leave both band counters nonzero
//! - Rebalance passes racing with updates count every change exactly once
//! - Deletion racing with updates never resurrects a record

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;

use prometheus_process_tiers::builders::build_engine;
use prometheus_process_tiers::config::EngineConfig;
use prometheus_process_tiers::core::{
    CreateProcessRequest, EngineError, ProcessRegistry, Tier, TierEngine, UsageReport,
};
use prometheus_process_tiers::infra::InMemoryRegistry;

fn shared_engine() -> Arc<TierEngine<InMemoryRegistry>> {
    Arc::new(build_engine(&EngineConfig::default()).expect("default config is valid"))
}

#[test]
fn test_concurrent_updates_keep_band_invariant() {
    let engine = shared_engine();
    let id = engine
        .create(CreateProcessRequest::new("contended", "run", Tier::Critical))
        .unwrap()
        .process_id;
    let barrier = Arc::new(Barrier::new(8));

    let handles: Vec<_> = (0..8)
        .map(|worker| {
            let engine = Arc::clone(&engine);
            let barrier = Arc::clone(&barrier);
            let id = id.clone();
            thread::spawn(move || {
                barrier.wait();
                for i in 0..200u32 {
                    let cpu = if (worker + i) % 2 == 0 { 95.0 } else { 5.0 };
                    engine
                        .update_usage(&id, &UsageReport::new(cpu, 64, i % 20))
                        .unwrap();
                    let usage = engine.get(&id).unwrap().usage;
                    assert!(
                        usage.high_cpu_duration_minutes == 0 || usage.low_cpu_duration_minutes == 0
                    );
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("worker panicked");
    }
}

#[test]
fn test_parallel_rebalance_counts_each_change_once() {
    let engine = shared_engine();
    let ids: Vec<String> = (0..200)
        .map(|i| {
            let id = engine
                .create(CreateProcessRequest::new(format!("job-{i}"), "run", Tier::BestEffort))
                .unwrap()
                .process_id;
            engine
                .update_usage(&id, &UsageReport::new(65.0, 100, 0))
                .unwrap();
            id
        })
        .collect();

    let upgrades = Arc::new(AtomicUsize::new(0));
    let barrier = Arc::new(Barrier::new(4));
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let engine = Arc::clone(&engine);
            let upgrades = Arc::clone(&upgrades);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                let report = engine.rebalance();
                upgrades.fetch_add(report.upgrades, Ordering::Relaxed);
                assert_eq!(report.downgrades, 0);
            })
        })
        .collect();
    for handle in handles {
        handle.join().expect("rebalancer panicked");
    }

    assert_eq!(upgrades.load(Ordering::Relaxed), ids.len());
    for id in &ids {
        assert_eq!(engine.get(id).unwrap().resource_class, Tier::Standard);
    }
}

#[test]
fn test_delete_racing_updates_never_resurrects() {
    let engine = shared_engine();
    let ids: Vec<String> = (0..100)
        .map(|i| {
            engine
                .create(CreateProcessRequest::new(format!("victim-{i}"), "run", Tier::Standard))
                .unwrap()
                .process_id
        })
        .collect();
    let ids = Arc::new(ids);
    let barrier = Arc::new(Barrier::new(3));

    let deleter = {
        let engine = Arc::clone(&engine);
        let ids = Arc::clone(&ids);
        let barrier = Arc::clone(&barrier);
        thread::spawn(move || {
            barrier.wait();
            for id in ids.iter() {
                engine.terminate(id).unwrap();
            }
        })
    };
    let updaters: Vec<_> = (0..2)
        .map(|_| {
            let engine = Arc::clone(&engine);
            let ids = Arc::clone(&ids);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                for id in ids.iter() {
                    match engine.update_usage(id, &UsageReport::new(10.0, 10, 12)) {
                        Ok(_) | Err(EngineError::NotFound(_)) => {}
                        Err(other) => panic!("unexpected error: {other}"),
                    }
                    engine.rebalance();
                }
            })
        })
        .collect();

    deleter.join().expect("deleter panicked");
    for updater in updaters {
        updater.join().expect("updater panicked");
    }

    assert!(engine.registry().is_empty());
    for id in ids.iter() {
        assert!(matches!(engine.get(id), Err(EngineError::NotFound(_))));
        assert!(matches!(engine.terminate(id), Err(EngineError::NotFound(_))));
    }
    assert_eq!(engine.stats().total_processes, 0);
}
