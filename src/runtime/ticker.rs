//! Periodic rebalance driver on a tokio runtime.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::config::EngineConfig;
use crate::core::{ProcessRegistry, TierEngine};

/// Background task running a rebalance pass every `interval`.
///
/// The first pass runs one full interval after start. A pass in progress is
/// never interrupted; shutdown takes effect between passes.
pub struct RebalanceTicker {
    shutdown: watch::Sender<bool>,
    passes: Arc<AtomicU64>,
    join: JoinHandle<()>,
}

impl RebalanceTicker {
    /// Shortest interval between passes.
    pub const MIN_INTERVAL: Duration = Duration::from_millis(1);

    /// Spawn the ticker on `handle`. Intervals shorter than
    /// [`MIN_INTERVAL`](Self::MIN_INTERVAL) are raised to it.
    pub fn spawn<G>(
        handle: &tokio::runtime::Handle,
        engine: Arc<TierEngine<G>>,
        interval: Duration,
    ) -> Self
    where
        G: ProcessRegistry + 'static,
    {
        let interval = interval.max(Self::MIN_INTERVAL);
        let (shutdown, mut shutdown_rx) = watch::channel(false);
        let passes = Arc::new(AtomicU64::new(0));
        let counter = Arc::clone(&passes);

        let join = handle.spawn(async move {
            let mut ticks = tokio::time::interval(interval);
            ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick completes immediately.
            ticks.tick().await;
            loop {
                tokio::select! {
                    _ = ticks.tick() => {
                        let report = engine.rebalance();
                        counter.fetch_add(1, Ordering::Release);
                        tracing::debug!(
                            upgrades = report.upgrades,
                            downgrades = report.downgrades,
                            "scheduled rebalance"
                        );
                    }
                    changed = shutdown_rx.changed() => {
                        if changed.is_err() || *shutdown_rx.borrow() {
                            tracing::info!("rebalance ticker shutting down");
                            break;
                        }
                    }
                }
            }
        });

        Self {
            shutdown,
            passes,
            join,
        }
    }

    /// Spawn on the current runtime. Must be called from within a tokio
    /// context.
    pub fn spawn_current<G>(engine: Arc<TierEngine<G>>, interval: Duration) -> Self
    where
        G: ProcessRegistry + 'static,
    {
        Self::spawn(&tokio::runtime::Handle::current(), engine, interval)
    }

    /// Spawn on the current runtime using `config`'s interval. Returns `None`
    /// when automatic rebalancing is disabled.
    pub fn from_config<G>(engine: Arc<TierEngine<G>>, config: &EngineConfig) -> Option<Self>
    where
        G: ProcessRegistry + 'static,
    {
        config
            .rebalance_interval()
            .map(|interval| Self::spawn_current(engine, interval))
    }

    /// Completed passes so far.
    #[must_use]
    pub fn passes(&self) -> u64 {
        self.passes.load(Ordering::Acquire)
    }

    /// Stop the ticker and wait for it to exit. Returns the number of passes
    /// that ran.
    pub async fn shutdown(self) -> u64 {
        let _ = self.shutdown.send(true);
        if let Err(e) = self.join.await {
            tracing::error!("rebalance ticker task failed: {}", e);
        }
        self.passes.load(Ordering::Acquire)
    }
}
