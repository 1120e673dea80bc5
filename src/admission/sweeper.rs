//! Background eviction sweeper.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::debug;

use super::engine::AdmissionEngine;

/// Periodically prunes expired request history so memory stays bounded
/// regardless of request traffic.
///
/// The interval is a startup parameter; the request path never waits on a
/// full sweep because the engine locks one client at a time.
pub struct EvictionSweeper {
    /// The engine whose logs are swept
    engine: Arc<AdmissionEngine>,
    /// Time between sweep passes
    interval: Duration,
}

impl EvictionSweeper {
    /// Create a sweeper over the given engine.
    pub fn new(engine: Arc<AdmissionEngine>, interval: Duration) -> Self {
        Self { engine, interval }
    }

    /// Spawn the sweep loop onto the runtime.
    ///
    /// The loop runs until the returned handle is aborted.
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    async fn run(self) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately; a sweep at startup has
        // nothing to do.
        ticker.tick().await;

        loop {
            ticker.tick().await;
            let stats = self.engine.sweep();
            debug!(
                clients_visited = stats.clients_visited,
                clients_evicted = stats.clients_evicted,
                entries_removed = stats.entries_removed,
                "Eviction sweep complete"
            );
        }
    }
}
