//! Core admission engine implementation.

use std::time::Instant;

use dashmap::DashMap;
use tracing::{debug, trace};

use super::registry::ConfigRegistry;
use super::window::{Decision, RequestLog, WindowConfig};

/// Counters reported by one sweep pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepStats {
    /// Clients visited during the sweep
    pub clients_visited: usize,
    /// Clients whose log emptied out and was removed
    pub clients_evicted: usize,
    /// Expired timestamps dropped across all clients
    pub entries_removed: usize,
}

/// The admission control engine.
///
/// Owns every client's request log and the configuration registry. All
/// mutation goes through this type; the read-prune-decide-append sequence
/// for one client runs under that client's map entry, so concurrent checks
/// for the same client serialize while unrelated clients proceed in
/// parallel.
pub struct AdmissionEngine {
    /// Request logs indexed by client id
    logs: DashMap<String, RequestLog>,
    /// Global default and per-client override configuration
    registry: ConfigRegistry,
    /// Startup default, restored by `reset_all`
    default_config: WindowConfig,
}

impl AdmissionEngine {
    /// Create an engine with the built-in default configuration.
    pub fn new() -> Self {
        Self::with_default_config(WindowConfig::default())
    }

    /// Create an engine with a specific startup default configuration.
    pub fn with_default_config(config: WindowConfig) -> Self {
        Self {
            logs: DashMap::new(),
            registry: ConfigRegistry::new(config),
            default_config: config,
        }
    }

    /// Decide whether one request from `client_id` is admitted.
    ///
    /// Unknown clients start from an empty log. On admission the current
    /// timestamp is recorded; on denial the log is left as its pruned view
    /// and a retry hint is returned.
    pub fn check(&self, client_id: &str) -> Decision {
        let config = self.registry.effective(client_id);
        let now = Instant::now();

        trace!(
            client_id = %client_id,
            limit = config.limit,
            window_secs = config.window_seconds(),
            "Checking admission"
        );

        let mut log = self.logs.entry(client_id.to_string()).or_default();
        let decision = log.admit(&config, now);

        if !decision.allowed {
            debug!(
                client_id = %client_id,
                limit = config.limit,
                retry_after = decision.retry_after,
                "Admission denied"
            );
        }

        decision
    }

    /// Replace the global default configuration.
    pub fn configure_global(&self, config: WindowConfig) -> WindowConfig {
        self.registry.set_global(config)
    }

    /// Set or replace the override for one client.
    pub fn configure_client(&self, client_id: &str, config: WindowConfig) -> WindowConfig {
        self.registry.set_override(client_id, config)
    }

    /// The configuration in effect for one client.
    pub fn effective_config(&self, client_id: &str) -> WindowConfig {
        self.registry.effective(client_id)
    }

    /// The current global default configuration.
    pub fn global_config(&self) -> WindowConfig {
        self.registry.global()
    }

    /// Remove the override for one client. Idempotent.
    pub fn reset_client_config(&self, client_id: &str) {
        self.registry.clear_override(client_id);
    }

    /// Clear all request logs and overrides and restore the startup default
    /// global configuration.
    ///
    /// Primarily useful for test harnesses.
    pub fn reset_all(&self) {
        self.logs.clear();
        self.registry.reset(self.default_config);
        debug!("Engine state reset");
    }

    /// Prune every client's log against that client's effective window and
    /// drop clients whose log emptied out.
    ///
    /// Locks one client entry at a time rather than the whole store, so
    /// concurrent checks are only ever blocked for the duration of a single
    /// client's prune.
    pub fn sweep(&self) -> SweepStats {
        let mut stats = SweepStats::default();

        let clients: Vec<String> = self.logs.iter().map(|entry| entry.key().clone()).collect();
        for client_id in clients {
            stats.clients_visited += 1;
            let window = self.registry.effective(&client_id).window;
            let now = Instant::now();

            if let Some(mut log) = self.logs.get_mut(&client_id) {
                let before = log.len();
                log.prune(now, window);
                stats.entries_removed += before - log.len();
            }

            if self
                .logs
                .remove_if(&client_id, |_, log| log.is_empty())
                .is_some()
            {
                stats.clients_evicted += 1;
            }
        }

        stats
    }

    /// Number of clients currently holding a request log.
    pub fn client_count(&self) -> usize {
        self.logs.len()
    }
}

impl Default for AdmissionEngine {
    fn default() -> Self {
        Self::new()
    }
}
