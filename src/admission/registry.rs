//! Configuration registry: the global default and per-client overrides.

use dashmap::DashMap;
use parking_lot::RwLock;
use tracing::debug;

use super::window::WindowConfig;

/// Holds the process-wide default window configuration and any per-client
/// overrides.
///
/// The global config is read on every check and written rarely, so it sits
/// behind a reader-friendly lock. Overrides live in a sharded map keyed by
/// client id.
pub struct ConfigRegistry {
    /// Process-wide default configuration
    global: RwLock<WindowConfig>,
    /// Per-client overrides, superseding the global while present
    overrides: DashMap<String, WindowConfig>,
}

impl ConfigRegistry {
    /// Create a registry with the given global default.
    pub fn new(global: WindowConfig) -> Self {
        Self {
            global: RwLock::new(global),
            overrides: DashMap::new(),
        }
    }

    /// Replace the global default configuration.
    ///
    /// Takes effect immediately for every client without an override. Does
    /// not touch any recorded request history.
    pub fn set_global(&self, config: WindowConfig) -> WindowConfig {
        let mut global = self.global.write();
        *global = config;
        debug!(
            window_secs = config.window_seconds(),
            limit = config.limit,
            "Global configuration replaced"
        );
        config
    }

    /// The current global default configuration.
    pub fn global(&self) -> WindowConfig {
        *self.global.read()
    }

    /// Set or replace the override for one client.
    pub fn set_override(&self, client_id: &str, config: WindowConfig) -> WindowConfig {
        self.overrides.insert(client_id.to_string(), config);
        debug!(
            client_id = %client_id,
            window_secs = config.window_seconds(),
            limit = config.limit,
            "Client override set"
        );
        config
    }

    /// Remove the override for one client, if any.
    ///
    /// Idempotent: succeeds whether or not an override existed.
    pub fn clear_override(&self, client_id: &str) {
        if self.overrides.remove(client_id).is_some() {
            debug!(client_id = %client_id, "Client override cleared");
        }
    }

    /// The configuration in effect for one client: its override if present,
    /// else the global default.
    pub fn effective(&self, client_id: &str) -> WindowConfig {
        match self.overrides.get(client_id) {
            Some(config) => *config,
            None => self.global(),
        }
    }

    /// Whether the client currently has an override.
    pub fn has_override(&self, client_id: &str) -> bool {
        self.overrides.contains_key(client_id)
    }

    /// Number of active overrides.
    pub fn override_count(&self) -> usize {
        self.overrides.len()
    }

    /// Drop all overrides and restore the given global default.
    pub fn reset(&self, global: WindowConfig) {
        self.overrides.clear();
        *self.global.write() = global;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn config(window_secs: u64, limit: u32) -> WindowConfig {
        WindowConfig::new(Duration::from_secs(window_secs), limit).unwrap()
    }

    #[test]
    fn test_effective_falls_back_to_global() {
        let registry = ConfigRegistry::new(config(60, 100));
        assert_eq!(registry.effective("unknown"), config(60, 100));
    }

    #[test]
    fn test_override_supersedes_global() {
        let registry = ConfigRegistry::new(config(60, 100));
        registry.set_override("client-x", config(60, 3));

        assert_eq!(registry.effective("client-x"), config(60, 3));
        assert_eq!(registry.effective("client-y"), config(60, 100));
    }

    #[test]
    fn test_set_global_observed_immediately() {
        let registry = ConfigRegistry::new(config(60, 100));
        registry.set_global(config(30, 10));

        assert_eq!(registry.global(), config(30, 10));
        assert_eq!(registry.effective("anyone"), config(30, 10));
    }

    #[test]
    fn test_clear_override_is_idempotent() {
        let registry = ConfigRegistry::new(config(60, 100));
        registry.set_override("client-x", config(10, 1));

        registry.clear_override("client-x");
        assert_eq!(registry.effective("client-x"), config(60, 100));

        // No override present, still fine.
        registry.clear_override("client-x");
        registry.clear_override("never-configured");
        assert_eq!(registry.effective("client-x"), config(60, 100));
    }

    #[test]
    fn test_set_override_replaces_prior() {
        let registry = ConfigRegistry::new(config(60, 100));
        registry.set_override("client-x", config(10, 1));
        registry.set_override("client-x", config(20, 5));

        assert_eq!(registry.effective("client-x"), config(20, 5));
        assert_eq!(registry.override_count(), 1);
    }

    #[test]
    fn test_reset_restores_default_and_drops_overrides() {
        let registry = ConfigRegistry::new(config(60, 100));
        registry.set_global(config(5, 5));
        registry.set_override("client-x", config(10, 1));

        registry.reset(config(60, 100));

        assert_eq!(registry.global(), config(60, 100));
        assert_eq!(registry.override_count(), 0);
        assert!(!registry.has_override("client-x"));
    }
}
