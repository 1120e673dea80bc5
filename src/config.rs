//! Configuration management for Floodgate.

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::time::Duration;

use crate::admission::WindowConfig;
use crate::error::{FloodgateError, Result};

/// Main configuration for the Floodgate service.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FloodgateConfig {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Admission engine configuration
    #[serde(default)]
    pub engine: EngineConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// HTTP server address
    #[serde(default = "default_listen_addr")]
    pub listen_addr: SocketAddr,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
        }
    }
}

fn default_listen_addr() -> SocketAddr {
    "127.0.0.1:8080".parse().unwrap()
}

/// Admission engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Default window duration in seconds
    #[serde(default = "default_window_secs")]
    pub default_window_secs: u64,

    /// Default request limit per window
    #[serde(default = "default_limit")]
    pub default_limit: u32,

    /// Seconds between eviction sweeps
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_secs: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_window_secs: default_window_secs(),
            default_limit: default_limit(),
            sweep_interval_secs: default_sweep_interval(),
        }
    }
}

fn default_window_secs() -> u64 {
    60
}

fn default_limit() -> u32 {
    100
}

fn default_sweep_interval() -> u64 {
    30
}

impl EngineConfig {
    /// The startup default window configuration.
    pub fn window_config(&self) -> Result<WindowConfig> {
        WindowConfig::new(
            Duration::from_secs(self.default_window_secs),
            self.default_limit,
        )
    }

    /// Interval between eviction sweeps.
    pub fn sweep_interval(&self) -> Result<Duration> {
        if self.sweep_interval_secs == 0 {
            return Err(FloodgateError::Config(
                "sweep_interval_secs must be positive".to_string(),
            ));
        }
        Ok(Duration::from_secs(self.sweep_interval_secs))
    }
}

impl FloodgateConfig {
    /// Load configuration from a file path.
    pub fn from_file(path: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml(&contents)
    }

    /// Load configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).map_err(|e| FloodgateError::Config(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = FloodgateConfig::default();
        assert_eq!(config.server.listen_addr, default_listen_addr());
        assert_eq!(config.engine.default_window_secs, 60);
        assert_eq!(config.engine.default_limit, 100);
        assert_eq!(config.engine.sweep_interval_secs, 30);
    }

    #[test]
    fn test_parse_yaml() {
        let yaml = r#"
server:
  listen_addr: "0.0.0.0:9000"
engine:
  default_window_secs: 30
  default_limit: 10
  sweep_interval_secs: 5
"#;
        let config = FloodgateConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.server.listen_addr.port(), 9000);
        assert_eq!(config.engine.default_window_secs, 30);
        assert_eq!(config.engine.default_limit, 10);
        assert_eq!(config.engine.sweep_interval_secs, 5);
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let yaml = r#"
engine:
  default_limit: 7
"#;
        let config = FloodgateConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.engine.default_limit, 7);
        assert_eq!(config.engine.default_window_secs, 60);
        assert_eq!(config.server.listen_addr, default_listen_addr());
    }

    #[test]
    fn test_invalid_engine_values_rejected() {
        let config = EngineConfig {
            default_window_secs: 0,
            default_limit: 10,
            sweep_interval_secs: 30,
        };
        assert!(config.window_config().is_err());

        let config = EngineConfig {
            default_window_secs: 60,
            default_limit: 10,
            sweep_interval_secs: 0,
        };
        assert!(config.sweep_interval().is_err());
    }
}
