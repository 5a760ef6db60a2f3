//! Layered configuration for the monitor.
//!
//! Settings are resolved in this order, later sources winning:
//!
//! 1. compiled defaults ([`Settings::default`])
//! 2. an optional TOML file
//! 3. `BENCHWATCH_*` environment variables (`__` separates sections)
//! 4. command line flags (applied by the binary)
//!
//! ```toml
//! [bus]
//! host = "172.19.0.1"
//! port = 1882
//! topic = "q1-results"
//!
//! [monitoring]
//! stats_interval_ms = 3000
//! ```

use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

/// Prefix for environment overrides, e.g. `BENCHWATCH_BUS__PORT=1883`.
pub const ENV_PREFIX: &str = "BENCHWATCH";

/// Broker connection settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BusSettings {
    pub host: String,
    pub port: u16,
    pub topic: String,
    /// JSON key holding the publish timestamp (milliseconds since epoch).
    pub timestamp_key: String,
    pub keep_alive_secs: u64,
    pub initial_backoff_secs: u64,
    pub max_backoff_secs: u64,
}

impl Default for BusSettings {
    fn default() -> Self {
        Self {
            host: "172.19.0.1".to_string(),
            port: 1882,
            topic: "q1-results".to_string(),
            timestamp_key: "bid$timestamp".to_string(),
            keep_alive_secs: 60,
            initial_backoff_secs: 5,
            max_backoff_secs: 60,
        }
    }
}

impl BusSettings {
    pub fn keep_alive(&self) -> Duration {
        Duration::from_secs(self.keep_alive_secs)
    }

    pub fn initial_backoff(&self) -> Duration {
        Duration::from_secs(self.initial_backoff_secs)
    }

    pub fn max_backoff(&self) -> Duration {
        Duration::from_secs(self.max_backoff_secs)
    }

    /// Broker address for display, e.g. `mqtt://172.19.0.1:1882/q1-results`.
    pub fn describe(&self) -> String {
        format!("mqtt://{}:{}/{}", self.host, self.port, self.topic)
    }
}

/// Window capacities, refresh cadence and introspection limits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitoringSettings {
    pub max_latency_points: usize,
    pub max_stats_points: usize,
    pub update_interval_ms: u64,
    pub stats_interval_ms: u64,
    pub command_timeout_secs: u64,
    /// Upper bound on process-table candidates offered for selection.
    pub max_entities: usize,
}

impl Default for MonitoringSettings {
    fn default() -> Self {
        Self {
            max_latency_points: 500,
            max_stats_points: 50,
            update_interval_ms: 2000,
            stats_interval_ms: 3000,
            command_timeout_secs: 10,
            max_entities: 15,
        }
    }
}

impl MonitoringSettings {
    pub fn update_interval(&self) -> Duration {
        Duration::from_millis(self.update_interval_ms)
    }

    pub fn stats_interval(&self) -> Duration {
        Duration::from_millis(self.stats_interval_ms)
    }

    pub fn command_timeout(&self) -> Duration {
        Duration::from_secs(self.command_timeout_secs)
    }
}

/// Complete monitor configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub bus: BusSettings,
    pub monitoring: MonitoringSettings,
}

impl Settings {
    /// Load settings from defaults, an optional file and the environment.
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder().add_source(Config::try_from(&Settings::default())?);

        if let Some(path) = config_path {
            builder = builder.add_source(File::from(path));
        }

        let config = builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Ok(config.try_deserialize()?)
    }
}
