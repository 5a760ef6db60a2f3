//! Sample types stored in the rolling windows.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde::Serialize;

/// One end-to-end latency measurement taken when a bus message arrived.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatencySample {
    pub observed_at: SystemTime,
    pub latency_ms: f64,
}

/// Which introspection path produced a reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReadingSource {
    ContainerRuntime,
    ProcessTable,
}

impl ReadingSource {
    pub fn label(&self) -> &'static str {
        match self {
            ReadingSource::ContainerRuntime => "docker",
            ReadingSource::ProcessTable => "ps",
        }
    }
}

/// Normalized resource usage from a single poll.
///
/// Percentages are on a 0-100 scale, network counters are raw bytes.
/// The process-table path cannot see network I/O and reports zero.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ResourceReading {
    pub cpu_pct: f64,
    pub mem_pct: f64,
    pub net_rx_bytes: f64,
    pub net_tx_bytes: f64,
    pub source: ReadingSource,
}

impl ResourceReading {
    /// Stamp the reading with the poll time.
    pub fn into_sample(self, observed_at: SystemTime) -> ResourceSample {
        ResourceSample {
            observed_at,
            cpu_pct: self.cpu_pct,
            mem_pct: self.mem_pct,
            net_rx_bytes: self.net_rx_bytes,
            net_tx_bytes: self.net_tx_bytes,
        }
    }
}

/// Resource usage of one entity at one poll tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResourceSample {
    pub observed_at: SystemTime,
    pub cpu_pct: f64,
    pub mem_pct: f64,
    pub net_rx_bytes: f64,
    pub net_tx_bytes: f64,
}

/// Broker connection state as last reported by the subscriber.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionStatus {
    pub connected: bool,
    pub last_error: Option<String>,
}

impl Default for ConnectionStatus {
    fn default() -> Self {
        Self {
            connected: false,
            last_error: Some("Not connected yet".to_string()),
        }
    }
}

impl ConnectionStatus {
    /// Badge text: `Connected` or `Disconnected: <reason>`.
    pub fn badge(&self) -> String {
        if self.connected {
            "Connected".to_string()
        } else {
            let reason = self.last_error.as_deref().unwrap_or("Connection error");
            format!("Disconnected: {}", reason)
        }
    }
}

/// Milliseconds since the Unix epoch, as a float.
pub fn epoch_millis(at: SystemTime) -> f64 {
    at.duration_since(UNIX_EPOCH).unwrap_or(Duration::ZERO).as_secs_f64() * 1000.0
}
