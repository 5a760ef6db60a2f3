//! Latency subscription over the message bus.
//!
//! The benchmark sink publishes one JSON event per result, stamped with the
//! time it was produced. The subscriber keeps a connection to the broker,
//! turns each event into a [`LatencySample`](crate::data::LatencySample) and
//! reports the connection state in the shared store.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐   payload    ┌───────────────┐  sample/status  ┌────────────────┐
//! │ BusConnector │─────────────▶│ BusSubscriber │────────────────▶│ TelemetryStore │
//! │ (MQTT, ...)  │  BusSession  │ reconnect loop│                 └────────────────┘
//! └──────────────┘              └───────┬───────┘
//!                                       │ watch::Receiver<bool>
//!                                       ▼
//!                                   shutdown
//! ```
//!
//! The transport sits behind [`BusConnector`] and [`BusSession`] so the
//! reconnect loop can be driven by an in-memory broker in tests.

mod backoff;
mod message;
#[cfg(feature = "mqtt")]
mod mqtt;
mod subscriber;

pub use backoff::Backoff;
pub use message::{decode_latency, publish_timestamp_ms};
#[cfg(feature = "mqtt")]
pub use mqtt::MqttConnector;
pub use subscriber::BusSubscriber;

use async_trait::async_trait;

use crate::error::Result;

/// Opens sessions with a broker.
#[async_trait]
pub trait BusConnector: Send + Sync {
    /// Connect and wait for the broker to accept the session.
    async fn connect(&self) -> Result<Box<dyn BusSession>>;

    /// Human-readable broker address for logs and the status bar.
    fn description(&self) -> String;
}

/// A live broker session.
#[async_trait]
pub trait BusSession: Send {
    async fn subscribe(&mut self, topic: &str) -> Result<()>;

    /// Wait for the next message payload. An error ends the session.
    async fn next_payload(&mut self) -> Result<Vec<u8>>;
}
