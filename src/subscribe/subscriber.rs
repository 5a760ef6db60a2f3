//! Background reconnect loop feeding latency samples into the store.

use std::sync::Arc;
use std::time::SystemTime;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::backoff::Backoff;
use super::message::decode_latency;
use super::{BusConnector, BusSession};
use crate::context::TelemetryContext;
use crate::data::TelemetryStore;
use crate::error::TelemetryError;

/// Why a session ended.
enum SessionEnd {
    Shutdown,
    Failed(TelemetryError),
}

/// Keeps a broker subscription alive and records latency samples.
///
/// The subscriber is the only writer of latency samples and of the
/// connection status. It retries forever with exponential backoff and
/// stops only when the context's shutdown signal fires.
pub struct BusSubscriber<C> {
    connector: C,
    store: Arc<TelemetryStore>,
    topic: String,
    timestamp_key: String,
    backoff: Backoff,
}

impl<C: BusConnector + 'static> BusSubscriber<C> {
    pub fn new(connector: C, context: &TelemetryContext) -> Self {
        let bus = &context.settings().bus;
        Self {
            connector,
            store: context.store().clone(),
            topic: bus.topic.clone(),
            timestamp_key: bus.timestamp_key.clone(),
            backoff: Backoff::new(bus.initial_backoff(), bus.max_backoff()),
        }
    }

    /// Run the loop on the current tokio runtime.
    pub fn spawn(self, shutdown: watch::Receiver<bool>) -> JoinHandle<()> {
        tokio::spawn(self.run(shutdown))
    }

    /// Connect, consume, and reconnect until shutdown is requested.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) {
        info!(
            broker = %self.connector.description(),
            topic = %self.topic,
            "Starting bus subscriber"
        );

        loop {
            if *shutdown.borrow() {
                break;
            }

            let error = match self.run_session(&mut shutdown).await {
                SessionEnd::Shutdown => break,
                SessionEnd::Failed(error) => error,
            };

            let delay = self.backoff.next_delay();
            warn!(error = %error, retry_in = ?delay, "Bus connection lost");
            self.store.set_disconnected(error.to_string());

            tokio::select! {
                _ = shutdown_requested(&mut shutdown) => break,
                _ = tokio::time::sleep(delay) => {}
            }
        }

        info!("Bus subscriber stopped");
    }

    async fn run_session(&mut self, shutdown: &mut watch::Receiver<bool>) -> SessionEnd {
        let connected = tokio::select! {
            _ = shutdown_requested(shutdown) => return SessionEnd::Shutdown,
            result = self.connector.connect() => result,
        };

        let mut session: Box<dyn BusSession> = match connected {
            Ok(session) => session,
            Err(error) => return SessionEnd::Failed(error),
        };

        self.backoff.reset();

        if let Err(error) = session.subscribe(&self.topic).await {
            return SessionEnd::Failed(error);
        }

        self.store.set_connected();
        info!(topic = %self.topic, "Subscribed to latency topic");

        loop {
            tokio::select! {
                _ = shutdown_requested(shutdown) => return SessionEnd::Shutdown,
                payload = session.next_payload() => match payload {
                    Ok(bytes) => self.handle_payload(&bytes),
                    Err(error) => return SessionEnd::Failed(error),
                },
            }
        }
    }

    /// Decode one message; malformed messages are dropped individually.
    fn handle_payload(&self, payload: &[u8]) {
        match decode_latency(payload, &self.timestamp_key, SystemTime::now()) {
            Ok(sample) => {
                debug!(latency_ms = sample.latency_ms, "Latency sample");
                self.store.record_latency(sample);
            }
            Err(error) => {
                warn!(error = %error, bytes = payload.len(), "Dropping bus message");
            }
        }
    }
}

/// Resolves once shutdown is requested or the context is gone.
async fn shutdown_requested(shutdown: &mut watch::Receiver<bool>) {
    let _ = shutdown.wait_for(|stop| *stop).await;
}
