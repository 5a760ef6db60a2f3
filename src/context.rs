//! Shared context handed to the background subscriber and the dashboard.

use std::sync::Arc;

use tokio::sync::watch;

use crate::config::Settings;
use crate::data::TelemetryStore;

/// Store, settings and shutdown signal for one monitor instance.
///
/// Built once in `main` and cloned into each component; it lives as long
/// as the process. Calling [`TelemetryContext::shutdown`] asks background
/// workers to stop at their next checkpoint.
#[derive(Debug, Clone)]
pub struct TelemetryContext {
    store: Arc<TelemetryStore>,
    settings: Arc<Settings>,
    shutdown: Arc<watch::Sender<bool>>,
}

impl TelemetryContext {
    pub fn new(settings: Settings) -> Self {
        let store = TelemetryStore::new(
            settings.monitoring.max_latency_points,
            settings.monitoring.max_stats_points,
        );
        let (shutdown, _) = watch::channel(false);
        Self {
            store: Arc::new(store),
            settings: Arc::new(settings),
            shutdown: Arc::new(shutdown),
        }
    }

    pub fn store(&self) -> &Arc<TelemetryStore> {
        &self.store
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// A receiver that flips to `true` once shutdown is requested.
    pub fn shutdown_signal(&self) -> watch::Receiver<bool> {
        self.shutdown.subscribe()
    }

    pub fn shutdown(&self) {
        self.shutdown.send_replace(true);
    }
}
