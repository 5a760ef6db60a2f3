//! Thread-safe time-series store shared by the subscriber, the poller and
//! the dashboard.
//!
//! Every window sits behind its own lock, and an append (including any
//! eviction it causes) happens under a single lock acquisition, so a reader
//! always sees either the state before or after an append.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};

use super::sample::{ConnectionStatus, LatencySample, ResourceSample};
use super::window::RollingWindow;

/// Rolling resource history for one container or process.
#[derive(Debug)]
pub struct EntitySeries {
    samples: Mutex<RollingWindow<ResourceSample>>,
}

impl EntitySeries {
    fn new(capacity: usize) -> Self {
        Self {
            samples: Mutex::new(RollingWindow::new(capacity)),
        }
    }

    pub fn push(&self, sample: ResourceSample) {
        self.samples.lock().push(sample);
    }

    /// Consistent copy of the samples, oldest first.
    pub fn snapshot(&self) -> Vec<ResourceSample> {
        self.samples.lock().to_vec()
    }

    pub fn latest(&self) -> Option<ResourceSample> {
        self.samples.lock().latest().copied()
    }
}

/// Bounded telemetry store.
#[derive(Debug)]
pub struct TelemetryStore {
    latency: Mutex<RollingWindow<LatencySample>>,
    status: RwLock<ConnectionStatus>,
    entities: RwLock<HashMap<String, Arc<EntitySeries>>>,
    stats_capacity: usize,
}

impl TelemetryStore {
    /// Create a store with the given latency and per-entity capacities.
    pub fn new(latency_capacity: usize, stats_capacity: usize) -> Self {
        Self {
            latency: Mutex::new(RollingWindow::new(latency_capacity)),
            status: RwLock::new(ConnectionStatus::default()),
            entities: RwLock::new(HashMap::new()),
            stats_capacity,
        }
    }

    pub fn record_latency(&self, sample: LatencySample) {
        self.latency.lock().push(sample);
    }

    pub fn latency_snapshot(&self) -> Vec<LatencySample> {
        self.latency.lock().to_vec()
    }

    pub fn latency_len(&self) -> usize {
        self.latency.lock().len()
    }

    pub fn set_connected(&self) {
        let mut status = self.status.write();
        status.connected = true;
        status.last_error = None;
    }

    pub fn set_disconnected(&self, error: impl Into<String>) {
        let mut status = self.status.write();
        status.connected = false;
        status.last_error = Some(error.into());
    }

    pub fn connection_status(&self) -> ConnectionStatus {
        self.status.read().clone()
    }

    /// Get the series for an entity, registering it on first use.
    pub fn get_or_create_entity(&self, id: &str) -> Arc<EntitySeries> {
        // Fast path: check if it exists
        {
            let entities = self.entities.read();
            if let Some(series) = entities.get(id) {
                return series.clone();
            }
        }

        // Double-check under the write lock
        let mut entities = self.entities.write();
        entities
            .entry(id.to_string())
            .or_insert_with(|| Arc::new(EntitySeries::new(self.stats_capacity)))
            .clone()
    }

    pub fn record_resource(&self, id: &str, sample: ResourceSample) {
        self.get_or_create_entity(id).push(sample);
    }

    /// Samples for an entity; empty for ids that were never recorded.
    pub fn resource_snapshot(&self, id: &str) -> Vec<ResourceSample> {
        self.entities
            .read()
            .get(id)
            .map(|series| series.snapshot())
            .unwrap_or_default()
    }

    /// Registered entity ids, sorted.
    pub fn entity_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.entities.read().keys().cloned().collect();
        ids.sort();
        ids
    }
}
