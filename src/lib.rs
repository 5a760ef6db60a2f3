//! # benchwatch
//!
//! Live telemetry for distributed stream-processing benchmark runs.
//!
//! While a benchmark runs, its sink publishes one event per result to an
//! MQTT broker. benchwatch subscribes to those events to chart end-to-end
//! latency, and polls the docker daemon (or the host process table when
//! docker is unavailable) for the CPU, memory and network usage of a
//! selected container or process.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                           Application                            │
//! │  ┌─────────────┐  samples  ┌────────────────┐  snapshots ┌─────┐ │
//! │  │  subscribe  │──────────▶│      data      │───────────▶│ ui  │ │
//! │  │ (bus task)  │  status   │ TelemetryStore │            │     │ │
//! │  └─────────────┘           └────────────────┘            └─────┘ │
//! │                                    ▲                        ▲    │
//! │  ┌─────────────┐   readings        │      ticks   ┌─────────┴──┐ │
//! │  │    host     │───────────────────┘◀─────────────│    app     │ │
//! │  │docker │ ps  │                                  │  (state)   │ │
//! │  └─────────────┘                                  └────────────┘ │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! - **[`subscribe`]**: Reconnecting bus subscriber with exponential backoff
//!   ([`BusSubscriber`]) behind the [`BusConnector`](subscribe::BusConnector) trait
//! - **[`data`]**: Bounded rolling windows and the shared [`TelemetryStore`]
//! - **[`host`]**: Container runtime and process table introspection with
//!   fallback ([`HostMetricsPoller`])
//! - **[`config`]**: Layered [`Settings`] (defaults, TOML file, environment)
//! - **[`app`]** / **[`ui`]**: Dashboard state and terminal rendering
//!
//! ## Usage
//!
//! ### As a CLI tool
//!
//! ```bash
//! # Dashboard against the default broker
//! benchwatch
//!
//! # Another broker, preselecting a container
//! benchwatch --host localhost --port 1883 --entity flink-jobmanager
//!
//! # One-shot introspection
//! benchwatch --list-entities
//! benchwatch --probe kafka
//! ```
//!
//! ### As a library: reading the store
//!
//! ```
//! use std::time::SystemTime;
//! use benchwatch::{LatencySample, Settings, TelemetryContext};
//!
//! let context = TelemetryContext::new(Settings::default());
//! context.store().record_latency(LatencySample {
//!     observed_at: SystemTime::now(),
//!     latency_ms: 42.0,
//! });
//!
//! assert_eq!(context.store().latency_snapshot().len(), 1);
//! assert!(!context.store().connection_status().connected);
//! ```
//!
//! ### As a library: polling host metrics
//!
//! ```no_run
//! use benchwatch::{HostMetricsPoller, Settings, TelemetryContext};
//!
//! # tokio_test::block_on(async {
//! let context = TelemetryContext::new(Settings::default());
//! let poller = HostMetricsPoller::new(&context);
//!
//! for id in poller.list_entities().await {
//!     if let Ok(reading) = poller.poll(&id).await {
//!         println!("{id}: {:.1}% cpu", reading.cpu_pct);
//!     }
//! }
//! # });
//! ```
//!
//! ### Subscribing to latency events
//!
//! ```no_run
//! # tokio_test::block_on(async {
//! use benchwatch::subscribe::MqttConnector;
//! use benchwatch::{BusSubscriber, Settings, TelemetryContext};
//!
//! let context = TelemetryContext::new(Settings::default());
//! let connector = MqttConnector::new(&context.settings().bus);
//! let handle = BusSubscriber::new(connector, &context).spawn(context.shutdown_signal());
//!
//! // ... later
//! context.shutdown();
//! handle.await.ok();
//! # });
//! ```

pub mod app;
pub mod config;
pub mod context;
pub mod data;
pub mod error;
pub mod events;
pub mod host;
pub mod subscribe;
pub mod ui;

// Re-export main types for convenience
pub use app::App;
pub use config::{BusSettings, MonitoringSettings, Settings};
pub use context::TelemetryContext;
pub use data::{
    ConnectionStatus, LatencySample, ReadingSource, ResourceReading, ResourceSample, TelemetryStore,
};
pub use error::{Result, TelemetryError};
pub use host::{EntityIntrospector, HostMetricsPoller, RuntimeStatus};
pub use subscribe::BusSubscriber;
