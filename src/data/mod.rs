//! Telemetry data model and the shared time-series store.
//!
//! ## Submodules
//!
//! - [`window`]: Fixed-capacity rolling window ([`RollingWindow`])
//! - [`sample`]: Latency and resource samples, connection status
//! - [`store`]: Thread-safe store shared by the subscriber, poller and dashboard
//! - [`series`]: Conversion of snapshots into chart points
//! - [`units`]: Parsing of percentages and byte sizes reported by the runtime
//!
//! ## Data Flow
//!
//! ```text
//! BusSubscriber ──▶ LatencySample ──┐
//!                                   ▼
//!                            TelemetryStore ──▶ snapshot ──▶ ChartSeries ──▶ ui
//!                                   ▲
//! HostMetricsPoller ──▶ ResourceSample
//! ```

pub mod sample;
pub mod series;
pub mod store;
pub mod units;
pub mod window;

pub use sample::{ConnectionStatus, LatencySample, ReadingSource, ResourceReading, ResourceSample};
pub use series::{ChartSeries, Metric};
pub use store::{EntitySeries, TelemetryStore};
pub use window::RollingWindow;
