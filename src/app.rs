//! Dashboard state and tick handling.

use std::time::{Duration, Instant};

use tokio::runtime::Handle;
use tracing::{debug, info};

use crate::context::TelemetryContext;
use crate::data::units::format_bytes;
use crate::data::{ChartSeries, ConnectionStatus, Metric, ResourceReading};
use crate::error::Result;
use crate::host::{HostMetricsPoller, RuntimeStatus};
use crate::ui::Theme;

/// Poll traces are logged on every Nth stats tick.
const TRACE_EVERY_N_TICKS: u64 = 5;

/// How long a status bar message stays visible.
const STATUS_MESSAGE_TTL: Duration = Duration::from_secs(3);

/// Main application state.
pub struct App {
    pub running: bool,
    pub show_help: bool,

    context: TelemetryContext,
    poller: HostMetricsPoller,
    runtime: Handle,

    // Entity selection
    pub entities: Vec<String>,
    pub selected_index: Option<usize>,
    pub runtime_status: RuntimeStatus,

    // Last poll of the selected entity; `None` until the first stats tick
    pub last_reading: Option<Result<ResourceReading>>,
    stats_ticks: u64,

    // Chart data, refreshed on update ticks
    pub connection: ConnectionStatus,
    pub latency: ChartSeries,
    pub latency_points: usize,

    pub theme: Theme,
    pub status_message: Option<(String, Instant)>,
}

impl App {
    /// Create the dashboard state.
    ///
    /// `runtime` drives the poller futures; each tick blocks until its
    /// poll completes, so ticks never overlap.
    pub fn new(context: TelemetryContext, poller: HostMetricsPoller, runtime: Handle) -> Self {
        Self {
            running: true,
            show_help: false,
            context,
            poller,
            runtime,
            entities: Vec::new(),
            selected_index: None,
            runtime_status: RuntimeStatus::Available,
            last_reading: None,
            stats_ticks: 0,
            connection: ConnectionStatus::default(),
            latency: ChartSeries::default(),
            latency_points: 0,
            theme: Theme::auto_detect(),
            status_message: None,
        }
    }

    pub fn context(&self) -> &TelemetryContext {
        &self.context
    }

    /// Set a temporary status message.
    pub fn set_status_message(&mut self, message: String) {
        self.status_message = Some((message, Instant::now()));
    }

    /// The current status message if it hasn't expired.
    pub fn get_status_message(&self) -> Option<&str> {
        match &self.status_message {
            Some((msg, time)) if time.elapsed() < STATUS_MESSAGE_TTL => Some(msg),
            _ => None,
        }
    }

    /// Re-probe the container runtime and reload the entity list.
    ///
    /// The current selection survives when the entity is still listed.
    pub fn refresh_entities(&mut self) {
        let previous = self.selected_entity().map(str::to_string);

        let (status, entities) = self
            .runtime
            .block_on(async { (self.poller.runtime_status().await, self.poller.list_entities().await) });

        if let RuntimeStatus::Unavailable(reason) = &status {
            info!(reason = %reason, "Container runtime unavailable, monitoring processes");
        }
        self.runtime_status = status;
        self.entities = entities;
        self.set_status_message(format!("Found {} entities", self.entities.len()));

        match previous {
            Some(id) => self.select_entity(&id),
            None => self.clamp_selection(),
        }
    }

    /// Select an entity by id, adding it to the list if the source did not report it.
    pub fn select_entity(&mut self, id: &str) {
        let index = match self.entities.iter().position(|e| e == id) {
            Some(index) => index,
            None => {
                self.entities.push(id.to_string());
                self.entities.len() - 1
            }
        };
        self.set_selected(Some(index));
    }

    pub fn selected_entity(&self) -> Option<&str> {
        self.selected_index
            .and_then(|index| self.entities.get(index))
            .map(String::as_str)
    }

    /// Move selection down by one entity.
    pub fn select_next(&mut self) {
        if self.entities.is_empty() {
            return;
        }
        let next = match self.selected_index {
            Some(index) => (index + 1).min(self.entities.len() - 1),
            None => 0,
        };
        self.set_selected(Some(next));
    }

    /// Move selection up by one entity.
    pub fn select_prev(&mut self) {
        if self.entities.is_empty() {
            return;
        }
        let prev = self.selected_index.map_or(0, |index| index.saturating_sub(1));
        self.set_selected(Some(prev));
    }

    fn set_selected(&mut self, index: Option<usize>) {
        if index != self.selected_index {
            self.selected_index = index;
            self.last_reading = None;
        }
    }

    fn clamp_selection(&mut self) {
        if let Some(index) = self.selected_index {
            if index >= self.entities.len() {
                self.set_selected(self.entities.len().checked_sub(1));
            }
        }
    }

    /// Refresh the latency chart and connection badge from the store.
    pub fn on_update_tick(&mut self) {
        let store = self.context.store();
        let samples = store.latency_snapshot();
        self.latency_points = samples.len();
        self.latency = ChartSeries::latency(&samples);
        self.connection = store.connection_status();
    }

    /// Poll the selected entity once.
    pub fn on_stats_tick(&mut self) {
        let Some(id) = self.selected_entity().map(str::to_string) else {
            return;
        };

        let result = self.runtime.block_on(self.poller.poll(&id));
        self.stats_ticks += 1;

        if self.stats_ticks % TRACE_EVERY_N_TICKS == 0 {
            match &result {
                Ok(reading) => debug!(
                    entity = %id,
                    source = reading.source.label(),
                    cpu_pct = reading.cpu_pct,
                    mem_pct = reading.mem_pct,
                    samples = self.context.store().resource_snapshot(&id).len(),
                    "Resource poll"
                ),
                Err(e) => debug!(entity = %id, error = %e, "Resource poll failed"),
            }
        }

        self.last_reading = Some(result);
    }

    /// Chart data for one metric of the selected entity.
    pub fn resource_series(&self, metric: Metric) -> Option<ChartSeries> {
        let id = self.selected_entity()?;
        let samples = self.context.store().resource_snapshot(id);
        Some(ChartSeries::resource(&samples, metric))
    }

    /// Current value of a metric as shown next to its chart.
    pub fn metric_display(&self, metric: Metric) -> String {
        metric_display(self.selected_entity(), self.last_reading.as_ref(), metric)
    }

    /// Quit the application.
    pub fn quit(&mut self) {
        self.running = false;
    }

    /// Toggle the help overlay.
    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }
}

/// Render a metric value for the selected entity.
///
/// Failed polls show `Error`, except network counters of labels the process
/// table cannot attribute traffic to, which show `N/A`.
pub fn metric_display(
    entity: Option<&str>,
    reading: Option<&Result<ResourceReading>>,
    metric: Metric,
) -> String {
    let (Some(entity), Some(reading)) = (entity, reading) else {
        return "N/A".to_string();
    };

    match (reading, metric) {
        (Ok(r), Metric::Cpu) => format!("{:.1}%", r.cpu_pct),
        (Ok(r), Metric::Memory) => format!("{:.1}%", r.mem_pct),
        (Ok(r), Metric::NetRx) => format_bytes(r.net_rx_bytes),
        (Ok(r), Metric::NetTx) => format_bytes(r.net_tx_bytes),
        (Err(_), Metric::Cpu | Metric::Memory) => "Error".to_string(),
        (Err(_), Metric::NetRx | Metric::NetTx) => {
            if entity.starts_with("java-") || entity.starts_with("python-") {
                "Error".to_string()
            } else {
                "N/A".to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::config::Settings;
    use crate::data::ReadingSource;
    use crate::error::TelemetryError;
    use crate::host::command::testing::ScriptedRunner;
    use crate::host::command::{CommandOutput, CommandRunner};
    use crate::host::{ContainerRuntime, ProcessTable};

    fn reading() -> ResourceReading {
        ResourceReading {
            cpu_pct: 12.345,
            mem_pct: 7.0,
            net_rx_bytes: 1536.0,
            net_tx_bytes: 0.0,
            source: ReadingSource::ContainerRuntime,
        }
    }

    fn app(runner: ScriptedRunner, runtime: &tokio::runtime::Runtime) -> App {
        let context = TelemetryContext::new(Settings::default());
        let runner: Arc<dyn CommandRunner> = Arc::new(runner);
        let poller = HostMetricsPoller::with_introspectors(
            Arc::new(ContainerRuntime::new(runner.clone())),
            Arc::new(ProcessTable::new(runner, 15)),
            context.store().clone(),
        );
        App::new(context, poller, runtime.handle().clone())
    }

    fn runtime() -> tokio::runtime::Runtime {
        tokio::runtime::Builder::new_multi_thread().worker_threads(1).enable_all().build().unwrap()
    }

    #[test]
    fn test_display_without_selection() {
        assert_eq!(metric_display(None, Some(&Ok(reading())), Metric::Cpu), "N/A");
        assert_eq!(metric_display(Some("kafka"), None, Metric::Memory), "N/A");
    }

    #[test]
    fn test_display_successful_reading() {
        let ok = Ok(reading());
        assert_eq!(metric_display(Some("kafka"), Some(&ok), Metric::Cpu), "12.3%");
        assert_eq!(metric_display(Some("kafka"), Some(&ok), Metric::Memory), "7.0%");
        assert_eq!(metric_display(Some("kafka"), Some(&ok), Metric::NetRx), "1.5 KB");
        assert_eq!(metric_display(Some("kafka"), Some(&ok), Metric::NetTx), "0 B");
    }

    #[test]
    fn test_display_failed_reading() {
        let err = Err(TelemetryError::EntityNotFound("gone".into()));
        assert_eq!(metric_display(Some("nginx-812"), Some(&err), Metric::Cpu), "Error");
        assert_eq!(metric_display(Some("nginx-812"), Some(&err), Metric::NetRx), "N/A");
        assert_eq!(metric_display(Some("java-Main"), Some(&err), Metric::NetTx), "Error");
        assert_eq!(metric_display(Some("python-gen"), Some(&err), Metric::NetRx), "Error");
    }

    #[test]
    fn test_refresh_and_navigation() {
        let rt = runtime();
        let runner = ScriptedRunner::new()
            .respond("docker version", CommandOutput::ok(""))
            .respond("docker ps --format {{.Names}}", CommandOutput::ok("kafka\nflink\n"));
        let mut app = app(runner, &rt);

        app.refresh_entities();
        assert_eq!(app.entities, vec!["kafka", "flink"]);
        assert!(app.runtime_status.is_available());
        assert_eq!(app.selected_entity(), None);

        app.select_next();
        assert_eq!(app.selected_entity(), Some("kafka"));
        app.select_next();
        app.select_next();
        assert_eq!(app.selected_entity(), Some("flink"));
        app.select_prev();
        assert_eq!(app.selected_entity(), Some("kafka"));
    }

    #[test]
    fn test_preselect_unknown_entity() {
        let rt = runtime();
        let mut app = app(ScriptedRunner::new(), &rt);
        app.select_entity("spark-worker");
        assert_eq!(app.entities, vec!["spark-worker"]);
        assert_eq!(app.selected_entity(), Some("spark-worker"));

        app.refresh_entities();
        assert!(!app.runtime_status.is_available());
        assert_eq!(app.selected_entity(), Some("spark-worker"));
    }

    #[test]
    fn test_stats_tick_records_reading() {
        let rt = runtime();
        let runner = ScriptedRunner::new().respond(
            "ps -p 42 -o pid,pcpu,pmem,comm --no-headers",
            CommandOutput::ok("42 5.0 2.5 node"),
        );
        let mut app = app(runner, &rt);

        app.on_stats_tick();
        assert!(app.last_reading.is_none());

        app.select_entity("node-42");
        app.on_stats_tick();
        app.on_stats_tick();
        assert_eq!(app.metric_display(Metric::Cpu), "5.0%");
        assert_eq!(app.resource_series(Metric::Memory).unwrap().len(), 2);
    }

    #[test]
    fn test_stats_tick_failure_keeps_store_empty() {
        let rt = runtime();
        let mut app = app(ScriptedRunner::new(), &rt);
        app.select_entity("node-42");
        app.on_stats_tick();

        assert_eq!(app.metric_display(Metric::Cpu), "Error");
        assert_eq!(app.metric_display(Metric::NetRx), "N/A");
        assert!(app.context().store().resource_snapshot("node-42").is_empty());
    }

    #[test]
    fn test_update_tick_reads_store() {
        let rt = runtime();
        let mut app = app(ScriptedRunner::new(), &rt);
        app.context().store().set_connected();
        app.on_update_tick();
        assert!(app.connection.connected);
        assert_eq!(app.latency_points, 0);
    }
}
