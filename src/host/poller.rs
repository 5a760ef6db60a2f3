//! Resource polling with container-runtime to process-table fallback.

use std::sync::Arc;
use std::time::SystemTime;

use tracing::{debug, info, warn};

use super::command::{CommandRunner, SystemCommandRunner};
use super::container::ContainerRuntime;
use super::process::ProcessTable;
use super::EntityIntrospector;
use crate::context::TelemetryContext;
use crate::data::{ResourceReading, TelemetryStore};
use crate::error::Result;

/// Availability of the container runtime at the last probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuntimeStatus {
    Available,
    Unavailable(String),
}

impl RuntimeStatus {
    pub fn is_available(&self) -> bool {
        matches!(self, RuntimeStatus::Available)
    }

    /// Reason shown to the operator, if any.
    pub fn reason(&self) -> Option<&str> {
        match self {
            RuntimeStatus::Available => None,
            RuntimeStatus::Unavailable(reason) => Some(reason.as_str()),
        }
    }
}

/// Polls entity resource usage and records it in the store.
///
/// Every call tries the container runtime first; any failure there is
/// logged at debug level and answered from the process table instead.
pub struct HostMetricsPoller {
    container: Arc<dyn EntityIntrospector>,
    process: Arc<dyn EntityIntrospector>,
    store: Arc<TelemetryStore>,
}

impl HostMetricsPoller {
    /// Poller backed by real `docker` and `ps` invocations.
    pub fn new(context: &TelemetryContext) -> Self {
        let monitoring = &context.settings().monitoring;
        let runner: Arc<dyn CommandRunner> =
            Arc::new(SystemCommandRunner::new(monitoring.command_timeout()));
        Self::with_introspectors(
            Arc::new(ContainerRuntime::new(runner.clone())),
            Arc::new(ProcessTable::new(runner, monitoring.max_entities)),
            context.store().clone(),
        )
    }

    pub fn with_introspectors(
        container: Arc<dyn EntityIntrospector>,
        process: Arc<dyn EntityIntrospector>,
        store: Arc<TelemetryStore>,
    ) -> Self {
        Self {
            container,
            process,
            store,
        }
    }

    pub async fn runtime_status(&self) -> RuntimeStatus {
        match self.container.probe().await {
            Ok(()) => RuntimeStatus::Available,
            Err(e) => RuntimeStatus::Unavailable(e.to_string()),
        }
    }

    /// Names offered for selection.
    ///
    /// Container names when the runtime answers, process labels otherwise,
    /// and an empty list when neither source works.
    pub async fn list_entities(&self) -> Vec<String> {
        match list_from(self.container.as_ref()).await {
            Ok(names) => return names,
            Err(e) => debug!(
                source = self.container.source().label(),
                error = %e,
                "Entity listing unavailable, using process table"
            ),
        }

        match list_from(self.process.as_ref()).await {
            Ok(names) => names,
            Err(e) => {
                warn!(source = self.process.source().label(), error = %e, "Could not list entities");
                Vec::new()
            }
        }
    }

    /// Read current usage without recording it.
    pub async fn read(&self, id: &str) -> Result<ResourceReading> {
        match read_from(self.container.as_ref(), id).await {
            Ok(reading) => Ok(reading),
            Err(e) => {
                debug!(
                    entity = id,
                    source = self.container.source().label(),
                    error = %e,
                    "Stats unavailable, using process table"
                );
                read_from(self.process.as_ref(), id).await
            }
        }
    }

    /// Read current usage and append it to the entity's window.
    ///
    /// Nothing is recorded when both sources fail.
    pub async fn poll(&self, id: &str) -> Result<ResourceReading> {
        let reading = self.read(id).await?;
        self.store
            .record_resource(id, reading.into_sample(SystemTime::now()));
        Ok(reading)
    }
}

async fn list_from(introspector: &dyn EntityIntrospector) -> Result<Vec<String>> {
    introspector.probe().await?;
    let names = introspector.list_entities().await?;
    info!(source = introspector.source().label(), count = names.len(), "Found entities");
    Ok(names)
}

/// Stats from one introspector, stamped with its source.
async fn read_from(introspector: &dyn EntityIntrospector, id: &str) -> Result<ResourceReading> {
    introspector.probe().await?;
    let reading = introspector.entity_stats(id).await?;
    Ok(ResourceReading {
        source: introspector.source(),
        ..reading
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::ReadingSource;
    use crate::error::TelemetryError;
    use crate::host::command::testing::ScriptedRunner;
    use crate::host::command::CommandOutput;

    const PS_AUX: &str = "ps aux --no-headers";

    /// Introspector with canned answers that records which calls reach it.
    struct FixedIntrospector {
        source: ReadingSource,
        unavailable: Option<String>,
        reading: ResourceReading,
        calls: parking_lot::Mutex<Vec<&'static str>>,
    }

    impl FixedIntrospector {
        fn new(source: ReadingSource, reading_source: ReadingSource) -> Self {
            Self {
                source,
                unavailable: None,
                reading: ResourceReading {
                    cpu_pct: 5.0,
                    mem_pct: 1.0,
                    net_rx_bytes: 0.0,
                    net_tx_bytes: 0.0,
                    source: reading_source,
                },
                calls: parking_lot::Mutex::new(Vec::new()),
            }
        }

        fn unavailable(mut self, reason: &str) -> Self {
            self.unavailable = Some(reason.to_string());
            self
        }

        fn calls(&self) -> Vec<&'static str> {
            self.calls.lock().clone()
        }
    }

    #[async_trait::async_trait]
    impl EntityIntrospector for FixedIntrospector {
        fn source(&self) -> ReadingSource {
            self.source
        }

        async fn probe(&self) -> Result<()> {
            self.calls.lock().push("probe");
            match &self.unavailable {
                Some(reason) => Err(TelemetryError::Unavailable(reason.clone())),
                None => Ok(()),
            }
        }

        async fn list_entities(&self) -> Result<Vec<String>> {
            self.calls.lock().push("list");
            Ok(vec!["worker".to_string()])
        }

        async fn entity_stats(&self, _id: &str) -> Result<ResourceReading> {
            self.calls.lock().push("stats");
            Ok(self.reading)
        }
    }

    fn poller(runner: ScriptedRunner) -> (HostMetricsPoller, Arc<TelemetryStore>) {
        let runner: Arc<dyn CommandRunner> = Arc::new(runner);
        let store = Arc::new(TelemetryStore::new(10, 3));
        let poller = HostMetricsPoller::with_introspectors(
            Arc::new(ContainerRuntime::new(runner.clone())),
            Arc::new(ProcessTable::new(runner, 15)),
            store.clone(),
        );
        (poller, store)
    }

    fn docker_available() -> ScriptedRunner {
        ScriptedRunner::new().respond("docker version", CommandOutput::ok("Server: Docker Engine"))
    }

    #[tokio::test]
    async fn test_runtime_status() {
        let (with_docker, _) = poller(docker_available());
        assert_eq!(with_docker.runtime_status().await, RuntimeStatus::Available);

        let (without_docker, _) = poller(ScriptedRunner::new());
        let status = without_docker.runtime_status().await;
        assert!(!status.is_available());
        assert_eq!(status.reason(), Some("Docker not installed"));
    }

    #[tokio::test]
    async fn test_lists_containers_when_available() {
        let runner = docker_available()
            .respond("docker ps --format {{.Names}}", CommandOutput::ok("kafka\nflink-jobmanager\n"));
        let (poller, _) = poller(runner);
        assert_eq!(poller.list_entities().await, vec!["kafka", "flink-jobmanager"]);
    }

    #[tokio::test]
    async fn test_empty_container_list_does_not_fall_back() {
        let runner = docker_available()
            .respond("docker ps --format {{.Names}}", CommandOutput::ok(""))
            .respond(PS_AUX, CommandOutput::ok("u 1 0.0 0.0 1 1 ? S 0 0 node app.js\n"));
        let (poller, _) = poller(runner);
        assert!(poller.list_entities().await.is_empty());
    }

    #[tokio::test]
    async fn test_lists_processes_without_docker() {
        let runner = ScriptedRunner::new().respond(
            PS_AUX,
            CommandOutput::ok("u 42 0.0 0.0 1 1 ? S 09:00 0:00 /usr/bin/node server.js\n"),
        );
        let (poller, _) = poller(runner);
        assert_eq!(poller.list_entities().await, vec!["node-42"]);
    }

    #[tokio::test]
    async fn test_no_sources_yield_empty_list() {
        let (poller, _) = poller(ScriptedRunner::new());
        assert!(poller.list_entities().await.is_empty());
    }

    #[tokio::test]
    async fn test_poll_records_container_sample() {
        let runner = docker_available().respond(
            "docker stats --no-stream --format {{.CPUPerc}}|{{.MemPerc}}|{{.NetIO}} kafka",
            CommandOutput::ok("40.00%|10.00%|2kB / 1kB\n"),
        );
        let (poller, store) = poller(runner);

        let reading = poller.poll("kafka").await.unwrap();
        assert_eq!(reading.source, ReadingSource::ContainerRuntime);

        let samples = store.resource_snapshot("kafka");
        assert_eq!(samples.len(), 1);
        assert_eq!(samples[0].cpu_pct, 40.0);
        assert_eq!(samples[0].net_rx_bytes, 2048.0);
    }

    #[tokio::test]
    async fn test_poll_falls_back_when_container_stats_fail() {
        let runner = docker_available()
            .respond(
                "docker stats --no-stream --format {{.CPUPerc}}|{{.MemPerc}}|{{.NetIO}} nginx-812",
                CommandOutput::failed("No such container"),
            )
            .respond(
                "ps -p 812 -o pid,pcpu,pmem,comm --no-headers",
                CommandOutput::ok("812 3.0 1.5 nginx"),
            );
        let (poller, store) = poller(runner);

        let reading = poller.poll("nginx-812").await.unwrap();
        assert_eq!(reading.source, ReadingSource::ProcessTable);
        assert_eq!(store.resource_snapshot("nginx-812")[0].net_tx_bytes, 0.0);
    }

    #[tokio::test]
    async fn test_poll_failure_records_nothing() {
        let runner = ScriptedRunner::new().respond(PS_AUX, CommandOutput::ok(""));
        let (poller, store) = poller(runner);

        let err = poller.poll("ghost").await.unwrap_err();
        assert_eq!(err, TelemetryError::EntityNotFound("No processes found matching 'ghost'".into()));
        assert!(store.resource_snapshot("ghost").is_empty());
        assert!(store.entity_ids().is_empty());
    }

    #[tokio::test]
    async fn test_window_is_bounded() {
        let runner = ScriptedRunner::new().respond(
            "ps -p 9 -o pid,pcpu,pmem,comm --no-headers",
            CommandOutput::ok("9 1.0 1.0 node"),
        );
        let (poller, store) = poller(runner);
        for _ in 0..5 {
            poller.poll("node-9").await.unwrap();
        }
        assert_eq!(store.resource_snapshot("node-9").len(), 3);
    }

    #[tokio::test]
    async fn test_unusable_fallback_is_not_queried() {
        let container = Arc::new(
            FixedIntrospector::new(ReadingSource::ContainerRuntime, ReadingSource::ContainerRuntime)
                .unavailable("Docker not installed"),
        );
        let process = Arc::new(
            FixedIntrospector::new(ReadingSource::ProcessTable, ReadingSource::ProcessTable)
                .unavailable("ps missing"),
        );
        let store = Arc::new(TelemetryStore::new(10, 3));
        let poller =
            HostMetricsPoller::with_introspectors(container.clone(), process.clone(), store.clone());

        assert!(poller.list_entities().await.is_empty());
        let err = poller.poll("worker").await.unwrap_err();
        assert_eq!(err, TelemetryError::Unavailable("ps missing".into()));

        assert_eq!(container.calls(), vec!["probe", "probe"]);
        assert_eq!(process.calls(), vec!["probe", "probe"]);
        assert!(store.entity_ids().is_empty());
    }

    #[tokio::test]
    async fn test_reading_carries_serving_source() {
        let container = Arc::new(
            FixedIntrospector::new(ReadingSource::ContainerRuntime, ReadingSource::ContainerRuntime)
                .unavailable("Docker daemon not accessible"),
        );
        let process = Arc::new(FixedIntrospector::new(
            ReadingSource::ProcessTable,
            ReadingSource::ContainerRuntime,
        ));
        let store = Arc::new(TelemetryStore::new(10, 3));
        let poller = HostMetricsPoller::with_introspectors(container, process.clone(), store);

        assert_eq!(poller.list_entities().await, vec!["worker"]);
        let reading = poller.poll("worker").await.unwrap();
        assert_eq!(reading.source, ReadingSource::ProcessTable);
        assert_eq!(process.calls(), vec!["probe", "list", "probe", "stats"]);
    }
}
