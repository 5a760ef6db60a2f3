//! Container runtime introspection through the `docker` CLI.

use std::sync::Arc;

use async_trait::async_trait;

use super::command::{CommandError, CommandRunner};
use super::EntityIntrospector;
use crate::data::units::{parse_network_io, parse_percent};
use crate::data::{ReadingSource, ResourceReading};
use crate::error::{Result, TelemetryError};

const DOCKER: &str = "docker";

/// `docker stats` row layout: `cpu%|mem%|rx / tx`.
const STATS_FORMAT: &str = "{{.CPUPerc}}|{{.MemPerc}}|{{.NetIO}}";

/// Reads container names and stats from the docker daemon.
pub struct ContainerRuntime {
    runner: Arc<dyn CommandRunner>,
}

impl ContainerRuntime {
    pub fn new(runner: Arc<dyn CommandRunner>) -> Self {
        Self { runner }
    }
}

#[async_trait]
impl EntityIntrospector for ContainerRuntime {
    fn source(&self) -> ReadingSource {
        ReadingSource::ContainerRuntime
    }

    async fn probe(&self) -> Result<()> {
        match self.runner.run(DOCKER, &["version"]).await {
            Ok(output) if output.success => Ok(()),
            Ok(output) => Err(TelemetryError::Unavailable(format!(
                "Docker daemon not accessible: {}",
                output.stderr.trim()
            ))),
            Err(CommandError::NotFound(_)) => {
                Err(TelemetryError::Unavailable("Docker not installed".to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn list_entities(&self) -> Result<Vec<String>> {
        let output = self.runner.run(DOCKER, &["ps", "--format", "{{.Names}}"]).await?;
        if !output.success {
            return Err(TelemetryError::Unavailable(format!(
                "Error getting container names: {}",
                output.stderr.trim()
            )));
        }

        Ok(output
            .stdout
            .lines()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .collect())
    }

    async fn entity_stats(&self, id: &str) -> Result<ResourceReading> {
        let output = self
            .runner
            .run(DOCKER, &["stats", "--no-stream", "--format", STATS_FORMAT, id])
            .await?;

        if !output.success {
            return Err(TelemetryError::Unavailable(format!(
                "docker stats failed for '{}': {}",
                id,
                output.stderr.trim()
            )));
        }

        let line = output.stdout.lines().next().unwrap_or_default();
        parse_stats_line(line)
    }
}

/// Parse one `docker stats` row in [`STATS_FORMAT`].
///
/// Percentages must parse; a malformed network column degrades to zero.
pub fn parse_stats_line(line: &str) -> Result<ResourceReading> {
    let unexpected = || TelemetryError::Unavailable(format!("Unexpected docker stats output: {:?}", line));

    let fields: Vec<&str> = line.trim().split('|').collect();
    let [cpu, mem, net] = fields.as_slice() else {
        return Err(unexpected());
    };

    let cpu_pct = parse_percent(cpu).map_err(|_| unexpected())?;
    let mem_pct = parse_percent(mem).map_err(|_| unexpected())?;
    let (net_rx_bytes, net_tx_bytes) = parse_network_io(net);

    Ok(ResourceReading {
        cpu_pct,
        mem_pct,
        net_rx_bytes,
        net_tx_bytes,
        source: ReadingSource::ContainerRuntime,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::command::testing::ScriptedRunner;
    use crate::host::command::CommandOutput;

    const STATS_CMD: &str =
        "docker stats --no-stream --format {{.CPUPerc}}|{{.MemPerc}}|{{.NetIO}} flink-jobmanager";

    fn runtime(runner: ScriptedRunner) -> ContainerRuntime {
        ContainerRuntime::new(Arc::new(runner))
    }

    #[test]
    fn test_parse_stats_line() {
        let reading = parse_stats_line("12.50%|3.25%|1.2kB / 3.4MB\n").unwrap();
        assert_eq!(reading.cpu_pct, 12.5);
        assert_eq!(reading.mem_pct, 3.25);
        assert!((reading.net_rx_bytes - 1228.8).abs() < 1e-6);
        assert!((reading.net_tx_bytes - 3_565_158.4).abs() < 1e-6);
        assert_eq!(reading.source, ReadingSource::ContainerRuntime);
    }

    #[test]
    fn test_parse_stats_line_rejects_bad_shapes() {
        assert!(parse_stats_line("").is_err());
        assert!(parse_stats_line("12%|3%").is_err());
        assert!(parse_stats_line("--|--|-- / --").is_err());
    }

    #[test]
    fn test_parse_stats_line_tolerates_bad_network_column() {
        let reading = parse_stats_line("1%|2%|n/a").unwrap();
        assert_eq!((reading.net_rx_bytes, reading.net_tx_bytes), (0.0, 0.0));
    }

    #[tokio::test]
    async fn test_probe_available() {
        let runner = ScriptedRunner::new().respond("docker version", CommandOutput::ok("Client: ..."));
        assert!(runtime(runner).probe().await.is_ok());
    }

    #[tokio::test]
    async fn test_probe_daemon_unreachable() {
        let runner = ScriptedRunner::new().respond(
            "docker version",
            CommandOutput::failed("permission denied while trying to connect\n"),
        );
        let err = runtime(runner).probe().await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "Docker daemon not accessible: permission denied while trying to connect"
        );
    }

    #[tokio::test]
    async fn test_probe_not_installed() {
        let err = runtime(ScriptedRunner::new()).probe().await.unwrap_err();
        assert_eq!(err, TelemetryError::Unavailable("Docker not installed".to_string()));
    }

    #[tokio::test]
    async fn test_list_entities() {
        let runner = ScriptedRunner::new().respond(
            "docker ps --format {{.Names}}",
            CommandOutput::ok("flink-jobmanager\nkafka\n\nflink-taskmanager-1\n"),
        );
        let names = runtime(runner).list_entities().await.unwrap();
        assert_eq!(names, vec!["flink-jobmanager", "kafka", "flink-taskmanager-1"]);
    }

    #[tokio::test]
    async fn test_stats_for_missing_container() {
        let runner = ScriptedRunner::new()
            .respond(STATS_CMD, CommandOutput::failed("Error: No such container: flink-jobmanager"));
        let err = runtime(runner).entity_stats("flink-jobmanager").await.unwrap_err();
        assert!(err.is_unavailable());
    }

    #[tokio::test]
    async fn test_stats_timeout_is_unavailable() {
        let runner = ScriptedRunner::new().fail(
            STATS_CMD,
            CommandError::TimedOut {
                command: STATS_CMD.to_string(),
                after: std::time::Duration::from_secs(10),
            },
        );
        let err = runtime(runner).entity_stats("flink-jobmanager").await.unwrap_err();
        assert!(matches!(err, TelemetryError::Timeout { .. }));
    }

    #[tokio::test]
    async fn test_stats_success() {
        let runner = ScriptedRunner::new()
            .respond(STATS_CMD, CommandOutput::ok("150.03%|12.00%|648B / 0B\n"));
        let reading = runtime(runner).entity_stats("flink-jobmanager").await.unwrap();
        assert_eq!(reading.cpu_pct, 150.03);
        assert_eq!(reading.net_rx_bytes, 648.0);
    }
}
