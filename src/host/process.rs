//! Process-table introspection through `ps`.
//!
//! Used when the container runtime is unavailable. Processes are offered
//! for selection under a derived label:
//!
//! | command line                               | label                 |
//! |--------------------------------------------|-----------------------|
//! | `java -jar /opt/kafka/kafka-server.jar`    | `java-kafka-server`   |
//! | `java -cp ... org.apache.flink.Main`       | `java-Main`           |
//! | `python3 /srv/generator.py --rate 10`      | `python-generator`    |
//! | `/usr/sbin/nginx -g daemon off;` (pid 812) | `nginx-812`           |
//!
//! A label ending in `-<pid>` is polled by pid. Any other label is treated
//! as a pattern: its `-`/`_` separated tokens are matched against every
//! command line and the matching rows are summed. Unrelated processes that
//! share a token are summed too.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};

use super::command::CommandRunner;
use super::EntityIntrospector;
use crate::data::{ReadingSource, ResourceReading};
use crate::error::{Result, TelemetryError};

const PS: &str = "ps";

/// Command line fragments that mark a process as worth monitoring.
const MONITORED_KEYWORDS: &[&str] =
    &["java", "python", "node", "nginx", "kafka", "flink", "docker", "container"];

/// Number of `ps aux` columns; the last one is the full command line.
const PS_AUX_COLUMNS: usize = 11;

/// Characters of a command line included in discovery logs.
const LOGGED_COMMAND_CHARS: usize = 80;

/// One row of `ps aux` output.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessRow {
    pub user: String,
    pub pid: String,
    pub cpu: String,
    pub mem: String,
    pub command: String,
}

impl ProcessRow {
    /// Parse a `ps aux` line; `None` when it has fewer than 11 columns.
    pub fn parse(line: &str) -> Option<Self> {
        let fields = split_fields(line, PS_AUX_COLUMNS);
        if fields.len() < PS_AUX_COLUMNS {
            return None;
        }
        Some(Self {
            user: fields[0].to_string(),
            pid: fields[1].to_string(),
            cpu: fields[2].to_string(),
            mem: fields[3].to_string(),
            command: fields[10].to_string(),
        })
    }

    fn usage(&self) -> Option<(f64, f64)> {
        Some((self.cpu.parse().ok()?, self.mem.parse().ok()?))
    }
}

/// Split on whitespace into at most `count` fields, the last keeping the rest.
fn split_fields(line: &str, count: usize) -> Vec<&str> {
    let mut fields = Vec::with_capacity(count);
    let mut rest = line.trim();
    while !rest.is_empty() && fields.len() + 1 < count {
        match rest.find(char::is_whitespace) {
            Some(end) => {
                fields.push(&rest[..end]);
                rest = rest[end..].trim_start();
            }
            None => {
                fields.push(rest);
                rest = "";
            }
        }
    }
    if !rest.is_empty() {
        fields.push(rest);
    }
    fields
}

pub fn is_monitorable(command: &str) -> bool {
    let lower = command.to_lowercase();
    MONITORED_KEYWORDS.iter().any(|keyword| lower.contains(keyword))
}

/// Derive a human-readable selection label for a process.
pub fn process_label(command: &str, pid: &str) -> String {
    let lower = command.to_lowercase();
    if lower.contains("java") {
        java_label(command, pid)
    } else if lower.contains("python") {
        python_label(command, pid)
    } else {
        let binary = command.split_whitespace().next().unwrap_or(command);
        format!("{}-{}", basename(binary), pid)
    }
}

fn java_label(command: &str, pid: &str) -> String {
    if command.contains(".jar") {
        if let Some(jar) = command.split_whitespace().find(|arg| arg.contains(".jar")) {
            return format!("java-{}", basename(jar).replace(".jar", ""));
        }
    } else if let Some(class) = command
        .split_whitespace()
        .find(|arg| arg.starts_with("org.") || arg.starts_with("com."))
    {
        let main = class.rsplit('.').next().unwrap_or(class);
        return format!("java-{}", main);
    }
    format!("java-{}", pid)
}

fn python_label(command: &str, pid: &str) -> String {
    match command.split_whitespace().find(|arg| arg.contains(".py")) {
        Some(script) => format!("python-{}", basename(script).replace(".py", "")),
        None => format!("python-{}", pid),
    }
}

fn basename(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// The pid encoded after the last `-` of a label, if numeric.
///
/// A zero suffix is not a pid, so `nginx-0` is matched by pattern.
pub fn pid_suffix(id: &str) -> Option<u32> {
    let (_, tail) = id.rsplit_once('-')?;
    tail.parse::<u32>().ok().filter(|pid| *pid != 0)
}

/// Lowercased `-`/`_` separated tokens of a label.
pub fn pattern_tokens(id: &str) -> Vec<String> {
    id.to_lowercase()
        .split(['-', '_'])
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}

/// Reads process usage from `ps`.
pub struct ProcessTable {
    runner: Arc<dyn CommandRunner>,
    max_entities: usize,
}

impl ProcessTable {
    pub fn new(runner: Arc<dyn CommandRunner>, max_entities: usize) -> Self {
        Self {
            runner,
            max_entities,
        }
    }

    async fn rows(&self) -> Result<Vec<ProcessRow>> {
        let output = self.runner.run(PS, &["aux", "--no-headers"]).await?;
        if !output.success {
            return Err(TelemetryError::Unavailable("ps command failed".to_string()));
        }
        Ok(output.stdout.lines().filter_map(ProcessRow::parse).collect())
    }

    async fn stats_by_pid(&self, pid: u32) -> Result<ResourceReading> {
        let pid_arg = pid.to_string();
        let output = self
            .runner
            .run(PS, &["-p", &pid_arg, "-o", "pid,pcpu,pmem,comm", "--no-headers"])
            .await?;

        let stdout = output.stdout.trim();
        if !output.success || stdout.is_empty() {
            return Err(TelemetryError::EntityNotFound(format!(
                "Process with PID {} not found",
                pid
            )));
        }

        let fields: Vec<&str> = stdout.split_whitespace().collect();
        let parsed = match fields.as_slice() {
            [_, cpu, mem, ..] => cpu.parse::<f64>().ok().zip(mem.parse::<f64>().ok()),
            _ => None,
        };
        let Some((cpu_pct, mem_pct)) = parsed else {
            return Err(TelemetryError::Unavailable(format!(
                "Parse error for PID {}: {:?}",
                pid, stdout
            )));
        };

        Ok(ResourceReading {
            cpu_pct,
            mem_pct,
            net_rx_bytes: 0.0,
            net_tx_bytes: 0.0,
            source: self.source(),
        })
    }

    async fn stats_by_pattern(&self, pattern: &str) -> Result<ResourceReading> {
        let tokens = pattern_tokens(pattern);
        let rows = self.rows().await?;

        let mut cpu_pct = 0.0;
        let mut mem_pct = 0.0;
        let mut matched = 0usize;

        for row in &rows {
            let command = row.command.to_lowercase();
            if !tokens.iter().any(|token| command.contains(token.as_str())) {
                continue;
            }
            if let Some((cpu, mem)) = row.usage() {
                cpu_pct += cpu;
                mem_pct += mem;
                matched += 1;
            }
        }

        if matched == 0 {
            return Err(TelemetryError::EntityNotFound(format!(
                "No processes found matching '{}'",
                pattern
            )));
        }

        debug!(pattern, matched, cpu_pct, mem_pct, "Aggregated process usage");
        Ok(ResourceReading {
            cpu_pct,
            mem_pct,
            net_rx_bytes: 0.0,
            net_tx_bytes: 0.0,
            source: self.source(),
        })
    }
}

#[async_trait]
impl EntityIntrospector for ProcessTable {
    fn source(&self) -> ReadingSource {
        ReadingSource::ProcessTable
    }

    async fn list_entities(&self) -> Result<Vec<String>> {
        let rows = self.rows().await?;

        let mut seen = HashSet::new();
        let mut found: Vec<(String, &ProcessRow)> = Vec::new();
        for row in rows.iter().filter(|row| is_monitorable(&row.command)) {
            let label = process_label(&row.command, &row.pid);
            if seen.insert(label.clone()) {
                found.push((label, row));
            }
        }

        info!(count = found.len(), "Found processes for monitoring");
        for (label, row) in found.iter().take(5) {
            let command: String = row.command.chars().take(LOGGED_COMMAND_CHARS).collect();
            debug!(label = %label, pid = %row.pid, user = %row.user, command = %command, "Process candidate");
        }

        found.truncate(self.max_entities);
        Ok(found.into_iter().map(|(label, _)| label).collect())
    }

    async fn entity_stats(&self, id: &str) -> Result<ResourceReading> {
        match pid_suffix(id) {
            Some(pid) => self.stats_by_pid(pid).await,
            None => self.stats_by_pattern(id).await,
        }
    }
}
