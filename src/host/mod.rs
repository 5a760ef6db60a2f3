//! Host resource introspection.
//!
//! Two introspectors read per-entity CPU, memory and network usage:
//!
//! - [`ContainerRuntime`] asks the docker daemon about running containers
//! - [`ProcessTable`] falls back to `ps` when docker is missing or fails
//!
//! [`HostMetricsPoller`] picks between them on every call and appends
//! successful readings to the shared [`TelemetryStore`](crate::data::TelemetryStore).

use async_trait::async_trait;

use crate::data::{ReadingSource, ResourceReading};
use crate::error::Result;

pub mod command;
pub mod container;
pub mod poller;
pub mod process;

pub use command::{CommandOutput, CommandRunner, SystemCommandRunner};
pub use container::ContainerRuntime;
pub use poller::{HostMetricsPoller, RuntimeStatus};
pub use process::ProcessTable;

/// A source of monitorable entities and their resource usage.
#[async_trait]
pub trait EntityIntrospector: Send + Sync {
    fn source(&self) -> ReadingSource;

    /// Check that the backing tool is usable right now.
    ///
    /// Tools that need no daemon are always usable.
    async fn probe(&self) -> Result<()> {
        Ok(())
    }

    async fn list_entities(&self) -> Result<Vec<String>>;

    async fn entity_stats(&self, id: &str) -> Result<ResourceReading>;
}
