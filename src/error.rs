//! Error types for telemetry collection.

use std::time::Duration;

use thiserror::Error;

/// Errors that can occur while collecting telemetry.
///
/// None of these are fatal: connection errors are retried by the subscriber,
/// introspection errors trigger the fallback chain, and the rest are handed
/// back to the dashboard as display-level states.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TelemetryError {
    /// The broker could not be reached or the session dropped.
    #[error("{0}")]
    Connection(String),

    /// The broker answered the connect request with a failure code.
    #[error("Connection failed with code {0}")]
    ConnectionRefused(String),

    /// A bus payload could not be decoded.
    #[error("Failed to parse message: {0}")]
    MessageParse(String),

    /// An introspection path (container runtime or process table) failed.
    #[error("{0}")]
    Unavailable(String),

    /// An introspection command exceeded its time budget.
    #[error("`{command}` timed out after {after:?}")]
    Timeout { command: String, after: Duration },

    /// No container or process matched the requested entity.
    #[error("{0}")]
    EntityNotFound(String),
}

impl TelemetryError {
    /// Whether this error should send the poller down the next fallback path.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, TelemetryError::Unavailable(_) | TelemetryError::Timeout { .. })
    }
}

/// Convenience alias used across the telemetry modules.
pub type Result<T> = std::result::Result<T, TelemetryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_counts_as_unavailable() {
        let err = TelemetryError::Timeout {
            command: "docker stats".to_string(),
            after: Duration::from_secs(10),
        };
        assert!(err.is_unavailable());
        assert_eq!(err.to_string(), "`docker stats` timed out after 10s");
    }

    #[test]
    fn test_not_found_is_not_unavailable() {
        let err = TelemetryError::EntityNotFound("No processes found matching 'x'".into());
        assert!(!err.is_unavailable());
        assert_eq!(err.to_string(), "No processes found matching 'x'");
    }
}
