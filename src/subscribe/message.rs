//! Decoding of latency events received from the bus.
//!
//! Events are JSON objects carrying the time they were published, in
//! milliseconds since the Unix epoch, under a configurable key:
//!
//! ```json
//! {"auction": 1007, "price": 2310, "bid$timestamp": 1718031234567}
//! ```

use std::time::SystemTime;

use serde_json::Value;

use crate::data::sample::epoch_millis;
use crate::data::LatencySample;
use crate::error::{Result, TelemetryError};

/// Extract the publish timestamp (ms since epoch) from a JSON payload.
///
/// The value may be a JSON number or a numeric string.
pub fn publish_timestamp_ms(payload: &[u8], key: &str) -> Result<f64> {
    let value: Value =
        serde_json::from_slice(payload).map_err(|e| TelemetryError::MessageParse(e.to_string()))?;

    let field = value
        .get(key)
        .ok_or_else(|| TelemetryError::MessageParse(format!("missing key '{}'", key)))?;

    let millis = match field {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };

    match millis {
        Some(ms) if ms.is_finite() => Ok(ms),
        _ => Err(TelemetryError::MessageParse(format!(
            "'{}' is not a numeric timestamp: {}",
            key, field
        ))),
    }
}

/// Decode a payload into a latency sample observed at `received_at`.
pub fn decode_latency(payload: &[u8], key: &str, received_at: SystemTime) -> Result<LatencySample> {
    let published_ms = publish_timestamp_ms(payload, key)?;
    Ok(LatencySample {
        observed_at: received_at,
        latency_ms: epoch_millis(received_at) - published_ms,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, UNIX_EPOCH};

    const KEY: &str = "bid$timestamp";

    #[test]
    fn test_numeric_timestamp() {
        let received = UNIX_EPOCH + Duration::from_millis(1_000_250);
        let sample = decode_latency(br#"{"bid$timestamp": 1000000}"#, KEY, received).unwrap();
        assert!((sample.latency_ms - 250.0).abs() < 1e-6);
        assert_eq!(sample.observed_at, received);
    }

    #[test]
    fn test_string_timestamp() {
        let received = UNIX_EPOCH + Duration::from_millis(5_000);
        let sample = decode_latency(br#"{"bid$timestamp": "4990.5"}"#, KEY, received).unwrap();
        assert!((sample.latency_ms - 9.5).abs() < 1e-6);
    }

    #[test]
    fn test_missing_key() {
        let err = publish_timestamp_ms(br#"{"price": 3}"#, KEY).unwrap_err();
        assert!(matches!(err, TelemetryError::MessageParse(_)));
    }

    #[test]
    fn test_not_json() {
        let err = publish_timestamp_ms(b"hello", KEY).unwrap_err();
        assert!(matches!(err, TelemetryError::MessageParse(_)));
    }

    #[test]
    fn test_non_numeric_value() {
        assert!(publish_timestamp_ms(br#"{"bid$timestamp": true}"#, KEY).is_err());
        assert!(publish_timestamp_ms(br#"{"bid$timestamp": "soon"}"#, KEY).is_err());
    }

    #[test]
    fn test_custom_key() {
        let ms = publish_timestamp_ms(br#"{"ts": 42}"#, "ts").unwrap();
        assert_eq!(ms, 42.0);
    }
}
