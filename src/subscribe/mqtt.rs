//! MQTT transport for the latency subscription.

use std::time::Duration;

use async_trait::async_trait;
use rumqttc::{
    AsyncClient, ConnectReturnCode, ConnectionError, Event, EventLoop, MqttOptions, Packet, QoS,
};
use tracing::debug;

use super::{BusConnector, BusSession};
use crate::config::BusSettings;
use crate::error::{Result, TelemetryError};

/// Capacity of the request channel between client and event loop.
const REQUEST_CAPACITY: usize = 64;

/// Connects to an MQTT broker with a fresh clean session per attempt.
#[derive(Debug, Clone)]
pub struct MqttConnector {
    host: String,
    port: u16,
    keep_alive: Duration,
    client_id: String,
}

impl MqttConnector {
    pub fn new(settings: &BusSettings) -> Self {
        Self {
            host: settings.host.clone(),
            port: settings.port,
            keep_alive: settings.keep_alive(),
            client_id: format!("benchwatch-{}", std::process::id()),
        }
    }

    fn options(&self) -> MqttOptions {
        let mut options = MqttOptions::new(&self.client_id, &self.host, self.port);
        options.set_keep_alive(self.keep_alive);
        options.set_clean_session(true);
        options
    }
}

#[async_trait]
impl BusConnector for MqttConnector {
    async fn connect(&self) -> Result<Box<dyn BusSession>> {
        let (client, mut eventloop) = AsyncClient::new(self.options(), REQUEST_CAPACITY);

        loop {
            match eventloop.poll().await {
                Ok(Event::Incoming(Packet::ConnAck(ack))) => {
                    if ack.code == ConnectReturnCode::Success {
                        debug!(client_id = %self.client_id, "MQTT session accepted");
                        return Ok(Box::new(MqttSession { client, eventloop }));
                    }
                    return Err(TelemetryError::ConnectionRefused(format!("{:?}", ack.code)));
                }
                Ok(_) => continue,
                Err(ConnectionError::ConnectionRefused(code)) => {
                    return Err(TelemetryError::ConnectionRefused(format!("{:?}", code)));
                }
                Err(e) => return Err(TelemetryError::Connection(format!("MQTT error: {}", e))),
            }
        }
    }

    fn description(&self) -> String {
        format!("mqtt://{}:{}", self.host, self.port)
    }
}

struct MqttSession {
    client: AsyncClient,
    eventloop: EventLoop,
}

#[async_trait]
impl BusSession for MqttSession {
    async fn subscribe(&mut self, topic: &str) -> Result<()> {
        self.client
            .subscribe(topic, QoS::AtMostOnce)
            .await
            .map_err(|e| TelemetryError::Connection(format!("Subscribe failed: {}", e)))
    }

    async fn next_payload(&mut self) -> Result<Vec<u8>> {
        loop {
            match self.eventloop.poll().await {
                Ok(Event::Incoming(Packet::Publish(publish))) => return Ok(publish.payload.to_vec()),
                Ok(Event::Incoming(Packet::Disconnect)) => {
                    return Err(TelemetryError::Connection("Disconnected".to_string()));
                }
                Ok(_) => {}
                Err(e) => {
                    return Err(TelemetryError::Connection(format!(
                        "Disconnected with error: {}",
                        e
                    )));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connector_from_settings() {
        let settings = BusSettings {
            host: "broker.local".to_string(),
            port: 1883,
            ..BusSettings::default()
        };
        let connector = MqttConnector::new(&settings);
        assert_eq!(connector.description(), "mqtt://broker.local:1883");
        assert!(connector.client_id.starts_with("benchwatch-"));
        assert_eq!(connector.keep_alive, Duration::from_secs(60));
    }

    #[tokio::test]
    async fn test_unreachable_broker_is_connection_error() {
        // Port 1 on localhost is never an MQTT broker.
        let settings = BusSettings {
            host: "127.0.0.1".to_string(),
            port: 1,
            ..BusSettings::default()
        };
        let result = MqttConnector::new(&settings).connect().await;
        match result {
            Err(TelemetryError::Connection(message)) => assert!(message.starts_with("MQTT error:")),
            Err(other) => panic!("unexpected error: {other}"),
            Ok(_) => panic!("connected to a closed port"),
        }
    }
}
