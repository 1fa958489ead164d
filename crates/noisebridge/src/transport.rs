//! MQTT transport for the bridge, built on rumqttc.
//!
//! The bridge core depends on [`CommandPublisher`], a minimal publish
//! capability; [`MqttTransport`] is the production implementation. It owns
//! the client and the event-loop task, subscribes to the bridge's inbound
//! topics, and feeds every inbound publish to
//! [`MediaBridge::handle_message`].

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use rumqttc::{AsyncClient, Event, MqttOptions, Packet, QoS};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::bridge::MediaBridge;
use crate::error::{BridgeError, Result};

/// Consecutive event-loop errors tolerated before the connection task gives
/// up; rumqttc reconnects on its own below this threshold.
const MAX_CONSECUTIVE_ERRORS: u32 = 5;

/// Minimal publish capability the bridge core depends on.
///
/// Keeps the controller testable without a broker. Publishing is
/// fire-and-forget from the core's perspective; delivery and retry belong to
/// the implementation.
#[async_trait]
pub trait CommandPublisher: Send + Sync {
    /// Publish a payload to a topic.
    async fn publish(&self, topic: &str, payload: Vec<u8>) -> Result<()>;
}

/// MQTT broker configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MqttConfig {
    /// Broker host.
    pub broker: String,

    /// Broker port.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Client ID; a random one is generated when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,

    /// Username.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    /// Password.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,

    /// Keep-alive interval in seconds.
    #[serde(default = "default_keep_alive")]
    pub keep_alive: u64,
}

fn default_port() -> u16 {
    1883
}

fn default_keep_alive() -> u64 {
    60
}

impl MqttConfig {
    /// Create a configuration for a broker host with default settings.
    pub fn new(broker: impl Into<String>) -> Self {
        Self {
            broker: broker.into(),
            port: default_port(),
            client_id: None,
            username: None,
            password: None,
            keep_alive: default_keep_alive(),
        }
    }

    /// Set the port.
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set authentication.
    pub fn with_auth(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    /// Set the client ID.
    pub fn with_client_id(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = Some(client_id.into());
        self
    }

    /// Full broker address.
    pub fn broker_addr(&self) -> String {
        format!("{}:{}", self.broker, self.port)
    }
}

/// rumqttc-backed transport bound to one bridge.
pub struct MqttTransport {
    client: AsyncClient,
    running: Arc<AtomicBool>,
}

impl MqttTransport {
    /// Connect to the broker, subscribe to the bridge's inbound topics, and
    /// spawn the event-loop task routing inbound publishes to the bridge.
    ///
    /// The returned transport is attached to the bridge as its publish
    /// capability.
    pub async fn start(config: &MqttConfig, bridge: Arc<MediaBridge>) -> Result<Arc<Self>> {
        let client_id = config
            .client_id
            .clone()
            .unwrap_or_else(|| format!("noisebridge-{}-{}", bridge.device_id(), Uuid::new_v4()));

        let mut options = MqttOptions::new(client_id, config.broker.clone(), config.port);
        options.set_keep_alive(Duration::from_secs(config.keep_alive));
        if let (Some(user), Some(pass)) = (&config.username, &config.password) {
            options.set_credentials(user.clone(), pass.clone());
        }

        let (client, mut eventloop) = AsyncClient::new(options, 10);

        for topic in bridge.subscriptions() {
            client
                .subscribe(topic.clone(), QoS::AtLeastOnce)
                .await
                .map_err(|e| {
                    BridgeError::Transport(format!("subscribe to {topic} failed: {e}"))
                })?;
        }

        let running = Arc::new(AtomicBool::new(true));
        let run_flag = running.clone();
        let broker_addr = config.broker_addr();
        let bridge_task = bridge.clone();

        tokio::spawn(async move {
            let mut error_count = 0u32;

            while run_flag.load(Ordering::Relaxed) {
                match eventloop.poll().await {
                    Ok(Event::Incoming(Packet::Publish(publish))) => {
                        error_count = 0;
                        bridge_task.handle_message(&publish.topic, &publish.payload);
                    }
                    Ok(Event::Incoming(Packet::ConnAck(_))) => {
                        error_count = 0;
                        info!(broker = %broker_addr, "MQTT connection acknowledged");
                    }
                    Ok(_) => {
                        error_count = 0;
                    }
                    Err(e) => {
                        error_count += 1;
                        if error_count >= MAX_CONSECUTIVE_ERRORS {
                            error!(
                                broker = %broker_addr,
                                "MQTT error count reached {MAX_CONSECUTIVE_ERRORS}, stopping: {e}"
                            );
                            break;
                        }
                        warn!(
                            broker = %broker_addr,
                            "MQTT connection error ({error_count}/{MAX_CONSECUTIVE_ERRORS}): {e}"
                        );
                        tokio::time::sleep(Duration::from_secs(1)).await;
                    }
                }
            }

            bridge_task.clear_publisher();
            info!(broker = %broker_addr, "MQTT event loop stopped");
        });

        info!(broker = %config.broker_addr(), device = %bridge.device_id(), "MQTT transport started");

        let transport = Arc::new(Self { client, running });
        bridge.set_publisher(transport.clone());
        Ok(transport)
    }

    /// Stop the event-loop task and disconnect from the broker.
    pub async fn stop(&self) {
        self.running.store(false, Ordering::Relaxed);
        if let Err(e) = self.client.disconnect().await {
            warn!("MQTT disconnect failed: {e}");
        }
    }
}

#[async_trait]
impl CommandPublisher for MqttTransport {
    async fn publish(&self, topic: &str, payload: Vec<u8>) -> Result<()> {
        self.client
            .publish(topic, QoS::AtLeastOnce, false, payload)
            .await
            .map_err(|e| BridgeError::Transport(format!("publish to {topic} failed: {e}")))
    }
}
