//! Bridge controller: routes inbound device messages into the state store
//! and outbound host commands through the publish capability.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::codec;
use crate::command::{self, CommandKind};
use crate::error::{BridgeError, Result};
use crate::position;
use crate::state::{Availability, DeviceState, PlayerView};
use crate::store::StateStore;
use crate::topic::{Channel, DeviceTopics};
use crate::transport::CommandPublisher;

/// Capacity of the bridge event channel; slow subscribers lag rather than
/// block the inbound handler.
const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Configuration for one bridge instance (one logical device).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BridgeConfig {
    /// Device identifier (the `{device}` topic segment, normalized).
    pub device_id: String,
    /// Display name shown by the host.
    pub name: String,
}

impl BridgeConfig {
    /// Create a configuration for a device.
    pub fn new(device_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            device_id: device_id.into(),
            name: name.into(),
        }
    }
}

/// Change notifications emitted by the bridge.
#[derive(Debug, Clone)]
pub enum BridgeEvent {
    /// A status update was decoded and applied.
    StateChanged(DeviceState),
    /// The availability flag changed value.
    AvailabilityChanged(Availability),
}

/// Protocol bridge for a single device.
///
/// Owns the state store and the topic layout. Inbound MQTT messages come in
/// through [`MediaBridge::handle_message`] (called from the transport's I/O
/// task); the host reads through [`MediaBridge::current_view`] and writes
/// through [`MediaBridge::issue_command`], possibly from other threads. The
/// store makes each write atomic with respect to reads.
pub struct MediaBridge {
    config: BridgeConfig,
    topics: DeviceTopics,
    store: StateStore,
    publisher: RwLock<Option<Arc<dyn CommandPublisher>>>,
    events: broadcast::Sender<BridgeEvent>,
}

impl MediaBridge {
    /// Create a bridge with empty state and unknown availability.
    pub fn new(config: BridgeConfig) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let topics = DeviceTopics::new(&config.device_id);
        Self {
            config,
            topics,
            store: StateStore::new(),
            publisher: RwLock::new(None),
            events,
        }
    }

    /// Display name of the bridged device.
    pub fn name(&self) -> &str {
        &self.config.name
    }

    /// Normalized device id.
    pub fn device_id(&self) -> &str {
        self.topics.device_id()
    }

    /// Topic layout for this device.
    pub fn topics(&self) -> &DeviceTopics {
        &self.topics
    }

    /// Topics the transport must subscribe to on start.
    pub fn subscriptions(&self) -> [String; 2] {
        [self.topics.availability(), self.topics.status()]
    }

    /// Attach the publish capability used for outbound commands.
    pub fn set_publisher(&self, publisher: Arc<dyn CommandPublisher>) {
        *self.publisher.write() = Some(publisher);
    }

    /// Detach the publish capability; later commands fail with
    /// [`BridgeError::NotConnected`].
    pub fn clear_publisher(&self) {
        *self.publisher.write() = None;
    }

    /// Subscribe to change notifications.
    pub fn subscribe_events(&self) -> broadcast::Receiver<BridgeEvent> {
        self.events.subscribe()
    }

    /// Route one inbound MQTT message.
    ///
    /// Malformed payloads are logged and dropped; a failed decode never
    /// touches prior good state. Messages for other devices or unknown
    /// topics are ignored. Each message is an independent, idempotent
    /// overlay, so out-of-order delivery is tolerated (last write wins).
    pub fn handle_message(&self, topic: &str, payload: &[u8]) {
        let Some(channel) = self.topics.parse(topic) else {
            debug!(topic, "ignoring message outside this device's topics");
            return;
        };

        match channel {
            Channel::Availability => {
                let availability = codec::decode_availability(payload);
                if self.store.apply_availability(availability) {
                    info!(device = %self.device_id(), ?availability, "availability changed");
                    let _ = self
                        .events
                        .send(BridgeEvent::AvailabilityChanged(availability));
                }
            }
            Channel::Status => {
                let (prev, _) = self.store.snapshot();
                match codec::decode_status(&prev, payload, Utc::now()) {
                    Ok(state) => {
                        debug!(device = %self.device_id(), track = %state.track_name, "status applied");
                        self.store.apply_status(state.clone());
                        let _ = self.events.send(BridgeEvent::StateChanged(state));
                    }
                    Err(err) => {
                        warn!(device = %self.device_id(), %err, "skipping malformed status update");
                    }
                }
            }
            Channel::Command => {
                // Echo of our own publishes, or another controller driving
                // the same device.
                debug!(device = %self.device_id(), "ignoring command topic echo");
            }
            Channel::Config => {
                debug!(device = %self.device_id(), "ignoring device config update");
            }
        }
    }

    /// Validate, encode, and publish a host command.
    ///
    /// A [`crate::error::ValidationError`] is returned to the caller and
    /// nothing is published. Publishing is fire-and-forget: delivery and
    /// retry belong to the transport.
    pub async fn issue_command(
        &self,
        kind: CommandKind,
        parameter: Option<&str>,
    ) -> Result<()> {
        let cmd = command::translate(kind, parameter)?;
        let payload = codec::encode_command(&cmd);
        let publisher = self.publisher.read().clone();
        let publisher = publisher.ok_or(BridgeError::NotConnected)?;
        publisher.publish(&self.topics.command(), payload).await?;
        debug!(device = %self.device_id(), %kind, "command published");
        Ok(())
    }

    /// Read path for the host: snapshot with the position resolved now.
    pub fn current_view(&self) -> PlayerView {
        self.view_at(Utc::now())
    }

    /// Snapshot with the position resolved at an explicit instant.
    pub fn view_at(&self, now: DateTime<Utc>) -> PlayerView {
        let (state, availability) = self.store.snapshot();
        let position_secs = position::current_position(&state, now);
        PlayerView {
            state,
            position_secs,
            availability,
        }
    }
}
