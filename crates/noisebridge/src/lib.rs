//! Protocol bridge between the noisemusicsystem MQTT wire protocol and a
//! media-player abstraction.
//!
//! The bridge keeps the canonical playback state of one remote device in
//! sync over MQTT and translates abstract playback commands into outbound
//! wire messages.
//!
//! ## Architecture
//!
//! - [`codec`]: pure decode/encode of the status, availability, and command
//!   payloads
//! - [`position`]: playback position extrapolation from the last report
//! - [`store`]: single-writer, multi-reader state store with atomic
//!   snapshots
//! - [`command`]: abstract commands and parameter validation
//! - [`bridge`]: the controller routing inbound messages and outbound
//!   commands
//! - [`transport`]: rumqttc transport behind the [`CommandPublisher`] seam
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use noisebridge::{BridgeConfig, CommandKind, MediaBridge, MqttConfig, MqttTransport};
//!
//! # async fn run() -> noisebridge::Result<()> {
//! let bridge = Arc::new(MediaBridge::new(BridgeConfig::new("kitchen", "Kitchen Player")));
//! let transport = MqttTransport::start(&MqttConfig::new("localhost"), bridge.clone()).await?;
//!
//! bridge.issue_command(CommandKind::Volume, Some("40")).await?;
//! let view = bridge.current_view();
//! println!("{}: {}s", view.state.track_name, view.position_secs);
//!
//! transport.stop().await;
//! # Ok(())
//! # }
//! ```

pub mod bridge;
pub mod codec;
pub mod command;
pub mod error;
pub mod position;
pub mod state;
pub mod store;
pub mod topic;
pub mod transport;

pub use bridge::{BridgeConfig, BridgeEvent, MediaBridge};
pub use command::{Command, CommandKind};
pub use error::{BridgeError, DecodeError, Result, ValidationError};
pub use state::{Availability, DeviceState, PlayState, PlayerView};
pub use store::StateStore;
pub use topic::DeviceTopics;
pub use transport::{CommandPublisher, MqttConfig, MqttTransport};
