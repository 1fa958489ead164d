//! MQTT topic layout for the noisemusicsystem namespace.
//!
//! Every device lives under `noisemusicsystem/{device}/...` with one topic
//! per message class:
//!
//! - `noisemusicsystem/{device}/availability` — inbound, raw text
//! - `noisemusicsystem/{device}/status` — inbound, JSON
//! - `noisemusicsystem/{device}/command` — outbound, JSON
//! - `noisemusicsystem/{device}/config` — inbound, reserved by the firmware

/// Fixed topic namespace shared with the device firmware.
pub const NAMESPACE: &str = "noisemusicsystem";

/// Message classes carried under a device's topic subtree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    /// Device availability announcements.
    Availability,
    /// Playback status updates.
    Status,
    /// Playback commands (outbound from the bridge).
    Command,
    /// Device configuration updates.
    Config,
}

impl Channel {
    fn from_segment(segment: &str) -> Option<Self> {
        match segment {
            "availability" => Some(Channel::Availability),
            "status" => Some(Channel::Status),
            "command" => Some(Channel::Command),
            "config" => Some(Channel::Config),
            _ => None,
        }
    }
}

/// Topic set for one logical device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceTopics {
    device_id: String,
}

impl DeviceTopics {
    /// Build the topic set for a device, normalizing the id the way the
    /// firmware publishes it.
    pub fn new(device_id: &str) -> Self {
        Self {
            device_id: normalize_device_id(device_id),
        }
    }

    /// The normalized device id used in topic paths.
    pub fn device_id(&self) -> &str {
        &self.device_id
    }

    /// Inbound availability topic.
    pub fn availability(&self) -> String {
        format!("{NAMESPACE}/{}/availability", self.device_id)
    }

    /// Inbound status topic.
    pub fn status(&self) -> String {
        format!("{NAMESPACE}/{}/status", self.device_id)
    }

    /// Outbound command topic.
    pub fn command(&self) -> String {
        format!("{NAMESPACE}/{}/command", self.device_id)
    }

    /// Parse an inbound topic into its message class.
    ///
    /// Returns `None` for topics outside the namespace, for other devices,
    /// or with an unknown trailing segment.
    pub fn parse(&self, topic: &str) -> Option<Channel> {
        let mut parts = topic.split('/');
        if parts.next()? != NAMESPACE {
            return None;
        }
        if normalize_device_id(parts.next()?) != self.device_id {
            return None;
        }
        let channel = Channel::from_segment(parts.next()?)?;
        if parts.next().is_some() {
            return None;
        }
        Some(channel)
    }
}

/// Uppercased slug of a device identifier.
///
/// The firmware addresses devices by slugified, uppercased ids; runs of
/// non-alphanumeric characters collapse to a single underscore.
pub fn normalize_device_id(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut pending_separator = false;
    for ch in raw.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_separator && !out.is_empty() {
                out.push('_');
            }
            pending_separator = false;
            out.push(ch.to_ascii_uppercase());
        } else {
            pending_separator = true;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_device_topics() {
        let topics = DeviceTopics::new("kitchen");
        assert_eq!(topics.availability(), "noisemusicsystem/KITCHEN/availability");
        assert_eq!(topics.status(), "noisemusicsystem/KITCHEN/status");
        assert_eq!(topics.command(), "noisemusicsystem/KITCHEN/command");
    }

    #[test]
    fn normalizes_device_ids() {
        assert_eq!(normalize_device_id("living room"), "LIVING_ROOM");
        assert_eq!(normalize_device_id("Living--Room!"), "LIVING_ROOM");
        assert_eq!(normalize_device_id("player1"), "PLAYER1");
        assert_eq!(normalize_device_id("  kitchen  "), "KITCHEN");
    }

    #[test]
    fn parses_own_topics() {
        let topics = DeviceTopics::new("kitchen");
        assert_eq!(
            topics.parse("noisemusicsystem/KITCHEN/availability"),
            Some(Channel::Availability)
        );
        assert_eq!(
            topics.parse("noisemusicsystem/KITCHEN/status"),
            Some(Channel::Status)
        );
        assert_eq!(
            topics.parse("noisemusicsystem/KITCHEN/config"),
            Some(Channel::Config)
        );
        // Device ids in topics are normalized before comparison.
        assert_eq!(
            topics.parse("noisemusicsystem/kitchen/status"),
            Some(Channel::Status)
        );
    }

    #[test]
    fn rejects_foreign_topics() {
        let topics = DeviceTopics::new("kitchen");
        assert_eq!(topics.parse("noisemusicsystem/BEDROOM/status"), None);
        assert_eq!(topics.parse("othersystem/KITCHEN/status"), None);
        assert_eq!(topics.parse("noisemusicsystem/KITCHEN/telemetry"), None);
        assert_eq!(topics.parse("noisemusicsystem/KITCHEN/status/extra"), None);
        assert_eq!(topics.parse("noisemusicsystem"), None);
    }
}
