//! Device state model for the bridged media player.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Transport state reported by the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PlayState {
    /// Currently playing audio.
    Playing,
    /// Paused, stopped, or anything else the device chooses to report.
    #[default]
    NotPlaying,
}

impl PlayState {
    /// Parse from the wire `playstate` string.
    ///
    /// Anything other than `"playing"` (compared case-insensitively) maps to
    /// [`PlayState::NotPlaying`].
    pub fn from_wire(state: &str) -> Self {
        if state.eq_ignore_ascii_case("playing") {
            PlayState::Playing
        } else {
            PlayState::NotPlaying
        }
    }

    /// Whether the device is actively playing.
    pub fn is_playing(&self) -> bool {
        matches!(self, PlayState::Playing)
    }
}

/// Device availability as reported on the availability topic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Availability {
    /// No availability message observed yet.
    #[default]
    Unknown,
    /// Device announced itself online.
    Online,
    /// Device announced itself offline (or sent an unrecognized payload).
    Offline,
}

impl Availability {
    /// Whether the host may treat the entity as usable.
    pub fn is_online(&self) -> bool {
        matches!(self, Availability::Online)
    }
}

/// Reconciled playback snapshot of the remote device.
///
/// Mutated in place on every successful status decode and never destroyed;
/// one instance lives for the lifetime of its bridge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceState {
    /// Artist of the current track.
    pub artist: String,
    /// Album of the current track.
    pub album: String,
    /// Title of the current track.
    pub track_name: String,
    /// Track number within the album.
    pub track_number: u32,
    /// Track duration in seconds (0 when unknown).
    pub duration_secs: u64,
    /// Playback position in seconds, valid at `position_recorded_at`.
    pub position_secs: u64,
    /// Wall-clock instant at which `position_secs` was valid.
    pub position_recorded_at: DateTime<Utc>,
    /// Volume level in [0, 100].
    pub volume: u8,
    /// Whether the device is muted.
    pub muted: bool,
    /// Transport state.
    pub play_state: PlayState,
}

impl Default for DeviceState {
    fn default() -> Self {
        Self {
            artist: String::new(),
            album: String::new(),
            track_name: String::new(),
            track_number: 0,
            duration_secs: 0,
            position_secs: 0,
            position_recorded_at: DateTime::UNIX_EPOCH,
            volume: 0,
            muted: false,
            play_state: PlayState::NotPlaying,
        }
    }
}

/// Read model handed to the host: a state snapshot with the playback
/// position resolved at query time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerView {
    /// The reconciled device state backing this view.
    pub state: DeviceState,
    /// Position in seconds, extrapolated to the query instant.
    pub position_secs: u64,
    /// Device availability.
    pub availability: Availability,
}

impl PlayerView {
    /// Whether the host may expose the entity as usable.
    pub fn is_available(&self) -> bool {
        self.availability.is_online()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn play_state_from_wire() {
        assert_eq!(PlayState::from_wire("playing"), PlayState::Playing);
        assert_eq!(PlayState::from_wire("Playing"), PlayState::Playing);
        assert_eq!(PlayState::from_wire("PLAYING"), PlayState::Playing);
        assert_eq!(PlayState::from_wire("paused"), PlayState::NotPlaying);
        assert_eq!(PlayState::from_wire("stopped"), PlayState::NotPlaying);
        assert_eq!(PlayState::from_wire(""), PlayState::NotPlaying);
    }

    #[test]
    fn availability_defaults_to_unknown() {
        assert_eq!(Availability::default(), Availability::Unknown);
        assert!(!Availability::Unknown.is_online());
        assert!(!Availability::Offline.is_online());
        assert!(Availability::Online.is_online());
    }

    #[test]
    fn device_state_default_is_empty() {
        let state = DeviceState::default();
        assert_eq!(state.artist, "");
        assert_eq!(state.duration_secs, 0);
        assert_eq!(state.volume, 0);
        assert!(!state.play_state.is_playing());
    }
}
