//! Wire codec for the noisemusicsystem payloads.
//!
//! Status and command payloads are JSON; the availability payload is raw
//! text. All functions here are pure: decoding merges into a caller-supplied
//! previous state and never touches shared data.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::command::Command;
use crate::error::DecodeError;
use crate::state::{Availability, DeviceState, PlayState};

/// JSON schema of the status topic.
///
/// Every field is optional: the device may publish partial updates, and a
/// missing field keeps its previous value.
#[derive(Debug, Default, Deserialize)]
struct StatusPayload {
    artist: Option<String>,
    album: Option<String>,
    trackname: Option<String>,
    tracknumber: Option<u32>,
    duration: Option<u64>,
    position: Option<u64>,
    positionat: Option<String>,
    volume: Option<i64>,
    muted: Option<bool>,
    playstate: Option<String>,
}

/// Outbound command payload: `{"command": "...", "parameter": "..."}`.
#[derive(Debug, Serialize)]
struct CommandPayload<'a> {
    command: &'a str,
    parameter: &'a str,
}

/// Decode a status payload as an overlay on the previous state.
///
/// Field semantics:
/// - missing fields keep the value from `prev`;
/// - `tracknumber`/`duration`/`position` must be non-negative integers, a
///   type violation fails the whole decode;
/// - `volume` is clamped into [0, 100] rather than rejected;
/// - `positionat` (RFC-1123) never merges from `prev`: absent or unparsable
///   values fall back to `now`, the decode-time wall clock.
pub fn decode_status(
    prev: &DeviceState,
    payload: &[u8],
    now: DateTime<Utc>,
) -> Result<DeviceState, DecodeError> {
    let raw: StatusPayload = serde_json::from_slice(payload)?;

    let mut next = prev.clone();
    if let Some(artist) = raw.artist {
        next.artist = artist;
    }
    if let Some(album) = raw.album {
        next.album = album;
    }
    if let Some(track_name) = raw.trackname {
        next.track_name = track_name;
    }
    if let Some(track_number) = raw.tracknumber {
        next.track_number = track_number;
    }
    if let Some(duration) = raw.duration {
        next.duration_secs = duration;
    }
    if let Some(position) = raw.position {
        next.position_secs = position;
    }
    if let Some(volume) = raw.volume {
        next.volume = volume.clamp(0, 100) as u8;
    }
    if let Some(muted) = raw.muted {
        next.muted = muted;
    }
    if let Some(playstate) = raw.playstate {
        next.play_state = PlayState::from_wire(&playstate);
    }
    next.position_recorded_at = raw
        .positionat
        .as_deref()
        .and_then(parse_position_at)
        .unwrap_or(now);

    Ok(next)
}

/// Decode an availability payload.
///
/// Raw text, not JSON: exactly `"online"` means online, anything else
/// (including non-UTF-8 bytes) means offline.
pub fn decode_availability(payload: &[u8]) -> Availability {
    match std::str::from_utf8(payload) {
        Ok("online") => Availability::Online,
        _ => Availability::Offline,
    }
}

/// Encode a validated command for the command topic.
///
/// Kinds without a parameter send an empty string, which is what the device
/// firmware expects.
pub fn encode_command(cmd: &Command) -> Vec<u8> {
    serde_json::to_vec(&CommandPayload {
        command: cmd.kind.wire_name(),
        parameter: cmd.parameter.as_deref().unwrap_or(""),
    })
    .unwrap_or_default()
}

fn parse_position_at(raw: &str) -> Option<DateTime<Utc>> {
    // RFC 1123 timestamps are a fixed-offset subset of RFC 2822.
    DateTime::parse_from_rfc2822(raw)
        .ok()
        .map(|t| t.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::{translate, CommandKind};
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 14, 12, 0, 0).unwrap()
    }

    #[test]
    fn decode_full_status() {
        let payload = br#"{
            "artist": "Boards of Canada",
            "album": "Geogaddi",
            "trackname": "1969",
            "tracknumber": 10,
            "duration": 251,
            "position": 60,
            "positionat": "Tue, 14 May 2024 11:59:00 GMT",
            "volume": 40,
            "muted": false,
            "playstate": "playing"
        }"#;

        let state = decode_status(&DeviceState::default(), payload, now()).unwrap();
        assert_eq!(state.artist, "Boards of Canada");
        assert_eq!(state.album, "Geogaddi");
        assert_eq!(state.track_name, "1969");
        assert_eq!(state.track_number, 10);
        assert_eq!(state.duration_secs, 251);
        assert_eq!(state.position_secs, 60);
        assert_eq!(
            state.position_recorded_at,
            Utc.with_ymd_and_hms(2024, 5, 14, 11, 59, 0).unwrap()
        );
        assert_eq!(state.volume, 40);
        assert!(!state.muted);
        assert_eq!(state.play_state, PlayState::Playing);
    }

    #[test]
    fn decode_partial_status_merges_previous() {
        let prev = DeviceState {
            artist: "Nina Simone".to_string(),
            album: "Pastel Blues".to_string(),
            track_name: "Sinnerman".to_string(),
            track_number: 10,
            duration_secs: 621,
            position_secs: 30,
            volume: 55,
            muted: true,
            play_state: PlayState::Playing,
            ..DeviceState::default()
        };

        let state = decode_status(&prev, br#"{"position": 45}"#, now()).unwrap();
        assert_eq!(state.artist, "Nina Simone");
        assert_eq!(state.album, "Pastel Blues");
        assert_eq!(state.track_number, 10);
        assert_eq!(state.duration_secs, 621);
        assert_eq!(state.position_secs, 45);
        assert_eq!(state.volume, 55);
        assert!(state.muted);
        assert_eq!(state.play_state, PlayState::Playing);
    }

    #[test]
    fn position_timestamp_defaults_to_decode_time() {
        let state = decode_status(&DeviceState::default(), br#"{"position": 5}"#, now()).unwrap();
        assert_eq!(state.position_recorded_at, now());

        // Unparsable positionat falls back to decode time without failing.
        let state = decode_status(
            &DeviceState::default(),
            br#"{"position": 5, "positionat": "half past nine"}"#,
            now(),
        )
        .unwrap();
        assert_eq!(state.position_recorded_at, now());
    }

    #[test]
    fn volume_is_clamped_not_rejected() {
        let state =
            decode_status(&DeviceState::default(), br#"{"volume": 150}"#, now()).unwrap();
        assert_eq!(state.volume, 100);
        let state = decode_status(&DeviceState::default(), br#"{"volume": -3}"#, now()).unwrap();
        assert_eq!(state.volume, 0);
    }

    #[test]
    fn negative_counters_fail_the_decode() {
        assert!(decode_status(&DeviceState::default(), br#"{"position": -1}"#, now()).is_err());
        assert!(decode_status(&DeviceState::default(), br#"{"duration": -10}"#, now()).is_err());
        assert!(
            decode_status(&DeviceState::default(), br#"{"tracknumber": -2}"#, now()).is_err()
        );
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(decode_status(&DeviceState::default(), b"{not json", now()).is_err());
        assert!(decode_status(&DeviceState::default(), b"", now()).is_err());
        assert!(
            decode_status(&DeviceState::default(), br#"{"position": "sixty"}"#, now()).is_err()
        );
    }

    #[test]
    fn unknown_playstate_normalizes_to_not_playing() {
        let state = decode_status(
            &DeviceState::default(),
            br#"{"playstate": "buffering"}"#,
            now(),
        )
        .unwrap();
        assert_eq!(state.play_state, PlayState::NotPlaying);
    }

    #[test]
    fn availability_requires_exact_online() {
        assert_eq!(decode_availability(b"online"), Availability::Online);
        assert_eq!(decode_availability(b"offline"), Availability::Offline);
        assert_eq!(decode_availability(b"Online"), Availability::Offline);
        assert_eq!(decode_availability(b"online "), Availability::Offline);
        assert_eq!(decode_availability(b""), Availability::Offline);
        assert_eq!(decode_availability(&[0xff, 0xfe]), Availability::Offline);
    }

    #[test]
    fn encode_command_wire_format() {
        let cmd = translate(CommandKind::Volume, Some("75")).unwrap();
        let value: serde_json::Value =
            serde_json::from_slice(&encode_command(&cmd)).unwrap();
        assert_eq!(
            value,
            serde_json::json!({"command": "volume", "parameter": "75"})
        );

        let cmd = translate(CommandKind::Play, None).unwrap();
        let value: serde_json::Value =
            serde_json::from_slice(&encode_command(&cmd)).unwrap();
        assert_eq!(
            value,
            serde_json::json!({"command": "play", "parameter": ""})
        );
    }
}
