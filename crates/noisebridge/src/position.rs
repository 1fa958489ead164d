//! Playback position extrapolation.

use chrono::{DateTime, Utc};

use crate::state::{DeviceState, PlayState};

/// Compute the playback position at `now` from the last reported state.
///
/// While playing, the recorded position advances with wall-clock time and is
/// clamped to the track duration when one is known. While not playing the
/// device is assumed frozen at the last reported position.
///
/// Pure function: callable at arbitrary cadence by a host poll.
pub fn current_position(state: &DeviceState, now: DateTime<Utc>) -> u64 {
    match state.play_state {
        PlayState::NotPlaying => state.position_secs,
        PlayState::Playing => {
            // A recorded-at instant in the future (clock skew) contributes
            // zero elapsed time rather than rewinding the position.
            let elapsed = (now - state.position_recorded_at).num_seconds().max(0) as u64;
            let position = state.position_secs.saturating_add(elapsed);
            if state.duration_secs > 0 {
                position.min(state.duration_secs)
            } else {
                position
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn playing_at(position_secs: u64, duration_secs: u64) -> (DeviceState, DateTime<Utc>) {
        let recorded = Utc.with_ymd_and_hms(2024, 5, 14, 12, 0, 0).unwrap();
        let state = DeviceState {
            position_secs,
            duration_secs,
            position_recorded_at: recorded,
            play_state: PlayState::Playing,
            ..DeviceState::default()
        };
        (state, recorded)
    }

    #[test]
    fn advances_while_playing() {
        let (state, recorded) = playing_at(60, 300);
        assert_eq!(current_position(&state, recorded), 60);
        assert_eq!(current_position(&state, recorded + Duration::seconds(10)), 70);
        assert_eq!(current_position(&state, recorded + Duration::seconds(45)), 105);
    }

    #[test]
    fn non_decreasing_over_a_now_sequence() {
        let (state, recorded) = playing_at(10, 600);
        let mut last = 0;
        for step in 0..30 {
            let pos = current_position(&state, recorded + Duration::seconds(step));
            assert!(pos >= last);
            last = pos;
        }
    }

    #[test]
    fn clamps_to_duration() {
        let (state, recorded) = playing_at(290, 300);
        assert_eq!(current_position(&state, recorded + Duration::seconds(60)), 300);
    }

    #[test]
    fn unclamped_when_duration_unknown() {
        let (state, recorded) = playing_at(290, 0);
        assert_eq!(current_position(&state, recorded + Duration::seconds(60)), 350);
    }

    #[test]
    fn frozen_while_not_playing() {
        let (mut state, recorded) = playing_at(120, 300);
        state.play_state = PlayState::NotPlaying;
        assert_eq!(current_position(&state, recorded + Duration::seconds(500)), 120);
    }

    #[test]
    fn future_recorded_instant_contributes_nothing() {
        let (state, recorded) = playing_at(60, 300);
        assert_eq!(current_position(&state, recorded - Duration::seconds(30)), 60);
    }
}
