//! Abstract playback commands and parameter validation.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Playback command kinds understood by the device firmware.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommandKind {
    Next,
    Previous,
    Play,
    Pause,
    Stop,
    Mute,
    Repeat,
    Seek,
    Volume,
}

impl CommandKind {
    /// All command kinds in wire order.
    pub const ALL: [CommandKind; 9] = [
        CommandKind::Next,
        CommandKind::Previous,
        CommandKind::Play,
        CommandKind::Pause,
        CommandKind::Stop,
        CommandKind::Mute,
        CommandKind::Repeat,
        CommandKind::Seek,
        CommandKind::Volume,
    ];

    /// Fixed lowercase wire name; must match the device firmware exactly.
    pub fn wire_name(&self) -> &'static str {
        match self {
            CommandKind::Next => "next",
            CommandKind::Previous => "previous",
            CommandKind::Play => "play",
            CommandKind::Pause => "pause",
            CommandKind::Stop => "stop",
            CommandKind::Mute => "mute",
            CommandKind::Repeat => "repeat",
            CommandKind::Seek => "seek",
            CommandKind::Volume => "volume",
        }
    }

    /// Whether this kind carries a parameter on the wire.
    pub fn takes_parameter(&self) -> bool {
        matches!(
            self,
            CommandKind::Mute | CommandKind::Seek | CommandKind::Volume
        )
    }
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}

impl FromStr for CommandKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "next" => Ok(CommandKind::Next),
            "previous" => Ok(CommandKind::Previous),
            "play" => Ok(CommandKind::Play),
            "pause" => Ok(CommandKind::Pause),
            "stop" => Ok(CommandKind::Stop),
            "mute" => Ok(CommandKind::Mute),
            "repeat" => Ok(CommandKind::Repeat),
            "seek" => Ok(CommandKind::Seek),
            "volume" => Ok(CommandKind::Volume),
            other => Err(ValidationError::UnknownCommand(other.to_string())),
        }
    }
}

/// A validated command ready for wire encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    /// The command kind.
    pub kind: CommandKind,
    /// Validated parameter, `None` for kinds that carry none.
    pub parameter: Option<String>,
}

/// Validate a raw host parameter against the command kind.
///
/// | kind | parameter requirement |
/// |---|---|
/// | seek | integer ≥ 0 (seconds) |
/// | volume | integer in [0, 100] |
/// | mute | literal `"true"` or `"false"` |
/// | next, previous, play, pause, stop, repeat | ignored |
pub fn translate(
    kind: CommandKind,
    parameter: Option<&str>,
) -> Result<Command, ValidationError> {
    match kind {
        CommandKind::Seek => {
            let raw = required(kind, parameter)?;
            let secs: u64 = raw.parse().map_err(|_| ValidationError::InvalidParameter {
                kind,
                reason: format!("expected non-negative seconds, got {raw:?}"),
            })?;
            Ok(Command {
                kind,
                parameter: Some(secs.to_string()),
            })
        }
        CommandKind::Volume => {
            let raw = required(kind, parameter)?;
            let level: i64 = raw.parse().map_err(|_| ValidationError::InvalidParameter {
                kind,
                reason: format!("expected an integer, got {raw:?}"),
            })?;
            if !(0..=100).contains(&level) {
                return Err(ValidationError::InvalidParameter {
                    kind,
                    reason: format!("volume {level} is outside [0, 100]"),
                });
            }
            Ok(Command {
                kind,
                parameter: Some(level.to_string()),
            })
        }
        CommandKind::Mute => {
            let raw = required(kind, parameter)?;
            match raw {
                "true" | "false" => Ok(Command {
                    kind,
                    parameter: Some(raw.to_string()),
                }),
                other => Err(ValidationError::InvalidParameter {
                    kind,
                    reason: format!("expected \"true\" or \"false\", got {other:?}"),
                }),
            }
        }
        // Simple transport kinds ignore whatever parameter was given.
        CommandKind::Next
        | CommandKind::Previous
        | CommandKind::Play
        | CommandKind::Pause
        | CommandKind::Stop
        | CommandKind::Repeat => Ok(Command {
            kind,
            parameter: None,
        }),
    }
}

fn required<'a>(
    kind: CommandKind,
    parameter: Option<&'a str>,
) -> Result<&'a str, ValidationError> {
    let raw = parameter.map(str::trim).unwrap_or_default();
    if raw.is_empty() {
        return Err(ValidationError::MissingParameter { kind });
    }
    Ok(raw)
}
