//! Error types for the bridge.

use crate::command::CommandKind;

/// Errors decoding inbound wire payloads.
///
/// A decode failure never corrupts prior good state: the controller logs the
/// error and drops the message.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// Status payload is not valid JSON, or a field has the wrong type.
    #[error("Malformed status payload: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors validating a host-issued command parameter.
///
/// Invalid commands are reported to the caller and never reach the wire.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// Command name is not part of the wire protocol.
    #[error("Unknown command: {0}")]
    UnknownCommand(String),

    /// Command requires a parameter but none was given.
    #[error("Command '{kind}' requires a parameter")]
    MissingParameter {
        /// The command kind.
        kind: CommandKind,
    },

    /// Parameter failed range or type validation.
    #[error("Invalid parameter for '{kind}': {reason}")]
    InvalidParameter {
        /// The command kind.
        kind: CommandKind,
        /// What was wrong with the parameter.
        reason: String,
    },
}

/// Errors surfaced by the bridge controller.
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    /// Command validation failed; nothing was published.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Subscribe or publish failed at the transport layer.
    #[error("Transport error: {0}")]
    Transport(String),

    /// No publish capability has been attached to the bridge.
    #[error("No transport connected")]
    NotConnected,
}

/// Result type for bridge operations.
pub type Result<T> = std::result::Result<T, BridgeError>;
