//! Error types for session and stroke operations.
//!
//! Nothing here is fatal: every variant describes a request or an event that
//! was rejected or dropped while the session keeps running.

use crate::session::RoomState;
use thiserror::Error;

/// Session errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SessionError {
    #[error("Username must not be empty")]
    EmptyUsername,
    #[error("Room id must not be empty")]
    EmptyRoomId,
    #[error("Transport is not open")]
    TransportNotOpen,
    #[error("Cannot {operation} while {state:?}")]
    InvalidTransition {
        operation: &'static str,
        state: RoomState,
    },
    #[error("Malformed message: {0}")]
    MalformedMessage(String),
    #[error("Out of order event from {peer}")]
    OutOfOrderEvent { peer: String },
    #[error("Transport closed")]
    TransportClosed,
    #[error("Relay error: {0}")]
    Relay(String),
    #[error("Invalid brush size: {0}")]
    InvalidBrushSize(f64),
}

/// Result type for session operations.
pub type SessionResult<T> = Result<T, SessionError>;
