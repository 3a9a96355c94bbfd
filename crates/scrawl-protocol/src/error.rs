//! Error types for the protocol layer.

use serde::{Deserialize, Serialize};

/// Errors that can occur while encoding or decoding frames.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning a Rust value into a frame).
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed: malformed JSON, unknown `type`, or a
    /// payload that doesn't match the command's shape.
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// The frame exceeds the size allowed for its command type.
    #[error("frame of {size} bytes exceeds limit of {limit} bytes")]
    FrameTooLarge { size: usize, limit: usize },

    /// The message passed deserialization but violates protocol rules.
    #[error("invalid message: {0}")]
    InvalidMessage(String),
}

/// Reasons a [`RoomSettings`](crate::RoomSettings) update is refused.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SettingsError {
    #[error("player limit {0} is out of range")]
    PlayerLimit(usize),

    #[error("drawing time {0}s is out of range")]
    DrawingTime(u32),

    #[error("total rounds {0} is out of range")]
    TotalRounds(u32),
}

/// Why a connection attempt was turned away.
///
/// Serialized in SCREAMING_SNAKE_CASE; the same string is used as the
/// reason of the close frame sent to the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JoinRejection {
    #[error("ROOM_NOT_FOUND")]
    RoomNotFound,
    #[error("ROOM_FULL")]
    RoomFull,
    #[error("ROOM_CLOSED")]
    RoomClosed,
    #[error("CONNECTION_TIMEOUT")]
    ConnectionTimeout,
}

impl JoinRejection {
    /// The wire code, e.g. `"ROOM_FULL"`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RoomNotFound => "ROOM_NOT_FOUND",
            Self::RoomFull => "ROOM_FULL",
            Self::RoomClosed => "ROOM_CLOSED",
            Self::ConnectionTimeout => "CONNECTION_TIMEOUT",
        }
    }

    /// Application close code (4000–4999 range) for the close frame.
    pub fn close_code(&self) -> u16 {
        match self {
            Self::RoomNotFound => 4004,
            Self::RoomFull => 4001,
            Self::RoomClosed => 4003,
            Self::ConnectionTimeout => 4008,
        }
    }
}
