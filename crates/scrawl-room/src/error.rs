//! Error types for the room layer.

use scrawl_protocol::{JoinRejection, RoomCode, RoundPhase};
use scrawl_tick::SchedulerError;

/// Why a command was refused by the current round state.
#[derive(Debug, thiserror::Error)]
pub enum GameError {
    /// The command has no meaning in the current phase. Logged and dropped.
    #[error("{command} is not valid during {phase}")]
    CommandInvalid {
        command: &'static str,
        phase: RoundPhase,
    },

    /// Wrong room role or wrong game role.
    #[error("{0}")]
    Unauthorized(&'static str),

    /// Malformed payload, bad settings, unknown word, or a start
    /// precondition that is not met.
    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Scheduler(#[from] SchedulerError),
}

impl GameError {
    pub(crate) fn wrong_room_role() -> Self {
        Self::Unauthorized("wrong room role")
    }

    pub(crate) fn wrong_game_role() -> Self {
        Self::Unauthorized("wrong game role")
    }

    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Whether the sender should receive an `error` event.
    pub fn is_user_facing(&self) -> bool {
        matches!(self, Self::Unauthorized(_) | Self::Validation(_))
    }

    /// Code carried by the `error` event.
    pub fn code(&self) -> &'static str {
        match self {
            Self::CommandInvalid { .. } => "COMMAND_INVALID",
            Self::Unauthorized(_) => "UNAUTHORIZED",
            Self::Validation(_) => "VALIDATION",
            Self::Scheduler(_) => "INTERNAL",
        }
    }
}

/// Errors from talking to rooms.
#[derive(Debug, thiserror::Error)]
pub enum RoomError {
    #[error("room {0} not found")]
    NotFound(RoomCode),

    /// The room refused the connection.
    #[error("connection rejected: {0}")]
    Rejected(#[from] JoinRejection),

    /// The room's channel is closed; the actor has stopped.
    #[error("room {0} is unavailable")]
    Unavailable(RoomCode),
}

impl RoomError {
    /// The close-frame reason to send the client.
    pub fn rejection(&self) -> JoinRejection {
        match self {
            Self::NotFound(_) => JoinRejection::RoomNotFound,
            Self::Rejected(reason) => *reason,
            Self::Unavailable(_) => JoinRejection::RoomClosed,
        }
    }
}
