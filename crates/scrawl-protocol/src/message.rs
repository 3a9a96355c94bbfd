//! Inbound commands, outbound events, and the payload types they carry.
//!
//! Both directions use adjacently tagged JSON:
//!
//! ```json
//! { "type": "room/newChatMessage", "payload": "is it a cat?" }
//! ```
//!
//! Commands without data (`game/start`, `canvas/undoStroke`, ...) may omit
//! `payload` entirely.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    GameRole, PlayerId, PlayerProfile, ProtocolError, RoomCode, RoomRole, RoomSettings,
    RoomStatus, RoundPhase, Word, is_hex_color, now_millis,
};

/// Widest brush accepted, in canvas pixels.
const MAX_STROKE_WIDTH: u32 = 100;
/// Most points an `canvas/addStroke` may carry up front.
const MAX_INITIAL_POINTS: usize = 1_000;

// ---------------------------------------------------------------------------
// Canvas
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrokeKind {
    Brush,
    Fill,
}

/// One stroke on the canvas: an ordered polyline plus its style.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stroke {
    #[serde(default)]
    pub points: Vec<[i32; 2]>,
    pub color: String,
    pub width: u32,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<StrokeKind>,
}

impl Stroke {
    /// Basic payload validation for strokes sent by the drawer.
    pub fn validate(&self) -> Result<(), ProtocolError> {
        if !is_hex_color(&self.color) {
            return Err(ProtocolError::InvalidMessage(format!(
                "invalid stroke color {:?}",
                self.color
            )));
        }
        if self.width == 0 || self.width > MAX_STROKE_WIDTH {
            return Err(ProtocolError::InvalidMessage(format!(
                "stroke width {} out of range",
                self.width
            )));
        }
        if self.points.len() > MAX_INITIAL_POINTS {
            return Err(ProtocolError::InvalidMessage("too many stroke points".into()));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Chat
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChatMessageKind {
    Default,
    Correct,
    CloseGuess,
    System,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: Uuid,
    /// `None` for system messages.
    pub sender_id: Option<PlayerId>,
    /// Blank for correct guesses so the answer is never broadcast.
    pub content: String,
    #[serde(rename = "type")]
    pub kind: ChatMessageKind,
    /// Unix millis.
    pub timestamp: u64,
}

impl ChatMessage {
    pub fn new(sender_id: Option<PlayerId>, content: impl Into<String>, kind: ChatMessageKind) -> Self {
        Self {
            id: Uuid::new_v4(),
            sender_id,
            content: content.into(),
            kind,
            timestamp: now_millis(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(None, content, ChatMessageKind::System)
    }
}

// ---------------------------------------------------------------------------
// Room views
// ---------------------------------------------------------------------------

/// What clients see of a player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerInfo {
    pub id: PlayerId,
    #[serde(flatten)]
    pub profile: PlayerProfile,
    pub score: u32,
    pub streak: u32,
    pub room_role: RoomRole,
    pub game_role: GameRole,
}

/// Full room snapshot sent to a player right after joining (`room/init`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomSnapshot {
    pub code: RoomCode,
    pub status: RoomStatus,
    pub players: Vec<PlayerInfo>,
    pub chat: Vec<ChatMessage>,
    pub settings: RoomSettings,
    pub current_round: u32,
    pub current_state: RoundPhase,
    pub drawer_id: Option<PlayerId>,
}

/// Partial profile update; absent fields are left unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub avatar_seed: Option<String>,
    #[serde(default)]
    pub avatar_color: Option<String>,
}

/// The word a drawer picks: either the bare string or a word object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WordChoice {
    Value(String),
    Word { value: String },
}

impl WordChoice {
    pub fn value(&self) -> &str {
        match self {
            Self::Value(v) | Self::Word { value: v } => v,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorPayload {
    pub code: String,
    pub message: String,
}

// ---------------------------------------------------------------------------
// Command (client → server)
// ---------------------------------------------------------------------------

/// A command sent by a client. The sending player is never part of the
/// payload; the connection attaches it server-side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum Command {
    #[serde(rename = "canvas/addStroke")]
    AddStroke(Stroke),
    #[serde(rename = "canvas/addStrokePoint")]
    AddStrokePoint([i32; 2]),
    #[serde(rename = "canvas/clearStrokes")]
    ClearStrokes,
    #[serde(rename = "canvas/undoStroke")]
    UndoStroke,
    #[serde(rename = "room/newChatMessage")]
    ChatMessage(String),
    #[serde(rename = "game/selectWord")]
    SelectWord(WordChoice),
    #[serde(rename = "game/start")]
    StartGame,
    #[serde(rename = "room/changeSettings")]
    ChangeSettings(RoomSettings),
    #[serde(rename = "room/updatePlayerProfile")]
    UpdatePlayerProfile(ProfileUpdate),
}

impl Command {
    /// Wire name of the command, for logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::AddStroke(_) => "canvas/addStroke",
            Self::AddStrokePoint(_) => "canvas/addStrokePoint",
            Self::ClearStrokes => "canvas/clearStrokes",
            Self::UndoStroke => "canvas/undoStroke",
            Self::ChatMessage(_) => "room/newChatMessage",
            Self::SelectWord(_) => "game/selectWord",
            Self::StartGame => "game/start",
            Self::ChangeSettings(_) => "room/changeSettings",
            Self::UpdatePlayerProfile(_) => "room/updatePlayerProfile",
        }
    }

    /// Commands that may exceed the baseline frame size.
    pub fn allows_large_frame(&self) -> bool {
        matches!(self, Self::AddStroke(_))
    }
}

// ---------------------------------------------------------------------------
// Event (server → client)
// ---------------------------------------------------------------------------

/// An event pushed to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum Event {
    #[serde(rename = "canvas/addStroke")]
    AddStroke(Stroke),
    #[serde(rename = "canvas/addStrokePoint")]
    AddStrokePoint([i32; 2]),
    #[serde(rename = "canvas/clearStrokes")]
    ClearStrokes,
    #[serde(rename = "canvas/undoStroke")]
    UndoStroke,
    #[serde(rename = "canvas/setStrokes")]
    SetStrokes(Vec<Stroke>),

    #[serde(rename = "game/setPointsAwarded")]
    SetPointsAwarded(HashMap<PlayerId, u32>),
    #[serde(rename = "game/setWordOptions")]
    SetWordOptions(Vec<Word>),
    /// The hinted word for guessers, the real word for the drawer and
    /// for players who already guessed it.
    #[serde(rename = "game/setSelectedWord")]
    SetSelectedWord(String),

    #[serde(rename = "room/init")]
    Init(RoomSnapshot),
    #[serde(rename = "room/setPlayerId")]
    SetPlayerId(PlayerId),
    #[serde(rename = "room/setPlayers")]
    SetPlayers(Vec<PlayerInfo>),
    #[serde(rename = "room/playerJoined")]
    PlayerJoined(PlayerInfo),
    #[serde(rename = "room/playerLeft")]
    PlayerLeft(PlayerId),
    #[serde(rename = "room/changeRoomSettings")]
    ChangeRoomSettings(RoomSettings),
    #[serde(rename = "room/setChat")]
    SetChat(Vec<ChatMessage>),
    #[serde(rename = "room/newChatMessage")]
    NewChatMessage(ChatMessage),
    #[serde(rename = "room/setCurrentRound")]
    SetCurrentRound(u32),
    #[serde(rename = "room/setCurrentState")]
    SetCurrentState(RoundPhase),
    /// Unix millis at which the current phase ends.
    #[serde(rename = "room/setTimer")]
    SetTimer(u64),

    #[serde(rename = "error")]
    Error(ErrorPayload),
}
