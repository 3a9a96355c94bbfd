//! Wire protocol for scrawl.
//!
//! This crate defines the "language" spoken between the game server and
//! browser clients:
//!
//! - **Identity** ([`PlayerId`], [`RoomCode`]) and the role/status enums.
//! - **Values** ([`Word`], [`Stroke`], [`ChatMessage`], [`RoomSettings`]).
//! - **Messages** ([`Command`] inbound, [`Event`] outbound). Each frame on
//!   the wire is one JSON object `{ "type": ..., "payload": ... }`.
//! - **Codec** ([`Codec`], [`JsonCodec`]) and [`ProtocolError`].
//!
//! ```text
//! Transport (frames) → Protocol (Command / Event) → Room (game rules)
//! ```

mod codec;
mod error;
mod message;
mod sanitize;
mod settings;
mod types;
mod word;

pub use codec::{Codec, JsonCodec};
pub use error::{JoinRejection, ProtocolError, SettingsError};
pub use message::{
    ChatMessage, ChatMessageKind, Command, ErrorPayload, Event, PlayerInfo,
    ProfileUpdate, RoomSnapshot, Stroke, StrokeKind, WordChoice,
};
pub use sanitize::{
    MAX_AVATAR_SEED_LENGTH, MAX_CHAT_LENGTH, MAX_USERNAME_LENGTH, is_hex_color,
    sanitize_avatar_seed, sanitize_chat, sanitize_guess, sanitize_username,
};
pub use settings::{
    GameMode, MAX_DRAWING_TIME, MAX_PLAYERS, MAX_ROUNDS, MIN_CUSTOM_WORDS,
    MIN_DRAWING_TIME, MIN_PLAYERS, MIN_ROUNDS, RoomSettings, WordBankKind,
    WordDifficulty,
};
pub use types::{
    GameRole, PlayerId, PlayerProfile, RoomCode, RoomRole, RoomStatus,
    RoundPhase, millis_from_now, now_millis,
};
pub use word::{
    Difficulty, MAX_WORD_LENGTH, Word, is_hideable, sanitize_custom_words, sanitize_word,
};
