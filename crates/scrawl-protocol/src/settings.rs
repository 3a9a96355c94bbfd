//! Host-configurable room settings and their validation bounds.

use serde::{Deserialize, Serialize};

use crate::{SettingsError, Word, sanitize_custom_words};

pub const MIN_PLAYERS: usize = 2;
pub const MAX_PLAYERS: usize = 10;
/// Seconds.
pub const MIN_DRAWING_TIME: u32 = 20;
/// Seconds.
pub const MAX_DRAWING_TIME: u32 = 240;
pub const MIN_ROUNDS: u32 = 1;
pub const MAX_ROUNDS: u32 = 10;
/// Custom words required to start a game with [`WordBankKind::Custom`].
pub const MIN_CUSTOM_WORDS: usize = 3;

/// Where word options come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WordBankKind {
    #[default]
    Default,
    Custom,
    Mixed,
}

/// Which difficulties of the default bank are eligible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WordDifficulty {
    Easy,
    Medium,
    Hard,
    #[default]
    All,
    Custom,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GameMode {
    #[default]
    Classic,
    NoHints,
}

/// Settings for one room. Changed by the host while the room is waiting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomSettings {
    pub player_limit: usize,
    /// Seconds the drawer has per turn.
    pub drawing_time_allowed: u32,
    pub total_rounds: u32,
    #[serde(default)]
    pub word_bank: WordBankKind,
    #[serde(default)]
    pub word_difficulty: WordDifficulty,
    #[serde(default)]
    pub game_mode: GameMode,
    #[serde(default)]
    pub custom_words: Vec<Word>,
}

impl Default for RoomSettings {
    fn default() -> Self {
        Self {
            player_limit: 8,
            drawing_time_allowed: 80,
            total_rounds: 3,
            word_bank: WordBankKind::Default,
            word_difficulty: WordDifficulty::All,
            game_mode: GameMode::Classic,
            custom_words: Vec::new(),
        }
    }
}

impl RoomSettings {
    /// Checks the numeric bounds and sanitizes the custom word list.
    ///
    /// The custom-word minimum is not checked here; it only applies
    /// when a game is started.
    pub fn validated(mut self) -> Result<Self, SettingsError> {
        if !(MIN_PLAYERS..=MAX_PLAYERS).contains(&self.player_limit) {
            return Err(SettingsError::PlayerLimit(self.player_limit));
        }
        if !(MIN_DRAWING_TIME..=MAX_DRAWING_TIME).contains(&self.drawing_time_allowed) {
            return Err(SettingsError::DrawingTime(self.drawing_time_allowed));
        }
        if !(MIN_ROUNDS..=MAX_ROUNDS).contains(&self.total_rounds) {
            return Err(SettingsError::TotalRounds(self.total_rounds));
        }
        self.custom_words = sanitize_custom_words(&self.custom_words);
        Ok(self)
    }

    /// Whether a game can start with the current word configuration.
    pub fn has_enough_custom_words(&self) -> bool {
        self.word_bank != WordBankKind::Custom || self.custom_words.len() >= MIN_CUSTOM_WORDS
    }
}
