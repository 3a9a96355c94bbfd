//! Identity types, roles, and lifecycle enums shared by every layer.

use std::fmt;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

/// Opaque identifier for a connected player.
///
/// Assigned server-side when a connection is accepted and stable for the
/// life of that connection. Serializes as the bare UUID string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub Uuid);

impl PlayerId {
    /// Generates a fresh random id.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for PlayerId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A six-letter, case-sensitive room code such as `"aBcDeF"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomCode(String);

impl RoomCode {
    pub const LEN: usize = 6;
    const ALPHABET: &'static [u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";

    /// Draws a random code from `rng`. Callers pass a CSPRNG
    /// (`rand::rng()` is one) and retry on collision.
    pub fn generate<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let code = (0..Self::LEN)
            .map(|_| Self::ALPHABET[rng.random_range(0..Self::ALPHABET.len())] as char)
            .collect();
        Self(code)
    }

    /// Parses a code supplied by a client. Returns `None` unless it is
    /// exactly six ASCII letters.
    pub fn parse(raw: &str) -> Option<Self> {
        if raw.len() == Self::LEN && raw.bytes().all(|b| b.is_ascii_alphabetic()) {
            Some(Self(raw.to_string()))
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Display metadata chosen by the player. Opaque to the server apart
/// from sanitization.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerProfile {
    pub username: String,
    #[serde(default)]
    pub avatar_seed: String,
    #[serde(default)]
    pub avatar_color: String,
}

// ---------------------------------------------------------------------------
// Roles and lifecycle
// ---------------------------------------------------------------------------

/// A player's role in the room (who may change settings and start games).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoomRole {
    Host,
    Player,
}

/// A player's role in the current turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameRole {
    Drawing,
    #[default]
    Guessing,
}

/// Coarse room lifecycle, used for admission decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoomStatus {
    #[default]
    Waiting,
    Playing,
    Finished,
}

impl fmt::Display for RoomStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Waiting => write!(f, "waiting"),
            Self::Playing => write!(f, "playing"),
            Self::Finished => write!(f, "finished"),
        }
    }
}

/// The round-state the room is in, as reported to clients.
///
/// ```text
/// Waiting → Picking → Drawing → PostDrawing → Picking … → GameOver → Waiting
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RoundPhase {
    Waiting,
    Picking,
    Drawing,
    PostDrawing,
    GameOver,
}

impl fmt::Display for RoundPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Waiting => write!(f, "Waiting"),
            Self::Picking => write!(f, "Picking"),
            Self::Drawing => write!(f, "Drawing"),
            Self::PostDrawing => write!(f, "PostDrawing"),
            Self::GameOver => write!(f, "GameOver"),
        }
    }
}

// ---------------------------------------------------------------------------
// Wall-clock timestamps
// ---------------------------------------------------------------------------

/// Milliseconds since the Unix epoch. Display-only; game timing uses the
/// scheduler's monotonic clock.
pub fn now_millis() -> u64 {
    to_millis(SystemTime::now())
}

/// Wall-clock millis `delay` from now, for `room/setTimer`.
pub fn millis_from_now(delay: Duration) -> u64 {
    to_millis(SystemTime::now() + delay)
}

fn to_millis(t: SystemTime) -> u64 {
    t.duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
