//! Words that can be drawn, and sanitization of user-supplied words.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Longest word (in characters) accepted from a custom list.
pub const MAX_WORD_LENGTH: usize = 32;

/// How hard a word is. Drives the drawer's share of guess points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
    Custom,
}

impl Difficulty {
    /// Parses a word-bank difficulty column (`easy`, `medium`, `hard`).
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "easy" => Some(Self::Easy),
            "medium" => Some(Self::Medium),
            "hard" => Some(Self::Hard),
            "custom" => Some(Self::Custom),
            _ => None,
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Easy => write!(f, "easy"),
            Self::Medium => write!(f, "medium"),
            Self::Hard => write!(f, "hard"),
            Self::Custom => write!(f, "custom"),
        }
    }
}

fn custom_difficulty() -> Difficulty {
    Difficulty::Custom
}

/// A drawable word.
///
/// `value` is non-empty and contains only lowercase letters, digits,
/// apostrophes, hyphens, and single interior spaces.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Word {
    pub value: String,
    #[serde(default = "custom_difficulty")]
    pub difficulty: Difficulty,
}

impl Word {
    pub fn new(value: impl Into<String>, difficulty: Difficulty) -> Self {
        Self {
            value: value.into(),
            difficulty,
        }
    }

    /// Number of characters a hint can reveal.
    pub fn letter_count(&self) -> usize {
        self.value.chars().filter(|c| is_hideable(*c)).count()
    }
}

/// Characters that are masked in a hinted word. Everything else
/// (spaces, apostrophes, hyphens) is shown from the start.
pub fn is_hideable(c: char) -> bool {
    c.is_ascii_alphanumeric()
}

/// Normalizes a raw word: lowercase, keeps `a–z`, `0–9`, `'` and `-`, collapses
/// whitespace runs to a single space, trims. Returns `None` when nothing
/// usable is left or the result is longer than [`MAX_WORD_LENGTH`].
pub fn sanitize_word(raw: &str) -> Option<String> {
    let mut out = String::with_capacity(raw.len());
    let mut pending_space = false;
    for c in raw.chars().flat_map(char::to_lowercase) {
        if c.is_whitespace() {
            pending_space = !out.is_empty();
            continue;
        }
        if c.is_ascii_lowercase() || c.is_ascii_digit() || c == '\'' || c == '-' {
            if pending_space {
                out.push(' ');
                pending_space = false;
            }
            out.push(c);
        }
    }
    if !out.chars().any(is_hideable) {
        return None;
    }
    if out.chars().count() > MAX_WORD_LENGTH {
        return None;
    }
    Some(out)
}

/// Sanitizes a custom word list: every entry is cleaned with
/// [`sanitize_word`], empty results are dropped, duplicates removed
/// (first occurrence wins), and difficulty forced to `Custom`.
pub fn sanitize_custom_words(words: &[Word]) -> Vec<Word> {
    let mut seen = HashSet::new();
    words
        .iter()
        .filter_map(|w| sanitize_word(&w.value))
        .filter(|v| seen.insert(v.clone()))
        .map(|v| Word::new(v, Difficulty::Custom))
        .collect()
}
