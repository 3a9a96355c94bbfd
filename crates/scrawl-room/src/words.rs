//! The word bank and word-option selection.

use std::collections::HashSet;
use std::io::BufRead;

use rand::Rng;
use rand::seq::IndexedRandom;
use scrawl_protocol::{Difficulty, RoomSettings, Word, WordBankKind, WordDifficulty, sanitize_word};
use tracing::{debug, warn};

const BUILTIN_WORDS: &[(&str, Difficulty)] = &[
    ("cat", Difficulty::Easy),
    ("dog", Difficulty::Easy),
    ("sun", Difficulty::Easy),
    ("tree", Difficulty::Easy),
    ("house", Difficulty::Easy),
    ("apple", Difficulty::Easy),
    ("fish", Difficulty::Easy),
    ("car", Difficulty::Easy),
    ("book", Difficulty::Easy),
    ("star", Difficulty::Easy),
    ("guitar", Difficulty::Medium),
    ("rainbow", Difficulty::Medium),
    ("castle", Difficulty::Medium),
    ("penguin", Difficulty::Medium),
    ("bicycle", Difficulty::Medium),
    ("volcano", Difficulty::Medium),
    ("lighthouse", Difficulty::Medium),
    ("snowman", Difficulty::Medium),
    ("ice cream", Difficulty::Medium),
    ("toothbrush", Difficulty::Medium),
    ("time machine", Difficulty::Hard),
    ("jack-o'-lantern", Difficulty::Hard),
    ("photosynthesis", Difficulty::Hard),
    ("constellation", Difficulty::Hard),
    ("hibernation", Difficulty::Hard),
    ("archaeologist", Difficulty::Hard),
    ("quicksand", Difficulty::Hard),
    ("skateboard ramp", Difficulty::Hard),
    ("traffic jam", Difficulty::Hard),
    ("black hole", Difficulty::Hard),
];

/// Words shared by every room. Loaded once at startup.
#[derive(Debug, Clone)]
pub struct WordBank {
    words: Vec<Word>,
}

impl WordBank {
    pub fn new(words: Vec<Word>) -> Self {
        Self { words }
    }

    /// A small list compiled into the binary.
    pub fn builtin() -> Self {
        Self::new(
            BUILTIN_WORDS
                .iter()
                .map(|(value, difficulty)| Word::new(*value, *difficulty))
                .collect(),
        )
    }

    /// Parses `category,word,difficulty` rows after a header line.
    ///
    /// Rows with a missing column, an unusable word, or an unknown
    /// difficulty are skipped with a warning. Duplicate words keep their
    /// first row.
    pub fn from_csv<R: BufRead>(reader: R) -> std::io::Result<Self> {
        let mut words = Vec::new();
        let mut seen = HashSet::new();

        for (index, line) in reader.lines().enumerate().skip(1) {
            let line = line?;
            let line_no = index + 1;
            if line.trim().is_empty() {
                continue;
            }

            let mut columns = line.split(',');
            let (Some(_category), Some(raw_word), Some(raw_difficulty)) =
                (columns.next(), columns.next(), columns.next())
            else {
                warn!(line = line_no, "word bank row has fewer than three columns");
                continue;
            };

            let Some(value) = sanitize_word(raw_word) else {
                warn!(line = line_no, word = raw_word, "unusable word in word bank");
                continue;
            };
            let difficulty = match Difficulty::parse(raw_difficulty) {
                Some(d @ (Difficulty::Easy | Difficulty::Medium | Difficulty::Hard)) => d,
                _ => {
                    warn!(line = line_no, difficulty = raw_difficulty, "unknown difficulty in word bank");
                    continue;
                }
            };

            if seen.insert(value.clone()) {
                words.push(Word::new(value, difficulty));
            }
        }

        debug!(count = words.len(), "word bank loaded");
        Ok(Self::new(words))
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    fn eligible(&self, difficulty: WordDifficulty) -> impl Iterator<Item = &Word> {
        self.words.iter().filter(move |w| match difficulty {
            WordDifficulty::Easy => w.difficulty == Difficulty::Easy,
            WordDifficulty::Medium => w.difficulty == Difficulty::Medium,
            WordDifficulty::Hard => w.difficulty == Difficulty::Hard,
            WordDifficulty::All | WordDifficulty::Custom => true,
        })
    }

    /// Up to `count` distinct words for a drawer to choose from.
    ///
    /// `Default` draws from this bank filtered by difficulty, `Custom` from
    /// the room's custom words only, `Mixed` from both. An empty pool falls
    /// back to the whole bank.
    pub fn pick_options<R: Rng + ?Sized>(
        &self,
        settings: &RoomSettings,
        count: usize,
        rng: &mut R,
    ) -> Vec<Word> {
        let bank = || self.eligible(settings.word_difficulty);
        let pool: Vec<&Word> = match settings.word_bank {
            WordBankKind::Default => bank().collect(),
            WordBankKind::Custom => settings.custom_words.iter().collect(),
            WordBankKind::Mixed => bank().chain(settings.custom_words.iter()).collect(),
        };

        let mut seen = HashSet::new();
        let mut pool: Vec<&Word> = pool.into_iter().filter(|w| seen.insert(&w.value)).collect();
        if pool.is_empty() {
            pool = self.words.iter().collect();
        }

        pool.choose_multiple(rng, count).map(|w| (*w).clone()).collect()
    }
}

impl Default for WordBank {
    fn default() -> Self {
        Self::builtin()
    }
}
