//! Pure scoring rules: guess points, streak bonuses, rankings, lead
//! changes, and close-guess detection.

use std::cmp::Reverse;
use std::collections::HashMap;

use scrawl_protocol::{Difficulty, PlayerId};

use crate::Player;

pub const BASE_POINTS: u32 = 300;
pub const POINTS_PER_PLAYER: u32 = 25;
pub const HARD_SHARE: f64 = 0.6;
pub const MEDIUM_SHARE: f64 = 0.35;
pub const EASY_SHARE: f64 = 0.15;
pub const BASE_STREAK_BONUS: f64 = 10.0;
pub const MAX_STREAK: u32 = 10;

/// Fraction of a guesser's points credited to the drawer. Custom words
/// score like medium ones.
pub fn drawer_share(difficulty: Difficulty) -> f64 {
    match difficulty {
        Difficulty::Easy => EASY_SHARE,
        Difficulty::Medium | Difficulty::Custom => MEDIUM_SHARE,
        Difficulty::Hard => HARD_SHARE,
    }
}

/// Points for a correct guess as `(guesser, drawer)`.
///
/// `max_guessers` is the number of players who can guess this turn and
/// `correct_so_far` how many of them already guessed. Earlier guessers
/// earn more.
pub fn guess_points(max_guessers: usize, correct_so_far: usize, difficulty: Difficulty) -> (u32, u32) {
    if max_guessers == 0 || correct_so_far >= max_guessers {
        return (0, 0);
    }
    let max_points = BASE_POINTS + POINTS_PER_PLAYER * max_guessers as u32;
    let position_mult = (max_guessers - correct_so_far) as f64 / max_guessers as f64;
    let guesser = (max_points as f64 * position_mult).floor() as u32;
    let drawer = (guesser as f64 * drawer_share(difficulty)).floor() as u32;
    (guesser, drawer)
}

/// End-of-turn bonus for a player on a streak.
///
/// `position` is 1-based in the current ranking. The multiplier runs from
/// 0.25 for the leader up towards 1.0 for last place, so trailing players
/// catch up faster.
pub fn streak_bonus(position: usize, total_players: usize, streak: u32) -> u32 {
    if total_players == 0 || position == 0 {
        return 0;
    }
    let streak = streak.min(MAX_STREAK);
    let raw = 1.0 - (-2.0 * (position - 1) as f64 / total_players as f64).exp();
    let multiplier = 0.25 + 0.75 * raw;
    (BASE_STREAK_BONUS * total_players as f64 * streak as f64 * multiplier).floor() as u32
}

/// Player ids ordered by score descending, ties broken by username.
pub fn rankings<'a>(players: impl IntoIterator<Item = &'a Player>) -> Vec<PlayerId> {
    let mut ranked: Vec<&Player> = players.into_iter().collect();
    ranked.sort_by(|a, b| {
        (Reverse(a.score), &a.profile.username).cmp(&(Reverse(b.score), &b.profile.username))
    });
    ranked.into_iter().map(|p| p.id).collect()
}

/// Announces a change of leader caused by this turn's points.
///
/// Pre-turn scores are the current scores minus `points_awarded`. Ties go
/// to the player seen first in `players`. Returns `None` when the leader
/// is unchanged.
pub fn check_lead_change<'a>(
    points_awarded: &HashMap<PlayerId, u32>,
    players: impl IntoIterator<Item = &'a Player>,
) -> Option<String> {
    let mut before: Option<(&Player, u32)> = None;
    let mut after: Option<&Player> = None;

    for player in players {
        let awarded = points_awarded.get(&player.id).copied().unwrap_or(0);
        let previous = player.score.saturating_sub(awarded);
        if before.is_none_or(|(_, best)| previous > best) {
            before = Some((player, previous));
        }
        if after.is_none_or(|best| player.score > best.score) {
            after = Some(player);
        }
    }

    let ((old, _), new) = (before?, after?);
    if old.id == new.id {
        return None;
    }
    Some(format!(
        "{} took the lead from {}",
        new.profile.username, old.profile.username
    ))
}

/// Edit distance counted in characters.
pub fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let substitution = prev[j] + usize::from(ca != cb);
            curr[j + 1] = substitution.min(prev[j + 1] + 1).min(curr[j] + 1);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b.len()]
}

/// A wrong guess within `len(word) / 3` edits of the word.
pub fn is_close_guess(guess: &str, word: &str) -> bool {
    guess != word && levenshtein(guess, word) <= word.chars().count() / 3
}
