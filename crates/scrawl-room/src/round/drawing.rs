//! The drawer draws; everyone else guesses in chat.

use std::collections::HashMap;
use std::time::Duration;

use rand::seq::IndexedRandom;
use scrawl_protocol::{
    ChatMessage, ChatMessageKind, Command, Event, GameMode, GameRole, PlayerId, RoundPhase,
    Stroke, Word, is_hideable, millis_from_now, sanitize_chat, sanitize_guess,
};
use tracing::{debug, trace};

use super::{Flow, PostDrawing, RoundState, invalid};
use crate::{GameError, Recipients, RoomContext, RoomInput, scoring};

/// Streak length worth announcing when it ends.
const NOTABLE_STREAK: u32 = 5;

#[derive(Debug, Clone)]
pub struct Drawing {
    pub word: Word,
    /// Same length as the word; hideable characters start as `*`.
    pub hinted: Vec<char>,
    pub strokes: Vec<Stroke>,
    /// Unix millis, for display.
    pub ends_at: u64,
    /// Points earned this turn. A player who guessed correctly is always
    /// present, so presence doubles as "already guessed".
    pub points_awarded: HashMap<PlayerId, u32>,
}

impl Drawing {
    pub fn new(word: Word) -> Self {
        let hinted = word
            .value
            .chars()
            .map(|c| if is_hideable(c) { '*' } else { c })
            .collect();
        Self {
            word,
            hinted,
            strokes: Vec::new(),
            ends_at: 0,
            points_awarded: HashMap::new(),
        }
    }

    pub fn hinted_word(&self) -> String {
        self.hinted.iter().collect()
    }

    /// Hints given over a full turn: ⌊0.6 × letters⌋.
    pub fn total_hints(&self) -> u32 {
        (self.word.letter_count() * 3 / 5) as u32
    }

    fn has_guessed(&self, id: PlayerId) -> bool {
        self.points_awarded.contains_key(&id)
    }

    /// Players still trying to guess: not the drawer, not yet correct.
    fn still_guessing(&self, ctx: &RoomContext) -> Vec<PlayerId> {
        ctx.players
            .values()
            .filter(|p| !ctx.is_drawer(p.id) && !self.has_guessed(p.id))
            .map(|p| p.id)
            .collect()
    }

    fn everyone_guessed(&self, ctx: &RoomContext) -> bool {
        !ctx.players.is_empty() && ctx.players.keys().all(|id| self.has_guessed(*id))
    }

    pub(super) fn enter(&mut self, ctx: &mut RoomContext) -> Flow {
        let drawing_time = Duration::from_secs(u64::from(ctx.settings.drawing_time_allowed));
        self.ends_at = millis_from_now(drawing_time);

        ctx.broadcast(Recipients::Guessers, &[Event::SetSelectedWord(self.hinted_word())]);

        if ctx.settings.game_mode != GameMode::NoHints {
            let hints = self.total_hints();
            if hints > 0 {
                ctx.schedule_hints(drawing_time / (hints + 1), hints);
            }
        }

        ctx.broadcast(
            Recipients::All,
            &[
                Event::SetCurrentState(RoundPhase::Drawing),
                Event::SetTimer(self.ends_at),
            ],
        );
        ctx.schedule_transition(drawing_time);
        debug!(code = %ctx.code, word = %self.word.value, "drawing");
        Flow::Stay
    }

    /// Reveals one random hidden letter to players still guessing.
    pub(crate) fn reveal_hint(&mut self, ctx: &mut RoomContext) {
        let hidden: Vec<usize> = self
            .hinted
            .iter()
            .enumerate()
            .filter(|(_, c)| **c == '*')
            .map(|(i, _)| i)
            .collect();
        let Some(&index) = hidden.choose(&mut ctx.rng) else {
            return;
        };
        if let Some(letter) = self.word.value.chars().nth(index) {
            self.hinted[index] = letter;
        }
        trace!(code = %ctx.code, hint = %self.hinted_word(), "hint revealed");

        let recipients = self.still_guessing(ctx);
        ctx.broadcast_where(
            |p| recipients.contains(&p.id),
            &[Event::SetSelectedWord(self.hinted_word())],
        );
    }

    pub(super) fn exit(mut self, ctx: &mut RoomContext) -> RoundState {
        ctx.scheduler.clear();

        ctx.broadcast(
            Recipients::All,
            &[
                Event::SetSelectedWord(self.word.value.clone()),
                Event::SetCurrentState(RoundPhase::PostDrawing),
            ],
        );

        let summary = self.summary(ctx);
        ctx.system_message(summary);

        self.update_streaks(ctx);

        if let Some(drawer) = ctx.current_drawer.take() {
            if let Some(player) = ctx.players.get_mut(&drawer) {
                player.game_role = GameRole::Guessing;
            }
        }
        let players = ctx.player_infos();
        ctx.broadcast(Recipients::All, &[Event::SetPlayers(players)]);

        if let Some(message) = scoring::check_lead_change(&self.points_awarded, ctx.players_in_order()) {
            ctx.system_message(message);
        }

        RoundState::PostDrawing(PostDrawing::new(self.points_awarded))
    }

    fn summary(&self, ctx: &RoomContext) -> String {
        let guessers = ctx.players.keys().filter(|id| !ctx.is_drawer(**id)).count();
        let guessed = ctx
            .players
            .keys()
            .filter(|id| !ctx.is_drawer(**id) && self.has_guessed(**id))
            .count();
        let word = &self.word.value;
        match guessed {
            0 => format!("Nobody guessed the word! The word was {word}"),
            n if n == guessers => format!("Everyone guessed the word! The word was {word}"),
            1 => format!("1 player guessed the word! The word was {word}"),
            n => format!("{n} players guessed the word! The word was {word}"),
        }
    }

    /// Extends or breaks streaks and credits streak bonuses by ranking.
    fn update_streaks(&mut self, ctx: &mut RoomContext) {
        let ranking = scoring::rankings(ctx.players_in_order());
        let total = ranking.len();
        let mut lost = Vec::new();

        for (index, id) in ranking.iter().enumerate() {
            let Some(player) = ctx.players.get_mut(id) else {
                continue;
            };
            if self.points_awarded.get(id).copied().unwrap_or(0) > 0 {
                player.streak += 1;
            } else {
                if player.streak >= NOTABLE_STREAK {
                    lost.push(format!(
                        "{} lost their streak of {}",
                        player.profile.username, player.streak
                    ));
                }
                player.streak = 0;
            }

            let bonus = scoring::streak_bonus(index + 1, total, player.streak);
            if bonus > 0 {
                player.score += bonus;
                *self.points_awarded.entry(*id).or_insert(0) += bonus;
            }
        }

        for message in lost {
            ctx.system_message(message);
        }
    }

    pub(super) fn handle(&mut self, ctx: &mut RoomContext, input: RoomInput) -> Result<Flow, GameError> {
        match input {
            RoomInput::Command { sender, command } => self.handle_command(ctx, sender, command),
            RoomInput::PlayerJoined(id) => {
                ctx.enqueue_drawer(id);
                ctx.send_to(
                    id,
                    &[
                        Event::SetStrokes(self.strokes.clone()),
                        Event::SetSelectedWord(self.hinted_word()),
                        Event::SetCurrentState(RoundPhase::Drawing),
                        Event::SetTimer(self.ends_at),
                    ],
                );
                Ok(Flow::Stay)
            }
            RoomInput::PlayerLeft(id) => {
                self.points_awarded.remove(&id);
                if ctx.is_drawer(id) {
                    debug!(code = %ctx.code, "drawer left, ending turn");
                    return Ok(Flow::Transition);
                }
                if self.everyone_guessed(ctx) {
                    return Ok(Flow::Transition);
                }
                Ok(Flow::Stay)
            }
        }
    }

    fn handle_command(&mut self, ctx: &mut RoomContext, sender: PlayerId, command: Command) -> Result<Flow, GameError> {
        match command {
            Command::AddStroke(stroke) => {
                ctx.require_drawer(sender)?;
                stroke
                    .validate()
                    .map_err(|e| GameError::validation(e.to_string()))?;
                self.strokes.push(stroke.clone());
                ctx.broadcast(Recipients::Guessers, &[Event::AddStroke(stroke)]);
            }
            Command::AddStrokePoint(point) => {
                ctx.require_drawer(sender)?;
                let Some(last) = self.strokes.last_mut() else {
                    return Err(GameError::validation("no stroke to extend"));
                };
                last.points.push(point);
                ctx.broadcast(Recipients::Guessers, &[Event::AddStrokePoint(point)]);
            }
            Command::ClearStrokes => {
                ctx.require_drawer(sender)?;
                self.strokes.clear();
                ctx.broadcast(Recipients::Guessers, &[Event::ClearStrokes]);
            }
            Command::UndoStroke => {
                ctx.require_drawer(sender)?;
                self.strokes.pop();
                ctx.broadcast(Recipients::Guessers, &[Event::UndoStroke]);
            }
            Command::ChatMessage(text) => return Ok(self.guess(ctx, sender, &text)),
            other => return Err(invalid(&other, RoundPhase::Drawing)),
        }
        Ok(Flow::Stay)
    }

    /// Chat during a turn doubles as guessing.
    fn guess(&mut self, ctx: &mut RoomContext, sender: PlayerId, text: &str) -> Flow {
        let Some(content) = sanitize_chat(text) else {
            return Flow::Stay;
        };
        if ctx.is_drawer(sender) || self.has_guessed(sender) {
            ctx.chat(sender, content);
            return Flow::Stay;
        }

        let guess = sanitize_guess(&content);
        if guess != self.word.value {
            let kind = if scoring::is_close_guess(&guess, &self.word.value) {
                ChatMessageKind::CloseGuess
            } else {
                ChatMessageKind::Default
            };
            ctx.post_chat(ChatMessage::new(Some(sender), content, kind));
            return Flow::Stay;
        }

        self.credit_correct_guess(ctx, sender);
        ctx.post_chat(ChatMessage::new(Some(sender), "", ChatMessageKind::Correct));
        ctx.send_to(sender, &[Event::SetSelectedWord(self.word.value.clone())]);

        if self.everyone_guessed(ctx) {
            debug!(code = %ctx.code, "everyone guessed");
            ctx.scheduler.clear();
            return Flow::Transition;
        }
        Flow::Stay
    }

    fn credit_correct_guess(&mut self, ctx: &mut RoomContext, guesser: PlayerId) {
        let drawer = ctx.current_drawer;
        let max_guessers = ctx
            .players
            .keys()
            .filter(|id| Some(**id) != drawer)
            .count();
        let correct_so_far = self
            .points_awarded
            .keys()
            .filter(|id| Some(**id) != drawer)
            .count();
        let (guesser_points, drawer_points) =
            scoring::guess_points(max_guessers, correct_so_far, self.word.difficulty);

        if let Some(player) = ctx.players.get_mut(&guesser) {
            player.score += guesser_points;
        }
        *self.points_awarded.entry(guesser).or_insert(0) += guesser_points;

        if let Some(drawer) = drawer {
            if let Some(player) = ctx.players.get_mut(&drawer) {
                player.score += drawer_points;
            }
            *self.points_awarded.entry(drawer).or_insert(0) += drawer_points;
        }
        debug!(code = %ctx.code, %guesser, guesser_points, drawer_points, "correct guess");
    }
}
