//! The drawer chooses one of the word options.

use rand::seq::IndexedRandom;
use scrawl_protocol::{Command, Event, GameRole, PlayerId, RoundPhase, Word, WordChoice, millis_from_now};
use tracing::{debug, warn};

use super::{Drawing, Flow, RoundState, invalid, plain_chat};
use crate::{GameError, PICKING_TIME, Recipients, RoomContext, RoomInput};

#[derive(Debug, Clone)]
pub struct Picking {
    pub word_options: Vec<Word>,
    pub selected: Option<Word>,
    /// Unix millis, for display.
    pub ends_at: u64,
}

impl Picking {
    pub fn new(word_options: Vec<Word>) -> Self {
        Self {
            word_options,
            selected: None,
            ends_at: 0,
        }
    }

    pub(super) fn enter(&mut self, ctx: &mut RoomContext) -> Flow {
        if ctx.current_round == 0 {
            ctx.current_round = 1;
        }

        let drawer = match ctx.next_drawer() {
            Some(id) => id,
            None if ctx.current_round >= ctx.settings.total_rounds => {
                return Flow::Replace(RoundState::GameOver);
            }
            None => {
                ctx.current_round += 1;
                ctx.refill_drawing_queue();
                match ctx.next_drawer() {
                    Some(id) => id,
                    None => return Flow::Replace(RoundState::GameOver),
                }
            }
        };

        ctx.reset_roles();
        if let Some(player) = ctx.players.get_mut(&drawer) {
            player.game_role = GameRole::Drawing;
        }
        ctx.current_drawer = Some(drawer);
        self.selected = None;
        self.ends_at = millis_from_now(PICKING_TIME);
        debug!(code = %ctx.code, round = ctx.current_round, %drawer, "picking");

        ctx.send_to(drawer, &[Event::SetWordOptions(self.word_options.clone())]);
        let players = ctx.player_infos();
        ctx.broadcast(
            Recipients::All,
            &[
                Event::SetCurrentState(RoundPhase::Picking),
                Event::SetPlayers(players),
                Event::SetCurrentRound(ctx.current_round),
                Event::SetSelectedWord(String::new()),
                Event::SetTimer(self.ends_at),
            ],
        );
        ctx.schedule_transition(PICKING_TIME);
        Flow::Stay
    }

    /// Falls back to a random option when the drawer did not choose.
    pub(super) fn exit(self, ctx: &mut RoomContext) -> RoundState {
        let word = self
            .selected
            .or_else(|| self.word_options.choose(&mut ctx.rng).cloned());
        let Some(word) = word else {
            warn!(code = %ctx.code, "no word options available, ending game");
            return RoundState::GameOver;
        };

        // Guessers get the hinted form when Drawing starts; the plain word
        // goes to the drawer alone.
        if let Some(drawer) = ctx.current_drawer {
            ctx.send_to(drawer, &[Event::SetSelectedWord(word.value.clone())]);
        }
        RoundState::Drawing(Drawing::new(word))
    }

    pub(super) fn handle(&mut self, ctx: &mut RoomContext, input: RoomInput) -> Result<Flow, GameError> {
        match input {
            RoomInput::Command { sender, command } => match command {
                Command::SelectWord(choice) => self.select_word(ctx, sender, &choice),
                Command::ChatMessage(text) => Ok(plain_chat(ctx, sender, &text)),
                other => Err(invalid(&other, RoundPhase::Picking)),
            },
            RoomInput::PlayerJoined(id) => {
                ctx.enqueue_drawer(id);
                ctx.send_to(
                    id,
                    &[
                        Event::SetCurrentState(RoundPhase::Picking),
                        Event::SetTimer(self.ends_at),
                    ],
                );
                Ok(Flow::Stay)
            }
            RoomInput::PlayerLeft(id) if ctx.is_drawer(id) => {
                ctx.current_drawer = None;
                Ok(Flow::Replace(RoundState::Picking(Picking::new(
                    self.word_options.clone(),
                ))))
            }
            RoomInput::PlayerLeft(_) => Ok(Flow::Stay),
        }
    }

    fn select_word(&mut self, ctx: &mut RoomContext, sender: PlayerId, choice: &WordChoice) -> Result<Flow, GameError> {
        ctx.require_drawer(sender)?;
        let wanted = choice.value().trim();
        let word = self
            .word_options
            .iter()
            .find(|w| w.value.eq_ignore_ascii_case(wanted))
            .cloned()
            .ok_or_else(|| GameError::validation("selected word is not a valid option"))?;
        self.selected = Some(word);
        Ok(Flow::Transition)
    }
}
