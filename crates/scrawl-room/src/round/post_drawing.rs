//! Short intermission showing the turn's points.

use std::collections::HashMap;

use scrawl_protocol::{Command, Event, PlayerId, RoundPhase, millis_from_now};

use super::{Flow, Picking, RoundState, invalid, plain_chat};
use crate::{GameError, POST_DRAWING_TIME, Recipients, RoomContext, RoomInput};

#[derive(Debug, Clone, Default)]
pub struct PostDrawing {
    pub points_awarded: HashMap<PlayerId, u32>,
    pub ends_at: u64,
}

impl PostDrawing {
    pub fn new(points_awarded: HashMap<PlayerId, u32>) -> Self {
        Self {
            points_awarded,
            ends_at: 0,
        }
    }

    pub(super) fn enter(&mut self, ctx: &mut RoomContext) -> Flow {
        self.ends_at = millis_from_now(POST_DRAWING_TIME);
        ctx.schedule_transition(POST_DRAWING_TIME);
        ctx.broadcast(
            Recipients::All,
            &[
                Event::SetPointsAwarded(self.points_awarded.clone()),
                Event::SetCurrentState(RoundPhase::PostDrawing),
                Event::SetTimer(self.ends_at),
            ],
        );
        Flow::Stay
    }

    pub(super) fn exit(self, ctx: &mut RoomContext) -> RoundState {
        let players = ctx.player_infos();
        ctx.broadcast(
            Recipients::All,
            &[Event::ClearStrokes, Event::SetPlayers(players)],
        );
        RoundState::Picking(Picking::new(ctx.pick_word_options()))
    }

    pub(super) fn handle(&mut self, ctx: &mut RoomContext, input: RoomInput) -> Result<Flow, GameError> {
        match input {
            RoomInput::Command { sender, command } => match command {
                Command::ChatMessage(text) => Ok(plain_chat(ctx, sender, &text)),
                other => Err(invalid(&other, RoundPhase::PostDrawing)),
            },
            RoomInput::PlayerJoined(id) => {
                ctx.enqueue_drawer(id);
                ctx.send_to(
                    id,
                    &[
                        Event::SetCurrentState(RoundPhase::PostDrawing),
                        Event::SetTimer(self.ends_at),
                    ],
                );
                Ok(Flow::Stay)
            }
            RoomInput::PlayerLeft(_) => Ok(Flow::Stay),
        }
    }
}
