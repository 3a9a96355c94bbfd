//! Lobby: the host tunes settings and starts the game.

use scrawl_protocol::{Command, Event, RoomSettings, RoomStatus, RoundPhase};
use tracing::info;

use super::{Flow, Picking, RoundState, invalid, plain_chat};
use crate::{GameError, Recipients, RoomContext, RoomInput};

pub(super) fn enter(ctx: &mut RoomContext) -> Flow {
    ctx.status = RoomStatus::Waiting;
    ctx.reset_roles();
    let players = ctx.player_infos();
    ctx.broadcast(
        Recipients::All,
        &[
            Event::SetCurrentState(RoundPhase::Waiting),
            Event::SetPlayers(players),
        ],
    );
    Flow::Stay
}

pub(super) fn exit(ctx: &mut RoomContext) -> RoundState {
    RoundState::Picking(Picking::new(ctx.pick_word_options()))
}

pub(super) fn handle(ctx: &mut RoomContext, input: RoomInput, phase: RoundPhase) -> Result<Flow, GameError> {
    match input {
        RoomInput::Command { sender, command } => match command {
            Command::StartGame => start_game(ctx, sender),
            Command::ChangeSettings(settings) => change_settings(ctx, sender, settings),
            Command::ChatMessage(text) => Ok(plain_chat(ctx, sender, &text)),
            other => Err(invalid(&other, phase)),
        },
        RoomInput::PlayerJoined(id) => {
            let settings = ctx.settings.clone();
            ctx.send_to(
                id,
                &[
                    Event::SetCurrentState(RoundPhase::Waiting),
                    Event::ChangeRoomSettings(settings),
                ],
            );
            Ok(Flow::Stay)
        }
        RoomInput::PlayerLeft(_) => Ok(Flow::Stay),
    }
}

fn start_game(ctx: &mut RoomContext, sender: scrawl_protocol::PlayerId) -> Result<Flow, GameError> {
    ctx.require_host(sender)?;
    if ctx.status != RoomStatus::Waiting {
        return Err(GameError::validation("game already started"));
    }
    if ctx.players.len() < 2 {
        return Err(GameError::validation("not enough players"));
    }
    if !ctx.settings.has_enough_custom_words() {
        return Err(GameError::validation("not enough custom words"));
    }

    ctx.reset_game_state();
    ctx.status = RoomStatus::Playing;
    info!(code = %ctx.code, players = ctx.players.len(), "game started");
    Ok(Flow::Transition)
}

fn change_settings(
    ctx: &mut RoomContext,
    sender: scrawl_protocol::PlayerId,
    settings: RoomSettings,
) -> Result<Flow, GameError> {
    ctx.require_host(sender)?;
    let settings = settings
        .validated()
        .map_err(|e| GameError::validation(e.to_string()))?;
    ctx.settings = settings.clone();
    ctx.broadcast(Recipients::All, &[Event::ChangeRoomSettings(settings)]);
    Ok(Flow::Stay)
}
