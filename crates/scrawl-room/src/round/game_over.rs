//! Final standings. The host may reopen the lobby with `game/start`.
//!
//! Status stays as it was: a game that ran its rounds is still joinable
//! here, one cut short by leavers arrives already `Finished`.

use scrawl_protocol::{Command, Event, PlayerId, RoundPhase};
use tracing::info;

use super::{Flow, RoundState, invalid, plain_chat};
use crate::{GameError, Recipients, RoomContext, RoomInput, scoring};

pub(super) fn enter(ctx: &mut RoomContext) -> Flow {
    ctx.reset_roles();
    ctx.drawing_queue.clear();

    let winner = scoring::rankings(ctx.players_in_order())
        .first()
        .and_then(|id| ctx.players.get(id))
        .map(|p| (p.profile.username.clone(), p.score));
    if let Some((name, score)) = winner {
        ctx.system_message(format!("{name} won with {score} points"));
    }

    let players = ctx.player_infos();
    ctx.broadcast(
        Recipients::All,
        &[
            Event::SetCurrentState(RoundPhase::GameOver),
            Event::SetPlayers(players),
        ],
    );
    info!(code = %ctx.code, "game over");
    Flow::Stay
}

pub(super) fn exit(_ctx: &mut RoomContext) -> RoundState {
    RoundState::Waiting
}

pub(super) fn handle(ctx: &mut RoomContext, input: RoomInput, phase: RoundPhase) -> Result<Flow, GameError> {
    match input {
        RoomInput::Command { sender, command } => match command {
            Command::StartGame => reopen(ctx, sender),
            Command::ChatMessage(text) => Ok(plain_chat(ctx, sender, &text)),
            other => Err(invalid(&other, phase)),
        },
        RoomInput::PlayerJoined(id) => {
            ctx.send_to(id, &[Event::SetCurrentState(RoundPhase::GameOver)]);
            Ok(Flow::Stay)
        }
        RoomInput::PlayerLeft(_) => Ok(Flow::Stay),
    }
}

fn reopen(ctx: &mut RoomContext, sender: PlayerId) -> Result<Flow, GameError> {
    ctx.require_host(sender)?;
    Ok(Flow::Transition)
}
