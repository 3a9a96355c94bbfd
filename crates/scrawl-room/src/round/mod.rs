//! The round state machine.
//!
//! ```text
//! Waiting → Picking → Drawing → PostDrawing ─┬→ Picking …
//!    ↑                                       └→ GameOver ─→ Waiting
//! ```
//!
//! Every state has the same three operations: `enter`, `exit`, and
//! `handle`. They never call back into the room; instead they return a
//! [`Flow`] saying what the room should do next, which keeps entering a
//! state that immediately moves on (final-round Picking → GameOver) a
//! plain loop in [`Room`](crate::Room).

mod drawing;
mod game_over;
mod picking;
mod post_drawing;
mod waiting;

pub use drawing::Drawing;
pub use picking::Picking;
pub use post_drawing::PostDrawing;

use scrawl_protocol::{PlayerId, RoundPhase, sanitize_chat};

use crate::{GameError, RoomContext, RoomInput};

/// What the room does after a state operation.
#[derive(Debug)]
pub(crate) enum Flow {
    /// Keep the current state.
    Stay,
    /// Exit the current state and enter whatever `exit` returns.
    Transition,
    /// Enter this state without running the current state's `exit`.
    Replace(RoundState),
}

/// A timed action queued on the room scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ScheduledAction {
    pub epoch: u64,
    pub kind: ActionKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ActionKind {
    Transition,
    RevealHint,
}

/// The current round state and its phase-local data.
#[derive(Debug)]
pub enum RoundState {
    Waiting,
    Picking(Picking),
    Drawing(Drawing),
    PostDrawing(PostDrawing),
    GameOver,
}

impl RoundState {
    pub fn phase(&self) -> RoundPhase {
        match self {
            Self::Waiting => RoundPhase::Waiting,
            Self::Picking(_) => RoundPhase::Picking,
            Self::Drawing(_) => RoundPhase::Drawing,
            Self::PostDrawing(_) => RoundPhase::PostDrawing,
            Self::GameOver => RoundPhase::GameOver,
        }
    }

    pub(crate) fn enter(&mut self, ctx: &mut RoomContext) -> Flow {
        match self {
            Self::Waiting => waiting::enter(ctx),
            Self::Picking(state) => state.enter(ctx),
            Self::Drawing(state) => state.enter(ctx),
            Self::PostDrawing(state) => state.enter(ctx),
            Self::GameOver => game_over::enter(ctx),
        }
    }

    /// Consumes the state and builds the next one.
    pub(crate) fn exit(self, ctx: &mut RoomContext) -> RoundState {
        match self {
            Self::Waiting => waiting::exit(ctx),
            Self::Picking(state) => state.exit(ctx),
            Self::Drawing(state) => state.exit(ctx),
            Self::PostDrawing(state) => state.exit(ctx),
            Self::GameOver => game_over::exit(ctx),
        }
    }

    pub(crate) fn handle(&mut self, ctx: &mut RoomContext, input: RoomInput) -> Result<Flow, GameError> {
        let phase = self.phase();
        match self {
            Self::Waiting => waiting::handle(ctx, input, phase),
            Self::Picking(state) => state.handle(ctx, input),
            Self::Drawing(state) => state.handle(ctx, input),
            Self::PostDrawing(state) => state.handle(ctx, input),
            Self::GameOver => game_over::handle(ctx, input, phase),
        }
    }
}

/// Chat outside of guessing: sanitized and posted as-is.
fn plain_chat(ctx: &mut RoomContext, sender: PlayerId, text: &str) -> Flow {
    if let Some(content) = sanitize_chat(text) {
        ctx.chat(sender, content);
    }
    Flow::Stay
}

fn invalid(command: &scrawl_protocol::Command, phase: RoundPhase) -> GameError {
    GameError::CommandInvalid {
        command: command.name(),
        phase,
    }
}
