//! The synchronous room core.
//!
//! [`Room`] owns a [`RoomContext`] and the current [`RoundState`] and
//! applies everything that can happen to a room: joins, leaves, commands,
//! and scheduler ticks. It does no I/O of its own apart from queueing
//! frames on player connections, which keeps it drivable from tests
//! without a runtime.

use std::sync::Arc;
use std::time::{Duration, Instant};

use rand::SeedableRng;
use rand::rngs::StdRng;
use scrawl_protocol::{
    Command, Event, JoinRejection, MIN_PLAYERS, PlayerId, PlayerProfile, RoomCode, RoomRole,
    RoomSnapshot, RoomStatus, RoundPhase,
};
use scrawl_transport::ConnectionHandle;
use tracing::{debug, info, trace};

use crate::actor::RoomInfo;
use crate::round::{ActionKind, Flow};
use crate::{GameError, Player, Recipients, RoomContext, RoundState, WordBank};

/// Something a round state reacts to.
#[derive(Debug)]
pub enum RoomInput {
    Command { sender: PlayerId, command: Command },
    /// Sent after the player is in the room and has its snapshot.
    PlayerJoined(PlayerId),
    /// Sent after the player has been removed.
    PlayerLeft(PlayerId),
}

#[derive(Debug)]
pub struct Room {
    ctx: RoomContext,
    state: RoundState,
}

impl Room {
    pub fn new(code: RoomCode, words: Arc<WordBank>) -> Self {
        Self::with_rng(code, words, StdRng::from_os_rng())
    }

    /// A room whose word options, fallback picks, and hints come from `rng`.
    pub fn with_rng(code: RoomCode, words: Arc<WordBank>, rng: StdRng) -> Self {
        let mut room = Self {
            ctx: RoomContext::new(code, words, rng),
            state: RoundState::Waiting,
        };
        room.set_state(RoundState::Waiting);
        room
    }

    pub fn code(&self) -> &RoomCode {
        &self.ctx.code
    }

    pub fn state(&self) -> &RoundState {
        &self.state
    }

    pub fn phase(&self) -> RoundPhase {
        self.state.phase()
    }

    pub fn context(&self) -> &RoomContext {
        &self.ctx
    }

    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.ctx.players.get(&id)
    }

    pub fn player_count(&self) -> usize {
        self.ctx.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ctx.players.is_empty()
    }

    /// No timed event is pending, so the room only needs waking for input.
    pub fn is_idle(&self) -> bool {
        self.ctx.scheduler.is_empty()
    }

    /// Whether a new player may join right now.
    pub fn admit(&self) -> Result<(), JoinRejection> {
        if self.ctx.status == RoomStatus::Finished {
            return Err(JoinRejection::RoomClosed);
        }
        if self.ctx.players.len() >= self.ctx.settings.player_limit {
            return Err(JoinRejection::RoomFull);
        }
        Ok(())
    }

    /// Adds a player. The first player in an empty room becomes host.
    pub fn add_player(
        &mut self,
        id: PlayerId,
        profile: PlayerProfile,
        connection: ConnectionHandle,
    ) -> Result<(), JoinRejection> {
        self.admit()?;

        let role = if self.ctx.players.values().any(Player::is_host) {
            RoomRole::Player
        } else {
            RoomRole::Host
        };
        let player = Player::new(id, profile, role, connection);
        let info = player.info();
        self.ctx.players.insert(id, player);
        self.ctx.join_order.push(id);
        info!(
            code = %self.ctx.code,
            player_id = %id,
            username = %info.profile.username,
            players = self.ctx.players.len(),
            "player joined"
        );

        let snapshot = self.snapshot();
        self.ctx
            .send_to(id, &[Event::SetPlayerId(id), Event::Init(snapshot)]);
        self.ctx
            .broadcast(Recipients::AllExcept(id), &[Event::PlayerJoined(info)]);
        self.dispatch(RoomInput::PlayerJoined(id));
        Ok(())
    }

    /// Removes a player and closes its connection.
    ///
    /// The host role moves to the earliest remaining joiner. A game that
    /// drops below two players ends immediately.
    pub fn remove_player(&mut self, id: PlayerId) -> Option<Player> {
        let player = self.ctx.players.remove(&id)?;
        player.connection().close();
        self.ctx.join_order.retain(|p| *p != id);
        self.ctx.drawing_queue.retain(|p| *p != id);
        info!(
            code = %self.ctx.code,
            player_id = %id,
            players = self.ctx.players.len(),
            "player left"
        );

        self.ctx.broadcast(Recipients::All, &[Event::PlayerLeft(id)]);

        if player.is_host() {
            self.migrate_host();
        }

        let game_running = self.ctx.status == RoomStatus::Playing
            && !matches!(self.state, RoundState::GameOver);
        if game_running && self.ctx.players.len() < MIN_PLAYERS {
            info!(code = %self.ctx.code, "not enough players left, ending game");
            self.ctx.status = RoomStatus::Finished;
            self.transition_to(RoundState::GameOver);
        } else {
            self.dispatch(RoomInput::PlayerLeft(id));
        }
        Some(player)
    }

    fn migrate_host(&mut self) {
        let Some(next) = self.ctx.join_order.first().copied() else {
            return;
        };
        if let Some(player) = self.ctx.players.get_mut(&next) {
            player.room_role = RoomRole::Host;
            debug!(code = %self.ctx.code, player_id = %next, "host migrated");
        }
        let players = self.ctx.player_infos();
        self.ctx.broadcast(Recipients::All, &[Event::SetPlayers(players)]);
    }

    /// Applies a command from `sender`.
    ///
    /// User-facing failures are also reported to the sender as an `error`
    /// event. Commands from unknown senders are ignored.
    pub fn handle_command(&mut self, sender: PlayerId, command: Command) -> Result<(), GameError> {
        let Some(player) = self.ctx.players.get_mut(&sender) else {
            debug!(code = %self.ctx.code, %sender, "command from non-member, ignoring");
            return Ok(());
        };
        player.last_interaction = Instant::now();

        if let Command::UpdatePlayerProfile(update) = command {
            player.apply_profile(update);
            let players = self.ctx.player_infos();
            self.ctx.broadcast(Recipients::All, &[Event::SetPlayers(players)]);
            return Ok(());
        }

        let name = command.name();
        trace!(code = %self.ctx.code, %sender, command = name, "command");
        match self
            .state
            .handle(&mut self.ctx, RoomInput::Command { sender, command })
        {
            Ok(flow) => {
                self.apply(flow);
                Ok(())
            }
            Err(e) => {
                debug!(code = %self.ctx.code, %sender, command = name, error = %e, "command rejected");
                if e.is_user_facing() {
                    self.ctx.send_error(sender, &e);
                }
                Err(e)
            }
        }
    }

    /// Advances the room clock by `elapsed` and runs whatever came due.
    pub fn tick(&mut self, elapsed: Duration) {
        for action in self.ctx.scheduler.tick(elapsed) {
            if action.epoch != self.ctx.epoch {
                trace!(code = %self.ctx.code, ?action, "stale scheduled action");
                continue;
            }
            match action.kind {
                ActionKind::Transition => self.transition(),
                ActionKind::RevealHint => {
                    if let RoundState::Drawing(drawing) = &mut self.state {
                        drawing.reveal_hint(&mut self.ctx);
                    }
                }
            }
        }
    }

    /// Players whose outbound queue overflowed since the last call.
    pub fn take_overflowed(&mut self) -> Vec<PlayerId> {
        self.ctx.take_overflowed()
    }

    pub fn snapshot(&self) -> RoomSnapshot {
        RoomSnapshot {
            code: self.ctx.code.clone(),
            status: self.ctx.status,
            players: self.ctx.player_infos(),
            chat: self.ctx.chat.iter().cloned().collect(),
            settings: self.ctx.settings.clone(),
            current_round: self.ctx.current_round,
            current_state: self.phase(),
            drawer_id: self.ctx.current_drawer,
        }
    }

    pub fn info(&self) -> RoomInfo {
        RoomInfo {
            code: self.ctx.code.clone(),
            status: self.ctx.status,
            phase: self.phase(),
            player_count: self.ctx.players.len(),
            player_limit: self.ctx.settings.player_limit,
            current_round: self.ctx.current_round,
        }
    }

    // -- state machine ----------------------------------------------------

    fn dispatch(&mut self, input: RoomInput) {
        match self.state.handle(&mut self.ctx, input) {
            Ok(flow) => self.apply(flow),
            Err(e) => debug!(code = %self.ctx.code, error = %e, "membership change rejected"),
        }
    }

    fn apply(&mut self, flow: Flow) {
        match flow {
            Flow::Stay => {}
            Flow::Transition => self.transition(),
            Flow::Replace(next) => self.set_state(next),
        }
    }

    /// Exits the current state and enters the one it hands over.
    fn transition(&mut self) {
        let current = std::mem::replace(&mut self.state, RoundState::Waiting);
        let next = current.exit(&mut self.ctx);
        self.set_state(next);
    }

    /// Abandons the current state without running its exit.
    fn transition_to(&mut self, next: RoundState) {
        self.ctx.scheduler.clear();
        self.ctx.reset_roles();
        self.set_state(next);
    }

    /// Enters `next`, following any transitions its `enter` asks for.
    fn set_state(&mut self, mut next: RoundState) {
        loop {
            self.ctx.epoch += 1;
            self.ctx.scheduler.clear();
            debug!(code = %self.ctx.code, phase = %next.phase(), "entering state");
            match next.enter(&mut self.ctx) {
                Flow::Stay => {
                    self.state = next;
                    return;
                }
                Flow::Transition => next = next.exit(&mut self.ctx),
                Flow::Replace(state) => next = state,
            }
        }
    }
}
