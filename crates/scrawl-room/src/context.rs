//! Room-wide state shared by every round state.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;

use rand::rngs::StdRng;
use scrawl_protocol::{
    ChatMessage, ChatMessageKind, Codec, ErrorPayload, Event, GameRole, JsonCodec, PlayerId,
    PlayerInfo, RoomCode, RoomSettings, RoomStatus, Word,
};
use scrawl_tick::{EventName, Scheduler};
use scrawl_transport::TransportError;
use tracing::{debug, warn};

use crate::round::{ActionKind, ScheduledAction};
use crate::{GameError, MAX_CHAT_MESSAGES, Player, WORD_OPTION_COUNT, WordBank};

/// Who receives a broadcast.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recipients {
    All,
    /// Everyone except the current drawer.
    Guessers,
    Only(PlayerId),
    AllExcept(PlayerId),
}

/// Everything a room owns apart from its current round state.
///
/// Round states receive `&mut RoomContext` next to their own data, so the
/// two can be borrowed independently.
#[derive(Debug)]
pub struct RoomContext {
    pub code: RoomCode,
    pub status: RoomStatus,
    pub settings: RoomSettings,
    pub players: HashMap<PlayerId, Player>,
    /// Player ids in join order. Gives host migration and queue refills a
    /// stable order.
    pub(crate) join_order: Vec<PlayerId>,
    pub chat: VecDeque<ChatMessage>,
    pub drawing_queue: VecDeque<PlayerId>,
    pub current_drawer: Option<PlayerId>,
    pub current_round: u32,
    pub(crate) scheduler: Scheduler<ScheduledAction>,
    /// Bumped on every state change; scheduled actions from an older
    /// epoch are stale.
    pub(crate) epoch: u64,
    pub(crate) rng: StdRng,
    words: Arc<WordBank>,
    overflowed: Vec<PlayerId>,
}

impl RoomContext {
    pub(crate) fn new(code: RoomCode, words: Arc<WordBank>, rng: StdRng) -> Self {
        Self {
            code,
            status: RoomStatus::Waiting,
            settings: RoomSettings::default(),
            players: HashMap::new(),
            join_order: Vec::new(),
            chat: VecDeque::new(),
            drawing_queue: VecDeque::new(),
            current_drawer: None,
            current_round: 0,
            scheduler: Scheduler::new(),
            epoch: 0,
            rng,
            words,
            overflowed: Vec::new(),
        }
    }

    // -- players ----------------------------------------------------------

    /// Players in join order.
    pub fn players_in_order(&self) -> impl Iterator<Item = &Player> {
        self.join_order.iter().filter_map(|id| self.players.get(id))
    }

    pub fn player_infos(&self) -> Vec<PlayerInfo> {
        self.players_in_order().map(Player::info).collect()
    }

    pub fn drawer(&self) -> Option<&Player> {
        self.current_drawer.and_then(|id| self.players.get(&id))
    }

    pub fn is_drawer(&self, id: PlayerId) -> bool {
        self.current_drawer == Some(id)
    }

    pub(crate) fn require_host(&self, id: PlayerId) -> Result<&Player, GameError> {
        self.players
            .get(&id)
            .filter(|p| p.is_host())
            .ok_or_else(GameError::wrong_room_role)
    }

    pub(crate) fn require_drawer(&self, id: PlayerId) -> Result<&Player, GameError> {
        self.players
            .get(&id)
            .filter(|p| p.is_drawing() && self.is_drawer(id))
            .ok_or_else(GameError::wrong_game_role)
    }

    /// Refills the drawing queue with every player, in join order.
    pub(crate) fn refill_drawing_queue(&mut self) {
        self.drawing_queue = self.join_order.iter().copied().collect();
    }

    /// Pops the next drawer that is still in the room.
    pub(crate) fn next_drawer(&mut self) -> Option<PlayerId> {
        while let Some(id) = self.drawing_queue.pop_front() {
            if self.players.contains_key(&id) {
                return Some(id);
            }
        }
        None
    }

    pub(crate) fn enqueue_drawer(&mut self, id: PlayerId) {
        if !self.drawing_queue.contains(&id) && !self.is_drawer(id) {
            self.drawing_queue.push_back(id);
        }
    }

    /// Clears the drawer and puts everyone back to guessing.
    pub(crate) fn reset_roles(&mut self) {
        self.current_drawer = None;
        for player in self.players.values_mut() {
            player.game_role = GameRole::Guessing;
        }
    }

    /// Starts a fresh game: round 0, zero scores and streaks, full drawing
    /// queue, empty chat.
    pub(crate) fn reset_game_state(&mut self) {
        self.current_round = 0;
        self.current_drawer = None;
        for player in self.players.values_mut() {
            player.reset();
        }
        self.refill_drawing_queue();
        self.chat.clear();
        self.broadcast(Recipients::All, &[Event::SetChat(Vec::new())]);
    }

    pub(crate) fn pick_word_options(&mut self) -> Vec<Word> {
        self.words
            .pick_options(&self.settings, WORD_OPTION_COUNT, &mut self.rng)
    }

    // -- scheduling -------------------------------------------------------

    fn schedule(&mut self, name: EventName, kind: ActionKind, after: Duration, limit: Option<u32>) {
        let action = ScheduledAction {
            epoch: self.epoch,
            kind,
        };
        let result = match name {
            EventName::StateChange => self.scheduler.add_one_shot(name, after, action),
            EventName::HintReveal => self.scheduler.add_recurring(name, after, limit, action),
        };
        if let Err(e) = result {
            warn!(code = %self.code, error = %e, "failed to schedule event");
        }
    }

    /// Transition out of the current state after `after`.
    pub(crate) fn schedule_transition(&mut self, after: Duration) {
        self.schedule(EventName::StateChange, ActionKind::Transition, after, None);
    }

    /// Reveal one hint letter every `interval`, `count` times.
    pub(crate) fn schedule_hints(&mut self, interval: Duration, count: u32) {
        self.schedule(EventName::HintReveal, ActionKind::RevealHint, interval, Some(count));
    }

    // -- messaging --------------------------------------------------------

    fn matches(&self, player: &Player, recipients: Recipients) -> bool {
        match recipients {
            Recipients::All => true,
            Recipients::Guessers => !self.is_drawer(player.id),
            Recipients::Only(id) => player.id == id,
            Recipients::AllExcept(id) => player.id != id,
        }
    }

    /// Sends `events` to every matching player. Each event is encoded once.
    pub fn broadcast(&mut self, recipients: Recipients, events: &[Event]) {
        let ids: Vec<PlayerId> = self
            .players
            .values()
            .filter(|p| self.matches(p, recipients))
            .map(|p| p.id)
            .collect();
        self.broadcast_to(&ids, events);
    }

    /// Sends `events` to every player for which `filter` holds.
    pub fn broadcast_where(&mut self, filter: impl Fn(&Player) -> bool, events: &[Event]) {
        let ids: Vec<PlayerId> = self
            .players
            .values()
            .filter(|p| filter(p))
            .map(|p| p.id)
            .collect();
        self.broadcast_to(&ids, events);
    }

    fn broadcast_to(&mut self, ids: &[PlayerId], events: &[Event]) {
        if ids.is_empty() || events.is_empty() {
            return;
        }
        let frames: Vec<String> = match events.iter().map(|e| JsonCodec.encode(e)).collect() {
            Ok(frames) => frames,
            Err(e) => {
                warn!(code = %self.code, error = %e, "failed to encode broadcast");
                return;
            }
        };
        for id in ids {
            let result = match self.players.get(id) {
                Some(player) => player.send_frames(&frames),
                None => continue,
            };
            self.note_send_result(*id, result);
        }
    }

    pub fn send_to(&mut self, id: PlayerId, events: &[Event]) {
        let Some(player) = self.players.get(&id) else {
            return;
        };
        let result = player.send(events);
        self.note_send_result(id, result);
    }

    pub(crate) fn send_error(&mut self, id: PlayerId, error: &GameError) {
        let payload = ErrorPayload {
            code: error.code().to_string(),
            message: error.to_string(),
        };
        self.send_to(id, &[Event::Error(payload)]);
    }

    fn note_send_result(&mut self, id: PlayerId, result: Result<(), TransportError>) {
        match result {
            Ok(()) => {}
            Err(TransportError::QueueFull) => {
                if !self.overflowed.contains(&id) {
                    self.overflowed.push(id);
                }
            }
            Err(e) => debug!(code = %self.code, player_id = %id, error = %e, "send failed"),
        }
    }

    /// Players whose outbound queue overflowed since the last call.
    pub(crate) fn take_overflowed(&mut self) -> Vec<PlayerId> {
        std::mem::take(&mut self.overflowed)
    }

    // -- chat -------------------------------------------------------------

    /// Appends to the bounded history and broadcasts the message.
    pub fn post_chat(&mut self, message: ChatMessage) {
        if self.chat.len() >= MAX_CHAT_MESSAGES {
            self.chat.pop_front();
        }
        self.chat.push_back(message.clone());
        self.broadcast(Recipients::All, &[Event::NewChatMessage(message)]);
    }

    pub fn system_message(&mut self, text: impl Into<String>) {
        self.post_chat(ChatMessage::system(text));
    }

    /// A plain chat line from `sender`.
    pub(crate) fn chat(&mut self, sender: PlayerId, content: String) {
        self.post_chat(ChatMessage::new(Some(sender), content, ChatMessageKind::Default));
    }
}
