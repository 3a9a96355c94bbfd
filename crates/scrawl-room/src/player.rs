//! A player in a room.

use std::time::Instant;

use scrawl_protocol::{
    Codec, Event, GameRole, JsonCodec, PlayerId, PlayerInfo, PlayerProfile, ProfileUpdate,
    RoomRole, is_hex_color, sanitize_avatar_seed, sanitize_username,
};
use scrawl_transport::{ConnectionHandle, TransportError};

#[derive(Debug)]
pub struct Player {
    pub id: PlayerId,
    pub profile: PlayerProfile,
    pub score: u32,
    pub streak: u32,
    pub room_role: RoomRole,
    pub game_role: GameRole,
    pub last_interaction: Instant,
    connection: ConnectionHandle,
}

impl Player {
    pub fn new(
        id: PlayerId,
        profile: PlayerProfile,
        room_role: RoomRole,
        connection: ConnectionHandle,
    ) -> Self {
        Self {
            id,
            profile,
            score: 0,
            streak: 0,
            room_role,
            game_role: GameRole::Guessing,
            last_interaction: Instant::now(),
            connection,
        }
    }

    pub fn connection(&self) -> &ConnectionHandle {
        &self.connection
    }

    pub fn is_host(&self) -> bool {
        self.room_role == RoomRole::Host
    }

    pub fn is_drawing(&self) -> bool {
        self.game_role == GameRole::Drawing
    }

    /// Encodes and queues each event as its own frame.
    pub fn send(&self, events: &[Event]) -> Result<(), TransportError> {
        for event in events {
            let frame = JsonCodec
                .encode(event)
                .map_err(|e| TransportError::SendFailed(e.to_string()))?;
            self.connection.send(frame)?;
        }
        Ok(())
    }

    /// Queues frames that were already encoded (broadcasts encode once).
    pub(crate) fn send_frames(&self, frames: &[String]) -> Result<(), TransportError> {
        frames
            .iter()
            .try_for_each(|frame| self.connection.send(frame.clone()))
    }

    pub fn info(&self) -> PlayerInfo {
        PlayerInfo {
            id: self.id,
            profile: self.profile.clone(),
            score: self.score,
            streak: self.streak,
            room_role: self.room_role,
            game_role: self.game_role,
        }
    }

    /// Applies the present fields of `update`. Invalid avatar colors are
    /// ignored.
    pub fn apply_profile(&mut self, update: ProfileUpdate) {
        if let Some(username) = update.username {
            self.profile.username = sanitize_username(&username);
        }
        if let Some(seed) = update.avatar_seed {
            self.profile.avatar_seed = sanitize_avatar_seed(&seed);
        }
        if let Some(color) = update.avatar_color.filter(|c| is_hex_color(c)) {
            self.profile.avatar_color = color;
        }
    }

    /// Zeroes per-game state.
    pub(crate) fn reset(&mut self) {
        self.score = 0;
        self.streak = 0;
        self.game_role = GameRole::Guessing;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scrawl_transport::Outbound;

    fn player() -> (Player, tokio::sync::mpsc::Receiver<Outbound>) {
        let id = PlayerId::new();
        let (handle, rx) = ConnectionHandle::detached(id, 8);
        let profile = PlayerProfile {
            username: "ann".into(),
            avatar_seed: "seed".into(),
            avatar_color: "#ffffff".into(),
        };
        (Player::new(id, profile, RoomRole::Player, handle), rx)
    }

    #[test]
    fn test_send_encodes_one_frame_per_event() {
        let (p, mut rx) = player();
        p.send(&[Event::ClearStrokes, Event::SetCurrentRound(2)]).unwrap();
        assert_eq!(
            rx.try_recv().unwrap(),
            Outbound::Frame(r#"{"type":"canvas/clearStrokes"}"#.into())
        );
        assert_eq!(
            rx.try_recv().unwrap(),
            Outbound::Frame(r#"{"type":"room/setCurrentRound","payload":2}"#.into())
        );
    }

    #[test]
    fn test_apply_profile_sanitizes_fields() {
        let (mut p, _rx) = player();
        p.apply_profile(ProfileUpdate {
            username: Some("   ".into()),
            avatar_seed: None,
            avatar_color: Some("not-a-color".into()),
        });
        assert_eq!(p.profile.username, "Player");
        assert_eq!(p.profile.avatar_seed, "seed");
        assert_eq!(p.profile.avatar_color, "#ffffff");
    }

    #[test]
    fn test_reset_clears_game_state() {
        let (mut p, _rx) = player();
        p.score = 500;
        p.streak = 3;
        p.game_role = GameRole::Drawing;
        p.reset();
        assert_eq!((p.score, p.streak, p.game_role), (0, 0, GameRole::Guessing));
    }
}
