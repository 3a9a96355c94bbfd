//! Game flow tests driven directly against [`Room`].
//!
//! Players are attached through detached connection handles, so every
//! frame the room queues can be inspected without a socket. Time is
//! advanced with `Room::tick`.

use std::sync::Arc;
use std::time::Duration;

use rand::SeedableRng;
use rand::rngs::StdRng;
use scrawl_protocol::{
    ChatMessageKind, Command, Difficulty, GameRole, JoinRejection, PlayerId, PlayerProfile,
    ProfileUpdate, RoomCode, RoomRole, RoomSettings, RoomStatus, RoundPhase, Stroke, Word,
    WordBankKind, WordChoice,
};
use scrawl_room::{GameError, POST_DRAWING_TIME, PICKING_TIME, Room, RoundState, WordBank, scoring};
use scrawl_transport::{ConnectionHandle, Outbound};
use serde_json::Value;
use tokio::sync::mpsc;

// =========================================================================
// Helpers
// =========================================================================

struct Client {
    id: PlayerId,
    rx: mpsc::Receiver<Outbound>,
}

impl Client {
    /// Every event queued since the last call, as JSON.
    fn events(&mut self) -> Vec<Value> {
        let mut out = Vec::new();
        while let Ok(msg) = self.rx.try_recv() {
            if let Outbound::Frame(frame) = msg {
                out.push(serde_json::from_str(&frame).expect("frames are JSON"));
            }
        }
        out
    }

    /// Payloads of the queued events of type `kind`, draining the queue.
    fn payloads(&mut self, kind: &str) -> Vec<Value> {
        self.events()
            .into_iter()
            .filter(|e| e["type"] == kind)
            .map(|e| e["payload"].clone())
            .collect()
    }
}

fn easy_words(words: &[&str]) -> Arc<WordBank> {
    Arc::new(WordBank::new(
        words.iter().map(|w| Word::new(*w, Difficulty::Easy)).collect(),
    ))
}

fn room_with(words: &[&str]) -> Room {
    Room::with_rng(
        RoomCode::parse("ABCDEF").expect("valid code"),
        easy_words(words),
        StdRng::seed_from_u64(42),
    )
}

fn join(room: &mut Room, name: &str) -> Client {
    let id = PlayerId::new();
    let (handle, rx) = ConnectionHandle::detached(id, 4096);
    let profile = PlayerProfile {
        username: name.to_string(),
        ..PlayerProfile::default()
    };
    room.add_player(id, profile, handle).expect("room admits player");
    Client { id, rx }
}

fn settings(room: &Room, f: impl FnOnce(&mut RoomSettings)) -> RoomSettings {
    let mut settings = room.context().settings.clone();
    f(&mut settings);
    settings
}

fn start(room: &mut Room, host: &Client) {
    room.handle_command(host.id, Command::StartGame)
        .expect("game starts");
}

fn select(room: &mut Room, drawer: &Client, word: &str) -> Result<(), GameError> {
    room.handle_command(drawer.id, Command::SelectWord(WordChoice::Value(word.to_string())))
}

fn say(room: &mut Room, who: &Client, text: &str) {
    room.handle_command(who.id, Command::ChatMessage(text.to_string()))
        .expect("chat is always accepted");
}

fn drawing(room: &Room) -> &scrawl_room::Drawing {
    match room.state() {
        RoundState::Drawing(d) => d,
        other => panic!("expected drawing, got {:?}", other.phase()),
    }
}

fn score(room: &Room, client: &Client) -> u32 {
    room.player(client.id).expect("player present").score
}

fn last_chat_kinds(room: &Room, n: usize) -> Vec<ChatMessageKind> {
    let chat = &room.context().chat;
    chat.iter().skip(chat.len().saturating_sub(n)).map(|m| m.kind).collect()
}

/// Host plus `n - 1` guests, game started, host picking.
fn started(words: &[&str], n: usize) -> (Room, Vec<Client>) {
    let mut room = room_with(words);
    let clients: Vec<Client> = (0..n)
        .map(|i| join(&mut room, &format!("player{i}")))
        .collect();
    start(&mut room, &clients[0]);
    (room, clients)
}

// =========================================================================
// Lobby
// =========================================================================

#[test]
fn test_first_player_is_host() {
    let mut room = room_with(&["cat"]);
    let mut host = join(&mut room, "host");
    let guest = join(&mut room, "guest");

    assert_eq!(room.player(host.id).unwrap().room_role, RoomRole::Host);
    assert_eq!(room.player(guest.id).unwrap().room_role, RoomRole::Player);

    let events = host.events();
    assert_eq!(events[0]["type"], "room/setPlayerId");
    assert_eq!(events[0]["payload"], host.id.to_string());
    assert!(events.iter().any(|e| e["type"] == "room/init"));
    assert!(events.iter().any(|e| e["type"] == "room/playerJoined"));
}

#[test]
fn test_start_requires_host() {
    let mut room = room_with(&["cat", "dog", "bird"]);
    let _host = join(&mut room, "host");
    let mut guest = join(&mut room, "guest");
    guest.events();

    let err = room.handle_command(guest.id, Command::StartGame).unwrap_err();
    assert_eq!(err.to_string(), "wrong room role");
    assert_eq!(room.context().status, RoomStatus::Waiting);
    assert_eq!(room.phase(), RoundPhase::Waiting);

    let errors = guest.payloads("error");
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0]["code"], "UNAUTHORIZED");
}

#[test]
fn test_start_needs_two_players() {
    let mut room = room_with(&["cat"]);
    let host = join(&mut room, "host");

    let err = room.handle_command(host.id, Command::StartGame).unwrap_err();
    assert_eq!(err.to_string(), "not enough players");
    assert_eq!(room.phase(), RoundPhase::Waiting);
}

#[test]
fn test_custom_words_gate() {
    let mut room = room_with(&["cat", "dog", "bird"]);
    let mut host = join(&mut room, "host");
    let _guest = join(&mut room, "guest");

    let two = settings(&room, |s| {
        s.word_bank = WordBankKind::Custom;
        s.custom_words = vec![
            Word::new("word1", Difficulty::Custom),
            Word::new("word2", Difficulty::Custom),
        ];
    });
    room.handle_command(host.id, Command::ChangeSettings(two)).unwrap();
    let err = room.handle_command(host.id, Command::StartGame).unwrap_err();
    assert_eq!(err.to_string(), "not enough custom words");

    let three = settings(&room, |s| s.custom_words.push(Word::new("word3", Difficulty::Custom)));
    room.handle_command(host.id, Command::ChangeSettings(three)).unwrap();
    host.events();
    start(&mut room, &host);
    assert_eq!(room.phase(), RoundPhase::Picking);

    let options = host.payloads("game/setWordOptions");
    assert_eq!(options.len(), 1);
    let values: Vec<&str> = options[0]
        .as_array()
        .unwrap()
        .iter()
        .map(|w| w["value"].as_str().unwrap())
        .collect();
    assert_eq!(values.len(), 3);
    assert!(values.iter().all(|v| ["word1", "word2", "word3"].contains(v)));
}

#[test]
fn test_change_settings_host_only_and_validated() {
    let mut room = room_with(&["cat"]);
    let host = join(&mut room, "host");
    let mut guest = join(&mut room, "guest");

    let faster = settings(&room, |s| s.drawing_time_allowed = 30);
    let err = room
        .handle_command(guest.id, Command::ChangeSettings(faster.clone()))
        .unwrap_err();
    assert_eq!(err.to_string(), "wrong room role");

    let bogus = settings(&room, |s| s.total_rounds = 0);
    let err = room
        .handle_command(host.id, Command::ChangeSettings(bogus))
        .unwrap_err();
    assert!(matches!(err, GameError::Validation(_)));

    guest.events();
    room.handle_command(host.id, Command::ChangeSettings(faster)).unwrap();
    assert_eq!(room.context().settings.drawing_time_allowed, 30);
    let changed = guest.payloads("room/changeRoomSettings");
    assert_eq!(changed[0]["drawingTimeAllowed"], 30);
}

#[test]
fn test_room_full_and_player_limit() {
    let mut room = room_with(&["cat"]);
    let host = join(&mut room, "host");
    let _guest = join(&mut room, "guest");
    let two = settings(&room, |s| s.player_limit = 2);
    room.handle_command(host.id, Command::ChangeSettings(two)).unwrap();

    assert_eq!(room.admit(), Err(JoinRejection::RoomFull));
    let id = PlayerId::new();
    let (handle, _rx) = ConnectionHandle::detached(id, 16);
    let err = room
        .add_player(id, PlayerProfile::default(), handle)
        .unwrap_err();
    assert_eq!(err, JoinRejection::RoomFull);
    assert_eq!(room.player_count(), 2);
}

#[test]
fn test_host_migrates_to_earliest_joiner() {
    let mut room = room_with(&["cat"]);
    let host = join(&mut room, "host");
    let second = join(&mut room, "second");
    let third = join(&mut room, "third");

    room.remove_player(host.id);
    assert_eq!(room.player(second.id).unwrap().room_role, RoomRole::Host);
    assert_eq!(room.player(third.id).unwrap().room_role, RoomRole::Player);
}

#[test]
fn test_chat_history_is_capped() {
    let mut room = room_with(&["cat"]);
    let host = join(&mut room, "host");
    for i in 0..150 {
        say(&mut room, &host, &format!("message {i}"));
    }
    let chat = &room.context().chat;
    assert_eq!(chat.len(), scrawl_room::MAX_CHAT_MESSAGES);
    assert_eq!(chat.back().unwrap().content, "message 149");
    assert_eq!(chat.front().unwrap().content, "message 50");
}

#[test]
fn test_empty_chat_is_ignored() {
    let mut room = room_with(&["cat"]);
    let host = join(&mut room, "host");
    say(&mut room, &host, "   ");
    assert!(room.context().chat.is_empty());
}

#[test]
fn test_profile_update_in_any_state() {
    let (mut room, mut clients) = started(&["cat", "dog", "bird"], 2);
    clients[1].events();

    let update = ProfileUpdate {
        username: Some("  Renamed  ".to_string()),
        ..ProfileUpdate::default()
    };
    room.handle_command(clients[0].id, Command::UpdatePlayerProfile(update))
        .unwrap();

    assert_eq!(room.player(clients[0].id).unwrap().profile.username, "Renamed");
    let players = clients[1].payloads("room/setPlayers");
    assert_eq!(players.len(), 1);
    assert!(
        players[0]
            .as_array()
            .unwrap()
            .iter()
            .any(|p| p["username"] == "Renamed")
    );
}

// =========================================================================
// Picking
// =========================================================================

#[test]
fn test_word_selection_gate() {
    let (mut room, mut clients) = started(&["cat", "dog", "bird"], 2);
    assert_eq!(room.phase(), RoundPhase::Picking);
    assert_eq!(room.context().current_round, 1);
    assert_eq!(room.player(clients[0].id).unwrap().game_role, GameRole::Drawing);

    let err = select(&mut room, &clients[1], "cat").unwrap_err();
    assert_eq!(err.to_string(), "wrong game role");

    let err = select(&mut room, &clients[0], "elephant").unwrap_err();
    assert_eq!(err.to_string(), "selected word is not a valid option");
    assert_eq!(room.phase(), RoundPhase::Picking);

    clients[0].events();
    clients[1].events();
    select(&mut room, &clients[0], "CAT").unwrap();
    assert_eq!(room.phase(), RoundPhase::Drawing);
    assert_eq!(drawing(&room).word.value, "cat");

    assert_eq!(clients[0].payloads("game/setSelectedWord"), vec![Value::from("cat")]);
    assert_eq!(clients[1].payloads("game/setSelectedWord"), vec![Value::from("***")]);
}

#[test]
fn test_word_options_only_reach_the_drawer() {
    let mut room = room_with(&["cat", "dog", "bird"]);
    let host = join(&mut room, "host");
    let mut guest = join(&mut room, "guest");
    guest.events();
    start(&mut room, &host);
    assert!(guest.payloads("game/setWordOptions").is_empty());
}

#[test]
fn test_picking_timeout_chooses_an_option() {
    let (mut room, _clients) = started(&["cat", "dog", "bird"], 2);
    let options = match room.state() {
        RoundState::Picking(p) => p.word_options.clone(),
        _ => panic!("expected picking"),
    };
    room.tick(PICKING_TIME - Duration::from_millis(100));
    assert_eq!(room.phase(), RoundPhase::Picking);

    room.tick(Duration::from_millis(100));
    assert_eq!(room.phase(), RoundPhase::Drawing);
    assert!(options.contains(&drawing(&room).word));
}

#[test]
fn test_drawer_leaving_picking_picks_new_drawer() {
    let (mut room, clients) = started(&["cat", "dog", "bird"], 3);
    let options = match room.state() {
        RoundState::Picking(p) => p.word_options.clone(),
        _ => panic!("expected picking"),
    };

    room.remove_player(clients[0].id);
    match room.state() {
        RoundState::Picking(p) => assert_eq!(p.word_options, options),
        _ => panic!("expected picking"),
    }
    assert_eq!(room.context().current_drawer, Some(clients[1].id));
    assert_eq!(room.player(clients[1].id).unwrap().game_role, GameRole::Drawing);
}

#[test]
fn test_commands_outside_their_phase_are_rejected_quietly() {
    let (mut room, mut clients) = started(&["cat", "dog", "bird"], 2);
    clients[0].events();

    let err = room
        .handle_command(clients[0].id, Command::ClearStrokes)
        .unwrap_err();
    assert!(matches!(err, GameError::CommandInvalid { .. }));
    assert!(clients[0].payloads("error").is_empty());
}

// =========================================================================
// Drawing
// =========================================================================

#[test]
fn test_correct_guess_scoring() {
    let (mut room, mut clients) = started(&["cat"], 3);
    select(&mut room, &clients[0], "cat").unwrap();
    for c in clients.iter_mut() {
        c.events();
    }

    say(&mut room, &clients[1], "Cat ");
    assert_eq!(score(&room, &clients[1]), 350);
    assert_eq!(score(&room, &clients[0]), 52);
    assert_eq!(drawing(&room).points_awarded[&clients[1].id], 350);

    let chat = clients[2].payloads("room/newChatMessage");
    assert_eq!(chat.len(), 1);
    assert_eq!(chat[0]["type"], "correct");
    assert_eq!(chat[0]["content"], "");
    assert_eq!(clients[1].payloads("game/setSelectedWord"), vec![Value::from("cat")]);
    assert!(clients[2].payloads("game/setSelectedWord").is_empty());

    // The second guess ends the turn, which also pays streak bonuses.
    say(&mut room, &clients[2], "cat");
    assert_eq!(room.phase(), RoundPhase::PostDrawing);
    assert_eq!(score(&room, &clients[1]), 350 + scoring::streak_bonus(1, 3, 1));
    assert_eq!(score(&room, &clients[2]), 175 + scoring::streak_bonus(2, 3, 1));
    assert_eq!(score(&room, &clients[0]), 78 + scoring::streak_bonus(3, 3, 1));
}

#[test]
fn test_guessers_chat_after_guessing_is_plain() {
    let (mut room, clients) = started(&["cat"], 3);
    select(&mut room, &clients[0], "cat").unwrap();

    say(&mut room, &clients[1], "cat");
    say(&mut room, &clients[1], "cat");
    say(&mut room, &clients[0], "cat");
    assert_eq!(
        last_chat_kinds(&room, 3),
        vec![ChatMessageKind::Correct, ChatMessageKind::Default, ChatMessageKind::Default]
    );
    assert_eq!(score(&room, &clients[1]), 350);
    assert_eq!(room.phase(), RoundPhase::Drawing);
}

#[test]
fn test_close_guess() {
    let (mut room, clients) = started(&["banana"], 2);
    select(&mut room, &clients[0], "banana").unwrap();

    say(&mut room, &clients[1], "banano");
    say(&mut room, &clients[1], "bananaa");
    say(&mut room, &clients[1], "apple");
    assert_eq!(
        last_chat_kinds(&room, 3),
        vec![
            ChatMessageKind::CloseGuess,
            ChatMessageKind::CloseGuess,
            ChatMessageKind::Default
        ]
    );
    assert_eq!(room.context().chat.back().unwrap().content, "apple");
}

#[test]
fn test_hint_schedule() {
    let mut room = room_with(&["cat"]);
    let host = join(&mut room, "host");
    let mut guest = join(&mut room, "guest");
    let quick = settings(&room, |s| s.drawing_time_allowed = 30);
    room.handle_command(host.id, Command::ChangeSettings(quick)).unwrap();
    start(&mut room, &host);
    select(&mut room, &host, "cat").unwrap();
    assert_eq!(drawing(&room).total_hints(), 1);
    assert_eq!(drawing(&room).hinted_word(), "***");
    guest.events();

    room.tick(Duration::from_secs(14));
    assert_eq!(drawing(&room).hinted_word(), "***");

    room.tick(Duration::from_secs(1));
    let hinted = drawing(&room).hinted_word();
    assert_eq!(hinted.chars().filter(|c| *c == '*').count(), 2);
    assert!(hinted.chars().zip("cat".chars()).all(|(h, w)| h == '*' || h == w));
    assert_eq!(guest.payloads("game/setSelectedWord"), vec![Value::from(hinted)]);

    room.tick(Duration::from_secs(14));
    assert_eq!(room.phase(), RoundPhase::Drawing);
    room.tick(Duration::from_secs(1));
    assert_eq!(room.phase(), RoundPhase::PostDrawing);
}

#[test]
fn test_no_hints_mode() {
    let mut room = room_with(&["cat"]);
    let host = join(&mut room, "host");
    let _guest = join(&mut room, "guest");
    let no_hints = settings(&room, |s| {
        s.drawing_time_allowed = 30;
        s.game_mode = scrawl_protocol::GameMode::NoHints;
    });
    room.handle_command(host.id, Command::ChangeSettings(no_hints)).unwrap();
    start(&mut room, &host);
    select(&mut room, &host, "cat").unwrap();

    room.tick(Duration::from_secs(29));
    assert_eq!(drawing(&room).hinted_word(), "***");
}

#[test]
fn test_hints_skip_players_who_guessed() {
    let mut room = room_with(&["cat"]);
    let host = join(&mut room, "host");
    let mut solver = join(&mut room, "solver");
    let mut other = join(&mut room, "other");
    let quick = settings(&room, |s| s.drawing_time_allowed = 30);
    room.handle_command(host.id, Command::ChangeSettings(quick)).unwrap();
    start(&mut room, &host);
    select(&mut room, &host, "cat").unwrap();
    say(&mut room, &solver, "cat");
    solver.events();
    other.events();

    room.tick(Duration::from_secs(15));
    assert!(solver.payloads("game/setSelectedWord").is_empty());
    assert_eq!(other.payloads("game/setSelectedWord").len(), 1);
}

#[test]
fn test_all_guessed_ends_turn_early() {
    let (mut room, mut clients) = started(&["cat"], 3);
    select(&mut room, &clients[0], "cat").unwrap();
    say(&mut room, &clients[1], "cat");
    for c in clients.iter_mut() {
        c.events();
    }
    say(&mut room, &clients[2], "cat");

    assert_eq!(room.phase(), RoundPhase::PostDrawing);
    let events = clients[2].events();
    let word = events
        .iter()
        .find(|e| e["type"] == "game/setSelectedWord")
        .unwrap();
    assert_eq!(word["payload"], "cat");
    let awarded = events
        .iter()
        .find(|e| e["type"] == "game/setPointsAwarded")
        .unwrap();
    assert_eq!(awarded["payload"].as_object().unwrap().len(), 3);
    assert!(
        room.context()
            .chat
            .iter()
            .any(|m| m.content == "Everyone guessed the word! The word was cat")
    );

    // Next turn goes to the second joiner.
    room.tick(POST_DRAWING_TIME);
    assert_eq!(room.phase(), RoundPhase::Picking);
    assert_eq!(room.context().current_drawer, Some(clients[1].id));
    assert_eq!(room.player(clients[0].id).unwrap().game_role, GameRole::Guessing);
}

#[test]
fn test_nobody_guessed_breaks_streaks() {
    let (mut room, clients) = started(&["cat"], 2);
    select(&mut room, &clients[0], "cat").unwrap();
    say(&mut room, &clients[1], "cat");
    room.tick(POST_DRAWING_TIME);
    assert_eq!(room.player(clients[1].id).unwrap().streak, 1);

    // Second turn: clients[1] draws and nobody guesses.
    select(&mut room, &clients[1], "cat").unwrap();
    room.tick(Duration::from_secs(80));
    assert_eq!(room.phase(), RoundPhase::PostDrawing);
    assert_eq!(room.player(clients[0].id).unwrap().streak, 0);
    assert_eq!(room.player(clients[1].id).unwrap().streak, 0);
    assert!(
        room.context()
            .chat
            .iter()
            .any(|m| m.content == "Nobody guessed the word! The word was cat")
    );
}

#[test]
fn test_strokes_are_drawer_only_and_echoed_to_guessers() {
    let (mut room, mut clients) = started(&["cat"], 2);
    select(&mut room, &clients[0], "cat").unwrap();
    clients[0].events();
    clients[1].events();

    let stroke = Stroke {
        points: vec![[1, 2]],
        color: "#000".to_string(),
        width: 4,
        kind: None,
    };
    let err = room
        .handle_command(clients[1].id, Command::AddStroke(stroke.clone()))
        .unwrap_err();
    assert_eq!(err.to_string(), "wrong game role");
    assert_eq!(clients[1].payloads("error").len(), 1);

    room.handle_command(clients[0].id, Command::AddStroke(stroke.clone())).unwrap();
    room.handle_command(clients[0].id, Command::AddStrokePoint([3, 4])).unwrap();
    assert_eq!(drawing(&room).strokes[0].points, vec![[1, 2], [3, 4]]);

    room.handle_command(clients[0].id, Command::AddStroke(stroke)).unwrap();
    room.handle_command(clients[0].id, Command::UndoStroke).unwrap();
    assert_eq!(drawing(&room).strokes.len(), 1);
    room.handle_command(clients[0].id, Command::ClearStrokes).unwrap();
    assert!(drawing(&room).strokes.is_empty());

    let kinds: Vec<String> = clients[1]
        .events()
        .iter()
        .map(|e| e["type"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(
        kinds,
        vec![
            "canvas/addStroke",
            "canvas/addStrokePoint",
            "canvas/addStroke",
            "canvas/undoStroke",
            "canvas/clearStrokes"
        ]
    );
    assert!(clients[0].events().is_empty());
}

#[test]
fn test_invalid_stroke_is_rejected() {
    let (mut room, clients) = started(&["cat"], 2);
    select(&mut room, &clients[0], "cat").unwrap();

    let stroke = Stroke {
        points: vec![],
        color: "black".to_string(),
        width: 4,
        kind: None,
    };
    let err = room
        .handle_command(clients[0].id, Command::AddStroke(stroke))
        .unwrap_err();
    assert!(matches!(err, GameError::Validation(_)));
    assert!(drawing(&room).strokes.is_empty());
}

#[test]
fn test_late_joiner_gets_canvas_and_hint() {
    let (mut room, clients) = started(&["cat"], 2);
    select(&mut room, &clients[0], "cat").unwrap();
    let stroke = Stroke {
        points: vec![[5, 5]],
        color: "#ff0000".to_string(),
        width: 2,
        kind: None,
    };
    room.handle_command(clients[0].id, Command::AddStroke(stroke)).unwrap();

    let mut late = join(&mut room, "late");
    let events = late.events();
    let strokes = events
        .iter()
        .find(|e| e["type"] == "canvas/setStrokes")
        .unwrap();
    assert_eq!(strokes["payload"].as_array().unwrap().len(), 1);
    let word = events
        .iter()
        .find(|e| e["type"] == "game/setSelectedWord")
        .unwrap();
    assert_eq!(word["payload"], "***");
    assert!(room.context().drawing_queue.contains(&late.id));
}

#[test]
fn test_drawer_leaving_ends_turn() {
    let (mut room, clients) = started(&["cat"], 3);
    select(&mut room, &clients[0], "cat").unwrap();
    say(&mut room, &clients[1], "cat");

    room.remove_player(clients[0].id);
    assert_eq!(room.phase(), RoundPhase::PostDrawing);
    match room.state() {
        RoundState::PostDrawing(p) => {
            assert!(p.points_awarded.contains_key(&clients[1].id));
            assert!(!p.points_awarded.contains_key(&clients[0].id));
        }
        _ => panic!("expected post drawing"),
    }
}

#[test]
fn test_guesser_leaving_can_complete_the_turn() {
    let (mut room, clients) = started(&["cat"], 3);
    select(&mut room, &clients[0], "cat").unwrap();
    say(&mut room, &clients[1], "cat");

    room.remove_player(clients[2].id);
    assert_eq!(room.phase(), RoundPhase::PostDrawing);
}

// =========================================================================
// Game over
// =========================================================================

#[test]
fn test_game_ends_when_too_few_players_remain() {
    let (mut room, clients) = started(&["cat"], 2);
    select(&mut room, &clients[0], "cat").unwrap();

    room.remove_player(clients[1].id);
    assert_eq!(room.phase(), RoundPhase::GameOver);
    assert_eq!(room.context().status, RoomStatus::Finished);
    assert_eq!(room.context().current_drawer, None);
    assert_eq!(room.admit(), Err(JoinRejection::RoomClosed));
    assert!(room.is_idle());
}

#[test]
fn test_full_game_runs_to_game_over_and_restarts() {
    let mut room = room_with(&["cat", "dog", "bird"]);
    let host = join(&mut room, "host");
    let guest = join(&mut room, "guest");
    let one_round = settings(&room, |s| s.total_rounds = 1);
    room.handle_command(host.id, Command::ChangeSettings(one_round)).unwrap();
    start(&mut room, &host);

    let mut drawers = Vec::new();
    for _ in 0..2 {
        assert_eq!(room.phase(), RoundPhase::Picking);
        drawers.push(room.context().current_drawer.unwrap());
        room.tick(PICKING_TIME);
        assert_eq!(room.phase(), RoundPhase::Drawing);
        room.tick(Duration::from_secs(80));
        assert_eq!(room.phase(), RoundPhase::PostDrawing);
        room.tick(POST_DRAWING_TIME);
    }
    assert_eq!(drawers, vec![host.id, guest.id]);
    assert_eq!(room.phase(), RoundPhase::GameOver);
    assert_eq!(room.context().status, RoomStatus::Playing);
    assert_eq!(room.admit(), Ok(()));
    assert!(
        room.context()
            .chat
            .iter()
            .any(|m| m.kind == ChatMessageKind::System && m.content.contains(" won with "))
    );

    let err = room
        .handle_command(guest.id, Command::StartGame)
        .unwrap_err();
    assert_eq!(err.to_string(), "wrong room role");

    room.handle_command(host.id, Command::StartGame).unwrap();
    assert_eq!(room.phase(), RoundPhase::Waiting);
    assert_eq!(room.context().status, RoomStatus::Waiting);

    start(&mut room, &host);
    assert_eq!(room.phase(), RoundPhase::Picking);
    assert_eq!(room.context().current_round, 1);
    for id in [host.id, guest.id] {
        let player = room.player(id).unwrap();
        assert_eq!(player.score, 0);
        assert_eq!(player.streak, 0);
    }
    assert!(
        room.context()
            .chat
            .iter()
            .all(|m| !m.content.contains(" won with "))
    );
}

#[test]
fn test_player_can_join_during_game_over() {
    let mut room = room_with(&["cat", "dog"]);
    let host = join(&mut room, "host");
    let _guest = join(&mut room, "guest");
    let one_round = settings(&room, |s| s.total_rounds = 1);
    room.handle_command(host.id, Command::ChangeSettings(one_round)).unwrap();
    start(&mut room, &host);
    for _ in 0..2 {
        room.tick(PICKING_TIME);
        room.tick(Duration::from_secs(80));
        room.tick(POST_DRAWING_TIME);
    }
    assert_eq!(room.phase(), RoundPhase::GameOver);

    let mut late = join(&mut room, "late");
    assert_eq!(room.player_count(), 3);
    assert_eq!(late.payloads("room/setCurrentState"), vec![Value::from("gameOver")]);
    assert_eq!(room.player(late.id).unwrap().room_role, RoomRole::Player);
}

#[test]
fn test_rounds_advance_after_everyone_drew() {
    let (mut room, _clients) = started(&["cat", "dog", "bird"], 2);
    for _ in 0..2 {
        room.tick(PICKING_TIME);
        room.tick(Duration::from_secs(80));
        room.tick(POST_DRAWING_TIME);
    }
    assert_eq!(room.phase(), RoundPhase::Picking);
    assert_eq!(room.context().current_round, 2);
}

// =========================================================================
// Streaks and lead changes
// =========================================================================

/// Two players, one-word bank, `rounds` rounds, game started.
fn duel(rounds: u32) -> (Room, Client, Client) {
    let mut room = room_with(&["cat"]);
    let host = join(&mut room, "ann");
    let guest = join(&mut room, "ben");
    let long_game = settings(&room, |s| s.total_rounds = rounds);
    room.handle_command(host.id, Command::ChangeSettings(long_game)).unwrap();
    start(&mut room, &host);
    (room, host, guest)
}

/// Plays one turn between `players`; the guesser finds the word when
/// `solved`.
fn play_turn(room: &mut Room, players: [PlayerId; 2], solved: bool) {
    assert_eq!(room.phase(), RoundPhase::Picking);
    let drawer = room.context().current_drawer.expect("someone draws");
    room.handle_command(drawer, Command::SelectWord(WordChoice::Value("cat".into())))
        .unwrap();
    if solved {
        let guesser = if players[0] == drawer { players[1] } else { players[0] };
        room.handle_command(guesser, Command::ChatMessage("cat".into()))
            .unwrap();
    } else {
        room.tick(Duration::from_secs(80));
    }
    assert_eq!(room.phase(), RoundPhase::PostDrawing);
    room.tick(POST_DRAWING_TIME);
}

fn system_lines(room: &Room) -> Vec<String> {
    room.context()
        .chat
        .iter()
        .filter(|m| m.kind == ChatMessageKind::System)
        .map(|m| m.content.clone())
        .collect()
}

#[test]
fn test_first_scoring_turn_announces_new_leader() {
    let (mut room, host, guest) = duel(3);
    play_turn(&mut room, [host.id, guest.id], true);

    assert!(score(&room, &guest) > score(&room, &host));
    assert!(
        system_lines(&room)
            .iter()
            .any(|line| line == "ben took the lead from ann")
    );
}

#[test]
fn test_broken_long_streak_is_announced() {
    let (mut room, host, guest) = duel(5);
    for _ in 0..5 {
        play_turn(&mut room, [host.id, guest.id], true);
    }
    for client in [&host, &guest] {
        assert_eq!(room.player(client.id).unwrap().streak, 5);
    }
    assert!(system_lines(&room).iter().all(|line| !line.contains("lost their streak")));

    play_turn(&mut room, [host.id, guest.id], false);
    for client in [&host, &guest] {
        assert_eq!(room.player(client.id).unwrap().streak, 0);
    }
    let lines = system_lines(&room);
    assert!(lines.iter().any(|line| line == "ann lost their streak of 5"));
    assert!(lines.iter().any(|line| line == "ben lost their streak of 5"));
}

// =========================================================================
// Randomized invariants
// =========================================================================

#[test]
fn test_random_play_keeps_invariants() {
    use rand::Rng;
    use rand::seq::IndexedRandom;

    let mut rng = StdRng::seed_from_u64(7);
    let mut room = room_with(&["cat", "dog", "bird", "ice cream", "t-rex"]);
    let mut clients: Vec<Client> = (0..4).map(|i| join(&mut room, &format!("p{i}"))).collect();
    start(&mut room, &clients[0]);

    let mut last_hint: Option<(String, usize)> = None;
    for step in 0..2000 {
        let actor = clients.choose(&mut rng).unwrap().id;
        let command = match rng.random_range(0..8) {
            0 => Command::ChatMessage(["cat", "dog", "bird", "hello", "ice creem"].choose(&mut rng).unwrap().to_string()),
            1 => Command::SelectWord(WordChoice::Value(["cat", "dog", "bird", "ice cream", "t-rex"].choose(&mut rng).unwrap().to_string())),
            2 => Command::AddStrokePoint([step, step]),
            3 => Command::UndoStroke,
            4 => Command::StartGame,
            _ => Command::ChatMessage("hi".to_string()),
        };
        let _ = room.handle_command(actor, command);
        room.tick(Duration::from_millis(rng.random_range(0..3000)));

        for c in clients.iter_mut() {
            c.events();
        }

        let drawers = room
            .context()
            .players
            .values()
            .filter(|p| p.game_role == GameRole::Drawing)
            .count();
        assert!(drawers <= 1, "step {step}: {drawers} drawers");
        assert!(room.context().chat.len() <= scrawl_room::MAX_CHAT_MESSAGES);

        if let RoundState::Drawing(d) = room.state() {
            let hinted = d.hinted_word();
            assert_eq!(hinted.chars().count(), d.word.value.chars().count());
            for (h, w) in hinted.chars().zip(d.word.value.chars()) {
                assert!(h == '*' || h == w);
                if !w.is_ascii_alphanumeric() {
                    assert_eq!(h, w);
                }
            }
            let hidden = hinted.chars().filter(|c| *c == '*').count();
            if let Some((word, before)) = &last_hint {
                if *word == d.word.value {
                    assert!(hidden <= *before, "hidden letters grew");
                }
            }
            last_hint = Some((d.word.value.clone(), hidden));
        } else {
            last_hint = None;
        }
    }
}
