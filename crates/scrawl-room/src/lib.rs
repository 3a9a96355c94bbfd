//! Rooms for Scrawl.
//!
//! Each room runs as an isolated Tokio task (actor model) that owns its
//! players, chat, settings, and the round state machine. Everything that
//! mutates a room happens inside that task.
//!
//! # Key types
//!
//! - [`Room`]: the synchronous game core (players, rounds, scoring)
//! - [`RoundState`]: Waiting → Picking → Drawing → PostDrawing → GameOver
//! - [`RoomHandle`]: talk to a running room actor
//! - [`RoomManager`]: creates rooms by code and evicts idle ones
//! - [`WordBank`]: the pool word options are drawn from

mod actor;
mod config;
mod context;
mod error;
mod manager;
mod player;
mod room;
mod round;
pub mod scoring;
mod words;

pub use actor::{RoomHandle, RoomInfo};
pub use config::{
    CONNECT_TIMEOUT, EVICTION_INTERVAL, MAX_CHAT_MESSAGES, PICKING_TIME, POST_DRAWING_TIME,
    ROOM_TIMEOUT, RoomConfig, WORD_OPTION_COUNT,
};
pub use context::{Recipients, RoomContext};
pub use error::{GameError, RoomError};
pub use manager::RoomManager;
pub use player::Player;
pub use room::{Room, RoomInput};
pub use round::{Drawing, Picking, PostDrawing, RoundState};
pub use words::WordBank;
