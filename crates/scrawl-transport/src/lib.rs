//! Transport layer for Scrawl.
//!
//! A [`Connection`] wraps one accepted WebSocket. Starting it spawns a read
//! task and a write task and hands back a [`ConnectionHandle`], the only
//! thing the room keeps: a bounded outbound queue plus a liveness flag.
//!
//! # Feature Flags
//!
//! - `websocket` (default): [`Connection::new`] over a `tokio-tungstenite` stream
//! - `axum`: [`Connection::from_axum`] over a socket upgraded by axum

#[cfg(feature = "axum")]
mod axum_ws;
mod connection;
mod error;
mod handle;
#[cfg(feature = "websocket")]
mod websocket;

pub use connection::Connection;
pub use error::TransportError;
pub use handle::{ConnectionConfig, ConnectionHandle, Inbound, Outbound, RoomChannels};
