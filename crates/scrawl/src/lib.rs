//! # Scrawl
//!
//! Realtime server for a multiplayer drawing and guessing game.
//!
//! Players connect over WebSocket to `/host` (create a room) or
//! `/join/{code}`. Each room runs as its own task and takes players
//! through picking a word, drawing it while everyone else guesses, and
//! scoring, for a configurable number of rounds.
//!
//! ```rust,no_run
//! use scrawl::{ScrawlServer, ServerConfig};
//!
//! # async fn run() -> Result<(), scrawl::ScrawlError> {
//! let server = ScrawlServer::bind(ServerConfig::from_env()).await?;
//! server.run().await
//! # }
//! ```

mod config;
mod error;
mod handler;
mod server;

pub use config::ServerConfig;
pub use error::ScrawlError;
pub use server::ScrawlServer;
