//! `ScrawlServer`: binds the listener and serves the router.
//!
//! This is the entry point for running a Scrawl game server. It ties
//! together all the layers: transport → protocol → room.

use std::net::SocketAddr;
use std::sync::Arc;

use scrawl_room::RoomManager;
use scrawl_transport::ConnectionConfig;
use tokio::net::TcpListener;
use tracing::info;

use crate::handler::router;
use crate::{ScrawlError, ServerConfig};

/// Shared server state passed to each connection handler task.
pub(crate) struct ServerState {
    pub(crate) rooms: Arc<RoomManager>,
    pub(crate) connection: ConnectionConfig,
}

/// A bound Scrawl server.
///
/// Call [`run()`](Self::run) to start accepting connections.
pub struct ScrawlServer {
    listener: TcpListener,
    state: Arc<ServerState>,
}

impl ScrawlServer {
    /// Loads the word list, starts the room manager, and binds the
    /// listener.
    pub async fn bind(config: ServerConfig) -> Result<Self, ScrawlError> {
        let words = Arc::new(config.load_words()?);
        let listener = TcpListener::bind(config.bind_addr()).await?;
        let state = Arc::new(ServerState {
            connection: config.room.connection.clone(),
            rooms: RoomManager::start(words, config.room),
        });
        Ok(Self { listener, state })
    }

    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    pub fn rooms(&self) -> Arc<RoomManager> {
        Arc::clone(&self.state.rooms)
    }

    /// Serves HTTP and WebSocket traffic until the process is
    /// terminated.
    pub async fn run(self) -> Result<(), ScrawlError> {
        info!(addr = ?self.listener.local_addr().ok(), "scrawl server running");
        axum::serve(self.listener, router(self.state)).await?;
        Ok(())
    }
}
