//! Unified error type for the Scrawl server.

use scrawl_protocol::ProtocolError;
use scrawl_room::RoomError;
use scrawl_transport::TransportError;

/// Top-level error that wraps every crate-specific error.
///
/// The `#[from]` attribute on each variant generates the `From` impls the
/// `?` operator uses to convert sub-crate errors.
#[derive(Debug, thiserror::Error)]
pub enum ScrawlError {
    /// Binding, accepting, or reading a file failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// A transport-level error (read, send, timeout).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (encode, decode, invalid message).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A room-level error (not found, rejected, unavailable).
    #[error(transparent)]
    Room(#[from] RoomError),

    /// The server configuration cannot be used.
    #[error("invalid configuration: {0}")]
    Config(String),
}
