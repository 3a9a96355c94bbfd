/// Errors that can occur in the transport layer.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The peer or the room closed the connection.
    #[error("connection closed: {0}")]
    ConnectionClosed(String),

    /// Writing a frame to the socket failed.
    #[error("send failed: {0}")]
    SendFailed(String),

    /// The outbound queue is full; the client is not keeping up.
    #[error("outbound queue full")]
    QueueFull,

    /// A read or write deadline passed.
    #[error("timed out: {0}")]
    Timeout(&'static str),

    /// Reading from the socket failed.
    #[error("read failed: {0}")]
    ReadFailed(String),
}
