//! The room-facing side of a connection.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use scrawl_protocol::{Command, PlayerId};
use tokio::sync::{mpsc, watch};
use tracing::warn;

use crate::TransportError;

/// Timing and sizing knobs for a connection.
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    /// Deadline for a single frame write.
    pub write_wait: Duration,
    /// How long the read side waits for a pong before giving up.
    pub pong_wait: Duration,
    /// Ping interval; must be shorter than `pong_wait`.
    pub ping_period: Duration,
    /// Largest frame accepted for ordinary commands.
    pub max_message_size: usize,
    /// Largest frame accepted for `canvas/addStroke`. Also the hard
    /// WebSocket message limit.
    pub max_stroke_message_size: usize,
    /// Capacity of the outbound queue.
    pub outbound_capacity: usize,
    /// Inbound frames allowed per second; extra frames are dropped.
    pub rate_limit: u32,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        let pong_wait = Duration::from_secs(60);
        Self {
            write_wait: Duration::from_secs(10),
            pong_wait,
            ping_period: pong_wait * 9 / 10,
            max_message_size: 512,
            max_stroke_message_size: 16 * 1024,
            outbound_capacity: 256,
            rate_limit: 120,
        }
    }
}

/// A decoded command together with the player whose connection read it.
#[derive(Debug, Clone, PartialEq)]
pub struct Inbound {
    pub sender: PlayerId,
    pub command: Command,
}

/// What the room hands to a connection when it starts.
#[derive(Debug, Clone)]
pub struct RoomChannels {
    /// Decoded commands, in arrival order per connection.
    pub events: mpsc::Sender<Inbound>,
    /// Receives this connection's player id once when either task exits.
    pub disconnects: mpsc::Sender<PlayerId>,
    /// Flips to `true` when the room shuts down.
    pub shutdown: watch::Receiver<bool>,
}

/// One entry in a connection's outbound queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outbound {
    /// A complete JSON text frame.
    Frame(String),
    /// Send a close frame and stop writing.
    Close,
}

/// Cheap handle to a running connection.
///
/// Sending never waits: the room loop must not stall behind one slow
/// client, so a full queue is reported as [`TransportError::QueueFull`]
/// and the room drops the player.
#[derive(Debug, Clone)]
pub struct ConnectionHandle {
    player_id: PlayerId,
    outbound: mpsc::Sender<Outbound>,
    connected: Arc<AtomicBool>,
}

impl ConnectionHandle {
    pub(crate) fn new(
        player_id: PlayerId,
        outbound: mpsc::Sender<Outbound>,
        connected: Arc<AtomicBool>,
    ) -> Self {
        Self {
            player_id,
            outbound,
            connected,
        }
    }

    /// A handle with no socket behind it. The receiver sees exactly what a
    /// write task would send.
    pub fn detached(player_id: PlayerId, capacity: usize) -> (Self, mpsc::Receiver<Outbound>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        let handle = Self::new(player_id, tx, Arc::new(AtomicBool::new(true)));
        (handle, rx)
    }

    pub fn player_id(&self) -> PlayerId {
        self.player_id
    }

    /// Queues one text frame.
    pub fn send(&self, frame: String) -> Result<(), TransportError> {
        self.outbound
            .try_send(Outbound::Frame(frame))
            .map_err(|e| match e {
                mpsc::error::TrySendError::Full(_) => {
                    warn!(player_id = %self.player_id, "outbound queue full");
                    TransportError::QueueFull
                }
                mpsc::error::TrySendError::Closed(_) => {
                    self.connected.store(false, Ordering::Release);
                    TransportError::ConnectionClosed("write task stopped".into())
                }
            })
    }

    /// Asks the write task to send a close frame. Dropping every handle has
    /// the same effect once the queue drains.
    pub fn close(&self) {
        let _ = self.outbound.try_send(Outbound::Close);
    }

    /// `false` once either connection task has stopped.
    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Acquire)
    }
}
