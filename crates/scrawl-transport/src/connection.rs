//! The read and write tasks behind every connection.
//!
//! Tasks speak [`Frame`]s. Each WebSocket library gets a small adapter
//! that maps its own message type onto them.

use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use futures_util::{Sink, SinkExt, Stream, StreamExt};
use scrawl_protocol::{Codec, Command, JoinRejection, JsonCodec, PlayerId, ProtocolError};
use tokio::sync::{mpsc, oneshot, watch};
use tokio::time::{self, Instant};
use tracing::{debug, info, warn};

use crate::{ConnectionConfig, ConnectionHandle, Inbound, Outbound, RoomChannels, TransportError};

pub(crate) type FrameSink = Pin<Box<dyn Sink<Frame, Error = TransportError> + Send>>;
pub(crate) type FrameSource = Pin<Box<dyn Stream<Item = Result<Frame, TransportError>> + Send>>;

/// One WebSocket message, whatever library carried it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Frame {
    Text(String),
    Binary(Vec<u8>),
    Ping,
    Pong,
    /// Close code and reason, if the peer sent them.
    Close(Option<(u16, String)>),
}

/// An accepted WebSocket that has not been handed to a room yet.
pub struct Connection {
    sink: FrameSink,
    source: FrameSource,
}

impl Connection {
    pub(crate) fn from_parts<Si, St>(sink: Si, source: St) -> Self
    where
        Si: Sink<Frame, Error = TransportError> + Send + 'static,
        St: Stream<Item = Result<Frame, TransportError>> + Send + 'static,
    {
        Self {
            sink: Box::pin(sink),
            source: Box::pin(source),
        }
    }

    /// Turns the client away with a close frame whose reason is the
    /// rejection code.
    pub async fn reject(
        mut self,
        reason: JoinRejection,
        config: &ConnectionConfig,
    ) -> Result<(), TransportError> {
        let frame = Frame::Close(Some((reason.close_code(), reason.as_str().to_string())));
        debug!(%reason, "rejecting connection");
        write(&mut self.sink, frame, config).await
    }

    /// Spawns the read and write tasks and waits until both are running.
    ///
    /// The returned handle is the room's only way to reach the client. When
    /// either task stops, `player_id` is pushed onto
    /// [`RoomChannels::disconnects`] exactly once.
    pub async fn start(
        self,
        player_id: PlayerId,
        channels: RoomChannels,
        config: ConnectionConfig,
    ) -> ConnectionHandle {
        let (out_tx, out_rx) = mpsc::channel(config.outbound_capacity.max(1));
        let connected = Arc::new(AtomicBool::new(true));

        let (read_ready_tx, read_ready_rx) = oneshot::channel();
        let (write_ready_tx, write_ready_rx) = oneshot::channel();
        let (read_done_tx, read_done_rx) = oneshot::channel();
        let (write_done_tx, write_done_rx) = oneshot::channel();

        tokio::spawn(write_task(
            self.sink,
            out_rx,
            channels.shutdown.clone(),
            config.clone(),
            write_ready_tx,
            read_done_rx,
            write_done_tx,
        ));
        tokio::spawn(read_task(
            self.source,
            player_id,
            channels,
            Arc::clone(&connected),
            config,
            read_ready_tx,
            write_done_rx,
            read_done_tx,
        ));

        let _ = read_ready_rx.await;
        let _ = write_ready_rx.await;
        debug!(%player_id, "connection started");

        ConnectionHandle::new(player_id, out_tx, connected)
    }
}

async fn write(sink: &mut FrameSink, frame: Frame, config: &ConnectionConfig) -> Result<(), TransportError> {
    match time::timeout(config.write_wait, sink.send(frame)).await {
        Ok(result) => result,
        Err(_) => Err(TransportError::Timeout("write")),
    }
}

/// Fixed one-second window counter.
struct RateLimiter {
    limit: u32,
    window_start: Instant,
    count: u32,
}

impl RateLimiter {
    fn new(limit: u32) -> Self {
        Self {
            limit,
            window_start: Instant::now(),
            count: 0,
        }
    }

    fn allow(&mut self) -> bool {
        let now = Instant::now();
        if now.duration_since(self.window_start) >= Duration::from_secs(1) {
            self.window_start = now;
            self.count = 0;
        }
        self.count += 1;
        self.count <= self.limit
    }
}

fn decode_frame(data: &[u8], config: &ConnectionConfig) -> Result<Command, ProtocolError> {
    if data.len() > config.max_stroke_message_size {
        return Err(ProtocolError::FrameTooLarge {
            size: data.len(),
            limit: config.max_stroke_message_size,
        });
    }
    let command: Command = JsonCodec.decode(data)?;
    if data.len() > config.max_message_size && !command.allows_large_frame() {
        return Err(ProtocolError::FrameTooLarge {
            size: data.len(),
            limit: config.max_message_size,
        });
    }
    Ok(command)
}

#[allow(clippy::too_many_arguments)]
async fn read_task(
    mut source: FrameSource,
    player_id: PlayerId,
    channels: RoomChannels,
    connected: Arc<AtomicBool>,
    config: ConnectionConfig,
    ready: oneshot::Sender<()>,
    mut write_done: oneshot::Receiver<()>,
    done: oneshot::Sender<()>,
) {
    let mut deadline = Instant::now() + config.pong_wait;
    let mut limiter = RateLimiter::new(config.rate_limit);
    let _ = ready.send(());

    loop {
        let next = tokio::select! {
            _ = &mut write_done => break,
            next = time::timeout_at(deadline, source.next()) => next,
        };

        let frame = match next {
            Ok(Some(Ok(frame))) => frame,
            Ok(Some(Err(e))) => {
                debug!(%player_id, error = %e, "read error");
                break;
            }
            Ok(None) => break,
            Err(_) => {
                warn!(%player_id, "no pong within deadline");
                break;
            }
        };

        let data = match &frame {
            Frame::Text(text) => text.as_bytes(),
            Frame::Binary(data) => &data[..],
            Frame::Pong => {
                deadline = Instant::now() + config.pong_wait;
                continue;
            }
            Frame::Close(_) => {
                debug!(%player_id, "client closed connection");
                break;
            }
            Frame::Ping => continue,
        };

        if !limiter.allow() {
            debug!(%player_id, "rate limit exceeded, dropping frame");
            continue;
        }

        let command = match decode_frame(data, &config) {
            Ok(command) => command,
            Err(e) => {
                info!(%player_id, error = %e, "undecodable frame, closing connection");
                break;
            }
        };

        let inbound = Inbound {
            sender: player_id,
            command,
        };
        if channels.events.send(inbound).await.is_err() {
            break;
        }
    }

    connected.store(false, Ordering::Release);
    let _ = done.send(());
    let _ = channels.disconnects.send(player_id).await;
    debug!(%player_id, "read task stopped");
}

async fn write_task(
    mut sink: FrameSink,
    mut outbound: mpsc::Receiver<Outbound>,
    mut shutdown: watch::Receiver<bool>,
    config: ConnectionConfig,
    ready: oneshot::Sender<()>,
    mut read_done: oneshot::Receiver<()>,
    done: oneshot::Sender<()>,
) {
    let mut ping = time::interval_at(Instant::now() + config.ping_period, config.ping_period);
    let _ = ready.send(());

    loop {
        let result = tokio::select! {
            _ = shutdown.changed() => {
                let _ = write(&mut sink, Frame::Close(None), &config).await;
                break;
            }
            _ = &mut read_done => break,
            frame = outbound.recv() => match frame {
                Some(Outbound::Frame(text)) => write(&mut sink, Frame::Text(text), &config).await,
                Some(Outbound::Close) | None => {
                    let _ = write(&mut sink, Frame::Close(None), &config).await;
                    break;
                }
            },
            _ = ping.tick() => write(&mut sink, Frame::Ping, &config).await,
        };

        if let Err(e) = result {
            warn!(error = %e, "write failed, closing connection");
            break;
        }
    }

    let _ = done.send(());
    debug!("write task stopped");
}
