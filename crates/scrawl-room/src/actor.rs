//! Room actor: an isolated Tokio task that owns a [`Room`].
//!
//! The actor multiplexes four sources in one `select!` loop: control
//! requests from handles, decoded commands from player connections,
//! disconnect notices, and the room ticker. Nothing else ever touches the
//! room, so game logic needs no locks.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use scrawl_protocol::{
    JoinRejection, PlayerId, PlayerProfile, RoomCode, RoomStatus, RoundPhase,
};
use scrawl_tick::TickScheduler;
use scrawl_transport::{Connection, ConnectionConfig, Inbound, RoomChannels};
use tokio::sync::{mpsc, oneshot, watch};
use tokio::time::{self, Instant};
use tracing::{debug, info, warn};

use crate::{Room, RoomConfig, RoomError, WordBank};

/// Requests sent to a room actor through its handle.
enum Control {
    /// Admit a new player on an accepted connection.
    Connect {
        profile: PlayerProfile,
        connection: Connection,
        reply: oneshot::Sender<Result<PlayerId, JoinRejection>>,
    },
    Info {
        reply: oneshot::Sender<RoomInfo>,
    },
    Shutdown,
}

/// A snapshot of room metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomInfo {
    pub code: RoomCode,
    pub status: RoomStatus,
    pub phase: RoundPhase,
    pub player_count: usize,
    pub player_limit: usize,
    pub current_round: u32,
}

/// Handle to a running room actor. Cheap to clone.
#[derive(Clone)]
pub struct RoomHandle {
    code: RoomCode,
    control: mpsc::Sender<Control>,
    activity: Arc<Activity>,
    connection: ConnectionConfig,
    connect_timeout: Duration,
}

impl RoomHandle {
    pub fn code(&self) -> &RoomCode {
        &self.code
    }

    /// Hands an accepted connection to the room.
    ///
    /// If the room does not take the request within the connect timeout,
    /// or turns the player away, the client gets a close frame carrying
    /// the rejection code.
    pub async fn connect(
        &self,
        profile: PlayerProfile,
        connection: Connection,
    ) -> Result<PlayerId, RoomError> {
        let permit = match time::timeout(self.connect_timeout, self.control.reserve()).await {
            Ok(Ok(permit)) => permit,
            Ok(Err(_)) => {
                let _ = connection
                    .reject(JoinRejection::RoomClosed, &self.connection)
                    .await;
                return Err(RoomError::Unavailable(self.code.clone()));
            }
            Err(_) => {
                warn!(code = %self.code, "room did not accept connection in time");
                let _ = connection
                    .reject(JoinRejection::ConnectionTimeout, &self.connection)
                    .await;
                return Err(JoinRejection::ConnectionTimeout.into());
            }
        };

        let (reply_tx, reply_rx) = oneshot::channel();
        permit.send(Control::Connect {
            profile,
            connection,
            reply: reply_tx,
        });
        match reply_rx.await {
            Ok(result) => result.map_err(RoomError::from),
            Err(_) => Err(RoomError::Unavailable(self.code.clone())),
        }
    }

    pub async fn info(&self) -> Result<RoomInfo, RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.control
            .send(Control::Info { reply: reply_tx })
            .await
            .map_err(|_| RoomError::Unavailable(self.code.clone()))?;
        reply_rx
            .await
            .map_err(|_| RoomError::Unavailable(self.code.clone()))
    }

    /// Tells the room to close every connection and stop.
    pub async fn shutdown(&self) -> Result<(), RoomError> {
        self.control
            .send(Control::Shutdown)
            .await
            .map_err(|_| RoomError::Unavailable(self.code.clone()))
    }

    /// Time since a player last did anything in this room.
    pub fn idle_for(&self) -> Duration {
        self.activity.idle_for()
    }

    /// `true` once the actor has stopped.
    pub fn is_closed(&self) -> bool {
        self.control.is_closed()
    }
}

/// Last-activity clock shared between the actor and its handles.
struct Activity {
    base: Instant,
    last_ms: AtomicU64,
}

impl Activity {
    fn new() -> Self {
        Self {
            base: Instant::now(),
            last_ms: AtomicU64::new(0),
        }
    }

    fn touch(&self) {
        let ms = self.base.elapsed().as_millis() as u64;
        self.last_ms.store(ms, Ordering::Relaxed);
    }

    fn idle_for(&self) -> Duration {
        let last = Duration::from_millis(self.last_ms.load(Ordering::Relaxed));
        self.base.elapsed().saturating_sub(last)
    }
}

struct RoomActor {
    room: Room,
    config: RoomConfig,
    control: mpsc::Receiver<Control>,
    events_tx: mpsc::Sender<Inbound>,
    events: mpsc::Receiver<Inbound>,
    disconnects_tx: mpsc::Sender<PlayerId>,
    disconnects: mpsc::Receiver<PlayerId>,
    shutdown: watch::Sender<bool>,
    ticker: TickScheduler,
    activity: Arc<Activity>,
    closed: mpsc::UnboundedSender<RoomCode>,
    /// Set once the first player joins; an empty room after that stops.
    occupied: bool,
}

impl RoomActor {
    async fn run(mut self) {
        info!(code = %self.room.code(), "room actor started");
        self.ticker.set_paused(self.room.is_idle());

        loop {
            tokio::select! {
                control = self.control.recv() => {
                    let Some(control) = control else { break };
                    if !self.handle_control(control).await {
                        break;
                    }
                }
                Some(id) = self.disconnects.recv() => {
                    self.activity.touch();
                    self.room.remove_player(id);
                }
                Some(inbound) = self.events.recv() => {
                    self.activity.touch();
                    let _ = self.room.handle_command(inbound.sender, inbound.command);
                }
                tick = self.ticker.wait_for_tick() => {
                    self.room.tick(tick.elapsed);
                    self.ticker.record_tick_end();
                }
            }

            self.drop_overflowed();
            if self.occupied && self.room.is_empty() {
                info!(code = %self.room.code(), "room empty");
                break;
            }
            self.ticker.set_paused(self.room.is_idle());
        }

        self.control.close();
        let _ = self.shutdown.send(true);
        let _ = self.closed.send(self.room.code().clone());
        info!(code = %self.room.code(), "room actor stopped");
    }

    /// Returns `false` when the actor should stop.
    async fn handle_control(&mut self, control: Control) -> bool {
        match control {
            Control::Connect {
                profile,
                connection,
                reply,
            } => {
                self.activity.touch();
                if let Err(reason) = self.room.admit() {
                    debug!(code = %self.room.code(), %reason, "connection refused");
                    let config = self.config.connection.clone();
                    tokio::spawn(async move {
                        let _ = connection.reject(reason, &config).await;
                    });
                    let _ = reply.send(Err(reason));
                    return true;
                }

                let id = PlayerId::new();
                let channels = RoomChannels {
                    events: self.events_tx.clone(),
                    disconnects: self.disconnects_tx.clone(),
                    shutdown: self.shutdown.subscribe(),
                };
                let handle = connection
                    .start(id, channels, self.config.connection.clone())
                    .await;
                let result = self.room.add_player(id, profile, handle).map(|()| id);
                if result.is_ok() {
                    self.occupied = true;
                }
                let _ = reply.send(result);
                true
            }
            Control::Info { reply } => {
                let _ = reply.send(self.room.info());
                true
            }
            Control::Shutdown => {
                info!(code = %self.room.code(), "room shutting down");
                false
            }
        }
    }

    fn drop_overflowed(&mut self) {
        for id in self.room.take_overflowed() {
            warn!(code = %self.room.code(), player_id = %id, "outbound queue full, dropping player");
            self.room.remove_player(id);
        }
    }
}

/// Spawns a room actor and returns a handle to it.
///
/// The room's code is pushed onto `closed` when the actor stops.
pub(crate) fn spawn_room(
    code: RoomCode,
    words: Arc<WordBank>,
    config: RoomConfig,
    closed: mpsc::UnboundedSender<RoomCode>,
) -> RoomHandle {
    let room = Room::new(code, words);
    let channel_size = config.event_channel_size.max(1);
    let (control_tx, control_rx) = mpsc::channel(channel_size);
    let (events_tx, events_rx) = mpsc::channel(channel_size);
    let (disconnects_tx, disconnects_rx) = mpsc::channel(channel_size);
    let (shutdown, _) = watch::channel(false);
    let activity = Arc::new(Activity::new());

    let handle = RoomHandle {
        code: room.code().clone(),
        control: control_tx,
        activity: Arc::clone(&activity),
        connection: config.connection.clone(),
        connect_timeout: config.connect_timeout,
    };

    let actor = RoomActor {
        room,
        ticker: TickScheduler::new(config.tick.clone()),
        config,
        control: control_rx,
        events_tx,
        events: events_rx,
        disconnects_tx,
        disconnects: disconnects_rx,
        shutdown,
        activity,
        closed,
        occupied: false,
    };
    tokio::spawn(actor.run());
    handle
}
