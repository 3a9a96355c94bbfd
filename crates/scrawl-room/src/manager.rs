//! Room manager: creates rooms by code and tracks the live ones.

use std::collections::HashMap;
use std::sync::{Arc, Weak};
use std::time::Duration;

use scrawl_protocol::RoomCode;
use tokio::sync::{RwLock, mpsc};
use tokio::time::{self, Instant};
use tracing::{debug, info};

use crate::actor::spawn_room;
use crate::{RoomConfig, RoomError, RoomHandle, RoomInfo, WordBank};

/// Every live room, keyed by its join code.
///
/// Rooms remove themselves when their actor stops; a background task
/// also shuts down rooms that have been idle for longer than
/// [`RoomConfig::idle_timeout`].
pub struct RoomManager {
    rooms: RwLock<HashMap<RoomCode, RoomHandle>>,
    words: Arc<WordBank>,
    config: RoomConfig,
    closed: mpsc::UnboundedSender<RoomCode>,
}

impl RoomManager {
    /// Creates a manager and spawns its maintenance task. The task stops
    /// once the manager is dropped.
    pub fn start(words: Arc<WordBank>, config: RoomConfig) -> Arc<Self> {
        let (closed_tx, closed_rx) = mpsc::unbounded_channel();
        let interval = config.eviction_interval;
        let manager = Arc::new(Self {
            rooms: RwLock::new(HashMap::new()),
            words,
            config,
            closed: closed_tx,
        });
        tokio::spawn(maintain(Arc::downgrade(&manager), closed_rx, interval));
        manager
    }

    /// Spawns a room under a fresh, unused code.
    pub async fn create_room(&self) -> RoomHandle {
        let mut rooms = self.rooms.write().await;
        let code = loop {
            let code = RoomCode::generate(&mut rand::rng());
            if !rooms.contains_key(&code) {
                break code;
            }
        };
        let handle = spawn_room(
            code.clone(),
            Arc::clone(&self.words),
            self.config.clone(),
            self.closed.clone(),
        );
        rooms.insert(code.clone(), handle.clone());
        info!(%code, rooms = rooms.len(), "room created");
        handle
    }

    pub async fn get(&self, code: &RoomCode) -> Result<RoomHandle, RoomError> {
        self.rooms
            .read()
            .await
            .get(code)
            .cloned()
            .ok_or_else(|| RoomError::NotFound(code.clone()))
    }

    /// Forgets a room and tells it to shut down.
    pub async fn remove(&self, code: &RoomCode) -> Result<(), RoomError> {
        let handle = self
            .rooms
            .write()
            .await
            .remove(code)
            .ok_or_else(|| RoomError::NotFound(code.clone()))?;
        let _ = handle.shutdown().await;
        info!(%code, "room removed");
        Ok(())
    }

    pub async fn room_count(&self) -> usize {
        self.rooms.read().await.len()
    }

    /// Info for every room that answers. Rooms that are shutting down are
    /// skipped.
    pub async fn list(&self) -> Vec<RoomInfo> {
        let handles: Vec<RoomHandle> = self.rooms.read().await.values().cloned().collect();
        let mut infos = Vec::with_capacity(handles.len());
        for handle in handles {
            if let Ok(info) = handle.info().await {
                infos.push(info);
            }
        }
        infos
    }

    /// Drops a room whose actor has stopped.
    async fn forget_closed(&self, code: &RoomCode) {
        let mut rooms = self.rooms.write().await;
        if rooms.get(code).is_some_and(RoomHandle::is_closed) {
            rooms.remove(code);
            debug!(%code, rooms = rooms.len(), "room closed");
        }
    }

    /// Shuts down rooms idle for longer than the configured timeout.
    async fn evict_idle(&self) {
        let idle: Vec<RoomHandle> = self
            .rooms
            .read()
            .await
            .values()
            .filter(|h| h.idle_for() >= self.config.idle_timeout)
            .cloned()
            .collect();
        for handle in idle {
            info!(code = %handle.code(), idle_secs = handle.idle_for().as_secs(), "evicting idle room");
            let _ = self.remove(handle.code()).await;
        }
    }
}

async fn maintain(
    manager: Weak<RoomManager>,
    mut closed: mpsc::UnboundedReceiver<RoomCode>,
    interval: Duration,
) {
    let mut eviction = time::interval_at(Instant::now() + interval, interval);
    loop {
        tokio::select! {
            code = closed.recv() => {
                let (Some(code), Some(manager)) = (code, manager.upgrade()) else {
                    break;
                };
                manager.forget_closed(&code).await;
            }
            _ = eviction.tick() => {
                let Some(manager) = manager.upgrade() else {
                    break;
                };
                manager.evict_idle().await;
            }
        }
    }
    debug!("room maintenance stopped");
}
