//! HTTP routes: the health check and the two WebSocket entry points.
//!
//! ```text
//! GET /             → 200 "OK"
//! GET /host         → upgrade, create a room, join it as host
//! GET /join/{code}  → upgrade, join an existing room
//! ```
//!
//! The player's profile rides in the query string of both upgrade
//! routes. Anything else is a 404 from the router.

use std::sync::Arc;

use axum::Router;
use axum::extract::ws::{WebSocket, WebSocketUpgrade};
use axum::extract::{Path, Query, State};
use axum::response::Response;
use axum::routing::get;
use scrawl_protocol::{
    JoinRejection, PlayerProfile, RoomCode, is_hex_color, sanitize_avatar_seed, sanitize_username,
};
use scrawl_room::RoomHandle;
use scrawl_transport::Connection;
use serde::Deserialize;
use tracing::{debug, info};

use crate::ScrawlError;
use crate::server::ServerState;

/// Profile fields accepted on `/host` and `/join/{code}`.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub(crate) struct ProfileQuery {
    username: String,
    avatar_seed: String,
    avatar_color: String,
}

impl ProfileQuery {
    /// Applies the same cleaning as profile updates. A color that is not
    /// `#rgb`/`#rrggbb` is dropped.
    pub(crate) fn into_profile(self) -> PlayerProfile {
        PlayerProfile {
            username: sanitize_username(&self.username),
            avatar_seed: sanitize_avatar_seed(&self.avatar_seed),
            avatar_color: if is_hex_color(&self.avatar_color) {
                self.avatar_color
            } else {
                String::new()
            },
        }
    }
}

pub(crate) fn router(state: Arc<ServerState>) -> Router {
    Router::new()
        .route("/", get(health))
        .route("/host", get(host))
        .route("/join/{code}", get(join))
        .with_state(state)
}

async fn health() -> &'static str {
    "OK"
}

async fn host(
    ws: WebSocketUpgrade,
    Query(query): Query<ProfileQuery>,
    State(state): State<Arc<ServerState>>,
) -> Response {
    let profile = query.into_profile();
    limit(ws, &state).on_upgrade(move |socket| async move {
        let room = state.rooms.create_room().await;
        if let Err(e) = enter_room(room, profile, socket).await {
            debug!(error = %e, "host connection ended with error");
        }
    })
}

/// Malformed and unknown codes both upgrade and then close with
/// `ROOM_NOT_FOUND`, so clients see one failure mode.
async fn join(
    ws: WebSocketUpgrade,
    Path(code): Path<String>,
    Query(query): Query<ProfileQuery>,
    State(state): State<Arc<ServerState>>,
) -> Response {
    let profile = query.into_profile();
    limit(ws, &state).on_upgrade(move |socket| async move {
        let found = match RoomCode::parse(&code) {
            Some(code) => state.rooms.get(&code).await.map_err(|e| e.rejection()),
            None => Err(JoinRejection::RoomNotFound),
        };
        let result = match found {
            Ok(room) => enter_room(room, profile, socket).await,
            Err(reason) => {
                debug!(%code, %reason, "join refused");
                Connection::from_axum(socket)
                    .reject(reason, &state.connection)
                    .await
                    .map_err(ScrawlError::from)
            }
        };
        if let Err(e) = result {
            debug!(error = %e, "join connection ended with error");
        }
    })
}

/// Strokes are the largest frames; nothing bigger is read off the wire.
fn limit(ws: WebSocketUpgrade, state: &ServerState) -> WebSocketUpgrade {
    let max = state.connection.max_stroke_message_size;
    ws.max_message_size(max).max_frame_size(max)
}

async fn enter_room(
    room: RoomHandle,
    profile: PlayerProfile,
    socket: WebSocket,
) -> Result<(), ScrawlError> {
    let username = profile.username.clone();
    let player_id = room.connect(profile, Connection::from_axum(socket)).await?;
    info!(code = %room.code(), %player_id, %username, "player connected");
    Ok(())
}
