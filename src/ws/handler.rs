//! WebSocket upgrade handler

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};

use crate::app::AppState;
use crate::game::{ArenaHandle, ConnectionId, PlayerId};
use crate::util::rate_limit::{ConnectionRateLimiter, InputCheck};
use crate::ws::protocol::{ClientMsg, ServerMsg};

/// Longest a single frame write may take before the client is dropped
const SEND_TIMEOUT: Duration = Duration::from_secs(2);

type WsSink = SplitSink<WebSocket, Message>;

/// WebSocket upgrade handler
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Handle the upgraded WebSocket connection
async fn handle_socket(socket: WebSocket, state: AppState) {
    let connection = ConnectionId::new();
    info!(conn_id = %connection, "Player connected");

    let (mut ws_sink, ws_stream) = socket.split();
    let arena = state.arena.clone();

    // Subscribe before joining so no snapshot with the new player is missed
    let frames = arena.subscribe();

    let welcome = match arena.connect(connection).await {
        Ok(welcome) => welcome,
        Err(e) => {
            error!(conn_id = %connection, error = %e, "Failed to join arena");
            return;
        }
    };
    let player_id = welcome.player_id;

    // init goes to this connection only
    if let Err(e) = send_msg(&mut ws_sink, &ServerMsg::from(welcome)).await {
        debug!(player_id, error = %e, "Failed to send init");
        let _ = arena.disconnect(connection).await;
        return;
    }

    let rate_limiter = ConnectionRateLimiter::new(state.config.input_rate_limit);
    run_session(connection, player_id, &arena, ws_sink, ws_stream, frames, rate_limiter).await;

    // Cleanup on disconnect
    if let Err(e) = arena.disconnect(connection).await {
        warn!(player_id, error = %e, "Failed to report disconnect");
    }

    info!(player_id, conn_id = %connection, "WebSocket connection closed");
}

/// Run the WebSocket session with read/write split
async fn run_session(
    connection: ConnectionId,
    player_id: PlayerId,
    arena: &ArenaHandle,
    ws_sink: WsSink,
    mut ws_stream: SplitStream<WebSocket>,
    frames: broadcast::Receiver<Arc<str>>,
    mut rate_limiter: ConnectionRateLimiter,
) {
    // Spawn writer task: snapshots -> WebSocket
    let mut writer = tokio::spawn(forward_frames(player_id, ws_sink, frames));

    // Reader loop: WebSocket -> arena
    loop {
        tokio::select! {
            _ = &mut writer => {
                debug!(player_id, "Writer finished, closing session");
                break;
            }
            next = ws_stream.next() => {
                let Some(result) = next else {
                    break;
                };
                match result {
                    Ok(Message::Text(text)) => {
                        match rate_limiter.check_input() {
                            InputCheck::Allowed { dropped } => {
                                if dropped > 0 {
                                    debug!(player_id, dropped, "Input burst ended");
                                }
                            }
                            InputCheck::BurstStarted => {
                                warn!(player_id, "Rate limiting input messages");
                                continue;
                            }
                            InputCheck::Dropped => continue,
                        }
                        if dispatch(connection, player_id, arena, &text).await.is_err() {
                            debug!(player_id, "Arena closed");
                            break;
                        }
                    }
                    Ok(Message::Binary(_)) => {
                        warn!(player_id, "Received binary message, ignoring");
                    }
                    Ok(Message::Ping(_)) | Ok(Message::Pong(_)) => {}
                    Ok(Message::Close(_)) => {
                        info!(player_id, "Client initiated close");
                        break;
                    }
                    Err(e) => {
                        debug!(player_id, error = %e, "WebSocket error");
                        break;
                    }
                }
            }
        }
    }

    // Abort writer task
    writer.abort();
}

/// Route one text frame to the arena; Err only when the arena is gone
async fn dispatch(
    connection: ConnectionId,
    player_id: PlayerId,
    arena: &ArenaHandle,
    text: &str,
) -> Result<(), crate::game::ArenaError> {
    match serde_json::from_str::<ClientMsg>(text) {
        Ok(ClientMsg::PlayerInput(input)) => arena.input(connection, input).await,
        Ok(ClientMsg::ChangeName(name)) => arena.change_name(connection, name).await,
        Err(e) => {
            warn!(player_id, error = %e, "Failed to parse client message");
            Ok(())
        }
    }
}

/// Forward broadcast frames to one client until it fails or falls away
async fn forward_frames(
    player_id: PlayerId,
    mut ws_sink: WsSink,
    mut frames: broadcast::Receiver<Arc<str>>,
) {
    loop {
        match frames.recv().await {
            Ok(frame) => {
                let send = ws_sink.send(Message::Text(frame.to_string()));
                match tokio::time::timeout(SEND_TIMEOUT, send).await {
                    Ok(Ok(())) => {}
                    Ok(Err(e)) => {
                        debug!(player_id, error = %e, "WebSocket send failed");
                        break;
                    }
                    Err(_) => {
                        warn!(player_id, "WebSocket send timed out");
                        break;
                    }
                }
            }
            Err(broadcast::error::RecvError::Lagged(n)) => {
                warn!(player_id, lagged_count = n, "Client lagged, skipping {} snapshots", n);
                // Continue - don't disconnect for lag
            }
            Err(broadcast::error::RecvError::Closed) => {
                debug!(player_id, "Snapshot channel closed");
                break;
            }
        }
    }
}

/// Send a message over WebSocket
async fn send_msg(sink: &mut WsSink, msg: &ServerMsg) -> Result<(), String> {
    let json = serde_json::to_string(msg).map_err(|e| e.to_string())?;
    sink.send(Message::Text(json))
        .await
        .map_err(|e| e.to_string())
}
