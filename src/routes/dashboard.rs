//! # routes::dashboard
//!
//! Transport layer for the browser dashboard.
//!
//! | Method    | Path            | Description                              |
//! |-----------|-----------------|------------------------------------------|
//! | GET (WS)  | `/ws/dashboard` | Real-time `data_update` / `status_update`|
//! | GET       | `/api/snapshot` | Latest dashboard snapshot (REST)         |
//! | GET       | `/api/status`   | Session status only                      |
//!
//! A freshly connected client is immediately sent the full current snapshot
//! and the current status, so late joiners never start blank. Client
//! disconnects are transport events only — they never touch session state.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
    Json,
};
use futures_util::{SinkExt, StreamExt};
use serde_json::json;
use tracing::{debug, info};

use crate::{events::WsEvent, state::SharedState};

// ─── WebSocket Handler ────────────────────────────────────────────────────────

/// Upgrade HTTP → WebSocket and attach to the broadcast channel.
pub async fn ws_dashboard(
    ws: WebSocketUpgrade,
    State(state): State<SharedState>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: SharedState) {
    let mut rx = state.broadcast_tx.subscribe();
    let (mut sender, mut receiver) = socket.split();

    info!("🔌 dashboard client connected");

    // ── Replay current state to the new client ───────────────────────────────
    let snapshot = state.current_snapshot().await;
    let status = snapshot.status;
    let frames = [
        WsEvent::data(snapshot).to_json(),
        WsEvent::status(status, None).to_json(),
    ];
    for frame in frames {
        if sender.send(Message::Text(frame)).await.is_err() {
            return; // client gone before the replay finished
        }
    }

    // ── Event Loop ────────────────────────────────────────────────────────────
    loop {
        tokio::select! {
            result = rx.recv() => {
                match result {
                    Ok(json_str) => {
                        if sender.send(Message::Text(json_str)).await.is_err() {
                            break; // client disconnect
                        }
                    }
                    Err(tokio::sync::broadcast::error::RecvError::Lagged(n)) => {
                        // Slow reader — its problem, not the session's.
                        debug!("dashboard client lagged, skipped {n} events");
                    }
                    Err(_) => break, // channel closed
                }
            }

            result = receiver.next() => {
                match result {
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(Message::Ping(data))) => {
                        let _ = sender.send(Message::Pong(data)).await;
                    }
                    _ => {} // inbound text/binary is ignored
                }
            }
        }
    }

    info!("🔌 dashboard client disconnected");
}

// ─── REST Endpoints ───────────────────────────────────────────────────────────

/// GET /api/snapshot — the latest full snapshot.
pub async fn get_snapshot(State(state): State<SharedState>) -> impl IntoResponse {
    Json(state.current_snapshot().await)
}

/// GET /api/status — session status only (cheap health probe).
pub async fn get_status(State(state): State<SharedState>) -> impl IntoResponse {
    let snapshot = state.current_snapshot().await;
    Json(json!({
        "status":      snapshot.status,
        "last_update": snapshot.last_update,
    }))
}
