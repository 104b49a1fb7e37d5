//! WebSocket Transport
//!
//! One persistent bidirectional connection per client (`GET /ws?user=...`).
//! The client selects the task it is viewing with an INIT frame:
//!
//! ```json
//! {"type": "INIT", "taskId": "..."}
//! ```
//!
//! From then on the server pushes `ThreadUpdate` events for that task. A
//! later INIT re-targets the same connection (one active task view per
//! connection). Delivery is best-effort: a receiver that lags out of the
//! broadcast channel just skips ahead, and a gone client is dropped
//! silently.
//!
//! The identity collaborator authenticates upstream; the `user` query
//! parameter carries the already-authenticated display name (browser
//! WebSocket clients cannot set request headers).

use crate::backend::realtime::registry::RealtimeState;
use crate::shared::event::{ClientFrame, ThreadUpdate};
use axum::{
    extract::{
        ws::{Message, WebSocket},
        Query, State, WebSocketUpgrade,
    },
    http::StatusCode,
    response::IntoResponse,
};
use futures_util::{SinkExt, StreamExt};
use std::collections::HashMap;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;

/// Handle the WebSocket upgrade (GET /ws).
///
/// # Errors
///
/// * `400 Bad Request` - if the `user` query parameter is missing or empty
pub async fn handle_socket_upgrade(
    ws: WebSocketUpgrade,
    State(realtime): State<RealtimeState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<impl IntoResponse, StatusCode> {
    let username = params
        .get("user")
        .map(|u| u.trim().to_string())
        .filter(|u| !u.is_empty())
        .ok_or_else(|| {
            tracing::warn!("[Realtime] Socket upgrade rejected: missing user parameter");
            StatusCode::BAD_REQUEST
        })?;

    Ok(ws.on_upgrade(move |socket| run_connection(socket, realtime, username)))
}

/// Drive one live connection until the client goes away.
async fn run_connection(socket: WebSocket, realtime: RealtimeState, username: String) {
    let connection_id = realtime.register(&username);
    let (mut ws_tx, mut ws_rx) = socket.split();

    // Outbound frames funnel through one channel so the update pump and the
    // read loop never contend for the sink.
    let (outbound_tx, mut outbound_rx) = mpsc::channel::<Message>(64);
    let send_task = tokio::spawn(async move {
        while let Some(frame) = outbound_rx.recv().await {
            if ws_tx.send(frame).await.is_err() {
                tracing::debug!("[Realtime] Send failed, client disconnected");
                break;
            }
        }
    });

    // The pump forwarding broadcast updates to this client; replaced on
    // every INIT.
    let mut pump: Option<JoinHandle<()>> = None;

    while let Some(result) = ws_rx.next().await {
        let text = match result {
            Ok(Message::Text(text)) => text,
            Ok(Message::Ping(data)) => {
                let _ = outbound_tx.send(Message::Pong(data)).await;
                continue;
            }
            Ok(Message::Close(_)) => break,
            Ok(_) => continue,
            Err(e) => {
                tracing::warn!("[Realtime] Socket error for {}: {}", username, e);
                break;
            }
        };

        let frame: ClientFrame = match serde_json::from_str(&text) {
            Ok(frame) => frame,
            Err(e) => {
                tracing::warn!("[Realtime] Unparseable client frame from {}: {}", username, e);
                continue;
            }
        };

        match frame {
            ClientFrame::Init { task_id } => {
                tracing::info!("[Realtime] {} now viewing task {}", username, task_id);
                let receiver = realtime.watch(connection_id, task_id);
                if let Some(old) = pump.take() {
                    old.abort();
                }
                pump = Some(spawn_update_pump(receiver, outbound_tx.clone()));
            }
        }
    }

    realtime.unregister(connection_id);
    if let Some(pump) = pump {
        pump.abort();
    }
    send_task.abort();
}

/// Forward a task's broadcast updates to one client's outbound channel.
fn spawn_update_pump(
    mut receiver: broadcast::Receiver<ThreadUpdate>,
    outbound_tx: mpsc::Sender<Message>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            match receiver.recv().await {
                Ok(update) => {
                    let json = match serde_json::to_string(&update) {
                        Ok(json) => json,
                        Err(e) => {
                            tracing::error!("[Realtime] Failed to serialize update: {}", e);
                            continue;
                        }
                    };
                    if outbound_tx.send(Message::Text(json.into())).await.is_err() {
                        break;
                    }
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    // Best-effort delivery: the client reconciles with a
                    // full fetch, so skipping ahead is fine.
                    tracing::warn!("[Realtime] Receiver lagged, skipped {} updates", skipped);
                    continue;
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    })
}
