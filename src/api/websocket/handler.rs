//! WebSocket connection handler

use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use tokio::sync::broadcast;
use tracing::debug;

use super::state::AppState;
use crate::types::Metrics;

/// WebSocket upgrade handler for GET /api/ws
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Push the current snapshot, then every broadcast snapshot, until the client leaves
async fn handle_socket(mut socket: WebSocket, state: Arc<AppState>) {
    // Subscribe before reading the current state so no update falls in between
    let mut rx = state.subscribe();
    debug!(clients = state.connected_clients(), "WebSocket client connected");

    if !send_metrics(&mut socket, &state.aggregator.get_metrics()).await {
        return; // Client disconnected immediately
    }

    loop {
        tokio::select! {
            result = rx.recv() => {
                match result {
                    Ok(metrics) => {
                        if !send_metrics(&mut socket, &metrics).await {
                            break; // Client disconnected
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        // Client is too slow; the next snapshot supersedes the missed ones
                        let error_msg = serde_json::json!({
                            "type": "error",
                            "code": "lagged",
                            "message": format!("Missed {} snapshots", n)
                        });
                        let _ = socket.send(Message::Text(error_msg.to_string())).await;
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }

            result = socket.recv() => {
                match result {
                    Some(Ok(Message::Ping(data))) => {
                        let _ = socket.send(Message::Pong(data)).await;
                    }
                    Some(Ok(Message::Close(_))) => break,
                    Some(Ok(_)) => {} // Clients only listen
                    Some(Err(_)) => break,
                    None => break,
                }
            }
        }
    }

    debug!("WebSocket client disconnected");
}

/// Returns false if the client is gone
async fn send_metrics(socket: &mut WebSocket, metrics: &Metrics) -> bool {
    match serde_json::to_string(metrics) {
        Ok(json) => socket.send(Message::Text(json)).await.is_ok(),
        Err(_) => true,
    }
}
