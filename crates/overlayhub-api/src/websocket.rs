//! WebSocket endpoint.
//!
//! Each socket becomes a hub peer. Outbound traffic is queued on the peer's
//! bounded channel and drained by a dedicated sender task; inbound frames
//! are dispatched one at a time, in arrival order.

use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
};
use futures::{SinkExt, StreamExt};
use serde_json::{json, Value};
use tracing::{debug, error, info};

use crate::inbound;
use crate::state::AppState;

/// Capabilities advertised in the welcome message.
pub const SERVER_FEATURES: [&str; 4] = [
    "dom_analysis",
    "screenshot",
    "overlay_drawing",
    "voice_commands",
];

pub const PROTOCOL_VERSION: &str = "1.0.0";

/// First message every peer receives.
pub fn welcome_message(client_id: &str) -> Value {
    json!({
        "type": "welcome",
        "client_id": client_id,
        "server_info": {
            "version": PROTOCOL_VERSION,
            "features": SERVER_FEATURES,
        },
    })
}

/// WebSocket upgrade handler.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let (client_id, mut rx) = state.hub.connect();
    info!("WebSocket connected: {}", client_id);

    let (mut sender, mut receiver) = socket.split();

    let welcome = welcome_message(&client_id).to_string();
    if sender.send(Message::Text(welcome.into())).await.is_err() {
        state.hub.disconnect(&client_id);
        return;
    }

    let sender_task = tokio::spawn(async move {
        while let Some(text) = rx.recv().await {
            if sender.send(Message::Text(text.into())).await.is_err() {
                break;
            }
        }
    });

    while let Some(result) = receiver.next().await {
        match result {
            Ok(Message::Text(text)) => {
                debug!("Received from {}: {}", client_id, text.as_str());
                inbound::dispatch(&state, &client_id, text.as_str()).await;
            }
            Ok(Message::Close(_)) => {
                info!("WebSocket closed: {}", client_id);
                break;
            }
            Err(e) => {
                error!("WebSocket error on {}: {}", client_id, e);
                break;
            }
            _ => {}
        }
    }

    if let Some(peer) = state.hub.disconnect(&client_id) {
        info!("WebSocket disconnected: {} ({})", client_id, peer.role);
    }
    sender_task.abort();
}
