//! WebSocket endpoint for live reload.

use std::sync::Arc;

use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::IntoResponse;
use tokio::sync::broadcast;

use crate::state::AppState;

/// Handle WebSocket upgrade for live reload.
pub(crate) async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

/// Forward reload events to one client until either side closes.
async fn handle_socket(mut socket: WebSocket, state: Arc<AppState>) {
    let Some(live_reload) = &state.live_reload else {
        return;
    };
    let mut receiver = live_reload.subscribe();
    tracing::debug!("Live reload client connected");

    loop {
        tokio::select! {
            result = receiver.recv() => match result {
                Ok(event) => {
                    let Ok(text) = serde_json::to_string(&event) else {
                        continue;
                    };
                    if socket.send(Message::Text(text.into())).await.is_err() {
                        break;
                    }
                }
                Err(broadcast::error::RecvError::Closed) => break,
                // A slow client only needs one of the missed reloads.
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::debug!(skipped, "Live reload client lagged");
                }
            },
            result = socket.recv() => {
                if !matches!(result, Some(Ok(_))) {
                    break;
                }
            }
        }
    }

    tracing::debug!("Live reload client disconnected");
}
