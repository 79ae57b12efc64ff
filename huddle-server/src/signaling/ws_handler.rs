use crate::signaling::AppState;
use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::http::HeaderMap;
use axum::http::header::ORIGIN;
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};
use huddle_core::{ClientMessage, ServerMessage};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    headers: HeaderMap,
    State(state): State<AppState>,
) -> impl IntoResponse {
    let origin = headers
        .get(ORIGIN)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string();

    ws.on_upgrade(move |socket| handle_socket(socket, origin, state))
}

async fn handle_socket(socket: WebSocket, origin: String, state: AppState) {
    let (mut sender, mut receiver) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel();

    let Some(id) = state.relay.connect(origin, tx).await else {
        error!("Relay unavailable; closing fresh socket");
        return;
    };
    info!("New WebSocket connection: {}", id);

    let mut send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sender.send(msg).await.is_err() {
                break;
            }
        }
    });

    let mut recv_task = tokio::spawn({
        let state = state.clone();
        let id = id.clone();

        async move {
            while let Some(Ok(msg)) = receiver.next().await {
                match msg {
                    Message::Text(text) => match serde_json::from_str::<ClientMessage>(&text) {
                        Ok(frame) => state.relay.frame(id.clone(), frame).await,
                        Err(e) => {
                            warn!("Invalid frame from {}: {}", id, e);
                            state
                                .router
                                .unicast(&id, &ServerMessage::bad_request("unrecognized message"));
                        }
                    },
                    Message::Pong(_) => state.relay.pong(id.clone()).await,
                    Message::Binary(data) => {
                        debug!("Ignoring {} binary bytes from {}", data.len(), id)
                    }
                    Message::Close(_) => break,
                    _ => {}
                }
            }
        }
    });

    tokio::select! {
        _ = (&mut send_task) => recv_task.abort(),
        _ = (&mut recv_task) => send_task.abort(),
    };

    state.relay.disconnect(id.clone()).await;
    info!("WebSocket disconnected: {}", id);
}
