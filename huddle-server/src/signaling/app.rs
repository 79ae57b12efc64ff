use crate::relay::RelayHandle;
use crate::router::MessageRouter;
use crate::signaling::ws_handler;
use axum::Json;
use axum::Router;
use axum::routing::{get, post};
use huddle_core::vocabulary;
use std::collections::BTreeMap;

#[derive(Clone)]
pub struct AppState {
    pub router: MessageRouter,
    pub relay: RelayHandle,
}

/// The relay's HTTP surface: the WebSocket endpoint and the type-tag
/// vocabulary clients fetch at startup.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/ws", get(ws_handler))
        .route("/types", post(vocabulary_handler))
        .with_state(state)
}

async fn vocabulary_handler() -> Json<BTreeMap<&'static str, &'static str>> {
    Json(vocabulary())
}
