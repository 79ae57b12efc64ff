use axum::extract::ws::Message;
use huddle_core::ClientMessage;

use crate::utils::TestConn;
use crate::{create_test_relay, init_tracing};

#[tokio::test]
async fn heartbeat_ping_gets_transport_reply() {
    init_tracing();

    let (relay, _router, _observer) = create_test_relay();

    let mut alice = TestConn::connect(&relay).await;
    alice.send(ClientMessage::Ping).await;

    match alice.recv_raw().await {
        Some(Message::Ping(_)) => {}
        other => panic!("expected a transport ping, got {other:?}"),
    }
}
