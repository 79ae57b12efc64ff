use huddle_core::{ClientMessage, ServerMessage};
use serde_json::json;

use crate::utils::TestConn;
use crate::{create_test_relay, init_tracing};

#[tokio::test]
async fn offer_not_relayed_to_media_closed_peer() {
    init_tracing();

    let (relay, _router, _observer) = create_test_relay();

    let mut alice = TestConn::connect(&relay).await;
    let mut bob = TestConn::connect(&relay).await;

    alice.join("R1", "Alice", "host").await;
    alice.expect_response().await;
    bob.join("R1", "Bob", "guest").await;
    bob.expect_response().await;
    alice.expect_member_joined().await;

    alice.send(ClientMessage::MediaOpened).await;
    alice.recv().await; // ack

    // Bob never opened media, so nothing may reach him.
    alice
        .send(ClientMessage::SendOffer {
            to: bob.id.clone(),
            offer: json!({ "type": "offer", "sdp": "v=0" }),
        })
        .await;
    bob.expect_silence().await;

    // Once Bob opens media the same offer goes through.
    bob.send(ClientMessage::MediaOpened).await;
    bob.recv().await; // ack

    alice
        .send(ClientMessage::SendOffer {
            to: bob.id.clone(),
            offer: json!({ "type": "offer", "sdp": "v=0" }),
        })
        .await;
    match bob.recv().await {
        Some(ServerMessage::ReceiveOffer { data }) => {
            assert_eq!(data.id, alice.id);
            assert_eq!(data.name, "Alice");
            assert_eq!(data.offer["sdp"], "v=0");
        }
        other => panic!("expected receive-offer, got {other:?}"),
    }
}
