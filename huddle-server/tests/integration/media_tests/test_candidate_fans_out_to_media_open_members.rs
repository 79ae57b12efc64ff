use huddle_core::{ClientMessage, ServerMessage};
use serde_json::json;

use crate::utils::TestConn;
use crate::{create_test_relay, init_tracing};

#[tokio::test]
async fn candidate_fans_out_to_media_open_members() {
    init_tracing();

    let (relay, _router, _observer) = create_test_relay();

    let mut alice = TestConn::connect(&relay).await;
    let mut bob = TestConn::connect(&relay).await;
    let mut carol = TestConn::connect(&relay).await;
    let mut dave = TestConn::connect(&relay).await;

    for (conn, name) in [
        (&alice, "Alice"),
        (&bob, "Bob"),
        (&carol, "Carol"),
        (&dave, "Dave"),
    ] {
        conn.join("R1", name, "guest").await;
    }
    for conn in [&mut alice, &mut bob, &mut carol, &mut dave] {
        // Swallow the join response and any membership notices so far.
        conn.drain().await;
    }

    for conn in [&mut alice, &mut bob, &mut carol] {
        conn.send(ClientMessage::MediaOpened).await;
        conn.recv().await; // ack
    }

    // Targetless candidate from Alice reaches the media-open members only.
    let candidate = json!({ "candidate": "candidate:1 1 udp 2122 127.0.0.1 50000 typ host" });
    alice
        .send(ClientMessage::SendCandidate {
            to: None,
            candidate: candidate.clone(),
        })
        .await;

    for peer in [&mut bob, &mut carol] {
        match peer.recv().await {
            Some(ServerMessage::ReceiveCandidate { data }) => {
                assert_eq!(data.id, alice.id);
                assert_eq!(data.candidate, candidate);
            }
            other => panic!("expected receive-candidate, got {other:?}"),
        }
    }
    dave.expect_silence().await;
    alice.expect_silence().await;
}
