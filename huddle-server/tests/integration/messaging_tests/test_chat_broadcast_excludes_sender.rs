use huddle_core::{ClientMessage, ServerMessage};

use crate::utils::TestConn;
use crate::{create_test_relay, init_tracing};

#[tokio::test]
async fn chat_broadcast_excludes_sender() {
    init_tracing();

    let (relay, _router, observer) = create_test_relay();

    let mut alice = TestConn::connect(&relay).await;
    let mut bob = TestConn::connect(&relay).await;
    let mut carol = TestConn::connect(&relay).await;
    let mut dave = TestConn::connect(&relay).await;

    alice.join("R1", "Alice", "host").await;
    alice.expect_response().await;
    bob.join("R1", "Bob", "guest").await;
    bob.expect_response().await;
    carol.join("R1", "Carol", "guest").await;
    carol.expect_response().await;
    dave.join("R2", "Dave", "host").await;
    dave.expect_response().await;

    alice.expect_member_joined().await;
    alice.expect_member_joined().await;
    bob.expect_member_joined().await;

    alice
        .send(ClientMessage::SendMessage {
            message: "hello room".to_string(),
        })
        .await;

    for peer in [&mut bob, &mut carol] {
        match peer.recv().await {
            Some(ServerMessage::Message { message, data }) => {
                assert_eq!(message, "hello room");
                assert_eq!(data.id, alice.id);
                assert_eq!(data.name, "Alice");
            }
            other => panic!("expected chat message, got {other:?}"),
        }
    }

    // The sender only sees the delivery acknowledgement, and the message
    // never crosses the room boundary.
    let (code, _, _) = alice.expect_response().await;
    assert_eq!(code, 200);
    alice.expect_silence().await;
    dave.expect_silence().await;

    assert!(observer.wait_for_events(5, 1000).await);
}
