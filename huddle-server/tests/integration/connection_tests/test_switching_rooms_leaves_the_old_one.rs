use huddle_core::{ClientMessage, ResponseData};

use crate::utils::TestConn;
use crate::{create_test_relay, init_tracing};

#[tokio::test]
async fn switching_rooms_leaves_the_old_one() {
    init_tracing();

    let (relay, _router, _observer) = create_test_relay();

    let mut alice = TestConn::connect(&relay).await;
    let mut bob = TestConn::connect(&relay).await;
    let mut carol = TestConn::connect(&relay).await;

    alice.join("R1", "Alice", "host").await;
    alice.expect_response().await;
    bob.join("R1", "Bob", "guest").await;
    bob.expect_response().await;
    alice.expect_member_joined().await;
    carol.join("R2", "Carol", "host").await;
    carol.expect_response().await;

    // Alice moves to R2: the new room hears a join, the old room's removal
    // is silent.
    alice.join("R2", "Alice", "host").await;
    let (code, _, data) = alice.expect_response().await;
    assert_eq!(code, 200);
    let Some(ResponseData::Profile(profile)) = data else {
        panic!("no profile in join response");
    };
    assert_eq!(profile.room_id.as_deref(), Some("R2"));
    assert_eq!(carol.expect_member_joined().await.id, alice.id);
    bob.expect_silence().await;

    // Bob's chat stays inside R1 and no longer reaches Alice.
    bob.send(ClientMessage::SendMessage {
        message: "anyone here?".to_string(),
    })
    .await;
    bob.expect_response().await;
    alice.expect_silence().await;
}
