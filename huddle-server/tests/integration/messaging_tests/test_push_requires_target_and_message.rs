use huddle_core::ClientMessage;

use crate::utils::TestConn;
use crate::{create_test_relay, init_tracing};

#[tokio::test]
async fn push_requires_target_and_message() {
    init_tracing();

    let (relay, _router, _observer) = create_test_relay();

    let mut alice = TestConn::connect(&relay).await;
    let bob = TestConn::connect(&relay).await;

    alice
        .send(ClientMessage::PushMessage {
            to: vec![],
            message: "nobody to hear it".to_string(),
        })
        .await;
    let (code, _, _) = alice.expect_response().await;
    assert_eq!(code, 400);

    alice
        .send(ClientMessage::PushMessage {
            to: vec![bob.id.clone()],
            message: String::new(),
        })
        .await;
    let (code, _, _) = alice.expect_response().await;
    assert_eq!(code, 400);
}
