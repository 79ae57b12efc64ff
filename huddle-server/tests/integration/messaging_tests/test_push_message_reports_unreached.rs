use huddle_core::{ClientMessage, ResponseData, ServerMessage};

use crate::utils::TestConn;
use crate::{create_test_relay, init_tracing};

#[tokio::test]
async fn push_message_reports_unreached() {
    init_tracing();

    let (relay, _router, _observer) = create_test_relay();

    let mut alice = TestConn::connect(&relay).await;
    let mut bob = TestConn::connect(&relay).await;
    let gone = TestConn::connect(&relay).await;

    // One target closed its transport without telling anyone.
    let gone_id = gone.close();

    alice
        .send(ClientMessage::PushMessage {
            to: vec![bob.id.clone(), gone_id.clone()],
            message: "direct hello".to_string(),
        })
        .await;

    match bob.recv().await {
        Some(ServerMessage::Message { message, data }) => {
            assert_eq!(message, "direct hello");
            assert_eq!(data.id, alice.id);
        }
        other => panic!("expected pushed message, got {other:?}"),
    }

    let (code, _, data) = alice.expect_response().await;
    assert_eq!(code, 200);
    match data {
        Some(ResponseData::Unreached { unreached }) => assert_eq!(unreached, vec![gone_id]),
        other => panic!("expected unreached report, got {other:?}"),
    }
}
