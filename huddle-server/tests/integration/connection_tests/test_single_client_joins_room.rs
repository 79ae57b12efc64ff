use huddle_core::ResponseData;

use crate::utils::TestConn;
use crate::{create_test_relay, init_tracing};

#[tokio::test]
async fn single_client_joins_room() {
    init_tracing();

    let (relay, _router, observer) = create_test_relay();

    let mut alice = TestConn::connect(&relay).await;
    alice.join("R1", "Alice", "host").await;

    let (code, message, data) = alice.expect_response().await;
    assert_eq!(code, 200);
    assert_eq!(message, "success");

    let Some(ResponseData::Profile(profile)) = data else {
        panic!("join response carries no profile");
    };
    assert_eq!(profile.id.as_ref(), Some(&alice.id));
    assert_eq!(profile.name, "Alice");
    assert_eq!(profile.role, "host");
    assert_eq!(profile.room_id.as_deref(), Some("R1"));

    assert!(observer.wait_for_events(1, 1000).await);
    assert!(observer.has_join(&alice.id, "R1").await);
}
