use crate::utils::TestConn;
use crate::{create_test_relay, init_tracing};

#[tokio::test]
async fn disconnect_behaves_like_leave() {
    init_tracing();

    let (relay, _router, observer) = create_test_relay();

    let mut alice = TestConn::connect(&relay).await;
    let bob = TestConn::connect(&relay).await;

    alice.join("R1", "Alice", "host").await;
    alice.expect_response().await;
    bob.join("R1", "Bob", "guest").await;
    alice.expect_member_joined().await;

    // Bob's socket drops. The room is told he is gone, same as a leave.
    let bob_id = bob.id.clone();
    bob.disconnect().await;

    let left = alice.expect_member_left().await;
    assert_eq!(left.id, bob_id);
    assert!(observer.wait_for_events(3, 1000).await);
    assert!(observer.has_leave(&bob_id, "R1").await);
}
