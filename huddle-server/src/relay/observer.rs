use async_trait::async_trait;
use huddle_core::ClientId;

/// Hooks the relay calls after membership and chat events have been
/// broadcast. Embedders attach one to mirror room activity into their own
/// logic; every hook defaults to a no-op.
#[async_trait]
pub trait RelayObserver: Send + Sync + 'static {
    async fn on_join(&self, _id: &ClientId, _room_id: &str) {}

    async fn on_leave(&self, _id: &ClientId, _room_id: &str) {}

    async fn on_message(&self, _id: &ClientId, _text: &str) {}
}

pub struct NoopObserver;

#[async_trait]
impl RelayObserver for NoopObserver {}
