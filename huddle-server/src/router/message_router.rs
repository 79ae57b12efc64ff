use axum::extract::ws::Message;
use bytes::Bytes;
use dashmap::DashMap;
use huddle_core::{ClientId, ServerMessage};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{error, warn};

struct RouterInner {
    peers: DashMap<ClientId, mpsc::UnboundedSender<Message>>,
}

/// Per-socket send buffers and the delivery primitives over them.
///
/// Each connection gets its own unbounded channel drained by that socket's
/// send task, so a stalled peer never blocks delivery to the others.
/// Delivery is fire and forget: serialization and transport failures are
/// logged and swallowed, a closed or missing peer is skipped.
#[derive(Clone)]
pub struct MessageRouter {
    inner: Arc<RouterInner>,
}

impl MessageRouter {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RouterInner {
                peers: DashMap::new(),
            }),
        }
    }

    pub fn add_peer(&self, id: ClientId, tx: mpsc::UnboundedSender<Message>) {
        self.inner.peers.insert(id, tx);
    }

    /// Forget a connection. Dropping the sender ends the socket's send task
    /// and with it the socket itself.
    pub fn remove_peer(&self, id: &ClientId) {
        self.inner.peers.remove(id);
    }

    pub fn is_open(&self, id: &ClientId) -> bool {
        self.inner
            .peers
            .get(id)
            .is_some_and(|tx| !tx.is_closed())
    }

    fn encode(msg: &ServerMessage) -> Option<Message> {
        match serde_json::to_string(msg) {
            Ok(json) => Some(Message::Text(json.into())),
            Err(e) => {
                error!("Failed to serialize outbound message: {}", e);
                None
            }
        }
    }

    /// Send to exactly one open connection.
    pub fn unicast(&self, id: &ClientId, msg: &ServerMessage) {
        let Some(frame) = Self::encode(msg) else {
            return;
        };
        match self.inner.peers.get(id) {
            Some(tx) => {
                if let Err(e) = tx.send(frame) {
                    error!("Failed to queue message for {}: {}", id, e);
                }
            }
            None => warn!("Attempted to send to unknown client {}", id),
        }
    }

    /// Send to every open connection except `exclude`. A filter may claim
    /// a connection as already handled, in which case the default send is
    /// skipped for it; callers use this to scope a broadcast to a room
    /// without a second scan.
    pub fn broadcast(
        &self,
        exclude: &ClientId,
        msg: &ServerMessage,
        filter: Option<&dyn Fn(&ClientId) -> bool>,
    ) {
        let Some(frame) = Self::encode(msg) else {
            return;
        };
        for entry in self.inner.peers.iter() {
            let id = entry.key();
            if id == exclude || entry.value().is_closed() {
                continue;
            }
            if filter.is_some_and(|handled| handled(id)) {
                continue;
            }
            if let Err(e) = entry.value().send(frame.clone()) {
                error!("Broadcast send to {} failed: {}", id, e);
            }
        }
    }

    /// Send to exactly the given ids. Returns the subset that was not
    /// reachable (unknown, closed, or the send failed) so the caller can
    /// report partial delivery.
    pub fn multicast(&self, ids: &[ClientId], msg: &ServerMessage) -> Vec<ClientId> {
        let Some(frame) = Self::encode(msg) else {
            return ids.to_vec();
        };
        let mut unreached = Vec::new();
        for id in ids {
            let reached = match self.inner.peers.get(id) {
                Some(tx) if !tx.is_closed() => tx.send(frame.clone()).is_ok(),
                _ => false,
            };
            if !reached {
                unreached.push(id.clone());
            }
        }
        unreached
    }

    /// Queue a transport-level ping on one socket.
    pub fn transport_ping(&self, id: &ClientId) {
        if let Some(tx) = self.inner.peers.get(id) {
            let _ = tx.send(Message::Ping(Bytes::new()));
        }
    }

    pub fn open_count(&self) -> usize {
        self.inner
            .peers
            .iter()
            .filter(|entry| !entry.value().is_closed())
            .count()
    }
}

impl Default for MessageRouter {
    fn default() -> Self {
        Self::new()
    }
}
