use crate::registry::client::ClientState;
use huddle_core::ClientId;
use std::collections::HashMap;
use std::time::{SystemTime, UNIX_EPOCH};

/// Table of live connections. Owned by the relay actor; all structural
/// mutation goes through that single writer.
#[derive(Debug, Default)]
pub struct ClientRegistry {
    clients: HashMap<ClientId, ClientState>,
}

impl ClientRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a record for a fresh connection. The id mixes the origin, the
    /// connect timestamp and the current table size; enough entropy that
    /// collisions among live connections do not occur in practice.
    pub fn register(&mut self, origin: &str) -> ClientId {
        let now_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);
        let id = ClientId::derive(origin, now_ms, self.clients.len());
        self.clients.insert(id.clone(), ClientState::new(id.clone()));
        id
    }

    pub fn find(&self, id: &ClientId) -> Option<&ClientState> {
        self.clients.get(id)
    }

    pub fn find_mut(&mut self, id: &ClientId) -> Option<&mut ClientState> {
        self.clients.get_mut(id)
    }

    pub fn remove(&mut self, id: &ClientId) -> Option<ClientState> {
        self.clients.remove(id)
    }

    pub fn mark_alive(&mut self, id: &ClientId) {
        if let Some(state) = self.clients.get_mut(id) {
            state.alive = true;
        }
    }

    /// Connections that did not answer a heartbeat since the last sweep.
    pub fn unresponsive(&self) -> Vec<ClientId> {
        self.clients
            .values()
            .filter(|s| !s.alive)
            .map(|s| s.id.clone())
            .collect()
    }

    /// Clear every liveness flag so the next heartbeat round has to prove
    /// liveness again.
    pub fn reset_liveness(&mut self) {
        for state in self.clients.values_mut() {
            state.alive = false;
        }
    }

    pub fn len(&self) -> usize {
        self.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }
}
