use huddle_core::{ClientId, MemberInfo, PeerProfile};

/// Room a connection currently sits in, with its slot in that room's
/// roster. The index is kept in sync by the roster's re-index pass on every
/// removal.
#[derive(Debug, Clone, PartialEq)]
pub struct RoomMembership {
    pub room_id: String,
    pub index: usize,
}

/// Server-side record for one live connection.
#[derive(Debug)]
pub struct ClientState {
    pub id: ClientId,
    pub name: String,
    pub role: String,
    pub room: Option<RoomMembership>,
    /// Cleared by the sweep, set again by each heartbeat pong.
    pub alive: bool,
    /// Whether this connection signaled willingness to exchange media.
    pub media_open: bool,
}

impl ClientState {
    pub(crate) fn new(id: ClientId) -> Self {
        Self {
            id,
            name: String::new(),
            role: String::new(),
            room: None,
            alive: true,
            media_open: false,
        }
    }

    pub fn profile(&self) -> PeerProfile {
        PeerProfile {
            id: Some(self.id.clone()),
            name: self.name.clone(),
            role: self.role.clone(),
            room_id: self.room.as_ref().map(|m| m.room_id.clone()),
        }
    }

    pub fn member_info(&self) -> MemberInfo {
        MemberInfo {
            id: self.id.clone(),
            name: self.name.clone(),
        }
    }

    pub fn in_room(&self, room_id: &str) -> bool {
        self.room.as_ref().is_some_and(|m| m.room_id == room_id)
    }
}
