use crate::model::client::ClientId;
use serde::{Deserialize, Serialize};

/// What a client knows about itself. The server echoes it back on join and
/// on `get-personal-info`; the browser persists it (minus the id) so a page
/// reload can rejoin silently.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeerProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ClientId>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub role: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberInfo {
    pub id: ClientId,
    pub name: String,
}
