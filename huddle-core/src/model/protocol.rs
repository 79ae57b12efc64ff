use crate::model::client::ClientId;
use crate::model::profile::{MemberInfo, PeerProfile};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Messages a client sends to the relay, one variant per accepted tag.
///
/// SDP and candidate bodies are carried as raw JSON. The relay forwards
/// them verbatim and never inspects them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "kebab-case")]
pub enum ClientMessage {
    #[serde(rename_all = "camelCase")]
    JoinRoom {
        #[serde(default)]
        room_id: Option<String>,
        #[serde(default)]
        name: Option<String>,
        #[serde(default)]
        role: Option<String>,
    },
    LeaveRoom,
    SendMessage {
        message: String,
    },
    PushMessage {
        #[serde(default)]
        to: Vec<ClientId>,
        #[serde(default)]
        message: String,
    },
    SendOffer {
        to: ClientId,
        offer: Value,
    },
    SendAnswer {
        to: ClientId,
        answer: Value,
    },
    SendCandidate {
        #[serde(default)]
        to: Option<ClientId>,
        candidate: Value,
    },
    MediaOpened,
    GetPersonalInfo,
    Ping,
}

/// Messages the relay sends to clients. `code` is only carried by
/// `response`; everything else is an event the client reacts to.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ServerMessage {
    Response {
        code: u16,
        message: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        data: Option<ResponseData>,
    },
    Message {
        message: String,
        data: MemberInfo,
    },
    MemberJoined {
        message: String,
        data: MemberInfo,
    },
    MemberLeft {
        message: String,
        data: MemberInfo,
    },
    ReceiveOffer {
        data: OfferForward,
    },
    ReceiveAnswer {
        data: AnswerForward,
    },
    ReceiveCandidate {
        data: CandidateForward,
    },
    MediaOpenedAck {
        data: MediaPeers,
    },
}

impl ServerMessage {
    pub fn ok(message: impl Into<String>) -> Self {
        Self::Response {
            code: 200,
            message: message.into(),
            data: None,
        }
    }

    pub fn ok_with(message: impl Into<String>, data: ResponseData) -> Self {
        Self::Response {
            code: 200,
            message: message.into(),
            data: Some(data),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::Response {
            code: 400,
            message: message.into(),
            data: None,
        }
    }
}

// Untagged, so the variant with the required `unreached` key must be tried
// first. Every profile field is defaultable and would swallow anything.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResponseData {
    Unreached { unreached: Vec<ClientId> },
    Profile(PeerProfile),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OfferForward {
    pub id: ClientId,
    pub name: String,
    pub offer: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerForward {
    pub id: ClientId,
    pub name: String,
    pub answer: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateForward {
    pub id: ClientId,
    pub name: String,
    pub candidate: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaPeers {
    pub client_ids: Vec<ClientId>,
}

/// Canonical type-tag vocabulary. Served over HTTP at startup so client and
/// server never hardcode divergent literals.
pub const VOCABULARY: &[(&str, &str)] = &[
    ("JOIN_ROOM", "join-room"),
    ("LEAVE_ROOM", "leave-room"),
    ("SEND_MESSAGE", "send-message"),
    ("PUSH_MESSAGE", "push-message"),
    ("SEND_OFFER", "send-offer"),
    ("SEND_ANSWER", "send-answer"),
    ("SEND_CANDIDATE", "send-candidate"),
    ("MEDIA_OPENED", "media-opened"),
    ("GET_PERSONAL_INFO", "get-personal-info"),
    ("PING", "ping"),
    ("RESPONSE", "response"),
    ("MESSAGE", "message"),
    ("MEMBER_JOINED", "member-joined"),
    ("MEMBER_LEFT", "member-left"),
    ("RECEIVE_OFFER", "receive-offer"),
    ("RECEIVE_ANSWER", "receive-answer"),
    ("RECEIVE_CANDIDATE", "receive-candidate"),
    ("MEDIA_OPENED_ACK", "media-opened-ack"),
];

pub fn vocabulary() -> BTreeMap<&'static str, &'static str> {
    VOCABULARY.iter().copied().collect()
}
