mod client;
mod ice;
mod negotiation;
mod profile;
mod protocol;

pub use client::ClientId;
pub use ice::{DEFAULT_STUN_SERVERS, IceServerConfig};
pub use negotiation::{CandidateAction, Negotiation, NegotiationState};
pub use profile::{MemberInfo, PeerProfile};
pub use protocol::{
    AnswerForward, CandidateForward, ClientMessage, MediaPeers, OfferForward, ResponseData,
    ServerMessage, VOCABULARY, vocabulary,
};
