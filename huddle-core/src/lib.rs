pub mod model;

pub use model::{
    AnswerForward, CandidateAction, CandidateForward, ClientId, ClientMessage,
    DEFAULT_STUN_SERVERS, IceServerConfig, MediaPeers, MemberInfo, Negotiation, NegotiationState,
    OfferForward, PeerProfile, ResponseData, ServerMessage, vocabulary,
};
