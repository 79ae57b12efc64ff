use std::cell::RefCell;
use std::rc::Rc;

use huddle_core::{CandidateAction, ClientId, ClientMessage, NegotiationState};
use serde_json::{Value, json};
use wasm_bindgen_futures::JsFuture;

use crate::engine::peer_session::PeerSession;
use crate::engine::{EngineInner, HuddleEngine};
use crate::logger::Logger;

impl HuddleEngine {
    /// Call one discovered peer: create the session, store the offer as
    /// local description and send it tagged with the target's id.
    pub(super) async fn offer_to(inner: Rc<RefCell<EngineInner>>, peer_id: ClientId) {
        if inner.borrow().sessions.contains_key(&peer_id) {
            Logger::warn(&format!("Session with {} already exists", peer_id));
            return;
        }

        let pc = match Self::create_pc(&inner, &peer_id) {
            Ok(pc) => pc,
            Err(e) => {
                Logger::error(&e);
                return;
            }
        };
        Self::attach_local_tracks(&inner, &pc);

        {
            let mut guard = inner.borrow_mut();
            let mut session = PeerSession::new(pc.clone(), String::new());
            session.negotiation.begin_offer();
            guard.sessions.insert(peer_id.clone(), session);
        }

        let offer = match JsFuture::from(pc.create_offer()).await {
            Ok(v) => v,
            Err(e) => {
                Logger::error(&e);
                Self::fail_session(&inner, &peer_id);
                return;
            }
        };
        let Some(sdp) = js_sys::Reflect::get(&offer, &"sdp".into())
            .ok()
            .and_then(|v| v.as_string())
        else {
            Logger::warn("Created offer carries no sdp");
            Self::fail_session(&inner, &peer_id);
            return;
        };

        let desc = web_sys::RtcSessionDescriptionInit::new(web_sys::RtcSdpType::Offer);
        desc.set_sdp(&sdp);
        if let Err(e) = JsFuture::from(pc.set_local_description(&desc)).await {
            Logger::error(&e);
            Self::fail_session(&inner, &peer_id);
            return;
        }

        Self::send_frame(
            &inner,
            &ClientMessage::SendOffer {
                to: peer_id.clone(),
                offer: json!({ "type": "offer", "sdp": sdp }),
            },
        );
        if let Some(session) = inner.borrow_mut().sessions.get_mut(&peer_id) {
            session.negotiation.offer_dispatched();
        }
    }

    /// Inbound offer: create the session when none exists, apply the
    /// remote description, answer. A session that already has a remote
    /// description drops the offer as a duplicate.
    pub(super) async fn handle_remote_offer(
        inner: Rc<RefCell<EngineInner>>,
        from: ClientId,
        name: String,
        offer: Value,
    ) {
        if !inner.borrow().sessions.contains_key(&from) {
            let pc = match Self::create_pc(&inner, &from) {
                Ok(pc) => pc,
                Err(e) => {
                    Logger::error(&e);
                    return;
                }
            };
            Self::attach_local_tracks(&inner, &pc);
            inner
                .borrow_mut()
                .sessions
                .insert(from.clone(), PeerSession::new(pc, name.clone()));
        }

        let (pc, previous) = {
            let mut guard = inner.borrow_mut();
            let Some(session) = guard.sessions.get_mut(&from) else {
                return;
            };
            session.remote_name = name;
            let previous = session.negotiation.state();
            if !session.negotiation.accept_remote_offer() {
                Logger::info(&format!("Duplicate offer from {} dropped", from));
                return;
            }
            (session.pc.clone(), previous)
        };

        let Some(sdp) = offer["sdp"].as_str() else {
            Logger::warn("Offer body carries no sdp");
            Self::revert_session(&inner, &from, previous);
            return;
        };
        let desc = web_sys::RtcSessionDescriptionInit::new(web_sys::RtcSdpType::Offer);
        desc.set_sdp(sdp);
        if let Err(e) = JsFuture::from(pc.set_remote_description(&desc)).await {
            Logger::error(&e);
            Self::revert_session(&inner, &from, previous);
            return;
        }

        Self::flush_candidates(&inner, &from, &pc).await;

        let answer = match JsFuture::from(pc.create_answer()).await {
            Ok(v) => v,
            Err(e) => {
                Logger::error(&e);
                return;
            }
        };
        let Some(answer_sdp) = js_sys::Reflect::get(&answer, &"sdp".into())
            .ok()
            .and_then(|v| v.as_string())
        else {
            Logger::warn("Created answer carries no sdp");
            return;
        };

        let answer_init = web_sys::RtcSessionDescriptionInit::new(web_sys::RtcSdpType::Answer);
        answer_init.set_sdp(&answer_sdp);
        if let Err(e) = JsFuture::from(pc.set_local_description(&answer_init)).await {
            Logger::error(&e);
            return;
        }

        Self::send_frame(
            &inner,
            &ClientMessage::SendAnswer {
                to: from.clone(),
                answer: json!({ "type": "answer", "sdp": answer_sdp }),
            },
        );
        if let Some(session) = inner.borrow_mut().sessions.get_mut(&from) {
            session.negotiation.answer_dispatched();
        }
    }

    /// Inbound answer: applied only to a session still waiting on one.
    pub(super) async fn handle_remote_answer(
        inner: Rc<RefCell<EngineInner>>,
        from: ClientId,
        name: String,
        answer: Value,
    ) {
        let (pc, previous) = {
            let mut guard = inner.borrow_mut();
            let Some(session) = guard.sessions.get_mut(&from) else {
                Logger::warn(&format!("Answer from {} without a session; dropped", from));
                return;
            };
            session.remote_name = name;
            let previous = session.negotiation.state();
            if !session.negotiation.accept_remote_answer() {
                Logger::info(&format!("Duplicate answer from {} ignored", from));
                return;
            }
            (session.pc.clone(), previous)
        };

        let Some(sdp) = answer["sdp"].as_str() else {
            Logger::warn("Answer body carries no sdp");
            Self::revert_session(&inner, &from, previous);
            return;
        };
        let desc = web_sys::RtcSessionDescriptionInit::new(web_sys::RtcSdpType::Answer);
        desc.set_sdp(sdp);
        if let Err(e) = JsFuture::from(pc.set_remote_description(&desc)).await {
            Logger::error(&e);
            Self::revert_session(&inner, &from, previous);
            return;
        }

        Self::flush_candidates(&inner, &from, &pc).await;
    }

    /// Inbound candidate: apply when the remote description is in place,
    /// otherwise it waits in the session's buffer.
    pub(super) async fn handle_remote_candidate(
        inner: Rc<RefCell<EngineInner>>,
        from: ClientId,
        candidate: Value,
    ) {
        let applicable = {
            let mut guard = inner.borrow_mut();
            let Some(session) = guard.sessions.get_mut(&from) else {
                Logger::warn(&format!(
                    "Candidate from {} without a session; dropped",
                    from
                ));
                return;
            };
            match session.negotiation.accept_candidate(candidate) {
                CandidateAction::Apply(c) => Some((session.pc.clone(), c)),
                CandidateAction::Held => None,
            }
        };

        if let Some((pc, candidate)) = applicable {
            Self::apply_candidate(&pc, &candidate).await;
        }
    }

    /// Drain candidates held while the remote description was missing and
    /// apply them in receipt order.
    async fn flush_candidates(
        inner: &Rc<RefCell<EngineInner>>,
        peer_id: &ClientId,
        pc: &web_sys::RtcPeerConnection,
    ) {
        let held = match inner.borrow_mut().sessions.get_mut(peer_id) {
            Some(session) => session.negotiation.drain_candidates(),
            None => return,
        };
        for candidate in held {
            Self::apply_candidate(pc, &candidate).await;
        }
    }

    fn revert_session(
        inner: &Rc<RefCell<EngineInner>>,
        peer_id: &ClientId,
        previous: NegotiationState,
    ) {
        if let Some(session) = inner.borrow_mut().sessions.get_mut(peer_id) {
            session.negotiation.revert_remote(previous);
        }
    }

    fn fail_session(inner: &Rc<RefCell<EngineInner>>, peer_id: &ClientId) {
        if let Some(session) = inner.borrow_mut().sessions.get_mut(peer_id) {
            session.negotiation.fail();
        }
    }
}
