use std::cell::RefCell;
use std::rc::Rc;

use huddle_core::{ClientId, ClientMessage, DEFAULT_STUN_SERVERS, Negotiation};
use serde_json::{Value, json};
use wasm_bindgen::JsCast;
use wasm_bindgen::JsValue;
use wasm_bindgen::prelude::Closure;

use crate::engine::{EngineEvent, EngineInner, HuddleEngine};
use crate::logger::Logger;

/// One remote participant: the media connection plus where its negotiation
/// stands.
pub struct PeerSession {
    pub(crate) pc: web_sys::RtcPeerConnection,
    pub(crate) negotiation: Negotiation,
    pub(crate) remote_name: String,
}

impl PeerSession {
    pub(crate) fn new(pc: web_sys::RtcPeerConnection, remote_name: String) -> Self {
        Self {
            pc,
            negotiation: Negotiation::new(),
            remote_name,
        }
    }

    pub fn remote_name(&self) -> &str {
        &self.remote_name
    }
}

impl HuddleEngine {
    /// Build the peer connection for one remote peer and wire its
    /// callbacks: locally found candidates go out directed at that peer,
    /// inbound tracks go to the page, connection-state changes drive the
    /// session's negotiation state.
    pub(crate) fn create_pc(
        inner: &Rc<RefCell<EngineInner>>,
        peer_id: &ClientId,
    ) -> Result<web_sys::RtcPeerConnection, JsValue> {
        let rtc_config = web_sys::RtcConfiguration::new();
        let ice_servers_arr = js_sys::Array::new();

        let configured = inner.borrow().ice_servers.clone();
        if let Some(servers) = configured {
            for server_config in &servers {
                let rtc_ice_server = web_sys::RtcIceServer::new();

                let urls = js_sys::Array::new();
                for url in &server_config.urls {
                    urls.push(&JsValue::from_str(url));
                }
                rtc_ice_server.set_urls(&urls);

                if let Some(username) = &server_config.username {
                    rtc_ice_server.set_username(username);
                }
                if let Some(credential) = &server_config.credential {
                    rtc_ice_server.set_credential(credential);
                }

                ice_servers_arr.push(&rtc_ice_server);
            }
        } else {
            let stun_urls = js_sys::Array::new();
            for url in DEFAULT_STUN_SERVERS {
                stun_urls.push(&JsValue::from_str(url));
            }
            let stun_server = web_sys::RtcIceServer::new();
            stun_server.set_urls(&stun_urls);
            ice_servers_arr.push(&stun_server);
        }

        rtc_config.set_ice_servers(&ice_servers_arr);

        let pc = web_sys::RtcPeerConnection::new_with_configuration(&rtc_config)?;

        let onice = {
            let inner = inner.clone();
            let peer_id = peer_id.clone();
            Closure::wrap(Box::new(move |ev: web_sys::RtcPeerConnectionIceEvent| {
                if let Some(candidate) = ev.candidate() {
                    let body = json!({
                        "candidate": candidate.candidate(),
                        "sdpMid": candidate.sdp_mid(),
                        "sdpMLineIndex": candidate.sdp_m_line_index(),
                    });
                    Self::send_frame(
                        &inner,
                        &ClientMessage::SendCandidate {
                            to: Some(peer_id.clone()),
                            candidate: body,
                        },
                    );
                }
            }) as Box<dyn FnMut(web_sys::RtcPeerConnectionIceEvent)>)
        };
        pc.set_onicecandidate(Some(onice.as_ref().unchecked_ref()));
        onice.forget();

        let ontrack = {
            let inner = inner.clone();
            let peer_id = peer_id.clone();
            Closure::wrap(Box::new(move |ev: web_sys::RtcTrackEvent| {
                let streams = ev.streams();
                if let Ok(stream) = streams.get(0).dyn_into::<web_sys::MediaStream>() {
                    Logger::info(&format!("Inbound track from {}", peer_id));
                    Self::dispatch_track(&inner, &peer_id, &stream);
                }
            }) as Box<dyn FnMut(web_sys::RtcTrackEvent)>)
        };
        pc.set_ontrack(Some(ontrack.as_ref().unchecked_ref()));
        ontrack.forget();

        let onstate = {
            let inner = inner.clone();
            let peer_id = peer_id.clone();
            let pc_ref = pc.clone();
            Closure::wrap(Box::new(move |_: JsValue| {
                let state = pc_ref.connection_state();
                let mut guard = inner.borrow_mut();
                if let Some(session) = guard.sessions.get_mut(&peer_id) {
                    match state {
                        web_sys::RtcPeerConnectionState::Connected => {
                            session.negotiation.established()
                        }
                        web_sys::RtcPeerConnectionState::Failed => {
                            Logger::warn(&format!("Peer connection with {} failed", peer_id));
                            session.negotiation.fail();
                        }
                        _ => {}
                    }
                }
            }) as Box<dyn FnMut(JsValue)>)
        };
        pc.set_onconnectionstatechange(Some(onstate.as_ref().unchecked_ref()));
        onstate.forget();

        Ok(pc)
    }

    /// Hand one candidate body to the media layer. Failures are logged and
    /// the session is left as it was.
    pub(crate) async fn apply_candidate(pc: &web_sys::RtcPeerConnection, candidate: &Value) {
        let Some(candidate_str) = candidate["candidate"].as_str() else {
            Logger::warn("Candidate body without a candidate field; dropped");
            return;
        };
        let init = web_sys::RtcIceCandidateInit::new(candidate_str);
        if let Some(mid) = candidate["sdpMid"].as_str() {
            init.set_sdp_mid(Some(mid));
        }
        if let Some(idx) = candidate["sdpMLineIndex"].as_u64() {
            init.set_sdp_m_line_index(Some(idx as u16));
        }

        let promise = pc.add_ice_candidate_with_opt_rtc_ice_candidate_init(Some(&init));
        if let Err(e) = wasm_bindgen_futures::JsFuture::from(promise).await {
            Logger::warn(&format!("Error adding candidate: {:?}", e));
        }
    }

    /// Close and drop the session for one departed peer.
    pub(crate) fn close_session(inner: &Rc<RefCell<EngineInner>>, peer_id: &ClientId) {
        let removed = {
            let mut guard = inner.borrow_mut();
            guard.sessions.remove(peer_id)
        };
        if let Some(mut session) = removed {
            session.negotiation.close();
            session.pc.close();
            Self::dispatch_event(
                inner,
                &EngineEvent::PeerClosed {
                    id: peer_id.clone(),
                },
            );
        }
    }

    pub(crate) fn teardown_sessions(inner: &Rc<RefCell<EngineInner>>) {
        let ids: Vec<ClientId> = inner.borrow().sessions.keys().cloned().collect();
        for id in ids {
            Self::close_session(inner, &id);
        }
    }
}
