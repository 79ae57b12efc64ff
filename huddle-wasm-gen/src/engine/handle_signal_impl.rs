use std::cell::RefCell;
use std::rc::Rc;

use huddle_core::{ResponseData, ServerMessage};

use crate::engine::{EngineEvent, EngineInner, HuddleEngine};
use crate::logger::Logger;

impl HuddleEngine {
    pub(super) fn handle_signal(inner_rc: &Rc<RefCell<EngineInner>>, text: String) {
        let msg: ServerMessage = match serde_json::from_str(&text) {
            Ok(m) => m,
            Err(e) => {
                Logger::warn(&format!("JSON Error: {}. Text: {}", e, text));
                return;
            }
        };

        let inner = inner_rc.clone();

        match msg {
            ServerMessage::Response {
                code,
                message,
                data,
            } => match data {
                Some(ResponseData::Profile(profile)) => {
                    {
                        let mut guard = inner.borrow_mut();
                        guard.profile = profile.clone();
                        Self::store_profile(&guard.profile);
                    }
                    Self::dispatch_event(&inner, &EngineEvent::Profile { profile });
                }
                Some(ResponseData::Unreached { unreached }) => {
                    Self::dispatch_event(&inner, &EngineEvent::PushReport { unreached });
                }
                None if code >= 400 => {
                    Logger::warn(&format!("Server rejected a request: {}", message));
                    Self::dispatch_event(&inner, &EngineEvent::Error { code, message });
                }
                None => {}
            },

            ServerMessage::Message { message, data } => {
                Self::dispatch_event(
                    &inner,
                    &EngineEvent::Chat {
                        from: data,
                        message,
                    },
                );
            }

            ServerMessage::MemberJoined { data, .. } => {
                Self::dispatch_event(&inner, &EngineEvent::MemberJoined { member: data });
            }

            ServerMessage::MemberLeft { data, .. } => {
                // The only normal remote teardown path: that peer's session
                // goes away together with its rendered output.
                Self::close_session(&inner, &data.id);
                Self::dispatch_event(&inner, &EngineEvent::MemberLeft { member: data });
            }

            ServerMessage::MediaOpenedAck { data } => {
                Logger::info(&format!(
                    "Media opened; {} peers to call",
                    data.client_ids.len()
                ));
                Self::start_offers(&inner, data.client_ids);
            }

            ServerMessage::ReceiveOffer { data } => {
                if !inner.borrow().media_open {
                    Logger::warn("Offer received before media was opened; dropped");
                    return;
                }
                wasm_bindgen_futures::spawn_local(async move {
                    Self::handle_remote_offer(inner, data.id, data.name, data.offer).await;
                });
            }

            ServerMessage::ReceiveAnswer { data } => {
                wasm_bindgen_futures::spawn_local(async move {
                    Self::handle_remote_answer(inner, data.id, data.name, data.answer).await;
                });
            }

            ServerMessage::ReceiveCandidate { data } => {
                wasm_bindgen_futures::spawn_local(async move {
                    Self::handle_remote_candidate(inner, data.id, data.candidate).await;
                });
            }
        }
    }
}
