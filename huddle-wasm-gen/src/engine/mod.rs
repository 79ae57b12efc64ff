use huddle_core::{ClientId, ClientMessage, IceServerConfig, MemberInfo, PeerProfile, vocabulary};
use serde::Serialize;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use wasm_bindgen::JsValue;

use crate::error::EngineError;
use crate::logger::Logger;

mod handle_signal_impl;
mod media_impl;
mod negotiate_impl;
mod peer_session;
mod storage_impl;
mod ws_setup_impl;

pub use peer_session::PeerSession;

#[derive(Clone)]
pub struct EngineConfig {
    pub url: String,
    pub ice_servers: Option<Vec<IceServerConfig>>,
}

/// Events surfaced to the embedding page through the event callback.
#[derive(Debug, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum EngineEvent {
    Chat { from: MemberInfo, message: String },
    MemberJoined { member: MemberInfo },
    MemberLeft { member: MemberInfo },
    Profile { profile: PeerProfile },
    Error { code: u16, message: String },
    PushReport { unreached: Vec<ClientId> },
    PeerClosed { id: ClientId },
}

pub(crate) struct EngineInner {
    ws: Option<web_sys::WebSocket>,
    profile: PeerProfile,
    sessions: HashMap<ClientId, PeerSession>,
    media_open: bool,
    local_stream: Option<web_sys::MediaStream>,
    event_callback: Option<js_sys::Function>,
    track_callback: Option<js_sys::Function>,
    ice_servers: Option<Vec<IceServerConfig>>,
}

/// Browser-side coordinator: one WebSocket to the relay, one peer session
/// per remote participant the local client exchanges media with.
pub struct HuddleEngine {
    inner: Rc<RefCell<EngineInner>>,
}

impl HuddleEngine {
    pub fn new(config: EngineConfig) -> Result<Self, JsValue> {
        let inner = Rc::new(RefCell::new(EngineInner {
            ws: None,
            profile: Self::load_profile().unwrap_or_default(),
            sessions: HashMap::new(),
            media_open: false,
            local_stream: None,
            event_callback: None,
            track_callback: None,
            ice_servers: config.ice_servers.clone(),
        }));

        let engine = HuddleEngine { inner };
        engine.ws_setup(config)?;
        Ok(engine)
    }

    /// The canonical type-tag map, for pages that build their own frames.
    pub fn vocabulary() -> JsValue {
        serde_wasm_bindgen::to_value(&vocabulary()).unwrap_or(JsValue::NULL)
    }

    pub fn join_room(&self, name: String, role: String, room_id: String) {
        {
            let mut inner = self.inner.borrow_mut();
            inner.profile.name = name.clone();
            inner.profile.role = role.clone();
            inner.profile.room_id = Some(room_id.clone());
            Self::store_profile(&inner.profile);
        }
        Self::send_frame(
            &self.inner,
            &ClientMessage::JoinRoom {
                room_id: Some(room_id),
                name: Some(name),
                role: Some(role),
            },
        );
    }

    /// Drop every peer session, forget the stored profile and tell the
    /// relay we are gone.
    pub fn leave_room(&self) {
        Self::teardown_sessions(&self.inner);
        {
            let mut inner = self.inner.borrow_mut();
            inner.profile = PeerProfile::default();
            inner.media_open = false;
            inner.local_stream = None;
        }
        Self::clear_profile();
        Self::send_frame(&self.inner, &ClientMessage::LeaveRoom);
    }

    pub fn send_chat(&self, message: String) {
        Self::send_frame(&self.inner, &ClientMessage::SendMessage { message });
    }

    pub fn push_to(&self, ids: Vec<String>, message: String) {
        let to = ids.into_iter().map(ClientId::from).collect();
        Self::send_frame(&self.inner, &ClientMessage::PushMessage { to, message });
    }

    pub fn request_personal_info(&self) {
        Self::send_frame(&self.inner, &ClientMessage::GetPersonalInfo);
    }

    pub fn ping(&self) {
        Self::send_frame(&self.inner, &ClientMessage::Ping);
    }

    /// Display name of a connected peer, for labeling its rendered media.
    pub fn peer_name(&self, id: &str) -> Option<String> {
        let id = ClientId::from(id);
        self.inner
            .borrow()
            .sessions
            .get(&id)
            .map(|s| s.remote_name().to_string())
    }

    pub fn set_event_handler(&self, callback: js_sys::Function) {
        self.inner.borrow_mut().event_callback = Some(callback);
    }

    /// Callback invoked with `(peer_id, MediaStream)` whenever a remote
    /// session produces a new inbound track.
    pub fn set_track_handler(&self, callback: js_sys::Function) {
        self.inner.borrow_mut().track_callback = Some(callback);
    }

    pub(crate) fn send_frame(inner: &Rc<RefCell<EngineInner>>, msg: &ClientMessage) {
        if let Err(e) = Self::try_send_frame(inner, msg) {
            Logger::warn(&format!("Failed to send frame: {}", e));
        }
    }

    fn try_send_frame(
        inner: &Rc<RefCell<EngineInner>>,
        msg: &ClientMessage,
    ) -> Result<(), EngineError> {
        let json = serde_json::to_string(msg)?;
        let guard = inner.borrow();
        let ws = guard.ws.as_ref().ok_or(EngineError::SocketClosed)?;
        ws.send_with_str(&json)
            .map_err(|e| EngineError::Transport(format!("{e:?}")))
    }

    pub(crate) fn dispatch_event(inner: &Rc<RefCell<EngineInner>>, event: &EngineEvent) {
        let callback = inner.borrow().event_callback.clone();
        if let Some(cb) = callback {
            if let Ok(js_val) = serde_wasm_bindgen::to_value(event) {
                let _ = cb.call1(&JsValue::NULL, &js_val);
            }
        }
    }

    pub(crate) fn dispatch_track(
        inner: &Rc<RefCell<EngineInner>>,
        peer_id: &ClientId,
        stream: &web_sys::MediaStream,
    ) {
        let callback = inner.borrow().track_callback.clone();
        if let Some(cb) = callback {
            let _ = cb.call2(
                &JsValue::NULL,
                &JsValue::from_str(&peer_id.to_string()),
                stream,
            );
        }
    }
}
