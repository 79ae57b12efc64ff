use std::cell::RefCell;
use std::rc::Rc;

use huddle_core::{ClientId, ClientMessage};
use wasm_bindgen::JsCast;

use crate::engine::{EngineInner, HuddleEngine};
use crate::logger::Logger;

impl HuddleEngine {
    /// Announce willingness to exchange media. The relay answers with the
    /// media-open room members and we call each of them.
    pub fn open_media(&self, stream: web_sys::MediaStream) {
        {
            let mut inner = self.inner.borrow_mut();
            if inner.media_open {
                Logger::warn("Media was already opened");
                return;
            }
            inner.media_open = true;
            inner.local_stream = Some(stream);
        }
        Self::send_frame(&self.inner, &ClientMessage::MediaOpened);
    }

    /// Local teardown: every peer session goes away, the relay keeps our
    /// room membership.
    pub fn close_media(&self) {
        {
            let mut inner = self.inner.borrow_mut();
            if !inner.media_open {
                Logger::warn("Media was not opened yet");
                return;
            }
            inner.media_open = false;
            inner.local_stream = None;
        }
        Self::teardown_sessions(&self.inner);
    }

    /// One offer per advertised peer, each driven independently.
    pub(super) fn start_offers(inner: &Rc<RefCell<EngineInner>>, peers: Vec<ClientId>) {
        if !inner.borrow().media_open {
            return;
        }
        for peer_id in peers {
            let inner = inner.clone();
            wasm_bindgen_futures::spawn_local(async move {
                Self::offer_to(inner, peer_id).await;
            });
        }
    }

    /// Feed the local stream's tracks into a fresh peer connection.
    pub(super) fn attach_local_tracks(
        inner: &Rc<RefCell<EngineInner>>,
        pc: &web_sys::RtcPeerConnection,
    ) {
        let stream = inner.borrow().local_stream.clone();
        let Some(stream) = stream else {
            return;
        };
        for track in stream.get_tracks().iter() {
            match track.dyn_into::<web_sys::MediaStreamTrack>() {
                Ok(track) => {
                    let _ = pc.add_track(&track, &stream, &js_sys::Array::new());
                }
                Err(_) => Logger::warn("Non-track entry in local stream"),
            }
        }
    }
}
