use wasm_bindgen::prelude::*;
use web_sys::WebSocket;

use crate::engine::{EngineConfig, HuddleEngine};
use crate::logger::Logger;
use huddle_core::ClientMessage;

/// The relay sweeps connections that stay quiet; one ping a minute keeps
/// ours provably alive.
const HEARTBEAT_INTERVAL_MS: i32 = 60_000;

impl HuddleEngine {
    pub(crate) fn ws_setup(&self, config: EngineConfig) -> Result<(), JsValue> {
        let ws: WebSocket = web_sys::WebSocket::new(&config.url)?;
        ws.set_binary_type(web_sys::BinaryType::Arraybuffer);

        let onopen_callback = {
            let inner = self.inner.clone();
            Closure::<dyn FnMut(JsValue)>::wrap(Box::new(move |_| {
                Logger::info("WS Open");

                // A stored profile means this page reloaded mid-session;
                // rejoin without bothering the user.
                let rejoin = {
                    let guard = inner.borrow();
                    guard.profile.room_id.clone().map(|room_id| {
                        ClientMessage::JoinRoom {
                            room_id: Some(room_id),
                            name: Some(guard.profile.name.clone()),
                            role: Some(guard.profile.role.clone()),
                        }
                    })
                };
                if let Some(join) = rejoin {
                    Logger::info("Rejoining last known room");
                    Self::send_frame(&inner, &join);
                }

                let inner = inner.clone();
                wasm_bindgen_futures::spawn_local(async move {
                    loop {
                        let promise = js_sys::Promise::new(&mut |resolve, _| {
                            web_sys::window()
                                .unwrap()
                                .set_timeout_with_callback_and_timeout_and_arguments_0(
                                    &resolve,
                                    HEARTBEAT_INTERVAL_MS,
                                )
                                .unwrap();
                        });
                        let _ = wasm_bindgen_futures::JsFuture::from(promise).await;

                        let open = inner
                            .borrow()
                            .ws
                            .as_ref()
                            .is_some_and(|ws| ws.ready_state() == WebSocket::OPEN);
                        if !open {
                            break;
                        }
                        Self::send_frame(&inner, &ClientMessage::Ping);
                    }
                });
            }))
        };
        ws.set_onopen(Some(onopen_callback.as_ref().unchecked_ref()));
        onopen_callback.forget();

        let onmessage_callback = {
            let inner = self.inner.clone();
            Closure::<dyn FnMut(web_sys::MessageEvent)>::wrap(Box::new(
                move |e: web_sys::MessageEvent| {
                    if let Ok(text) = e.data().dyn_into::<js_sys::JsString>() {
                        let text: String = text.into();
                        Self::handle_signal(&inner, text);
                    }
                },
            ))
        };
        ws.set_onmessage(Some(onmessage_callback.as_ref().unchecked_ref()));
        onmessage_callback.forget();

        let onclose_callback = Closure::<dyn FnMut(web_sys::CloseEvent)>::wrap(Box::new(
            move |e: web_sys::CloseEvent| {
                if e.was_clean() {
                    Logger::info("WS disconnected");
                } else {
                    Logger::warn("WS connection dropped");
                }
            },
        ));
        ws.set_onclose(Some(onclose_callback.as_ref().unchecked_ref()));
        onclose_callback.forget();

        let onerror_callback = Closure::<dyn FnMut(web_sys::ErrorEvent)>::wrap(Box::new(
            move |e: web_sys::ErrorEvent| {
                Logger::error(&e.into());
            },
        ));
        ws.set_onerror(Some(onerror_callback.as_ref().unchecked_ref()));
        onerror_callback.forget();

        self.inner.borrow_mut().ws = Some(ws);
        Ok(())
    }
}
