use huddle_core::PeerProfile;

use crate::engine::HuddleEngine;
use crate::logger::Logger;

const PROFILE_KEY: &str = "huddle.profile";

impl HuddleEngine {
    /// Last-known profile from the browser's session storage, if any.
    pub(crate) fn load_profile() -> Option<PeerProfile> {
        let storage = web_sys::window()?.session_storage().ok()??;
        let raw = storage.get_item(PROFILE_KEY).ok()??;
        serde_json::from_str(&raw).ok()
    }

    pub(crate) fn store_profile(profile: &PeerProfile) {
        let Some(storage) = web_sys::window().and_then(|w| w.session_storage().ok().flatten())
        else {
            return;
        };
        match serde_json::to_string(profile) {
            Ok(raw) => {
                if storage.set_item(PROFILE_KEY, &raw).is_err() {
                    Logger::warn("Failed to persist profile");
                }
            }
            Err(e) => Logger::warn(&format!("Failed to encode profile: {}", e)),
        }
    }

    pub(crate) fn clear_profile() {
        if let Some(storage) = web_sys::window().and_then(|w| w.session_storage().ok().flatten()) {
            let _ = storage.remove_item(PROFILE_KEY);
        }
    }
}
