use anyhow::{Context, Result};
use serde_json::{Value, json};
use std::sync::Arc;
use tokio::sync::Mutex;
use webrtc::api::APIBuilder;
use webrtc::api::interceptor_registry::register_default_interceptors;
use webrtc::api::media_engine::MediaEngine;
use webrtc::ice_transport::ice_candidate::RTCIceCandidateInit;
use webrtc::interceptor::registry::Registry;
use webrtc::peer_connection::RTCPeerConnection;
use webrtc::peer_connection::configuration::RTCConfiguration;
use webrtc::peer_connection::peer_connection_state::RTCPeerConnectionState;
use webrtc::peer_connection::sdp::session_description::RTCSessionDescription;

/// A real media endpoint used to prove the relay carries a working
/// offer/answer/candidate exchange. Loopback host candidates are enough,
/// so no ICE servers are configured.
pub struct MediaPeer {
    peer_connection: Arc<RTCPeerConnection>,
    connection_state: Arc<Mutex<RTCPeerConnectionState>>,
    candidates: Arc<Mutex<Vec<Value>>>,
}

impl MediaPeer {
    pub async fn new() -> Result<Self> {
        let mut media_engine = MediaEngine::default();
        media_engine.register_default_codecs()?;
        let registry = register_default_interceptors(Registry::new(), &mut media_engine)?;

        let api = APIBuilder::new()
            .with_media_engine(media_engine)
            .with_interceptor_registry(registry)
            .build();

        let peer_connection = Arc::new(
            api.new_peer_connection(RTCConfiguration {
                ice_servers: vec![],
                ..Default::default()
            })
            .await?,
        );

        let connection_state = Arc::new(Mutex::new(RTCPeerConnectionState::New));
        let state_clone = Arc::clone(&connection_state);
        peer_connection.on_peer_connection_state_change(Box::new(move |state| {
            let state_clone = Arc::clone(&state_clone);
            Box::pin(async move {
                tracing::debug!("[MediaPeer] Connection state: {:?}", state);
                *state_clone.lock().await = state;
            })
        }));

        let candidates = Arc::new(Mutex::new(Vec::new()));
        let candidates_clone = Arc::clone(&candidates);
        peer_connection.on_ice_candidate(Box::new(move |candidate| {
            let candidates = Arc::clone(&candidates_clone);
            Box::pin(async move {
                if let Some(c) = candidate {
                    if let Ok(init) = c.to_json() {
                        if let Ok(value) = serde_json::to_value(&init) {
                            candidates.lock().await.push(value);
                        }
                    }
                }
            })
        }));

        Ok(Self {
            peer_connection,
            connection_state,
            candidates,
        })
    }

    /// Create a data channel and an SDP offer, returned as the opaque JSON
    /// body a browser would put on the wire.
    pub async fn create_offer(&self) -> Result<Value> {
        self.peer_connection
            .create_data_channel("mesh", None)
            .await
            .context("Failed to create data channel")?;

        let offer = self
            .peer_connection
            .create_offer(None)
            .await
            .context("Failed to create offer")?;
        self.peer_connection
            .set_local_description(offer.clone())
            .await
            .context("Failed to set local description")?;

        Ok(json!({ "type": "offer", "sdp": offer.sdp }))
    }

    /// Apply a remote offer and produce the matching answer body.
    pub async fn accept_offer(&self, offer: &Value) -> Result<Value> {
        let sdp = offer["sdp"]
            .as_str()
            .context("offer body has no sdp")?
            .to_string();
        self.peer_connection
            .set_remote_description(RTCSessionDescription::offer(sdp)?)
            .await
            .context("Failed to set remote offer")?;

        let answer = self
            .peer_connection
            .create_answer(None)
            .await
            .context("Failed to create answer")?;
        self.peer_connection
            .set_local_description(answer.clone())
            .await
            .context("Failed to set local description")?;

        Ok(json!({ "type": "answer", "sdp": answer.sdp }))
    }

    pub async fn accept_answer(&self, answer: &Value) -> Result<()> {
        let sdp = answer["sdp"]
            .as_str()
            .context("answer body has no sdp")?
            .to_string();
        self.peer_connection
            .set_remote_description(RTCSessionDescription::answer(sdp)?)
            .await
            .context("Failed to set remote answer")?;
        Ok(())
    }

    pub async fn add_candidate(&self, candidate: &Value) -> Result<()> {
        let init: RTCIceCandidateInit =
            serde_json::from_value(candidate.clone()).context("Failed to parse candidate")?;
        self.peer_connection
            .add_ice_candidate(init)
            .await
            .context("Failed to add candidate")?;
        Ok(())
    }

    /// Wait for ICE gathering to finish and return everything collected.
    pub async fn gather_candidates(&self, timeout_ms: u64) -> Vec<Value> {
        let mut gathering_complete = self.peer_connection.gathering_complete_promise().await;
        let _ = tokio::time::timeout(
            std::time::Duration::from_millis(timeout_ms),
            gathering_complete.recv(),
        )
        .await;
        self.candidates.lock().await.clone()
    }

    pub async fn wait_until_connected(&self, timeout_ms: u64) -> Result<()> {
        let start = std::time::Instant::now();
        let timeout = std::time::Duration::from_millis(timeout_ms);

        loop {
            let state = *self.connection_state.lock().await;
            match state {
                RTCPeerConnectionState::Connected => return Ok(()),
                RTCPeerConnectionState::Failed => anyhow::bail!("Connection failed"),
                RTCPeerConnectionState::Closed => anyhow::bail!("Connection closed"),
                _ => {}
            }
            if start.elapsed() > timeout {
                anyhow::bail!("Timeout waiting for connection (state: {:?})", state);
            }
            tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        }
    }

    pub async fn close(&self) -> Result<()> {
        self.peer_connection
            .close()
            .await
            .context("Failed to close peer connection")?;
        Ok(())
    }
}
