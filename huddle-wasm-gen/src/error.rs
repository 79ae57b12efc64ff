use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("socket is not connected")]
    SocketClosed,

    #[error("failed to encode frame: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("transport error: {0}")]
    Transport(String),
}
