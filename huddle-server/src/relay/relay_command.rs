use axum::extract::ws::Message;
use huddle_core::{ClientId, ClientMessage};
use tokio::sync::{mpsc, oneshot};

/// Commands the transport layer feeds into the relay actor.
#[derive(Debug)]
pub enum RelayCommand {
    /// A socket finished its upgrade; register it and reply with its id.
    Connect {
        origin: String,
        tx: mpsc::UnboundedSender<Message>,
        reply: oneshot::Sender<ClientId>,
    },

    /// A decoded application frame from one connection.
    Frame {
        id: ClientId,
        message: ClientMessage,
    },

    /// Transport-level pong; proof of liveness for this connection.
    Pong { id: ClientId },

    /// The socket closed or errored out.
    Disconnect { id: ClientId },
}
