use crate::ws::WebSocketManager;
use axum::extract::ws::{Message, Utf8Bytes};
use serde::Serialize;
use tokio::sync::mpsc;

/// Per-connection handle given to a [`WsHandler`](super::handler_trait::WsHandler).
pub struct WsContext {
    pub topic: String,
    pub ws: WebSocketManager,
    /// Staff member behind the socket, when the route is authenticated.
    pub staff: Option<String>,
    out_tx: mpsc::Sender<Message>,
}

/// The client's outbound queue is gone; the socket is closing.
#[derive(Debug)]
pub struct Disconnected;

impl WsContext {
    pub fn new(
        topic: String,
        ws: WebSocketManager,
        staff: Option<String>,
        out_tx: mpsc::Sender<Message>,
    ) -> Self {
        Self {
            topic,
            ws,
            staff,
            out_tx,
        }
    }

    /// Send a single text frame to this client only.
    pub async fn reply_text(&self, text: impl Into<Utf8Bytes>) -> Result<(), Disconnected> {
        self.send(Message::Text(text.into())).await
    }

    /// Serialize `value` and send it to this client only.
    pub async fn reply_json<T: Serialize>(&self, value: &T) -> Result<(), Disconnected> {
        match serde_json::to_string(value) {
            Ok(text) => self.reply_text(text).await,
            Err(e) => {
                tracing::warn!(error = %e, topic = %self.topic, "Failed to serialize reply");
                Ok(())
            }
        }
    }

    pub async fn reply_pong(&self, payload: bytes::Bytes) -> Result<(), Disconnected> {
        self.send(Message::Pong(payload)).await
    }

    pub async fn send(&self, msg: Message) -> Result<(), Disconnected> {
        self.out_tx.send(msg).await.map_err(|_| Disconnected)
    }

    /// Broadcast a JSON envelope on this connection's topic.
    pub async fn emit<T: Serialize>(&self, event: &str, payload: &T) -> usize {
        crate::ws::emit(&self.ws, &self.topic, event, payload).await
    }
}
