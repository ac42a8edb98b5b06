//! Topic-based WebSocket plumbing: the broadcast manager, the per-socket serve loop and
//! the JSON event envelope every server-pushed message is wrapped in.

pub mod axum_adapter;
pub mod handler_trait;
pub mod manager;
pub mod runtime;
pub mod serve;

pub use manager::WebSocketManager;

use chrono::Utc;
use serde::Serialize;

/// Standard event envelope sent over WebSocket topics.
#[derive(Serialize)]
pub struct EventEnvelope<'a, T> {
    #[serde(rename = "type")]
    pub r#type: &'static str,
    pub event: &'a str,
    pub topic: &'a str,
    pub payload: T,
    pub ts: String,
}

/// Broadcasts `payload` wrapped in an [`EventEnvelope`] on `topic`.
///
/// Returns how many live subscribers the message was handed to; zero is not an error.
pub async fn emit<T: Serialize>(
    ws: &WebSocketManager,
    topic: &str,
    event: &str,
    payload: &T,
) -> usize {
    let env = EventEnvelope {
        r#type: "event",
        event,
        topic,
        payload,
        ts: Utc::now().to_rfc3339(),
    };
    match serde_json::to_string(&env) {
        Ok(json) => ws.broadcast(topic, json).await,
        Err(e) => {
            tracing::warn!(error = %e, topic, event, "Failed to serialize event");
            0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    #[tokio::test]
    async fn emit_wraps_payload_in_envelope() {
        let ws = WebSocketManager::new();
        let mut rx = ws.subscribe("tag_change").await;

        let reached = emit(&ws, "tag_change", "tag_change", &json!({ "tag": "hackgt" })).await;
        assert_eq!(reached, 1);

        let raw = rx.recv().await.unwrap();
        let msg: Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(msg["type"], "event");
        assert_eq!(msg["event"], "tag_change");
        assert_eq!(msg["topic"], "tag_change");
        assert_eq!(msg["payload"]["tag"], "hackgt");
        assert!(msg["ts"].is_string());
    }
}
