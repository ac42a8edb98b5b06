use super::common::TagChangeIncoming;
use chrono::Utc;
use serde_json::json;
use util::ws::handler_trait::WsHandler;
use util::ws::runtime::WsContext;

pub struct TagChangeWsHandler;

impl WsHandler for TagChangeWsHandler {
    type In = TagChangeIncoming;

    /// Greets the client once its subscription is live, so it knows from which point on
    /// it will see every change.
    async fn on_open(&self, ctx: &WsContext) {
        tracing::info!(staff = ?ctx.staff, "Staff subscribed to tag changes");
        let _ = ctx
            .reply_json(&json!({
                "type": "event",
                "event": "ready",
                "topic": ctx.topic,
                "payload": { "staff": ctx.staff },
                "ts": Utc::now().to_rfc3339(),
            }))
            .await;
    }

    async fn on_message(&self, ctx: &WsContext, msg: Self::In) {
        match msg {
            TagChangeIncoming::Ping => {
                let _ = ctx
                    .reply_json(&json!({
                        "type": "event",
                        "event": "pong",
                        "topic": ctx.topic,
                        "payload": {},
                        "ts": Utc::now().to_rfc3339(),
                    }))
                    .await;
            }
        }
    }

    async fn on_close(&self, ctx: &WsContext) {
        tracing::debug!(staff = ?ctx.staff, "Staff left tag changes");
    }
}
