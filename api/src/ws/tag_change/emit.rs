use serde::Serialize;
use util::ws::WebSocketManager;

use super::{TAG_CHANGE_TOPIC, payload::TagChange};
use crate::ws::core::{envelope, event::Event};

#[derive(Debug, Serialize)]
#[serde(transparent)]
pub struct TagChanged(pub TagChange);

impl Event for TagChanged {
    const NAME: &'static str = "tag_change";
    fn topic_path(&self) -> String {
        TAG_CHANGE_TOPIC.to_string()
    }
}

/// Publishes one transition. Returns how many clients were listening.
pub async fn tag_changed(ws: &WebSocketManager, change: TagChange) -> usize {
    let reached = envelope::emit(ws, &TagChanged(change)).await;
    tracing::debug!(reached, "Published tag_change");
    reached
}
