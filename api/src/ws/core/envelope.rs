use crate::ws::core::event::Event;
use util::ws::{WebSocketManager, emit as emit_enveloped};

/// Publishes `ev` on its topic. Returns the number of subscribers reached.
pub async fn emit<E>(ws: &WebSocketManager, ev: &E) -> usize
where
    E: Event,
{
    let topic = ev.topic_path();
    emit_enveloped(ws, &topic, E::NAME, ev).await
}
