use super::{TAG_CHANGE_TOPIC, ws_handlers::TagChangeWsHandler};
use crate::auth::Staff;
use axum::{
    extract::{State, WebSocketUpgrade},
    response::IntoResponse,
};
use std::sync::Arc;
use util::state::AppState;
use util::ws::axum_adapter::ws_route;
use util::ws::serve::WsServerOptions;

/// GET /ws/tag_change (upgrade)
pub async fn tag_change_handler(
    ws: WebSocketUpgrade,
    state: State<AppState>,
    Staff(staff): Staff,
) -> impl IntoResponse {
    let handler = Arc::new(TagChangeWsHandler);
    let opts = WsServerOptions::default(); // 30s WS ping, app-level ping answered

    ws_route(
        ws,
        state,
        Some(staff),
        TAG_CHANGE_TOPIC.to_string(),
        handler,
        opts,
    )
    .await
}
