//! WebSocket entry point for `/ws/...`. Every topic requires the admin key, sent as a
//! Basic `Authorization` header or as the `auth` query parameter.

use axum::{Router, middleware::from_fn};
use util::state::AppState;

use crate::{auth::guards::require_staff, ws::tag_change::ws_tag_change_routes};

pub mod core;
pub mod tag_change;

pub fn ws_routes(app_state: AppState) -> Router<AppState> {
    Router::new()
        .nest("/tag_change", ws_tag_change_routes())
        .route_layer(from_fn(require_staff))
        .with_state(app_state)
}
