//! The `tag_change` topic: one event per committed check-in or check-out, pushed to every
//! connected staff client. Clients filter by tag themselves.

use axum::{Router, routing::get};
use util::state::AppState;

use handlers::tag_change_handler;

pub mod common;
pub mod emit;
pub mod handlers;
pub mod payload;
pub mod ws_handlers;

/// Topic every transition is published on.
pub const TAG_CHANGE_TOPIC: &str = "tag_change";

pub fn ws_tag_change_routes() -> Router<AppState> {
    Router::new().route("/", get(tag_change_handler))
}
