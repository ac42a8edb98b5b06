//! # Tags Routes Module
//!
//! Routes for the `/api/tags` endpoint group. Every route requires the admin key
//! (applied by the parent router).
//!
//! - `get.rs` lists tags
//! - `post.rs` creates a tag
//! - `delete.rs` removes a tag from the system and from every attendee

use axum::{
    Router,
    routing::{delete, get, post},
};
use delete::delete_tag;
use get::list_tags;
use post::create_tag;
use util::state::AppState;

pub mod common;
pub mod delete;
pub mod get;
pub mod post;

/// - `GET /tags` → `list_tags`
/// - `POST /tags` → `create_tag`
/// - `DELETE /tags/{name}` → `delete_tag`
pub fn tags_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_tags))
        .route("/", post(create_tag))
        .route("/{name}", delete(delete_tag))
}
