//! `POST /graphql`: tags and check-ins resolved locally, attendee identity forwarded to
//! the registration service.

use std::sync::Arc;

use axum::{Extension, Router, middleware::from_fn, routing::post};
use util::state::AppState;

use crate::auth::guards::require_staff;

pub mod error;
pub mod executor;
pub mod handlers;
pub mod node;
pub mod projection;
pub mod request;
pub mod resolvers;
pub mod schema;

use handlers::graphql_handler;
use schema::Schema;

pub fn graphql_routes(app_state: AppState) -> Router<AppState> {
    Router::new()
        .route("/", post(graphql_handler))
        .route_layer(from_fn(require_staff))
        .layer(Extension(Arc::new(Schema::new())))
        .with_state(app_state)
}
