//! HTTP and websocket surface of the check-in service.

use axum::{Router, middleware::from_fn};
use tower_http::cors::CorsLayer;
use util::state::AppState;

pub mod auth;
pub mod graphql;
pub mod response;
pub mod routes;
pub mod ws;

use auth::middleware::log_request;

/// The whole application: `/api`, `/graphql` and `/ws`, with request logging and CORS.
pub fn app(app_state: AppState) -> Router {
    Router::new()
        .nest("/api", routes::routes(app_state.clone()))
        .nest("/graphql", graphql::graphql_routes(app_state.clone()))
        .nest("/ws", ws::ws_routes(app_state.clone()))
        .layer(from_fn(log_request))
        .layer(CorsLayer::very_permissive())
        .with_state(app_state)
}
