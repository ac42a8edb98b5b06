//! HTTP route entry point for `/api/...`.
//!
//! - `/health` → liveness of this service and of the registration service (public)
//! - `/tags` → tag management (admin key required)

use crate::auth::guards::require_staff;
use crate::routes::{health::health_routes, tags::tags_routes};
use axum::{Router, middleware::from_fn};
use util::state::AppState;

pub mod health;
pub mod tags;

/// Builds the `/api` router. The result has its state applied and can be nested
/// directly.
pub fn routes(app_state: AppState) -> Router<AppState> {
    Router::new()
        .nest("/health", health_routes())
        .nest("/tags", tags_routes().route_layer(from_fn(require_staff)))
        .with_state(app_state)
}
