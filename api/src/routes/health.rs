use crate::response::ApiResponse;
use axum::{Json, Router, http::StatusCode, response::IntoResponse, routing::get};
use serde::Serialize;
use util::{config, http::is_graphql_alive, state::AppState};

/// Seconds to wait for the registration service before declaring it down.
const UPSTREAM_TIMEOUT_SECS: u64 = 5;

/// Builds the `/health` route group.
///
/// - `GET /health` → the service itself is up
/// - `GET /health/upstream` → the registration service answers
pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(health_check))
        .route("/upstream", get(upstream_check))
}

/// GET /health
///
/// ### Response
/// - `200 OK`
///
/// ```json
/// {
///   "success": true,
///   "data": "OK",
///   "message": "Health check passed"
/// }
/// ```
async fn health_check() -> impl IntoResponse {
    Json(ApiResponse::success("OK", "Health check passed"))
}

#[derive(Debug, Serialize, Default)]
pub struct UpstreamHealth {
    pub endpoint: String,
    pub alive: bool,
}

/// GET /health/upstream
///
/// Probes `REGISTRATION_GRAPHQL` with a `{ __typename }` query.
///
/// ### Responses
/// - `200 OK` with `{ "endpoint": "...", "alive": true }`
/// - `503 Service Unavailable` with `alive: false` when the probe fails or gets a 5xx
async fn upstream_check() -> impl IntoResponse {
    let endpoint = config::registration_graphql();
    let alive = match is_graphql_alive(&endpoint, UPSTREAM_TIMEOUT_SECS).await {
        Ok(alive) => alive,
        Err(e) => {
            tracing::warn!(error = %e, endpoint = %endpoint, "Registration service unreachable");
            false
        }
    };

    let (status, message) = if alive {
        (StatusCode::OK, "Registration service reachable")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "Registration service unreachable")
    };
    (
        status,
        Json(ApiResponse {
            success: alive,
            data: UpstreamHealth { endpoint, alive },
            message: message.to_string(),
        }),
    )
}
