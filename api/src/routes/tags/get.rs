use axum::{Json, extract::State, http::StatusCode};
use services::tags::TagService;
use util::state::AppState;

use super::common::{TagResponse, tag_error_status};
use crate::response::{ApiReply, ApiResponse, reject};

/// GET /api/tags
///
/// Lists every tag in name order.
///
/// ### Response: 200 OK
/// ```json
/// {
///   "success": true,
///   "data": [
///     { "name": "hackgt", "start": null, "end": null, "warn_on_duplicates": true, "created_at": "..." }
///   ],
///   "message": "Tags retrieved successfully"
/// }
/// ```
pub async fn list_tags(State(state): State<AppState>) -> ApiReply<Vec<TagResponse>> {
    match TagService::list(state.db()).await {
        Ok(tags) => (
            StatusCode::OK,
            Json(ApiResponse::success(
                tags.into_iter().map(TagResponse::from).collect(),
                "Tags retrieved successfully",
            )),
        ),
        Err(e) => {
            tracing::error!(error = %e, "Failed to list tags");
            reject(tag_error_status(&e), e.to_string())
        }
    }
}
