use axum::{Json, extract::State, http::StatusCode};
use common::format_validation_errors;
use services::tags::{NewTag, TagService};
use util::state::AppState;
use validator::Validate;

use super::common::{CreateTagRequest, TagResponse, tag_error_status};
use crate::response::{ApiReply, ApiResponse, reject};

/// POST /api/tags
///
/// Creates a tag. Names are stored lowercase.
///
/// ### Request Body
/// ```json
/// {
///   "name": "lunch-day-1",
///   "start": "2026-10-17T11:00:00Z",
///   "end": "2026-10-17T14:00:00Z",
///   "warnOnDuplicates": true
/// }
/// ```
/// `start`/`end` are optional but must be given together, with `start < end`.
/// `warnOnDuplicates` defaults to `true`.
///
/// ### Responses
/// - `201 Created` with the tag
/// - `400 Bad Request` on validation failure
/// - `409 Conflict` if the tag exists
pub async fn create_tag(
    State(state): State<AppState>,
    Json(req): Json<CreateTagRequest>,
) -> ApiReply<TagResponse> {
    if let Err(e) = req.validate() {
        return reject(StatusCode::BAD_REQUEST, format_validation_errors(&e));
    }

    let input = NewTag {
        name: req.name,
        start: req.start,
        end: req.end,
        warn_on_duplicates: req.warn_on_duplicates,
    };

    match TagService::add(state.db(), input).await {
        Ok(tag) => (
            StatusCode::CREATED,
            Json(ApiResponse::success(tag.into(), "Tag created successfully")),
        ),
        Err(e) => reject(tag_error_status(&e), e.to_string()),
    }
}
