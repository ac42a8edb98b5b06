use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use services::tags::{TagService, normalize_name};
use util::state::AppState;

use super::common::{RemovedTagResponse, tag_error_status};
use crate::auth::Staff;
use crate::response::{ApiReply, ApiResponse, reject};

/// DELETE /api/tags/{name}
///
/// Deletes the tag and removes it from every attendee. Attendees left without any tag
/// are deleted as well.
///
/// ### Responses
/// - `200 OK`
/// ```json
/// {
///   "success": true,
///   "data": { "name": "lunch", "attendees_updated": 12, "attendees_deleted": 3 },
///   "message": "Tag removed successfully"
/// }
/// ```
/// - `404 Not Found` if the tag does not exist
pub async fn delete_tag(
    State(state): State<AppState>,
    Path(name): Path<String>,
    staff: Staff,
) -> ApiReply<RemovedTagResponse> {
    match TagService::remove(state.db(), &name).await {
        Ok(removal) => {
            tracing::info!(tag = %name, staff = %staff.0, "Tag deleted over REST");
            (
                StatusCode::OK,
                Json(ApiResponse::success(
                    RemovedTagResponse {
                        name: normalize_name(&name),
                        attendees_updated: removal.updated,
                        attendees_deleted: removal.deleted,
                    },
                    "Tag removed successfully",
                )),
            )
        }
        Err(e) => reject(tag_error_status(&e), e.to_string()),
    }
}
