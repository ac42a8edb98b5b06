use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use db::models::tag::Model as Tag;
use serde::{Deserialize, Serialize};
use services::tags::TagError;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateTagRequest {
    #[validate(length(min = 1, message = "Tag name is required"))]
    pub name: String,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    #[serde(rename = "warnOnDuplicates", alias = "warn_on_duplicates")]
    pub warn_on_duplicates: Option<bool>,
}

#[derive(Debug, Serialize, Default)]
pub struct TagResponse {
    pub name: String,
    pub start: Option<String>,
    pub end: Option<String>,
    pub warn_on_duplicates: bool,
    pub created_at: String,
}

impl From<Tag> for TagResponse {
    fn from(tag: Tag) -> Self {
        Self {
            name: tag.name,
            start: tag.start.map(|t| t.to_rfc3339()),
            end: tag.end.map(|t| t.to_rfc3339()),
            warn_on_duplicates: tag.warn_on_duplicates,
            created_at: tag.created_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize, Default)]
pub struct RemovedTagResponse {
    pub name: String,
    /// Attendees that kept other tags.
    pub attendees_updated: u64,
    /// Attendees deleted because this was their last tag.
    pub attendees_deleted: u64,
}

pub fn tag_error_status(err: &TagError) -> StatusCode {
    match err {
        TagError::Validation(_) => StatusCode::BAD_REQUEST,
        TagError::Exists(_) => StatusCode::CONFLICT,
        TagError::NotFound(_) => StatusCode::NOT_FOUND,
        TagError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}
