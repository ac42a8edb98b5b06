use axum::{Json, http::StatusCode};
use serde::Serialize;

/// JSON envelope used by every `/api` endpoint:
///
/// ```json
/// {
///   "success": true,
///   "data": [{ "name": "hackgt", "warn_on_duplicates": true }],
///   "message": "Tags retrieved successfully"
/// }
/// ```
///
/// On failure `success` is `false`, `data` is the type's default and `message` explains
/// what went wrong.
#[derive(Serialize)]
pub struct ApiResponse<T>
where
    T: Serialize,
{
    pub success: bool,
    pub data: T,
    pub message: String,
}

impl<T> ApiResponse<T>
where
    T: Serialize,
{
    pub fn success(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            data,
            message: message.into(),
        }
    }

    /// Error response with default `data`.
    pub fn error(message: impl Into<String>) -> Self
    where
        T: Default,
    {
        Self {
            success: false,
            data: T::default(),
            message: message.into(),
        }
    }
}

/// What every `/api` handler returns.
pub type ApiReply<T> = (StatusCode, Json<ApiResponse<T>>);

/// Shorthand for an error reply with the given status.
pub fn reject<T>(status: StatusCode, message: impl Into<String>) -> ApiReply<T>
where
    T: Serialize + Default,
{
    (status, Json(ApiResponse::error(message)))
}
