use crate::auth::{Staff, extractors::credentials_from_parts, verify};
use crate::response::ApiResponse;
use axum::{
    Json,
    body::Body,
    http::{Request, StatusCode},
    middleware::Next,
    response::Response,
};

#[derive(serde::Serialize, Default)]
pub struct Empty;

/// Rejects the request unless it carries the admin key; stores the [`Staff`] member in
/// the request extensions for handlers further down.
///
/// ### Errors
/// - `401 Unauthorized` with an `ApiResponse` body.
pub async fn require_staff(
    req: Request<Body>,
    next: Next,
) -> Result<Response, (StatusCode, Json<ApiResponse<Empty>>)> {
    let (parts, body) = req.into_parts();

    let staff = credentials_from_parts(&parts).and_then(verify).ok_or_else(|| {
        tracing::debug!(path = %parts.uri.path(), "Rejected request without a valid admin key");
        (
            StatusCode::UNAUTHORIZED,
            Json(ApiResponse::error("Missing or invalid admin key")),
        )
    })?;

    let mut req = Request::from_parts(parts, body);
    req.extensions_mut().insert::<Staff>(staff);
    Ok(next.run(req).await)
}
