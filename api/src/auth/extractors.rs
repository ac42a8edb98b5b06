use axum::{
    extract::FromRequestParts,
    http::{StatusCode, header::AUTHORIZATION, request::Parts},
};
use percent_encoding::percent_decode_str;

use super::{Credentials, Staff, decode_credentials, parse_basic_header, verify};

/// Reads the credential from the `Authorization` header, or from the `auth` query
/// parameter (same base64 payload) for clients that cannot set headers, like browser
/// WebSockets.
pub fn credentials_from_parts(parts: &Parts) -> Option<Credentials> {
    if let Some(header) = parts.headers.get(AUTHORIZATION) {
        return header.to_str().ok().and_then(parse_basic_header);
    }
    parts
        .uri
        .query()?
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(name, _)| *name == "auth")
        .and_then(|(_, value)| {
            let value = percent_decode_str(value).decode_utf8().ok()?;
            decode_credentials(&value)
        })
}

/// Extracts the authenticated [`Staff`] member.
///
/// Uses the value a guard already stored in the request extensions when present,
/// otherwise verifies the credential itself.
///
/// # Errors
/// - `401 Unauthorized` if the credential is missing, malformed or does not match the admin key.
impl<S> FromRequestParts<S> for Staff
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        if let Some(staff) = parts.extensions.get::<Staff>() {
            return Ok(staff.clone());
        }
        credentials_from_parts(parts)
            .and_then(verify)
            .ok_or((StatusCode::UNAUTHORIZED, "Missing or invalid admin key"))
    }
}
