//! Admin-key authentication for the check-in API.
//!
//! Every protected request carries `Authorization: Basic <base64(key)>` or
//! `Basic <base64(name:key)>`. The key must equal `ADMIN_KEY_SECRET`; the optional name is
//! recorded as the staff member performing check-ins.

pub mod extractors;
pub mod guards;
pub mod middleware;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as Base64;
use util::config;

/// Actor recorded when the credential carries no name.
pub const DEFAULT_STAFF: &str = "admin";

/// Staff member authenticated for the current request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Staff(pub String);

/// Name and key decoded from a Basic credential. Not yet checked against the admin key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub staff: String,
    pub key: String,
}

/// Decodes the payload of a Basic credential (the part after `Basic `).
pub fn decode_credentials(encoded: &str) -> Option<Credentials> {
    let bytes = Base64.decode(encoded.trim()).ok()?;
    let text = String::from_utf8(bytes).ok()?;
    let (staff, key) = match text.split_once(':') {
        Some((name, key)) if !name.trim().is_empty() => (name.trim().to_string(), key.to_string()),
        Some((_, key)) => (DEFAULT_STAFF.to_string(), key.to_string()),
        None => (DEFAULT_STAFF.to_string(), text),
    };
    Some(Credentials { staff, key })
}

/// Decodes a full `Authorization` header value. The scheme is case-insensitive.
pub fn parse_basic_header(value: &str) -> Option<Credentials> {
    let (scheme, rest) = value.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("basic") {
        return None;
    }
    decode_credentials(rest)
}

/// Checks decoded credentials against the configured admin key.
///
/// An empty `ADMIN_KEY_SECRET` rejects everyone.
pub fn verify(credentials: Credentials) -> Option<Staff> {
    let expected = config::admin_key_secret();
    if expected.is_empty() || credentials.key != expected {
        return None;
    }
    Some(Staff(credentials.staff))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_only_credential_defaults_to_admin() {
        // base64("letmein")
        let creds = parse_basic_header("Basic bGV0bWVpbg==").unwrap();
        assert_eq!(creds.staff, "admin");
        assert_eq!(creds.key, "letmein");
    }

    #[test]
    fn name_and_key_are_split_on_first_colon() {
        let encoded = Base64.encode("alice:se:cret");
        let creds = parse_basic_header(&format!("basic {encoded}")).unwrap();
        assert_eq!(creds.staff, "alice");
        assert_eq!(creds.key, "se:cret");

        let anonymous = decode_credentials(&Base64.encode(":k")).unwrap();
        assert_eq!(anonymous.staff, "admin");
    }

    #[test]
    fn rejects_other_schemes_and_garbage() {
        assert!(parse_basic_header("Bearer abc").is_none());
        assert!(parse_basic_header("Basic !!!").is_none());
        assert!(parse_basic_header("Basic").is_none());
    }
}
