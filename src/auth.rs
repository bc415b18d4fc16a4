//! Authorization header validation (C11, step 2).
//!
//! The `Authorization` header must be either `Bearer <key>` or
//! `Basic <base64>`; the decoded key must split on `_` into exactly three
//! non-empty parts shaped `sk_test_<rest>` — live keys (`sk_live_...`) are
//! rejected, matching the upstream's test-mode-only mock surface.

use base64::{engine::general_purpose::STANDARD, Engine as _};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthError(pub &'static str);

fn is_test_secret_key(key: &str) -> bool {
    let parts: Vec<&str> = key.split('_').collect();
    parts.len() == 3 && parts.iter().all(|p| !p.is_empty()) && parts[0] == "sk" && parts[1] == "test"
}

/// Validate an `Authorization` header value, returning the extracted key on
/// success.
pub fn validate_authorization(header_value: Option<&str>) -> Result<String, AuthError> {
    let header_value = header_value.ok_or(AuthError("missing Authorization header"))?;

    let key = if let Some(token) = header_value.strip_prefix("Bearer ") {
        token.to_string()
    } else if let Some(encoded) = header_value.strip_prefix("Basic ") {
        let decoded = STANDARD
            .decode(encoded)
            .map_err(|_| AuthError("invalid base64 in Basic auth"))?;
        let decoded = String::from_utf8(decoded).map_err(|_| AuthError("Basic auth payload is not UTF-8"))?;
        decoded.split(':').next().unwrap_or(&decoded).to_string()
    } else {
        return Err(AuthError("Authorization header is neither Bearer nor Basic"));
    };

    if !is_test_secret_key(&key) {
        return Err(AuthError("invalid API key"));
    }
    Ok(key)
}
