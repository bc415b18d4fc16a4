//! Request-level errors: each variant knows its own HTTP status and renders
//! the `{"error": {"type": ..., "message": ...}}` envelope. Config/startup
//! errors are `anyhow::Error` and never reach this type.

use serde_json::{json, Value};

#[derive(Debug, Clone)]
pub enum ApiError {
    InvalidAuth(String),
    NotFound,
    PathDecode(String),
    InvalidContentType(String),
    Decode(String),
    Validation(String),
    VersionMismatch { expected: String, got: String },
}

impl ApiError {
    pub fn status(&self) -> u16 {
        match self {
            ApiError::InvalidAuth(_) => 401,
            ApiError::NotFound => 404,
            ApiError::PathDecode(_) => 500,
            ApiError::InvalidContentType(_) => 400,
            ApiError::Decode(_) => 400,
            ApiError::Validation(_) => 400,
            ApiError::VersionMismatch { .. } => 400,
        }
    }

    fn error_type(&self) -> &'static str {
        match self {
            ApiError::InvalidAuth(_) => "invalid_request_error",
            ApiError::NotFound => "invalid_request_error",
            ApiError::PathDecode(_) => "api_error",
            ApiError::InvalidContentType(_) => "invalid_request_error",
            ApiError::Decode(_) => "invalid_request_error",
            ApiError::Validation(_) => "invalid_request_error",
            ApiError::VersionMismatch { .. } => "invalid_request_error",
        }
    }

    fn message(&self) -> String {
        match self {
            ApiError::InvalidAuth(msg) => msg.clone(),
            ApiError::NotFound => "Unrecognized request path.".to_string(),
            ApiError::PathDecode(msg) => format!("failed to decode request path: {msg}"),
            ApiError::InvalidContentType(msg) => msg.clone(),
            ApiError::Decode(msg) => msg.clone(),
            ApiError::Validation(msg) => msg.clone(),
            ApiError::VersionMismatch { expected, got } => {
                format!("Stripe-Version header {got:?} does not match spec version {expected:?}")
            }
        }
    }

    /// The JSON error envelope for this error.
    pub fn to_json(&self) -> Value {
        json!({
            "error": {
                "type": self.error_type(),
                "message": self.message(),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_is_404() {
        assert_eq!(ApiError::NotFound.status(), 404);
    }

    #[test]
    fn invalid_auth_is_401() {
        assert_eq!(ApiError::InvalidAuth("bad key".to_string()).status(), 401);
    }

    #[test]
    fn envelope_shape() {
        let err = ApiError::Decode("bad percent escape".to_string());
        let json = err.to_json();
        assert_eq!(json["error"]["type"], "invalid_request_error");
        assert_eq!(json["error"]["message"], "bad percent escape");
    }
}
