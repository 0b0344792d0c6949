//! Error types shared by the auth bridge, cookie jars and fragment loader.

use serde::Deserialize;
use thiserror::Error;

/// Failure talking to the backend or a fragment endpoint.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Access denied: {0}")]
    AccessDenied(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Rate limited - please wait before retrying")]
    RateLimited,

    #[error("Server error: {0}")]
    ServerError(String),

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

/// Error body returned by the backend on 4xx/5xx responses.
#[derive(Debug, Deserialize)]
struct BackendErrorBody {
    message: String,
}

impl ApiError {
    /// Truncate a response body to avoid logging excessive data
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            return body.to_string();
        }
        let mut end = MAX_ERROR_BODY_LENGTH;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}... (truncated, {} total bytes)", &body[..end], body.len())
    }

    /// Prefer the backend's `message` field; fall back to the raw body.
    fn describe_body(body: &str) -> String {
        match serde_json::from_str::<BackendErrorBody>(body) {
            Ok(parsed) if !parsed.message.is_empty() => parsed.message,
            _ => Self::truncate_body(body),
        }
    }

    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        let detail = Self::describe_body(body);
        match status.as_u16() {
            400 => ApiError::BadRequest(detail),
            401 => ApiError::Unauthorized(detail),
            403 => ApiError::AccessDenied(detail),
            404 => ApiError::NotFound(detail),
            429 => ApiError::RateLimited,
            500..=599 => ApiError::ServerError(detail),
            _ => ApiError::InvalidResponse(format!("Status {}: {}", status, detail)),
        }
    }
}

/// Failure persisting or reading cookies.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Cookie storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Cookie storage is corrupt: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Why `AuthBridge::login` did not produce an outcome.
///
/// A rejected or failed authentication call is an error here, never a
/// quiet "not authenticated" outcome.
#[derive(Error, Debug)]
pub enum LoginError {
    #[error("Authentication call failed: {0}")]
    AuthCall(#[from] ApiError),

    #[error("Failed to write session cookie: {0}")]
    Cookie(#[from] StoreError),
}

/// A fragment could not be placed into the document.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MountError {
    #[error("No mount element with id `{0}`")]
    NotFound(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn test_from_status_extracts_backend_message() {
        let body = r#"{"code":400,"message":"Failed to authenticate.","data":{}}"#;
        match ApiError::from_status(StatusCode::BAD_REQUEST, body) {
            ApiError::BadRequest(msg) => assert_eq!(msg, "Failed to authenticate."),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_from_status_maps_codes() {
        assert!(matches!(
            ApiError::from_status(StatusCode::NOT_FOUND, "<html>missing</html>"),
            ApiError::NotFound(ref body) if body == "<html>missing</html>"
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::TOO_MANY_REQUESTS, ""),
            ApiError::RateLimited
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::BAD_GATEWAY, "upstream"),
            ApiError::ServerError(_)
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::IM_A_TEAPOT, "tea"),
            ApiError::InvalidResponse(ref msg) if msg.contains("418")
        ));
    }

    #[test]
    fn test_truncate_body() {
        let long = "é".repeat(400);
        let truncated = ApiError::truncate_body(&long);
        assert!(truncated.contains("truncated, 800 total bytes"));

        assert_eq!(ApiError::truncate_body("short"), "short");
    }
}
