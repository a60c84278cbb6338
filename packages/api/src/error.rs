//! Error type shared by every backend call.

use reqwest::StatusCode;
use serde::Deserialize;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("not authenticated")]
    MissingToken,
    #[error("{0}")]
    Validation(String),
    #[error("unauthorized: {0}")]
    Unauthorized(String),
    #[error("forbidden: {0}")]
    Forbidden(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("request failed ({status}): {message}")]
    Status { status: u16, message: String },
    #[error("network error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("unexpected response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("real-time: {0}")]
    Realtime(String),
}

/// `{ "error": ... }` or `{ "message": ... }` body returned on failures.
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    error: Option<String>,
    message: Option<String>,
}

impl ApiError {
    /// Build an error from a non-2xx status and its (possibly empty) body.
    pub fn from_status(status: StatusCode, body: &str) -> Self {
        let parsed: ErrorBody = serde_json::from_str(body).unwrap_or_default();
        let message = parsed
            .error
            .or(parsed.message)
            .unwrap_or_else(|| {
                status
                    .canonical_reason()
                    .unwrap_or("unknown error")
                    .to_string()
            });
        match status {
            StatusCode::UNAUTHORIZED => Self::Unauthorized(message),
            StatusCode::FORBIDDEN => Self::Forbidden(message),
            StatusCode::NOT_FOUND => Self::NotFound(message),
            _ => Self::Status {
                status: status.as_u16(),
                message,
            },
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Unauthorized(_) => Some(401),
            Self::Forbidden(_) => Some(403),
            Self::NotFound(_) => Some(404),
            Self::Status { status, .. } => Some(*status),
            Self::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Whether the session should be dropped and the user sent back to login.
    pub fn is_token_expired(&self) -> bool {
        match self {
            Self::Unauthorized(_) | Self::MissingToken => true,
            Self::Status { message, .. } | Self::Forbidden(message) => {
                let lower = message.to_lowercase();
                lower.contains("token") && (lower.contains("expired") || lower.contains("invalid"))
            }
            _ => false,
        }
    }

    /// Replace the message of a 403 with a friendlier one.
    pub(crate) fn forbidden_as(self, message: &str) -> Self {
        match self {
            Self::Forbidden(_) => Self::Forbidden(message.to_string()),
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_body_variants() {
        let err = ApiError::from_status(StatusCode::BAD_REQUEST, r#"{"error":"bad title"}"#);
        assert!(matches!(err, ApiError::Status { status: 400, ref message } if message == "bad title"));

        let err = ApiError::from_status(StatusCode::CONFLICT, r#"{"message":"exists"}"#);
        assert_eq!(err.to_string(), "request failed (409): exists");

        let err = ApiError::from_status(StatusCode::INTERNAL_SERVER_ERROR, "<html>");
        assert_eq!(err.status(), Some(500));
        assert!(err.to_string().contains("Internal Server Error"));
    }

    #[test]
    fn test_token_expiry_detection() {
        assert!(ApiError::from_status(StatusCode::UNAUTHORIZED, "").is_token_expired());
        assert!(ApiError::MissingToken.is_token_expired());
        let expired = ApiError::from_status(
            StatusCode::UNPROCESSABLE_ENTITY,
            r#"{"message":"Token has expired"}"#,
        );
        assert!(expired.is_token_expired());
        assert!(!ApiError::from_status(StatusCode::NOT_FOUND, "").is_token_expired());
        assert!(!ApiError::Validation("x".into()).is_token_expired());
    }
}
