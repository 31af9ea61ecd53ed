//! Client error types
//!
//! A single error enum shared by the HTTP pipeline, the token store and every
//! service, so view code can render any failure the same way.

use reqwest::StatusCode;

/// Result alias used across the client core
pub type Result<T> = std::result::Result<T, ApiError>;

/// Errors surfaced by the API client
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Network or transport failure, never retried
    #[error("Network error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Non-success HTTP status returned by the API
    #[error("{message}")]
    Status {
        status: u16,
        message: String,
        body: Option<serde_json::Value>,
    },

    #[error("Invalid session: {0}")]
    InvalidSession(String),

    #[error("Invalid response: {0}")]
    Decode(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Request cancelled")]
    Cancelled,
}

impl ApiError {
    /// Build a status error from a response body.
    ///
    /// The API reports failures as `{"message": "..."}`; when that field is
    /// missing the canonical reason phrase is used instead.
    pub fn from_status(status: StatusCode, body: Option<serde_json::Value>) -> Self {
        let message = body
            .as_ref()
            .and_then(|b| b.get("message"))
            .and_then(|m| m.as_str())
            .map(str::to_string)
            .unwrap_or_else(|| {
                status
                    .canonical_reason()
                    .unwrap_or("Request failed")
                    .to_string()
            });

        ApiError::Status {
            status: status.as_u16(),
            message,
            body,
        }
    }

    /// HTTP status code, if the API answered at all
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            ApiError::Transport(err) => err.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(StatusCode::UNAUTHORIZED.as_u16())
    }

    /// Message suitable for an alert banner
    pub fn message(&self) -> String {
        match self {
            ApiError::Status { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Decode(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_status_uses_body_message() {
        let err = ApiError::from_status(
            StatusCode::BAD_REQUEST,
            Some(json!({"message": "Course name is required"})),
        );

        assert_eq!(err.status(), Some(400));
        assert_eq!(err.message(), "Course name is required");
        assert_eq!(err.to_string(), "Course name is required");
    }

    #[test]
    fn test_from_status_falls_back_to_reason() {
        let err = ApiError::from_status(StatusCode::NOT_FOUND, None);
        assert_eq!(err.message(), "Not Found");

        let err = ApiError::from_status(StatusCode::CONFLICT, Some(json!({"detail": "x"})));
        assert_eq!(err.message(), "Conflict");
    }

    #[test]
    fn test_is_unauthorized() {
        assert!(ApiError::from_status(StatusCode::UNAUTHORIZED, None).is_unauthorized());
        assert!(!ApiError::from_status(StatusCode::FORBIDDEN, None).is_unauthorized());
        assert!(!ApiError::Cancelled.is_unauthorized());
    }

    #[test]
    fn test_non_status_errors_have_no_status() {
        assert_eq!(ApiError::Storage("disk full".into()).status(), None);
        assert_eq!(ApiError::Cancelled.message(), "Request cancelled");
    }
}
