//! Structured error types for API responses.
//!
//! The store itself never errors on missing ids (those are silent no-ops);
//! these types describe the failures the HTTP layer does surface:
//! input validation, lookups callers asked to be strict about, and upstream
//! AI failures.

use serde::Serialize;
use std::fmt;

/// Error codes for programmatic error handling.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Validation errors (4xx-like)
    MissingRequiredField,
    TextTooLong,

    // Not found errors
    TaskNotFound,

    // Upstream errors
    AiNotConfigured,
    UpstreamUnavailable,
}

/// Structured error carried in API error responses.
#[derive(Debug, Serialize)]
pub struct ApiError {
    pub code: ErrorCode,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            field: None,
            details: None,
        }
    }

    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    // Convenience constructors

    pub fn missing_field(field: &str) -> Self {
        Self::new(
            ErrorCode::MissingRequiredField,
            format!("{} is required", field),
        )
        .with_field(field)
    }

    pub fn text_too_long(field: &str, max: usize) -> Self {
        Self::new(
            ErrorCode::TextTooLong,
            format!("{} is too long, maximum {} characters", field, max),
        )
        .with_field(field)
    }

    pub fn task_not_found(task_id: &str) -> Self {
        Self::new(
            ErrorCode::TaskNotFound,
            format!("Task not found: {}", task_id),
        )
    }

    pub fn ai_not_configured() -> Self {
        Self::new(
            ErrorCode::AiNotConfigured,
            "AI features are disabled: no API key configured",
        )
    }

    pub fn upstream(err: impl fmt::Display) -> Self {
        Self::new(ErrorCode::UpstreamUnavailable, "AI request failed")
            .with_details(err.to_string())
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ApiError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_codes_serialize_screaming_snake() {
        let err = ApiError::missing_field("title");
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["code"], "MISSING_REQUIRED_FIELD");
        assert_eq!(json["field"], "title");
        assert!(json.get("details").is_none());
    }

    #[test]
    fn upstream_error_keeps_details() {
        let err = ApiError::upstream("connection refused");
        assert_eq!(err.code, ErrorCode::UpstreamUnavailable);
        assert_eq!(err.details.as_deref(), Some("connection refused"));
    }
}
