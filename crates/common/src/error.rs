//! Error types for arena.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;

use crate::i18n::{Locale, translate};

/// Application result type.
pub type AppResult<T> = Result<T, AppError>;

/// Application error type.
///
/// Client errors carry a message key that is translated for the caller;
/// server errors carry the underlying detail, which is reported next to a
/// generic translated message.
#[derive(Debug, Error)]
pub enum AppError {
    // === Client Errors ===
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Validation error: {0}")]
    Validation(String),

    // === Server Errors ===
    #[error("Database error: {0}")]
    Database(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Not-found error with the given message key.
    #[must_use]
    pub fn not_found(key: &str) -> Self {
        Self::NotFound(key.to_string())
    }

    /// Bad-request error with the given message key.
    #[must_use]
    pub fn bad_request(key: &str) -> Self {
        Self::BadRequest(key.to_string())
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            // 4xx Client Errors
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::BadRequest(_) | Self::Validation(_) => StatusCode::BAD_REQUEST,

            // 5xx Server Errors
            Self::Database(_) | Self::Storage(_) | Self::Config(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "NOT_FOUND",
            Self::BadRequest(_) => "BAD_REQUEST",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Storage(_) => "STORAGE_ERROR",
            Self::Config(_) => "CONFIG_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Returns the message key resolved through the message catalogue.
    #[must_use]
    pub fn message_key(&self) -> &str {
        match self {
            Self::NotFound(key) | Self::BadRequest(key) => key,
            Self::Validation(_) => "validation_error",
            Self::Database(_) | Self::Storage(_) | Self::Config(_) | Self::Internal(_) => {
                "internal_error"
            }
        }
    }

    /// Returns diagnostic detail attached to the response, if any.
    #[must_use]
    pub fn details(&self) -> Option<&str> {
        match self {
            Self::NotFound(_) | Self::BadRequest(_) => None,
            Self::Validation(detail)
            | Self::Database(detail)
            | Self::Storage(detail)
            | Self::Config(detail)
            | Self::Internal(detail) => Some(detail),
        }
    }

    /// Returns whether this error should be logged at error level.
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        self.status_code().is_server_error()
    }

    /// Build the structured report for this error.
    #[must_use]
    pub fn report(&self) -> ErrorReport {
        ErrorReport {
            status: self.status_code(),
            code: self.error_code(),
            key: self.message_key().to_string(),
            details: self.details().map(ToString::to_string),
        }
    }
}

/// Locale-independent description of an error response.
///
/// Attached to error responses as an extension so that a later layer which
/// knows the request locale can re-render the body.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorReport {
    /// HTTP status of the response.
    #[serde(skip)]
    pub status: StatusCode,
    /// Stable error code.
    pub code: &'static str,
    /// Message catalogue key.
    pub key: String,
    /// Diagnostic detail.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorReport {
    /// Render the JSON error body in the given locale.
    #[must_use]
    pub fn render(&self, locale: Locale) -> Response {
        let mut error = json!({
            "code": self.code,
            "key": self.key,
            "message": translate(&self.key, locale),
        });
        if let Some(details) = &self.details {
            error["details"] = json!(details);
        }

        let mut response = (self.status, Json(json!({ "error": error }))).into_response();
        response.extensions_mut().insert(self.clone());
        response
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let code = self.error_code();

        // Log server errors
        if self.is_server_error() {
            tracing::error!(error = %self, code = code, "Server error occurred");
        } else {
            tracing::debug!(error = %self, code = code, "Client error occurred");
        }

        self.report().render(Locale::default())
    }
}

// === From implementations ===

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        Self::Validation(err.to_string())
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<sea_orm::DbErr> for AppError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_errors_have_no_details() {
        let err = AppError::not_found("category_not_found");
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(err.message_key(), "category_not_found");
        assert!(err.details().is_none());
    }

    #[test]
    fn test_server_errors_use_generic_key_with_details() {
        let err = AppError::Database("connection reset".to_string());
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.message_key(), "internal_error");
        assert_eq!(err.details(), Some("connection reset"));
    }

    #[test]
    fn test_validation_maps_to_bad_request() {
        let err = AppError::Validation("per_page: range".to_string());
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.error_code(), "VALIDATION_ERROR");
    }

    #[test]
    fn test_render_attaches_report() {
        let response = AppError::bad_request("checker_required_for_status_change")
            .report()
            .render(Locale::En);
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let report = response.extensions().get::<ErrorReport>();
        assert!(report.is_some_and(|r| r.key == "checker_required_for_status_change"));
    }
}
