//! Error types for the engine and the HTTP transport.
//!
//! [`ShortenerError`] is what every engine and store operation returns.
//! [`AppError`] is its HTTP projection, rendered as a JSON body by axum.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::{Value, json};

/// Failures of the short-code engine.
///
/// All variants are recoverable at the call site; none of them indicate a bug.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ShortenerError {
    /// Empty or otherwise unusable input (blank URL, unrepresentable TTL,
    /// invalid configuration).
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// No free code was found within the retry bound or the deadline.
    ///
    /// This is a capacity signal. Retrying without a longer code or a larger
    /// alphabet will not help.
    #[error("keyspace exhausted: no free short code after {attempts} attempt(s)")]
    ExhaustedKeyspace { attempts: usize },

    /// The code is unknown, expired, or already reclaimed.
    #[error("short code not found: {0}")]
    CodeNotFound(String),

    /// The backing store could not complete the operation.
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),
}

impl ShortenerError {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    pub fn store_unavailable(message: impl std::fmt::Display) -> Self {
        Self::StoreUnavailable(message.to_string())
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorInfo,
}

/// Machine-readable error payload returned by the API.
#[derive(Debug, Serialize)]
pub struct ErrorInfo {
    pub code: &'static str,
    pub message: String,
    pub details: Value,
}

/// Transport-level error rendered as `{"error": {"code", "message", "details"}}`.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{message}")]
    Validation { message: String, details: Value },
    #[error("{message}")]
    NotFound { message: String, details: Value },
    #[error("{message}")]
    Unavailable {
        code: &'static str,
        message: String,
        details: Value,
    },
    #[error("{message}")]
    Internal { message: String, details: Value },
}

impl AppError {
    pub fn bad_request(message: impl Into<String>, details: Value) -> Self {
        Self::Validation {
            message: message.into(),
            details,
        }
    }

    pub fn not_found(message: impl Into<String>, details: Value) -> Self {
        Self::NotFound {
            message: message.into(),
            details,
        }
    }

    pub fn unavailable(code: &'static str, message: impl Into<String>, details: Value) -> Self {
        Self::Unavailable {
            code,
            message: message.into(),
            details,
        }
    }

    pub fn internal(message: impl Into<String>, details: Value) -> Self {
        Self::Internal {
            message: message.into(),
            details,
        }
    }

    /// Returns the HTTP status this error maps to.
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation { .. } => StatusCode::BAD_REQUEST,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::Unavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn to_error_info(self) -> ErrorInfo {
        let (code, message, details) = match self {
            AppError::Validation { message, details } => ("validation_error", message, details),
            AppError::NotFound { message, details } => ("not_found", message, details),
            AppError::Unavailable {
                code,
                message,
                details,
            } => (code, message, details),
            AppError::Internal { message, details } => ("internal_error", message, details),
        };

        ErrorInfo {
            code,
            message,
            details,
        }
    }
}

impl From<ShortenerError> for AppError {
    fn from(err: ShortenerError) -> Self {
        match err {
            ShortenerError::InvalidInput(reason) => {
                AppError::bad_request("Invalid input", json!({ "reason": reason }))
            }
            ShortenerError::CodeNotFound(code) => {
                AppError::not_found("Short link not found", json!({ "code": code }))
            }
            ShortenerError::ExhaustedKeyspace { attempts } => AppError::unavailable(
                "keyspace_exhausted",
                "No free short code available",
                json!({ "attempts": attempts }),
            ),
            ShortenerError::StoreUnavailable(reason) => {
                tracing::error!("Store unavailable: {}", reason);
                AppError::unavailable(
                    "store_unavailable",
                    "Storage backend unavailable",
                    json!({}),
                )
            }
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let details = serde_json::to_value(errors.field_errors()).unwrap_or_else(|_| json!({}));
        AppError::bad_request("Request validation failed", details)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ErrorBody {
            error: self.to_error_info(),
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_input_maps_to_bad_request() {
        let err: AppError = ShortenerError::invalid_input("long URL is empty").into();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.to_error_info().code, "validation_error");
    }

    #[test]
    fn test_code_not_found_maps_to_404() {
        let err: AppError = ShortenerError::CodeNotFound("zzzzzz".to_string()).into();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);

        let info = err.to_error_info();
        assert_eq!(info.details["code"], "zzzzzz");
    }

    #[test]
    fn test_exhausted_keyspace_is_not_a_client_error() {
        let err: AppError = ShortenerError::ExhaustedKeyspace { attempts: 10 }.into();
        assert_eq!(err.status(), StatusCode::SERVICE_UNAVAILABLE);

        let info = err.to_error_info();
        assert_eq!(info.code, "keyspace_exhausted");
        assert_eq!(info.details["attempts"], 10);
    }

    #[test]
    fn test_store_unavailable_hides_backend_reason() {
        let err: AppError =
            ShortenerError::store_unavailable("Connection refused (os error 111)").into();
        assert_eq!(err.status(), StatusCode::SERVICE_UNAVAILABLE);

        let info = err.to_error_info();
        assert_eq!(info.code, "store_unavailable");
        assert!(!info.message.contains("os error"));
    }

    #[test]
    fn test_shortener_error_display() {
        let err = ShortenerError::ExhaustedKeyspace { attempts: 3 };
        assert!(err.to_string().contains("3 attempt"));
    }
}
