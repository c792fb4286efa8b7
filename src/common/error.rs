// Error handling types for the API

use axum::{http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;
use std::fmt;
use tracing::error;

use super::validation::ValidationResult;

/// API error types
#[derive(Debug)]
pub enum ApiError {
    /// No valid identity on a call that requires one
    NotAuthenticated(String),
    /// Caller is not the owner of the target entity
    NotAuthorized(String),
    NotFound(String),
    ValidationError(String),
    InternalServer(String),
    ServiceUnavailable(String),
    DatabaseError(sqlx::Error),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::NotAuthenticated(msg) => write!(f, "Not Authenticated: {}", msg),
            ApiError::NotAuthorized(msg) => write!(f, "Not Authorized: {}", msg),
            ApiError::NotFound(msg) => write!(f, "Not Found: {}", msg),
            ApiError::ValidationError(msg) => write!(f, "Validation Error: {}", msg),
            ApiError::InternalServer(msg) => write!(f, "Internal Server Error: {}", msg),
            ApiError::ServiceUnavailable(msg) => write!(f, "Service Unavailable: {}", msg),
            ApiError::DatabaseError(e) => write!(f, "Database Error: {}", e),
        }
    }
}

impl std::error::Error for ApiError {}

impl From<sqlx::Error> for ApiError {
    fn from(e: sqlx::Error) -> Self {
        ApiError::DatabaseError(e)
    }
}

/// JSON error response structure
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::NotAuthenticated(_) => StatusCode::UNAUTHORIZED,
            ApiError::NotAuthorized(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::ValidationError(_) => StatusCode::BAD_REQUEST,
            ApiError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::InternalServer(_) | ApiError::DatabaseError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ApiError::NotAuthenticated(_) => "NOT_AUTHENTICATED",
            ApiError::NotAuthorized(_) => "NOT_AUTHORIZED",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::ValidationError(_) => "VALIDATION_ERROR",
            ApiError::InternalServer(_) => "INTERNAL_SERVER_ERROR",
            ApiError::ServiceUnavailable(_) => "SERVICE_UNAVAILABLE",
            ApiError::DatabaseError(_) => "DATABASE_ERROR",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status_code();
        let code = self.code();

        let error_message = match self {
            ApiError::DatabaseError(e) => {
                error!(error = %e, "Database error occurred");
                "Database operation failed".to_string()
            }
            ApiError::NotAuthenticated(msg)
            | ApiError::NotAuthorized(msg)
            | ApiError::NotFound(msg)
            | ApiError::ValidationError(msg)
            | ApiError::InternalServer(msg)
            | ApiError::ServiceUnavailable(msg) => msg,
        };

        let error_response = ErrorResponse {
            error: error_message,
            code: code.to_string(),
        };

        (status, Json(error_response)).into_response()
    }
}

/// Helper function to convert ValidationResult to ApiError
impl From<ValidationResult> for ApiError {
    fn from(result: ValidationResult) -> Self {
        if result.is_valid {
            ApiError::InternalServer(
                "Validation result was valid but converted to error".to_string(),
            )
        } else {
            let error_messages: Vec<String> = result
                .errors
                .iter()
                .map(|e| format!("{}: {}", e.field, e.message))
                .collect();
            ApiError::ValidationError(error_messages.join(", "))
        }
    }
}
