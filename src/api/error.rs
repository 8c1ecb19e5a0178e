//! API Error Types
//!
//! Defines error types for the API layer and implements conversion
//! to HTTP responses with appropriate status codes.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::ops::OpError;

/// API error types
#[derive(Error, Debug)]
pub enum ApiError {
    /// Request validation failed
    #[error("Validation error: {0}")]
    Validation(String),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// The engine backend rejected or never received the call. The
    /// message is the user-facing summary; detail goes to the log.
    #[error("{0}")]
    Engine(String),

    /// Assistant endpoints hit without a configured model
    #[error("AI assistant is not configured")]
    AssistantDisabled,

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<OpError> for ApiError {
    fn from(e: OpError) -> Self {
        match e {
            // The operation layer already logged the engine detail
            OpError::Engine { action, .. } => {
                ApiError::Engine(format!("Failed to {}. Please try again.", action))
            }
            other => ApiError::Validation(other.to_string()),
        }
    }
}

/// Error response body
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
    pub request_id: String,
}

/// Error details
#[derive(Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            ApiError::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            ApiError::Engine(_) => (StatusCode::BAD_GATEWAY, "ENGINE_ERROR"),
            ApiError::AssistantDisabled => (StatusCode::SERVICE_UNAVAILABLE, "ASSISTANT_DISABLED"),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
            ApiError::Io(_) => (StatusCode::INTERNAL_SERVER_ERROR, "IO_ERROR"),
        };

        let request_id = uuid::Uuid::new_v4().to_string();

        // Log the error
        tracing::error!(
            request_id = %request_id,
            error_code = %code,
            error_message = %self,
            "API error occurred"
        );

        let body = ErrorResponse {
            error: ErrorBody {
                code: code.to_string(),
                message: self.to_string(),
            },
            request_id,
        };

        (status, Json(body)).into_response()
    }
}

/// Result type for API operations
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::EngineError;

    #[test]
    fn test_op_validation_maps_to_validation() {
        let err: ApiError = OpError::ZeroAmount.into();
        assert!(matches!(err, ApiError::Validation(_)));
        assert_eq!(
            err.to_string(),
            "Validation error: Amount must be greater than zero"
        );
    }

    #[test]
    fn test_op_engine_maps_to_generic_summary() {
        let err: ApiError = OpError::Engine {
            action: "mint DSC",
            source: EngineError::Unavailable,
        }
        .into();
        match &err {
            ApiError::Engine(msg) => assert_eq!(msg, "Failed to mint DSC. Please try again."),
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
