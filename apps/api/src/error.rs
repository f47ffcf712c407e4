//! # API Error Types
//!
//! The single error type handlers return, and its mapping to HTTP
//! responses. Every error body is `{"error": "<message>"}`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;
use tracing::error;

use store_core::{CoreError, ValidationError};
use store_db::{DbError, StoreError};

/// Errors surfaced to HTTP clients.
#[derive(Debug, Error)]
pub enum ApiError {
    /// 404 - entity does not exist.
    #[error("{0}")]
    NotFound(String),

    /// 409 - conflicts with existing state (duplicates, oversell, ...).
    #[error("{0}")]
    Conflict(String),

    /// 400 - malformed or invalid input.
    #[error("{0}")]
    BadRequest(String),

    /// 401 - missing or invalid credentials.
    #[error("{0}")]
    Unauthorized(String),

    /// 403 - authenticated but not allowed.
    #[error("{0}")]
    Forbidden(String),

    /// 500 - something we did not expect. Details are logged, not leaked.
    #[error("Internal server error")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
            ApiError::Internal(detail) => {
                error!(detail = %detail, "Internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

/// Business rule violations map to client-visible statuses; anything the
/// client could not have caused is a 500.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match &err {
            CoreError::ProductNotFound(_)
            | CoreError::OrderNotFound(_)
            | CoreError::CartItemNotFound(_) => ApiError::NotFound(err.to_string()),

            CoreError::InsufficientStock { .. } | CoreError::InsufficientQuantity { .. } => {
                ApiError::Conflict(err.to_string())
            }

            CoreError::EmptyCart => ApiError::BadRequest(err.to_string()),

            CoreError::Validation(_) => ApiError::BadRequest(err.to_string()),
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::BadRequest(err.to_string())
    }
}

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match &err {
            DbError::NotFound { .. } => ApiError::NotFound(err.to_string()),
            DbError::UniqueViolation { .. } => ApiError::Conflict(err.to_string()),
            DbError::ForeignKeyViolation { .. } => ApiError::Conflict(err.to_string()),
            _ => ApiError::Internal(err.to_string()),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Core(e) => e.into(),
            StoreError::Db(e) => e.into(),
        }
    }
}

/// Result type for API handlers.
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn core_errors_map_to_statuses() {
        let err: ApiError = CoreError::EmptyCart.into();
        assert!(matches!(err, ApiError::BadRequest(_)));

        let err: ApiError = CoreError::InsufficientStock {
            product_id: "p".to_string(),
            available: 1,
            requested: 2,
        }
        .into();
        assert!(matches!(err, ApiError::Conflict(_)));

        let err: ApiError = CoreError::OrderNotFound("o".to_string()).into();
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[test]
    fn unique_violations_are_conflicts() {
        let err: ApiError = DbError::duplicate("users.email", "a@b.com").into();
        assert!(matches!(err, ApiError::Conflict(_)));
    }
}
