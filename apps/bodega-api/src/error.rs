//! # API Error Type
//!
//! Unified error type for HTTP handlers.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in Bodega                                 │
//! │                                                                         │
//! │  Handler: Result<T, ApiError>                                          │
//! │       │                                                                 │
//! │       ├── bad status label  ── CoreError::InvalidStatus ──┐            │
//! │       ├── rejected input    ── ValidationError ───────────┤            │
//! │       ├── rule failure      ── DbError::Core(CoreError) ──┤            │
//! │       └── SQLite failure    ── DbError::QueryFailed ──────┤            │
//! │                                                           ▼            │
//! │                                       ApiError { code, message }       │
//! │                                                           │            │
//! │                                    IntoResponse: status + JSON body    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Persistence failures are logged with their cause and answered with a
//! generic message.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::json;

use bodega_core::CoreError;
use bodega_db::DbError;

/// Error body returned by every failing endpoint.
///
/// ```json
/// {
///   "code": "INSUFFICIENT_STOCK",
///   "message": "Insufficient stock for 5f0c...: available 6, requested 20",
///   "details": { "stock_item_id": "5f0c...", "requested": 20, "available": 6 }
/// }
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// Error codes for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Input validation failed (400)
    ValidationError,

    /// Unrecognized sale status label (400)
    InvalidStatus,

    /// Lifecycle does not allow the move (409)
    InvalidTransition,

    /// Resource not found (404)
    NotFound,

    /// Not enough units on hand (409)
    InsufficientStock,

    /// Document already emitted (409)
    AlreadyIssued,

    /// Database operation failed (500)
    DatabaseError,
}

impl ErrorCode {
    pub fn status(&self) -> StatusCode {
        match self {
            ErrorCode::ValidationError | ErrorCode::InvalidStatus => StatusCode::BAD_REQUEST,
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::InvalidTransition
            | ErrorCode::InsufficientStock
            | ErrorCode::AlreadyIssued => StatusCode::CONFLICT,
            ErrorCode::DatabaseError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Creates a not found error.
    pub fn not_found(resource: &str, id: &str) -> Self {
        ApiError::new(ErrorCode::NotFound, format!("{} not found: {}", resource, id))
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    fn database(message: &str) -> Self {
        ApiError::new(ErrorCode::DatabaseError, message)
    }
}

/// Converts core errors to API errors.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        let message = err.to_string();
        match err {
            CoreError::NotFound { .. } => ApiError::new(ErrorCode::NotFound, message),
            CoreError::InsufficientStock {
                stock_item_id,
                available,
                requested,
            } => ApiError::new(ErrorCode::InsufficientStock, message).with_details(json!({
                "stock_item_id": stock_item_id,
                "requested": requested,
                "available": available,
            })),
            CoreError::InvalidStatus(_) => ApiError::new(ErrorCode::InvalidStatus, message),
            CoreError::InvalidTransition { from, to } => {
                ApiError::new(ErrorCode::InvalidTransition, message).with_details(json!({
                    "from": from,
                    "to": to,
                }))
            }
            CoreError::AlreadyIssued { folio, status } => {
                ApiError::new(ErrorCode::AlreadyIssued, message).with_details(json!({
                    "folio": folio,
                    "status": status,
                }))
            }
            CoreError::Validation(e) => ApiError::validation(e.to_string()),
        }
    }
}

/// Converts database errors to API errors.
impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::Core(e) => ApiError::from(e),
            DbError::NotFound { entity, id } => ApiError::not_found(&entity, &id),
            DbError::ForeignKeyViolation { message } => {
                tracing::error!("Foreign key violation: {}", message);
                ApiError::validation("Invalid reference")
            }
            DbError::UniqueViolation { field, .. } => {
                tracing::error!(%field, "Unique constraint violated");
                ApiError::database("Database operation failed")
            }
            DbError::CheckViolation { message } => {
                tracing::error!("Check constraint violated: {}", message);
                ApiError::database("Database operation failed")
            }
            DbError::TransactionFailed(e) => {
                tracing::error!("Transaction failed: {}", e);
                ApiError::database("Database transaction failed")
            }
            DbError::PoolExhausted => {
                tracing::error!("Database pool exhausted");
                ApiError::database("Database busy")
            }
            other => {
                tracing::error!("Database error: {}", other);
                ApiError::database("Database operation failed")
            }
        }
    }
}

/// Malformed or mistyped JSON bodies.
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::validation(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.code.status(), Json(self)).into_response()
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

#[cfg(test)]
mod tests {
    use super::*;
    use bodega_core::{SaleStatus, ValidationError};

    #[test]
    fn test_status_mapping() {
        let cases = [
            (ErrorCode::ValidationError, 400),
            (ErrorCode::InvalidStatus, 400),
            (ErrorCode::NotFound, 404),
            (ErrorCode::InvalidTransition, 409),
            (ErrorCode::InsufficientStock, 409),
            (ErrorCode::AlreadyIssued, 409),
            (ErrorCode::DatabaseError, 500),
        ];
        for (code, status) in cases {
            assert_eq!(code.status().as_u16(), status, "{code:?}");
        }
    }

    #[test]
    fn test_insufficient_stock_details() {
        let err = ApiError::from(DbError::Core(CoreError::InsufficientStock {
            stock_item_id: "S".to_string(),
            available: 6,
            requested: 20,
        }));

        assert_eq!(err.code, ErrorCode::InsufficientStock);
        let details = err.details.unwrap();
        assert_eq!(details["requested"], 20);
        assert_eq!(details["available"], 6);
    }

    #[test]
    fn test_core_codes() {
        let err = ApiError::from(CoreError::InvalidTransition {
            from: SaleStatus::Finalized,
            to: SaleStatus::Pending,
        });
        assert_eq!(err.code, ErrorCode::InvalidTransition);
        assert_eq!(err.details.unwrap()["from"], "Finalizado");

        let err = ApiError::from(CoreError::Validation(ValidationError::Required {
            field: "products".to_string(),
        }));
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert_eq!(err.message, "products is required");
    }

    #[test]
    fn test_persistence_failures_are_generic() {
        let err = ApiError::from(DbError::QueryFailed("no such table: sales".to_string()));
        assert_eq!(err.code, ErrorCode::DatabaseError);
        assert!(!err.message.contains("sales"));
    }

    #[test]
    fn test_serialized_shape() {
        let body = serde_json::to_value(ApiError::not_found("Sale", "abc")).unwrap();
        assert_eq!(body["code"], "NOT_FOUND");
        assert_eq!(body["message"], "Sale not found: abc");
        assert!(body.get("details").is_none());
    }
}
