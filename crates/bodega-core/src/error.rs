//! # Error Types
//!
//! Domain-specific error types for bodega-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  bodega-core errors (this file)                                        │
//! │  ├── CoreError        - Business rule violations                       │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  bodega-db errors (separate crate)                                     │
//! │  └── DbError          - Database failures, wraps CoreError raised      │
//! │                         inside a unit of work                          │
//! │                                                                         │
//! │  bodega-api errors (app)                                               │
//! │  └── ApiError         - What HTTP clients see (code + message)         │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError → ApiError → Client       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

use crate::lifecycle::SaleStatus;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// Every variant carries enough context for the caller to reconstruct what
/// failed without parsing the message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// A referenced record does not exist.
    ///
    /// ## When This Occurs
    /// - Sale, warehouse or client id unknown
    /// - Sale soft-deleted
    /// - Stock item exists but belongs to another warehouse
    /// - Sale folio not found among the company's warehouses
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Requested quantity exceeds what the warehouse has on hand.
    ///
    /// ## User Workflow
    /// ```text
    /// Sale line: item S, quantity 20
    ///      │
    ///      ▼
    /// Stock row S: available_quantity = 6
    ///      │
    ///      ▼
    /// InsufficientStock { stock_item_id: "S", available: 6, requested: 20 }
    ///      │
    ///      ▼
    /// Whole request rolled back, nothing written
    /// ```
    #[error("Insufficient stock for {stock_item_id}: available {available}, requested {requested}")]
    InsufficientStock {
        stock_item_id: String,
        available: i64,
        requested: i64,
    },

    /// Status string is not one of the recognized lifecycle states.
    #[error("Invalid sale status: '{0}'")]
    InvalidStatus(String),

    /// The lifecycle does not allow moving between these states.
    #[error("Sale cannot move from {from} to {to}")]
    InvalidTransition { from: SaleStatus, to: SaleStatus },

    /// Document emission requested for a sale that is past Pending.
    #[error("Sale {folio} is already {status}")]
    AlreadyIssued { folio: i64, status: SaleStatus },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    /// Creates a NotFound error for a given entity type and ID.
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        CoreError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Raised before any storage is touched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., invalid UUID).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Client-supplied aggregate does not match the recomputed one.
    #[error("{field} is {actual} but line items add up to {expected}")]
    Mismatch {
        field: String,
        expected: i64,
        actual: i64,
    },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::InsufficientStock {
            stock_item_id: "S-1".to_string(),
            available: 6,
            requested: 20,
        };
        assert_eq!(
            err.to_string(),
            "Insufficient stock for S-1: available 6, requested 20"
        );

        let err = CoreError::InvalidTransition {
            from: SaleStatus::Issued,
            to: SaleStatus::Pending,
        };
        assert_eq!(err.to_string(), "Sale cannot move from Emitido to Pendiente");
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "warehouse_id".to_string(),
        };
        assert_eq!(err.to_string(), "warehouse_id is required");

        let err = ValidationError::Mismatch {
            field: "amount_total_products".to_string(),
            expected: 4,
            actual: 5,
        };
        assert_eq!(
            err.to_string(),
            "amount_total_products is 5 but line items add up to 4"
        );
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::MustBePositive {
            field: "quantity".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
