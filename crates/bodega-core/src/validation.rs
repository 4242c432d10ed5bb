//! # Validation Module
//!
//! Input validation for sale requests.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: HTTP extractor (bodega-api)                                  │
//! │  ├── JSON shape (deserialization)                                      │
//! │  └── Status label parsing                                              │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  ├── Ids, quantities, amounts, text lengths                            │
//! │  └── Optional strict totals check                                      │
//! │           │   nothing below runs if this layer rejects                  │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── Foreign keys, UNIQUE folio                                        │
//! │  └── CHECK (available_quantity >= 0)                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust,no_run
//! use bodega_core::validation::{validate_id, validate_quantity};
//!
//! validate_id("warehouse_id", "8b1f...").unwrap();
//! validate_quantity(5).unwrap();
//! ```

use crate::error::ValidationError;
use crate::lines::{LineRequest, SaleTotals};
use crate::types::{IssueDocument, SaleMetadata, SaleRequest};
use crate::{MAX_AMOUNT_CENTS, MAX_LINE_QUANTITY, MAX_SALE_LINES, MAX_TEXT_LENGTH};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Identifier Validators
// =============================================================================

/// Validates a reference id: not blank, no surrounding whitespace, at most
/// 64 characters. The id is looked up exactly as given.
pub fn validate_id(field: &str, id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if id.trim() != id {
        return Err(ValidationError::InvalidFormat {
            field: field.to_string(),
            reason: "must not start or end with whitespace".to_string(),
        });
    }

    if id.len() > 64 {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: 64,
        });
    }

    Ok(())
}

/// Validates a UUID string format.
///
/// Sale ids are generated as UUID v4; anything else cannot name a sale.
///
/// ## Example
/// ```rust
/// use bodega_core::validation::validate_uuid;
///
/// assert!(validate_uuid("sale_id", "550e8400-e29b-41d4-a716-446655440000").is_ok());
/// assert!(validate_uuid("sale_id", "not-a-uuid").is_err());
/// ```
pub fn validate_uuid(field: &str, id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    uuid::Uuid::parse_str(id).map_err(|_| ValidationError::InvalidFormat {
        field: field.to_string(),
        reason: "must be a valid UUID".to_string(),
    })?;

    Ok(())
}

/// Validates a sale folio.
pub fn validate_folio(folio: i64) -> ValidationResult<()> {
    if folio <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "folio".to_string(),
        });
    }
    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a line quantity.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed [`MAX_LINE_QUANTITY`]
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_LINE_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_LINE_QUANTITY,
        });
    }

    Ok(())
}

/// Validates an amount in cents: between zero (free items, promotions) and
/// [`MAX_AMOUNT_CENTS`].
///
/// ## Example
/// ```rust
/// use bodega_core::validation::validate_amount_cents;
///
/// assert!(validate_amount_cents("total", 1099).is_ok());
/// assert!(validate_amount_cents("total", 0).is_ok());
/// assert!(validate_amount_cents("total", -100).is_err());
/// assert!(validate_amount_cents("total", i64::MAX).is_err());
/// ```
pub fn validate_amount_cents(field: &str, cents: i64) -> ValidationResult<()> {
    if !(0..=MAX_AMOUNT_CENTS).contains(&cents) {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: MAX_AMOUNT_CENTS,
        });
    }

    Ok(())
}

// =============================================================================
// Text Validators
// =============================================================================

pub fn validate_optional_text(field: &str, value: Option<&str>) -> ValidationResult<()> {
    match value {
        Some(text) if text.chars().count() > MAX_TEXT_LENGTH => Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_TEXT_LENGTH,
        }),
        _ => Ok(()),
    }
}

fn validate_metadata(metadata: &SaleMetadata) -> ValidationResult<()> {
    validate_optional_text("type_emission", metadata.type_emission.as_deref())?;
    validate_optional_text("observation", metadata.observation.as_deref())?;
    validate_optional_text("name_companies", metadata.name_companies.as_deref())
}

// =============================================================================
// Request Validators
// =============================================================================

/// Validates one line item.
pub fn validate_line(line: &LineRequest) -> ValidationResult<()> {
    validate_id("stock_item_id", &line.stock_item_id)?;
    validate_quantity(line.quantity)?;
    validate_amount_cents("unit_price", line.unit_price_cents)?;
    validate_amount_cents("total", line.line_total_cents)
}

/// Validates a whole sale request before any storage is touched.
///
/// With `strict_totals` the client-declared quantity and subtotal must equal
/// the line sums. Without it the caller decides what to do with a mismatch
/// (see [`SaleTotals::verify`]).
///
/// ## User Workflow
/// ```text
/// POST /api/sales/Emitido
///      │
///      ▼
/// validate_sale_request ← THIS FUNCTION
///      │
///      ├── no lines?             → Required { products }
///      ├── > MAX_SALE_LINES?     → OutOfRange { products }
///      ├── bad id / qty / price? → field error
///      ├── strict + totals off?  → Mismatch
///      │
///      └── OK → open transaction
/// ```
pub fn validate_sale_request(request: &SaleRequest, strict_totals: bool) -> ValidationResult<()> {
    validate_id("warehouse_id", &request.warehouse_id)?;
    validate_id("client_id", &request.client_id)?;

    if request.lines.is_empty() {
        return Err(ValidationError::Required {
            field: "products".to_string(),
        });
    }

    if request.lines.len() > MAX_SALE_LINES {
        return Err(ValidationError::OutOfRange {
            field: "products".to_string(),
            min: 1,
            max: MAX_SALE_LINES as i64,
        });
    }

    for line in &request.lines {
        validate_line(line)?;
    }

    if request.totals.amount_total_products < 0 {
        return Err(ValidationError::OutOfRange {
            field: "amount_total_products".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }
    validate_amount_cents("price_subtotal", request.totals.price_subtotal_cents)?;
    validate_amount_cents("price_final", request.totals.price_final_cents)?;
    validate_metadata(&request.metadata)?;

    if strict_totals {
        SaleTotals::from_lines(&request.lines).verify(&request.totals)?;
    }

    Ok(())
}

/// Validates a document emission request.
pub fn validate_issue_document(document: &IssueDocument) -> ValidationResult<()> {
    if document.type_emission.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "type_emission".to_string(),
        });
    }
    validate_optional_text("type_emission", Some(&document.type_emission))?;
    validate_optional_text("observation", document.observation.as_deref())?;
    validate_optional_text("name_companies", document.name_companies.as_deref())
}

// =============================================================================
// Unit Tests
// =============================================================================
