//! # Sale Lines
//!
//! Pure arithmetic behind line replacement: how much stock a sale holds,
//! how much it should hold after a write, and the per-item difference.
//!
//! ## Reconciliation
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  held   = aggregate(old lines)   if old status applies stock, else ∅   │
//! │  target = aggregate(new lines)   if new status applies stock, else ∅   │
//! │                                                                         │
//! │  for each item:  delta = target - held                                 │
//! │      delta > 0  →  decrement stock by delta                            │
//! │      delta < 0  →  increment stock by -delta                           │
//! │      delta = 0  →  untouched                                           │
//! │                                                                         │
//! │  Pending → Issued  with lines L : decrements sum(L) exactly once       │
//! │  Issued  → Issued  with lines L : no stock movement                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Duplicate stock items in one request are summed here for checks and
//! deltas; the lines themselves are stored as submitted.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::lifecycle::SaleStatus;
use crate::money::Money;
use crate::types::{ClientTotals, SaleLine};

/// A line item as submitted by the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct LineRequest {
    pub stock_item_id: String,
    pub quantity: i64,
    pub unit_price_cents: i64,
    pub line_total_cents: i64,
}

impl LineRequest {
    #[inline]
    pub fn line_total(&self) -> Money {
        Money::from_cents(self.line_total_cents)
    }
}

/// Total quantity of one stock item across a set of lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemQuantity {
    pub stock_item_id: String,
    pub quantity: i64,
}

/// A stock movement for one item. Positive consumes stock, negative returns it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StockDelta {
    pub stock_item_id: String,
    pub delta: i64,
}

impl StockDelta {
    #[inline]
    pub fn is_decrement(&self) -> bool {
        self.delta > 0
    }
}

// =============================================================================
// Aggregation
// =============================================================================

fn aggregate<'a>(pairs: impl IntoIterator<Item = (&'a str, i64)>) -> Vec<ItemQuantity> {
    let mut out: Vec<ItemQuantity> = Vec::new();
    for (id, qty) in pairs {
        match out.iter_mut().find(|q| q.stock_item_id == id) {
            Some(existing) => existing.quantity += qty,
            None => out.push(ItemQuantity {
                stock_item_id: id.to_string(),
                quantity: qty,
            }),
        }
    }
    out
}

/// Sums requested quantities per stock item, in first-seen order.
///
/// ## Example
/// ```rust
/// use bodega_core::lines::{aggregate_requests, LineRequest};
///
/// let line = |id: &str, qty| LineRequest {
///     stock_item_id: id.to_string(),
///     quantity: qty,
///     unit_price_cents: 100,
///     line_total_cents: 100 * qty,
/// };
/// let agg = aggregate_requests(&[line("A", 2), line("B", 1), line("A", 3)]);
/// assert_eq!(agg[0].stock_item_id, "A");
/// assert_eq!(agg[0].quantity, 5);
/// assert_eq!(agg.len(), 2);
/// ```
pub fn aggregate_requests(lines: &[LineRequest]) -> Vec<ItemQuantity> {
    aggregate(lines.iter().map(|l| (l.stock_item_id.as_str(), l.quantity)))
}

/// Stock a sale currently holds, given its persisted status and lines.
pub fn held_quantities(status: SaleStatus, lines: &[SaleLine]) -> Vec<ItemQuantity> {
    if !status.applies_stock() {
        return Vec::new();
    }
    aggregate(lines.iter().map(|l| (l.stock_item_id.as_str(), l.quantity)))
}

/// Stock a sale should hold once written with `status` and `lines`.
pub fn target_quantities(status: SaleStatus, lines: &[LineRequest]) -> Vec<ItemQuantity> {
    if !status.applies_stock() {
        return Vec::new();
    }
    aggregate_requests(lines)
}

/// Quantity of `stock_item_id` in an aggregate, zero when absent.
pub fn quantity_of(quantities: &[ItemQuantity], stock_item_id: &str) -> i64 {
    quantities
        .iter()
        .find(|q| q.stock_item_id == stock_item_id)
        .map_or(0, |q| q.quantity)
}

/// Per-item movements that take stock from `held` to `target`.
///
/// Items in `target` come first in their order, then items only in `held`.
/// Zero deltas are omitted.
pub fn stock_deltas(held: &[ItemQuantity], target: &[ItemQuantity]) -> Vec<StockDelta> {
    let mut deltas = Vec::new();

    for t in target {
        let delta = t.quantity - quantity_of(held, &t.stock_item_id);
        if delta != 0 {
            deltas.push(StockDelta {
                stock_item_id: t.stock_item_id.clone(),
                delta,
            });
        }
    }

    for h in held {
        if quantity_of(target, &h.stock_item_id) == 0 && h.quantity != 0 {
            deltas.push(StockDelta {
                stock_item_id: h.stock_item_id.clone(),
                delta: -h.quantity,
            });
        }
    }

    deltas
}

/// Checks that `requested` fits in what is on hand plus what the sale
/// already holds for this item.
///
/// The error reports the row's current `available` value.
pub fn check_availability(
    stock_item_id: &str,
    available: i64,
    held: i64,
    requested: i64,
) -> CoreResult<()> {
    if requested > available + held {
        return Err(CoreError::InsufficientStock {
            stock_item_id: stock_item_id.to_string(),
            available,
            requested,
        });
    }
    Ok(())
}

// =============================================================================
// Totals
// =============================================================================

/// Totals recomputed from line items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SaleTotals {
    pub amount_total_products: i64,
    pub price_subtotal: Money,
}

impl SaleTotals {
    pub fn from_lines(lines: &[LineRequest]) -> Self {
        SaleTotals {
            amount_total_products: lines.iter().map(|l| l.quantity).sum(),
            price_subtotal: lines.iter().map(LineRequest::line_total).sum(),
        }
    }

    /// Compares against client-declared totals.
    ///
    /// `price_final` is not checked; it may carry discounts or taxes the
    /// lines do not describe.
    pub fn verify(&self, declared: &ClientTotals) -> Result<(), ValidationError> {
        if declared.amount_total_products != self.amount_total_products {
            return Err(ValidationError::Mismatch {
                field: "amount_total_products".to_string(),
                expected: self.amount_total_products,
                actual: declared.amount_total_products,
            });
        }
        if declared.price_subtotal_cents != self.price_subtotal.cents() {
            return Err(ValidationError::Mismatch {
                field: "price_subtotal".to_string(),
                expected: self.price_subtotal.cents(),
                actual: declared.price_subtotal_cents,
            });
        }
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn req(id: &str, qty: i64) -> LineRequest {
        LineRequest {
            stock_item_id: id.to_string(),
            quantity: qty,
            unit_price_cents: 500,
            line_total_cents: 500 * qty,
        }
    }

    fn persisted(id: &str, qty: i64) -> SaleLine {
        SaleLine {
            id: format!("line-{id}-{qty}"),
            sale_id: "sale".to_string(),
            stock_item_id: id.to_string(),
            position: 0,
            quantity: qty,
            unit_price_cents: 500,
            line_total_cents: 500 * qty,
            created_at: Utc::now(),
        }
    }

    fn qty(id: &str, quantity: i64) -> ItemQuantity {
        ItemQuantity {
            stock_item_id: id.to_string(),
            quantity,
        }
    }

    #[test]
    fn test_aggregate_keeps_first_seen_order() {
        let agg = aggregate_requests(&[req("B", 1), req("A", 2), req("B", 4)]);
        assert_eq!(agg, vec![qty("B", 5), qty("A", 2)]);
    }

    #[test]
    fn test_pending_holds_nothing() {
        let lines = vec![persisted("A", 3)];
        assert!(held_quantities(SaleStatus::Pending, &lines).is_empty());
        assert_eq!(held_quantities(SaleStatus::Issued, &lines), vec![qty("A", 3)]);
        assert!(target_quantities(SaleStatus::Pending, &[req("A", 3)]).is_empty());
    }

    #[test]
    fn test_first_issue_decrements_everything() {
        let deltas = stock_deltas(&[], &[qty("A", 4), qty("B", 1)]);
        assert_eq!(deltas.len(), 2);
        assert!(deltas.iter().all(StockDelta::is_decrement));
        assert_eq!(deltas[0].delta, 4);
    }

    #[test]
    fn test_same_lines_move_nothing() {
        let held = vec![qty("A", 4)];
        assert!(stock_deltas(&held, &held).is_empty());
    }

    #[test]
    fn test_replacement_nets_per_item() {
        let held = vec![qty("A", 4), qty("B", 2)];
        let target = vec![qty("A", 1), qty("C", 3)];
        let deltas = stock_deltas(&held, &target);

        assert_eq!(
            deltas,
            vec![
                StockDelta { stock_item_id: "A".to_string(), delta: -3 },
                StockDelta { stock_item_id: "C".to_string(), delta: 3 },
                StockDelta { stock_item_id: "B".to_string(), delta: -2 },
            ]
        );
    }

    #[test]
    fn test_availability_counts_held_stock() {
        assert!(check_availability("A", 6, 0, 6).is_ok());
        assert!(check_availability("A", 2, 4, 6).is_ok());
        assert_eq!(
            check_availability("A", 6, 0, 20),
            Err(CoreError::InsufficientStock {
                stock_item_id: "A".to_string(),
                available: 6,
                requested: 20,
            })
        );
    }

    #[test]
    fn test_totals_verify() {
        let lines = vec![req("A", 2), req("B", 3)];
        let totals = SaleTotals::from_lines(&lines);
        assert_eq!(totals.amount_total_products, 5);
        assert_eq!(totals.price_subtotal.cents(), 2500);

        let good = ClientTotals {
            amount_total_products: 5,
            price_subtotal_cents: 2500,
            price_final_cents: 2975,
        };
        assert!(totals.verify(&good).is_ok());

        let bad = ClientTotals {
            amount_total_products: 6,
            ..good
        };
        assert!(matches!(
            totals.verify(&bad),
            Err(ValidationError::Mismatch { expected: 5, actual: 6, .. })
        ));
    }
}
