//! # Sale Lifecycle
//!
//! The fixed state machine every sale moves through.
//!
//! ## States and Transitions
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Sale Lifecycle                                  │
//! │                                                                         │
//! │   ┌────────────┐        ┌────────────┐        ┌────────────┐           │
//! │   │ Pendiente  │ ─────► │  Emitido   │ ─────► │ Finalizado │           │
//! │   │ (Pending)  │        │  (Issued)  │        │ (Finalized)│           │
//! │   └─────┬──────┘        └────────────┘        └─────▲──────┘           │
//! │         │                                           │                   │
//! │         └───────────────────────────────────────────┘                   │
//! │                                                                         │
//! │   • Staying in the same state is allowed (line edits)                  │
//! │   • Nothing moves backward                                             │
//! │   • Creation may start in ANY state (direct issue is supported)        │
//! │                                                                         │
//! │   Stock rule: lines hold stock  ⇔  status ≠ Pendiente                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};

/// The status of a sale.
///
/// Persisted and serialized with the Spanish labels the sale documents use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[ts(export)]
pub enum SaleStatus {
    /// Sale recorded, stock untouched.
    #[default]
    #[serde(rename = "Pendiente")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "Pendiente"))]
    Pending,

    /// Document emitted, stock decremented.
    #[serde(rename = "Emitido")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "Emitido"))]
    Issued,

    /// Sale closed, stock decremented.
    #[serde(rename = "Finalizado")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "Finalizado"))]
    Finalized,
}

/// Allowed `(from, to)` pairs besides staying in place.
const FORWARD_TRANSITIONS: &[(SaleStatus, SaleStatus)] = &[
    (SaleStatus::Pending, SaleStatus::Issued),
    (SaleStatus::Pending, SaleStatus::Finalized),
    (SaleStatus::Issued, SaleStatus::Finalized),
];

impl SaleStatus {
    /// All recognized states, in lifecycle order.
    pub const ALL: [SaleStatus; 3] = [
        SaleStatus::Pending,
        SaleStatus::Issued,
        SaleStatus::Finalized,
    ];

    /// Canonical label, as stored in the `sales.status` column.
    pub const fn as_str(&self) -> &'static str {
        match self {
            SaleStatus::Pending => "Pendiente",
            SaleStatus::Issued => "Emitido",
            SaleStatus::Finalized => "Finalizado",
        }
    }

    /// Whether a sale in this status holds stock for its lines.
    #[inline]
    pub const fn applies_stock(&self) -> bool {
        !matches!(self, SaleStatus::Pending)
    }

    /// Whether a sale may be created directly in this status.
    ///
    /// Every state is a valid entry point: a sale can be recorded as pending
    /// and issued later, or created already issued/finalized in one step.
    #[inline]
    pub const fn is_valid_initial(&self) -> bool {
        true
    }

    /// Checks the transition table.
    pub fn can_transition_to(&self, next: SaleStatus) -> bool {
        *self == next || FORWARD_TRANSITIONS.contains(&(*self, next))
    }

    /// Validates a requested status against the current one.
    ///
    /// `current` is `None` when the sale is being created.
    pub fn validate_transition(current: Option<SaleStatus>, requested: SaleStatus) -> CoreResult<()> {
        match current {
            None if requested.is_valid_initial() => Ok(()),
            Some(from) if from.can_transition_to(requested) => Ok(()),
            Some(from) => Err(CoreError::InvalidTransition {
                from,
                to: requested,
            }),
            None => Err(CoreError::InvalidStatus(requested.as_str().to_string())),
        }
    }
}

impl fmt::Display for SaleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parses a status label, case-insensitively.
///
/// ## Example
/// ```rust
/// use bodega_core::SaleStatus;
///
/// assert_eq!("Emitido".parse::<SaleStatus>().unwrap(), SaleStatus::Issued);
/// assert_eq!("emitido".parse::<SaleStatus>().unwrap(), SaleStatus::Issued);
/// assert!("bogus".parse::<SaleStatus>().is_err());
/// ```
impl FromStr for SaleStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pendiente" => Ok(SaleStatus::Pending),
            "emitido" => Ok(SaleStatus::Issued),
            "finalizado" => Ok(SaleStatus::Finalized),
            _ => Err(CoreError::InvalidStatus(s.to_string())),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_pending() {
        assert_eq!(SaleStatus::default(), SaleStatus::Pending);
    }

    #[test]
    fn test_parse_labels() {
        assert_eq!("Pendiente".parse::<SaleStatus>(), Ok(SaleStatus::Pending));
        assert_eq!(" FINALIZADO ".parse::<SaleStatus>(), Ok(SaleStatus::Finalized));
        assert_eq!(
            "bogus".parse::<SaleStatus>(),
            Err(CoreError::InvalidStatus("bogus".to_string()))
        );
        assert!("".parse::<SaleStatus>().is_err());
    }

    #[test]
    fn test_label_round_trip_through_display() {
        for status in SaleStatus::ALL {
            assert_eq!(status.to_string().parse::<SaleStatus>(), Ok(status));
        }
    }

    #[test]
    fn test_stock_rule() {
        assert!(!SaleStatus::Pending.applies_stock());
        assert!(SaleStatus::Issued.applies_stock());
        assert!(SaleStatus::Finalized.applies_stock());
    }

    #[test]
    fn test_forward_and_same_state_transitions() {
        use SaleStatus::*;
        assert!(Pending.can_transition_to(Pending));
        assert!(Pending.can_transition_to(Issued));
        assert!(Pending.can_transition_to(Finalized));
        assert!(Issued.can_transition_to(Issued));
        assert!(Issued.can_transition_to(Finalized));
        assert!(Finalized.can_transition_to(Finalized));
    }

    #[test]
    fn test_backward_transitions_rejected() {
        use SaleStatus::*;
        assert!(!Issued.can_transition_to(Pending));
        assert!(!Finalized.can_transition_to(Issued));
        assert!(!Finalized.can_transition_to(Pending));

        assert_eq!(
            SaleStatus::validate_transition(Some(Finalized), Pending),
            Err(CoreError::InvalidTransition {
                from: Finalized,
                to: Pending
            })
        );
    }

    #[test]
    fn test_creation_accepts_every_state() {
        for status in SaleStatus::ALL {
            assert!(SaleStatus::validate_transition(None, status).is_ok());
        }
    }
}
