//! Core domain types for the load decision engine.

use chrono::NaiveDateTime;

use crate::Amount;

/// Customer identifier. The processor only accepts identifiers made of
/// decimal digits; anything else is rejected before an account exists.
pub type CustomerId = String;

/// Load (transaction) identifier.
pub type LoadId = String;

/// A single deposit attempt, fully parsed at the boundary.
#[derive(Debug, Clone)]
pub struct LoadRequest {
    pub customer: CustomerId,
    pub load: LoadId,
    pub amount: Amount,
    pub timestamp: NaiveDateTime,
}

/// The engine's verdict on one load request.
///
/// `accepted` is the whole contract: rejection reasons are never surfaced
/// here, only logged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decision {
    pub load: LoadId,
    pub customer: CustomerId,
    pub accepted: bool,
}
