//! Quota configuration.

use crate::Amount;

/// Per-customer quota limits.
///
/// These are plain values so callers can override any of them; the
/// defaults are 5000 per day, 20000 per week, 3 loads per day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuotaConfig {
    /// Maximum cumulative deposit amount within one calendar day.
    pub daily_limit: Amount,
    /// Maximum cumulative deposit amount within one Monday-aligned week.
    pub weekly_limit: Amount,
    /// Maximum count of accepted deposits within one calendar day.
    pub max_daily_loads: u32,
}

impl Default for QuotaConfig {
    fn default() -> Self {
        Self {
            daily_limit: Amount::from_units(5_000),
            weekly_limit: Amount::from_units(20_000),
            max_daily_loads: 3,
        }
    }
}
