use std::collections::HashMap;

use chrono::NaiveDateTime;

use crate::Amount;
use crate::model::{CustomerId, LoadId};

use super::window::Window;

/// Per-customer usage counters and the last load timestamp.
///
/// An account is NEW until its first accepted load (empty audit trail)
/// and ACTIVE from then on; there is no terminal state.
#[derive(Debug, Default)]
pub struct Account {
    /// Timestamp of the most recent accepted load. Seeded the first time
    /// the account is evaluated, before any accept/reject outcome.
    pub last_load: Option<NaiveDateTime>,
    /// Amount accumulated since the last daily reset.
    pub daily_used: Amount,
    /// Amount accumulated since the last weekly reset.
    pub weekly_used: Amount,
    /// Accepted loads since the last daily reset.
    pub daily_count: u32,
    /// Audit trail of accepted load ids, in commit order. Not a dedup
    /// mechanism: resubmitted ids land here twice.
    pub processed_loads: Vec<LoadId>,
}

impl Account {
    /// Whether the account has at least one accepted load.
    pub fn is_active(&self) -> bool {
        !self.processed_loads.is_empty()
    }

    /// Apply day/week boundary resets. Runs before quota evaluation and
    /// regardless of the eventual outcome, so a rejected request still
    /// clears a stale window for the next attempt.
    pub fn apply_resets(&mut self, window: &Window) {
        if window.day_difference >= 1 {
            self.daily_used = Amount::default();
            self.daily_count = 0;
        }
        if window.week_crossed {
            self.weekly_used = Amount::default();
        }
    }
}

/// Owns the mapping from customer id to account state.
///
/// Constructed once at startup and handed to the processor by reference;
/// entries are created lazily on first sight and never removed.
#[derive(Debug, Default)]
pub struct AccountRegistry {
    accounts: HashMap<CustomerId, Account>,
}

impl AccountRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_create(&mut self, customer: &str) -> &mut Account {
        self.accounts.entry(customer.to_owned()).or_default()
    }

    pub fn get(&self, customer: &str) -> Option<&Account> {
        self.accounts.get(customer)
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&CustomerId, &Account)> + '_ {
        self.accounts.iter()
    }
}
