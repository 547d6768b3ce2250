//! Error types for load processing.

use thiserror::Error;

/// Why a load request was not committed.
///
/// Every variant except [`LoadError::Internal`] collapses to
/// `accepted = false` in the response; the reason is only ever logged.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("customer id is not purely numeric")]
    InvalidCustomerId,

    #[error("timestamp predates the last accepted load")]
    NonChronologicalTimestamp,

    #[error("{0}")]
    Quota(#[from] QuotaError),

    #[error("internal inconsistency: {0}")]
    Internal(#[from] InternalError),
}

/// Which quota check failed. First failure wins; later checks never run.
#[derive(Debug, Error)]
pub enum QuotaError {
    #[error("daily amount limit exceeded")]
    DailyAmount,

    #[error("daily load count exhausted")]
    DailyCount,

    #[error("weekly amount limit exceeded")]
    WeeklyAmount,
}

/// A commit-time guard failed after every quota check passed.
///
/// The evaluation chain guarantees these conditions, so hitting one means
/// the chain itself is broken. Never folded into a reject decision: it
/// aborts the run instead.
#[derive(Debug, Error)]
pub enum InternalError {
    #[error("committed amount exceeds the daily limit outright for customer {customer}")]
    DailyAmountGuard { customer: String },

    #[error("committed amount exceeds the weekly limit outright for customer {customer}")]
    WeeklyAmountGuard { customer: String },

    #[error("daily load count already at maximum for customer {customer}")]
    DailyCountGuard { customer: String },
}
