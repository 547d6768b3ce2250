//! Calendar windowing between two timestamps.
//!
//! Day boundaries are midnight truncations and week boundaries are
//! Monday-aligned: crossing is about landing on a different calendar day
//! or week, not about elapsed hours or a rolling 7-day interval.

use chrono::{Datelike, Duration, NaiveDateTime};

/// Day and week boundary crossings from a reference timestamp to a
/// candidate timestamp.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Window {
    /// Whole calendar days between the truncated dates (candidate minus
    /// reference; negative when the candidate is older).
    pub day_difference: i64,
    /// Whether the candidate's date is at least 7 days past the
    /// Monday-aligned start of the reference's week.
    pub week_crossed: bool,
}

impl Window {
    /// Compute the crossings going from `reference` to `candidate`.
    pub fn between(reference: NaiveDateTime, candidate: NaiveDateTime) -> Self {
        let reference = reference.date();
        let candidate = candidate.date();

        let weekday_offset = i64::from(reference.weekday().num_days_from_monday());
        let week_start = reference - Duration::days(weekday_offset);

        Window {
            day_difference: candidate.signed_duration_since(reference).num_days(),
            week_crossed: candidate.signed_duration_since(week_start).num_days() >= 7,
        }
    }
}
