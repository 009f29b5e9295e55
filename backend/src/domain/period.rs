//! Progress through a defined tracking period.
//!
//! These values are derived at read time from the stored period
//! configuration and the number of marked days; they are never persisted.

use chrono::NaiveDate;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeriodProgress {
    /// Whole days from today until the end day, never negative
    pub days_remaining: i64,
    /// `None` when the target length is zero
    pub completion_percentage: Option<u32>,
}

/// Progress of a period ending on `end_date` with `target_days` days,
/// `marked_count` of which have been marked so far.
pub fn period_progress(
    today: NaiveDate,
    end_date: NaiveDate,
    target_days: u32,
    marked_count: usize,
) -> PeriodProgress {
    PeriodProgress {
        days_remaining: days_remaining(today, end_date),
        completion_percentage: completion_percentage(marked_count, target_days),
    }
}

pub fn days_remaining(today: NaiveDate, end_date: NaiveDate) -> i64 {
    (end_date - today).num_days().max(0)
}

/// `round(100 * marked / target)` clamped to 100, rounding halves up
pub fn completion_percentage(marked_count: usize, target_days: u32) -> Option<u32> {
    if target_days == 0 {
        return None;
    }
    let marked = marked_count as u64;
    let target = u64::from(target_days);
    let rounded = marked.saturating_mul(200).saturating_add(target) / (2 * target);
    Some(rounded.min(100) as u32)
}
