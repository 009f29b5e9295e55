//! Eligibility rules for marking today on a tracker.

use chrono::NaiveDate;
use std::collections::BTreeSet;
use thiserror::Error;

/// Why a mark was refused. Nothing is mutated when one of these is returned.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum MarkRejection {
    #[error("Already marked for today")]
    AlreadyMarked,
    #[error("This tracker has completed its defined period")]
    PeriodCompleted,
    #[error("This tracker has not yet started its defined period")]
    PeriodNotStarted,
}

impl MarkRejection {
    pub fn code(&self) -> &'static str {
        match self {
            MarkRejection::AlreadyMarked => "already_marked",
            MarkRejection::PeriodCompleted => "period_completed",
            MarkRejection::PeriodNotStarted => "period_not_started",
        }
    }
}

/// Period window of a tracker as far as marking is concerned
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MarkWindow {
    pub is_defined_period: bool,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

/// Check whether `today` may be marked. Rules apply in order, first match wins:
/// already marked, past the end day, before the start day.
pub fn validate_mark(
    marked_days: &BTreeSet<NaiveDate>,
    window: &MarkWindow,
    today: NaiveDate,
) -> Result<(), MarkRejection> {
    if marked_days.contains(&today) {
        return Err(MarkRejection::AlreadyMarked);
    }

    if window.is_defined_period {
        if let Some(end_date) = window.end_date {
            if today > end_date {
                return Err(MarkRejection::PeriodCompleted);
            }
        }
        if let Some(start_date) = window.start_date {
            if today < start_date {
                return Err(MarkRejection::PeriodNotStarted);
            }
        }
    }

    Ok(())
}
