use chrono::{DateTime, Local, NaiveDate, Utc};
use std::collections::BTreeSet;

use crate::domain::calendar::{self, CalendarError};
use crate::domain::commands::tracker::CreateTrackerCommand;
use crate::domain::mark_validator::{self, MarkRejection, MarkWindow};
use crate::domain::period::{self, PeriodProgress};
use crate::domain::streak;

pub const MAX_NAME_LENGTH: usize = 256;

/// A habit tracker: its configuration, the days marked so far and the
/// persisted streak fields.
#[derive(Debug, Clone, PartialEq)]
pub struct DomainTracker {
    pub id: String,
    pub owner_id: String,
    pub name: String,
    pub marked_days: BTreeSet<NaiveDate>,
    pub is_defined_period: bool,
    pub target_days: u32,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub streak: u32,
    pub longest_streak: u32,
    pub created_at: DateTime<Utc>,
    /// Bumped by every write; used for optimistic concurrency control
    pub version: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TrackerValidationError {
    #[error("Tracker name cannot be empty")]
    EmptyName,
    #[error("Tracker name cannot exceed 256 characters")]
    NameTooLong,
    #[error("Target days cannot be negative")]
    NegativeTargetDays,
    #[error("Target days must be positive for a defined-period tracker")]
    MissingTargetDays,
    #[error("Target days is too large")]
    TargetDaysTooLarge,
    #[error("Invalid start date: {0}")]
    InvalidStartDate(CalendarError),
}

impl DomainTracker {
    pub fn generate_id() -> String {
        uuid::Uuid::new_v4().to_string()
    }

    /// Build a new tracker for `owner_id` created at `now`.
    ///
    /// A defined period needs a positive target length; its start day defaults
    /// to the creation day and its end day is fixed here for good.
    pub fn create(
        owner_id: &str,
        command: &CreateTrackerCommand,
        now: DateTime<Local>,
    ) -> Result<Self, TrackerValidationError> {
        let name = command.name.trim();
        if name.is_empty() {
            return Err(TrackerValidationError::EmptyName);
        }
        if name.chars().count() > MAX_NAME_LENGTH {
            return Err(TrackerValidationError::NameTooLong);
        }

        let requested_target = command.target_days.unwrap_or(0);
        if requested_target < 0 {
            return Err(TrackerValidationError::NegativeTargetDays);
        }
        let target_days =
            u32::try_from(requested_target).map_err(|_| TrackerValidationError::TargetDaysTooLarge)?;

        let is_defined_period = command.is_defined_period.unwrap_or(false);
        let (start_date, end_date) = if is_defined_period {
            if target_days == 0 {
                return Err(TrackerValidationError::MissingTargetDays);
            }
            let start = match command.start_date.as_deref() {
                Some(raw) => calendar::parse_calendar_day(raw)
                    .map_err(TrackerValidationError::InvalidStartDate)?,
                None => calendar::calendar_day(&now),
            };
            let end = calendar::inclusive_end(start, target_days)
                .ok_or(TrackerValidationError::TargetDaysTooLarge)?;
            (Some(start), Some(end))
        } else {
            (None, None)
        };

        Ok(Self {
            id: Self::generate_id(),
            owner_id: owner_id.to_string(),
            name: name.to_string(),
            marked_days: BTreeSet::new(),
            is_defined_period,
            target_days,
            start_date,
            end_date,
            streak: 0,
            longest_streak: 0,
            created_at: now.with_timezone(&Utc),
            version: 0,
        })
    }

    pub fn mark_window(&self) -> MarkWindow {
        MarkWindow {
            is_defined_period: self.is_defined_period,
            start_date: self.start_date,
            end_date: self.end_date,
        }
    }

    /// Record `today` as completed. On rejection the tracker is left untouched.
    pub fn mark(&mut self, today: NaiveDate) -> Result<(), MarkRejection> {
        mark_validator::validate_mark(&self.marked_days, &self.mark_window(), today)?;
        self.marked_days.insert(today);
        self.recompute_derived(today);
        Ok(())
    }

    /// Refresh the persisted streak fields from `marked_days`.
    /// Called before every write of the tracker.
    pub fn recompute_derived(&mut self, today: NaiveDate) {
        let stats = streak::compute_streak(&self.marked_days, today, self.longest_streak);
        self.streak = stats.streak;
        self.longest_streak = stats.longest_streak;
    }

    /// Read-time progress through the defined period, if there is one
    pub fn progress(&self, today: NaiveDate) -> Option<PeriodProgress> {
        match (self.is_defined_period, self.end_date) {
            (true, Some(end_date)) => Some(period::period_progress(
                today,
                end_date,
                self.target_days,
                self.marked_days.len(),
            )),
            _ => None,
        }
    }

    pub fn is_marked_on(&self, day: NaiveDate) -> bool {
        self.marked_days.contains(&day)
    }

    /// Whether `day` lies inside the tracking window
    pub fn in_period(&self, day: NaiveDate) -> bool {
        if !self.is_defined_period {
            return true;
        }
        self.start_date.map_or(true, |start| day >= start)
            && self.end_date.map_or(true, |end| day <= end)
    }
}
