use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A habit tracker as returned by the REST API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tracker {
    pub id: String,
    /// Identity of the owner (the `sub` claim of the caller's token)
    pub owner_id: String,
    pub name: String,
    /// Calendar days on which the habit was completed, oldest first
    pub marked_days: Vec<NaiveDate>,
    pub is_defined_period: bool,
    /// Length of the defined period in days (0 for open-ended trackers)
    pub target_days: u32,
    pub start_date: Option<NaiveDate>,
    /// Last day of the defined period, inclusive
    pub end_date: Option<NaiveDate>,
    /// Current run of consecutive days, as persisted at the last mark
    pub streak: u32,
    pub longest_streak: u32,
    pub created_at: DateTime<Utc>,
    /// Days left until the end of the defined period (derived, never stored)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub days_remaining: Option<i64>,
    /// Share of the target days already marked, clamped to 0..=100 (derived, never stored)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completion_percentage: Option<u32>,
    /// Whether today is already in `marked_days` (derived, never stored)
    #[serde(default)]
    pub is_marked_today: bool,
}

/// Body of `POST /api/trackers`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTrackerRequest {
    pub name: String,
    #[serde(default)]
    pub is_defined_period: Option<bool>,
    #[serde(default)]
    pub target_days: Option<i64>,
    /// `YYYY-MM-DD` or an RFC 3339 timestamp; defaults to the creation day
    #[serde(default)]
    pub start_date: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeleteTrackerResponse {
    pub message: String,
}

/// Aggregated statistics across all of the caller's trackers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackerSummaryResponse {
    pub total_trackers: usize,
    /// Sum of marked days over every tracker
    pub total_days_tracked: usize,
    /// Number of trackers whose current streak is above zero
    pub active_streaks: usize,
    /// Highest current streak among the trackers
    pub highest_streak: u32,
}

/// Query string of `GET /api/trackers/{id}/calendar`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct TrackerCalendarRequest {
    pub year: Option<i32>,
    pub month: Option<u32>,
}

/// One month of a single tracker, laid out for a calendar grid
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackerCalendarMonth {
    pub tracker_id: String,
    pub year: i32,
    pub month: u32,
    pub month_name: String,
    /// Weekday of the 1st (0 = Sunday .. 6 = Saturday)
    pub first_day_of_week: u32,
    pub days: Vec<TrackerCalendarDay>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackerCalendarDay {
    pub day: u32,
    pub date: NaiveDate,
    pub is_marked: bool,
    pub is_today: bool,
    /// False for days outside a defined period; always true for open-ended trackers
    pub in_period: bool,
}

/// Error body returned by every failing endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub message: String,
    /// Stable machine-readable reason, e.g. `already_marked`
    pub code: String,
}
