//! Domain-level command and query types
//! These structs are used by services inside the domain layer and are **not**
//! exposed over the public API. The REST layer maps the public DTOs defined
//! in the `shared` crate to these internal types.

pub mod tracker {
    use crate::domain::models::tracker::DomainTracker;
    use crate::domain::period::PeriodProgress;

    /// Input for creating a new tracker.
    #[derive(Debug, Clone, Default)]
    pub struct CreateTrackerCommand {
        pub name: String,
        pub is_defined_period: Option<bool>,
        pub target_days: Option<i64>,
        /// Raw caller input, parsed into a calendar day by the domain
        pub start_date: Option<String>,
    }

    /// Command for marking today on a tracker.
    #[derive(Debug, Clone)]
    pub struct MarkTodayCommand {
        pub tracker_id: String,
    }

    /// Command for deleting a tracker.
    #[derive(Debug, Clone)]
    pub struct DeleteTrackerCommand {
        pub tracker_id: String,
    }

    /// Query for one month of a tracker's calendar. Missing parts default to
    /// the current year and month.
    #[derive(Debug, Clone, Default)]
    pub struct TrackerCalendarQuery {
        pub tracker_id: String,
        pub year: Option<i32>,
        pub month: Option<u32>,
    }

    /// A tracker together with the fields derived for the current day.
    #[derive(Debug, Clone, PartialEq)]
    pub struct TrackerView {
        pub tracker: DomainTracker,
        pub progress: Option<PeriodProgress>,
        pub is_marked_today: bool,
    }

    /// Result of listing trackers.
    #[derive(Debug, Clone)]
    pub struct TrackerListResult {
        pub trackers: Vec<TrackerView>,
    }

    /// Result of deleting a tracker.
    #[derive(Debug, Clone)]
    pub struct DeleteTrackerResult {
        pub tracker_id: String,
        pub success_message: String,
    }

    /// Statistics across all trackers of one owner.
    #[derive(Debug, Clone, PartialEq, Eq, Default)]
    pub struct TrackerSummary {
        pub total_trackers: usize,
        pub total_days_tracked: usize,
        pub active_streaks: usize,
        pub highest_streak: u32,
    }

    /// One day cell of a tracker calendar month.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct CalendarDayCell {
        pub day: u32,
        pub date: chrono::NaiveDate,
        pub is_marked: bool,
        pub is_today: bool,
        pub in_period: bool,
    }

    /// A month of one tracker laid out day by day.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct TrackerCalendarResult {
        pub tracker_id: String,
        pub year: i32,
        pub month: u32,
        pub first_day_of_week: u32,
        pub days: Vec<CalendarDayCell>,
    }
}
