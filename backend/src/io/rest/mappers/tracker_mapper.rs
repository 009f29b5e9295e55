use shared::{
    CreateTrackerRequest, Tracker, TrackerCalendarDay, TrackerCalendarMonth,
    TrackerCalendarRequest, TrackerSummaryResponse,
};

use crate::domain::calendar::month_name;
use crate::domain::commands::tracker::{
    CalendarDayCell, CreateTrackerCommand, TrackerCalendarQuery, TrackerCalendarResult,
    TrackerSummary, TrackerView,
};

pub struct TrackerMapper;

impl TrackerMapper {
    /// Convert a create request DTO into the domain command
    pub fn to_create_command(request: CreateTrackerRequest) -> CreateTrackerCommand {
        CreateTrackerCommand {
            name: request.name,
            is_defined_period: request.is_defined_period,
            target_days: request.target_days,
            start_date: request.start_date,
        }
    }

    pub fn to_calendar_query(tracker_id: String, request: TrackerCalendarRequest) -> TrackerCalendarQuery {
        TrackerCalendarQuery {
            tracker_id,
            year: request.year,
            month: request.month,
        }
    }

    /// Convert a tracker view (tracker plus read-time fields) to the Tracker DTO
    pub fn to_dto(view: TrackerView) -> Tracker {
        let TrackerView {
            tracker,
            progress,
            is_marked_today,
        } = view;

        Tracker {
            id: tracker.id,
            owner_id: tracker.owner_id,
            name: tracker.name,
            marked_days: tracker.marked_days.into_iter().collect(),
            is_defined_period: tracker.is_defined_period,
            target_days: tracker.target_days,
            start_date: tracker.start_date,
            end_date: tracker.end_date,
            streak: tracker.streak,
            longest_streak: tracker.longest_streak,
            created_at: tracker.created_at,
            days_remaining: progress.map(|p| p.days_remaining),
            completion_percentage: progress.and_then(|p| p.completion_percentage),
            is_marked_today,
        }
    }

    pub fn to_dto_list(views: Vec<TrackerView>) -> Vec<Tracker> {
        views.into_iter().map(Self::to_dto).collect()
    }

    pub fn to_summary_response(summary: TrackerSummary) -> TrackerSummaryResponse {
        TrackerSummaryResponse {
            total_trackers: summary.total_trackers,
            total_days_tracked: summary.total_days_tracked,
            active_streaks: summary.active_streaks,
            highest_streak: summary.highest_streak,
        }
    }

    pub fn to_calendar_response(result: TrackerCalendarResult) -> TrackerCalendarMonth {
        TrackerCalendarMonth {
            tracker_id: result.tracker_id,
            year: result.year,
            month: result.month,
            month_name: month_name(result.month).to_string(),
            first_day_of_week: result.first_day_of_week,
            days: result.days.into_iter().map(Self::to_calendar_day).collect(),
        }
    }

    fn to_calendar_day(cell: CalendarDayCell) -> TrackerCalendarDay {
        TrackerCalendarDay {
            day: cell.day,
            date: cell.date,
            is_marked: cell.is_marked,
            is_today: cell.is_today,
            in_period: cell.in_period,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::calendar::ymd;
    use crate::domain::models::tracker::DomainTracker;
    use crate::domain::period::PeriodProgress;
    use chrono::{TimeZone, Utc};

    fn tracker() -> DomainTracker {
        DomainTracker {
            id: "t1".to_string(),
            owner_id: "user_1".to_string(),
            name: "Run".to_string(),
            marked_days: [ymd(2024, 1, 2), ymd(2024, 1, 1)].into_iter().collect(),
            is_defined_period: true,
            target_days: 30,
            start_date: Some(ymd(2024, 1, 1)),
            end_date: Some(ymd(2024, 1, 30)),
            streak: 2,
            longest_streak: 2,
            created_at: Utc.with_ymd_and_hms(2024, 1, 1, 8, 0, 0).unwrap(),
            version: 2,
        }
    }

    #[test]
    fn test_to_dto_attaches_derived_fields() {
        let dto = TrackerMapper::to_dto(TrackerView {
            tracker: tracker(),
            progress: Some(PeriodProgress {
                days_remaining: 28,
                completion_percentage: Some(7),
            }),
            is_marked_today: true,
        });

        assert_eq!(dto.marked_days, vec![ymd(2024, 1, 1), ymd(2024, 1, 2)]);
        assert_eq!(dto.days_remaining, Some(28));
        assert_eq!(dto.completion_percentage, Some(7));
        assert!(dto.is_marked_today);
        assert_eq!(dto.end_date, Some(ymd(2024, 1, 30)));
    }

    #[test]
    fn test_to_dto_without_progress() {
        let dto = TrackerMapper::to_dto(TrackerView {
            tracker: tracker(),
            progress: None,
            is_marked_today: false,
        });

        assert_eq!(dto.days_remaining, None);
        assert_eq!(dto.completion_percentage, None);

        let json = serde_json::to_value(&dto).unwrap();
        assert!(json.get("daysRemaining").is_none());
        assert_eq!(json["longestStreak"], 2);
        assert_eq!(json["markedDays"][0], "2024-01-01");
    }

    #[test]
    fn test_to_calendar_response_names_month() {
        let response = TrackerMapper::to_calendar_response(TrackerCalendarResult {
            tracker_id: "t1".to_string(),
            year: 2024,
            month: 3,
            first_day_of_week: 5,
            days: vec![CalendarDayCell {
                day: 1,
                date: ymd(2024, 3, 1),
                is_marked: true,
                is_today: false,
                in_period: true,
            }],
        });

        assert_eq!(response.month_name, "March");
        assert_eq!(response.days.len(), 1);
        assert!(response.days[0].is_marked);
    }
}
