//! Tracker service domain logic.
//!
//! Creates, lists, marks and deletes trackers for one owner at a time, and
//! builds the dashboard summary and per-tracker calendar month.
//!
//! ## Business Rules
//!
//! - Every operation is scoped by the owner id passed in by the caller; a
//!   tracker belonging to someone else is reported as not found
//! - Streak fields are recomputed right before a mark is written
//! - Period progress is derived at read time and never stored
//! - A mark is written only if the tracker has not changed since it was read

use chrono::Datelike;
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::domain::calendar::{self, CalendarError, Clock};
use crate::domain::commands::tracker::{
    CalendarDayCell, CreateTrackerCommand, DeleteTrackerCommand, DeleteTrackerResult,
    MarkTodayCommand, TrackerCalendarQuery, TrackerCalendarResult, TrackerListResult,
    TrackerSummary, TrackerView,
};
use crate::domain::mark_validator::MarkRejection;
use crate::domain::models::tracker::{DomainTracker, TrackerValidationError};
use crate::storage::TrackerStorage;

#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("Tracker not found")]
    NotFound,
    #[error("{0}")]
    Invalid(String),
    #[error(transparent)]
    Rejected(#[from] MarkRejection),
    #[error("Tracker was modified concurrently, please retry")]
    Conflict,
    #[error("Storage failure: {0}")]
    Storage(#[from] anyhow::Error),
}

impl From<TrackerValidationError> for TrackerError {
    fn from(err: TrackerValidationError) -> Self {
        TrackerError::Invalid(err.to_string())
    }
}

impl From<CalendarError> for TrackerError {
    fn from(err: CalendarError) -> Self {
        TrackerError::Invalid(err.to_string())
    }
}

/// Service for managing habit trackers
#[derive(Clone)]
pub struct TrackerService {
    storage: Arc<dyn TrackerStorage>,
    clock: Arc<dyn Clock>,
}

impl TrackerService {
    pub fn new(storage: Arc<dyn TrackerStorage>, clock: Arc<dyn Clock>) -> Self {
        Self { storage, clock }
    }

    /// Create a new tracker for `owner_id`
    pub async fn create_tracker(
        &self,
        owner_id: &str,
        command: CreateTrackerCommand,
    ) -> Result<TrackerView, TrackerError> {
        info!("Creating tracker for owner {}: {:?}", owner_id, command);

        let tracker = DomainTracker::create(owner_id, &command, self.clock.now()).map_err(|e| {
            warn!("Rejected tracker creation for owner {}: {}", owner_id, e);
            e
        })?;

        self.storage.store_tracker(&tracker).await.map_err(|e| {
            error!("Failed to store tracker {}: {:?}", tracker.id, e);
            e
        })?;

        info!("Created tracker {} ('{}')", tracker.id, tracker.name);
        Ok(self.view(tracker))
    }

    /// List all trackers of `owner_id`, oldest first, with derived fields attached
    pub async fn list_trackers(&self, owner_id: &str) -> Result<TrackerListResult, TrackerError> {
        info!("Listing trackers for owner {}", owner_id);

        let trackers = self.storage.list_trackers(owner_id).await.map_err(|e| {
            error!("Failed to list trackers for owner {}: {:?}", owner_id, e);
            e
        })?;

        Ok(TrackerListResult {
            trackers: trackers.into_iter().map(|tracker| self.view(tracker)).collect(),
        })
    }

    /// Mark the current calendar day on a tracker
    pub async fn mark_today(
        &self,
        owner_id: &str,
        command: MarkTodayCommand,
    ) -> Result<TrackerView, TrackerError> {
        info!("Marking today on tracker {} for owner {}", command.tracker_id, owner_id);

        let mut tracker = self
            .storage
            .get_tracker(owner_id, &command.tracker_id)
            .await?
            .ok_or(TrackerError::NotFound)?;

        let today = self.clock.today();
        let expected_version = tracker.version;

        tracker.mark(today).map_err(|rejection| {
            warn!("Mark on tracker {} rejected: {}", tracker.id, rejection);
            rejection
        })?;

        let written = self
            .storage
            .record_mark(&tracker, today, expected_version)
            .await
            .map_err(|e| {
                error!("Failed to record mark on tracker {}: {:?}", tracker.id, e);
                e
            })?;
        if !written {
            warn!("Concurrent update of tracker {} detected", tracker.id);
            return Err(TrackerError::Conflict);
        }
        tracker.version = expected_version + 1;

        info!(
            "Marked {} on tracker {} (streak {}, longest {})",
            today, tracker.id, tracker.streak, tracker.longest_streak
        );
        Ok(self.view(tracker))
    }

    /// Delete a tracker and all of its marked days
    pub async fn delete_tracker(
        &self,
        owner_id: &str,
        command: DeleteTrackerCommand,
    ) -> Result<DeleteTrackerResult, TrackerError> {
        info!("Deleting tracker {} for owner {}", command.tracker_id, owner_id);

        let deleted = self
            .storage
            .delete_tracker(owner_id, &command.tracker_id)
            .await
            .map_err(|e| {
                error!("Failed to delete tracker {}: {:?}", command.tracker_id, e);
                e
            })?;
        if !deleted {
            return Err(TrackerError::NotFound);
        }

        Ok(DeleteTrackerResult {
            tracker_id: command.tracker_id,
            success_message: "Tracker deleted".to_string(),
        })
    }

    /// Overview statistics across every tracker of `owner_id`
    pub async fn get_summary(&self, owner_id: &str) -> Result<TrackerSummary, TrackerError> {
        info!("Building tracker summary for owner {}", owner_id);

        let trackers = self.storage.list_trackers(owner_id).await?;

        Ok(TrackerSummary {
            total_trackers: trackers.len(),
            total_days_tracked: trackers.iter().map(|t| t.marked_days.len()).sum(),
            active_streaks: trackers.iter().filter(|t| t.streak > 0).count(),
            highest_streak: trackers.iter().map(|t| t.streak).max().unwrap_or(0),
        })
    }

    /// Lay out one month of a tracker day by day
    pub async fn get_calendar_month(
        &self,
        owner_id: &str,
        query: TrackerCalendarQuery,
    ) -> Result<TrackerCalendarResult, TrackerError> {
        let today = self.clock.today();
        let year = query.year.unwrap_or_else(|| today.year());
        let month = query.month.unwrap_or_else(|| today.month());
        info!(
            "Getting calendar {}/{} of tracker {} for owner {}",
            month, year, query.tracker_id, owner_id
        );

        let day_count = calendar::days_in_month(year, month)?;
        let first_day_of_week = calendar::first_day_of_month(year, month)?;

        let tracker = self
            .storage
            .get_tracker(owner_id, &query.tracker_id)
            .await?
            .ok_or(TrackerError::NotFound)?;

        let days = (1..=day_count)
            .filter_map(|day| chrono::NaiveDate::from_ymd_opt(year, month, day))
            .map(|date| CalendarDayCell {
                day: date.day(),
                date,
                is_marked: tracker.is_marked_on(date),
                is_today: date == today,
                in_period: tracker.in_period(date),
            })
            .collect();

        Ok(TrackerCalendarResult {
            tracker_id: tracker.id,
            year,
            month,
            first_day_of_week,
            days,
        })
    }

    fn view(&self, tracker: DomainTracker) -> TrackerView {
        let today = self.clock.today();
        TrackerView {
            progress: tracker.progress(today),
            is_marked_today: tracker.is_marked_on(today),
            tracker,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::calendar::{ymd, FixedClock};
    use crate::storage::{DbConnection, TrackerRepository};
    use async_trait::async_trait;
    use chrono::NaiveDate;

    async fn setup_test(day: NaiveDate) -> (TrackerService, FixedClock) {
        let db = DbConnection::init_test().await.expect("Failed to create test database");
        let clock = FixedClock::on(day);
        let service = TrackerService::new(
            Arc::new(TrackerRepository::new(db)),
            Arc::new(clock.clone()),
        );
        (service, clock)
    }

    fn open_ended(name: &str) -> CreateTrackerCommand {
        CreateTrackerCommand {
            name: name.to_string(),
            ..Default::default()
        }
    }

    fn defined(name: &str, target_days: i64, start_date: &str) -> CreateTrackerCommand {
        CreateTrackerCommand {
            name: name.to_string(),
            is_defined_period: Some(true),
            target_days: Some(target_days),
            start_date: Some(start_date.to_string()),
        }
    }

    fn mark(id: &str) -> MarkTodayCommand {
        MarkTodayCommand {
            tracker_id: id.to_string(),
        }
    }

    #[tokio::test]
    async fn test_mark_today_twice_is_rejected() {
        let (service, _clock) = setup_test(ymd(2024, 5, 1)).await;
        let created = service.create_tracker("owner_a", open_ended("Meditation")).await.unwrap();
        assert!(!created.is_marked_today);

        let marked = service.mark_today("owner_a", mark(&created.tracker.id)).await.unwrap();
        assert_eq!(marked.tracker.streak, 1);
        assert_eq!(marked.tracker.longest_streak, 1);
        assert!(marked.is_marked_today);

        let again = service.mark_today("owner_a", mark(&created.tracker.id)).await;
        assert!(matches!(again, Err(TrackerError::Rejected(MarkRejection::AlreadyMarked))));

        let listed = service.list_trackers("owner_a").await.unwrap();
        assert_eq!(listed.trackers[0].tracker.marked_days.len(), 1);
        assert_eq!(listed.trackers[0].tracker.streak, 1);
    }

    #[tokio::test]
    async fn test_defined_period_rejects_mark_after_end() {
        let (service, clock) = setup_test(ymd(2024, 1, 31)).await;
        let created = service
            .create_tracker("owner_a", defined("Run", 30, "2024-01-01"))
            .await
            .unwrap();
        assert_eq!(created.tracker.end_date, Some(ymd(2024, 1, 30)));

        let result = service.mark_today("owner_a", mark(&created.tracker.id)).await;
        assert!(matches!(result, Err(TrackerError::Rejected(MarkRejection::PeriodCompleted))));

        clock.set_day(ymd(2023, 12, 31));
        let result = service.mark_today("owner_a", mark(&created.tracker.id)).await;
        assert!(matches!(result, Err(TrackerError::Rejected(MarkRejection::PeriodNotStarted))));
    }

    #[tokio::test]
    async fn test_streak_across_consecutive_days() {
        let (service, clock) = setup_test(ymd(2024, 3, 1)).await;
        let id = service.create_tracker("owner_a", open_ended("Read")).await.unwrap().tracker.id;

        for _ in 0..3 {
            service.mark_today("owner_a", mark(&id)).await.unwrap();
            clock.advance_days(1);
        }
        // 2024-03-04 is skipped
        clock.advance_days(1);
        let view = service.mark_today("owner_a", mark(&id)).await.unwrap();

        assert_eq!(view.tracker.streak, 1);
        assert_eq!(view.tracker.longest_streak, 3);
        assert_eq!(view.tracker.version, 4);
    }

    #[tokio::test]
    async fn test_list_attaches_period_progress() {
        let (service, _clock) = setup_test(ymd(2024, 1, 3)).await;
        service.create_tracker("owner_a", open_ended("Walk")).await.unwrap();
        service
            .create_tracker("owner_a", defined("Run", 30, "2024-01-01"))
            .await
            .unwrap();

        let listed = service.list_trackers("owner_a").await.unwrap().trackers;
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].progress, None);

        let progress = listed[1].progress.unwrap();
        assert_eq!(progress.days_remaining, 27);
        assert_eq!(progress.completion_percentage, Some(0));
    }

    #[tokio::test]
    async fn test_other_owner_sees_not_found() {
        let (service, _clock) = setup_test(ymd(2024, 5, 1)).await;
        let id = service.create_tracker("owner_a", open_ended("Swim")).await.unwrap().tracker.id;

        assert!(matches!(
            service.mark_today("owner_b", mark(&id)).await,
            Err(TrackerError::NotFound)
        ));
        assert!(matches!(
            service
                .delete_tracker("owner_b", DeleteTrackerCommand { tracker_id: id.clone() })
                .await,
            Err(TrackerError::NotFound)
        ));
        assert!(service.list_trackers("owner_b").await.unwrap().trackers.is_empty());
        assert_eq!(service.list_trackers("owner_a").await.unwrap().trackers.len(), 1);
    }

    #[tokio::test]
    async fn test_create_rejects_invalid_input() {
        let (service, _clock) = setup_test(ymd(2024, 5, 1)).await;

        let result = service.create_tracker("owner_a", open_ended("  ")).await;
        assert!(matches!(result, Err(TrackerError::Invalid(_))));

        let result = service.create_tracker("owner_a", defined("Run", 0, "2024-05-01")).await;
        assert!(matches!(result, Err(TrackerError::Invalid(_))));

        assert!(service.list_trackers("owner_a").await.unwrap().trackers.is_empty());
    }

    #[tokio::test]
    async fn test_delete_tracker() {
        let (service, _clock) = setup_test(ymd(2024, 5, 1)).await;
        let id = service.create_tracker("owner_a", open_ended("Stretch")).await.unwrap().tracker.id;
        service.mark_today("owner_a", mark(&id)).await.unwrap();

        let result = service
            .delete_tracker("owner_a", DeleteTrackerCommand { tracker_id: id.clone() })
            .await
            .unwrap();
        assert_eq!(result.tracker_id, id);
        assert_eq!(result.success_message, "Tracker deleted");

        assert!(service.list_trackers("owner_a").await.unwrap().trackers.is_empty());
        assert!(matches!(
            service.mark_today("owner_a", mark(&id)).await,
            Err(TrackerError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_summary() {
        let (service, clock) = setup_test(ymd(2024, 5, 1)).await;
        let a = service.create_tracker("owner_a", open_ended("A")).await.unwrap().tracker.id;
        let b = service.create_tracker("owner_a", open_ended("B")).await.unwrap().tracker.id;
        service.create_tracker("owner_a", open_ended("C")).await.unwrap();
        service.create_tracker("owner_b", open_ended("Foreign")).await.unwrap();

        service.mark_today("owner_a", mark(&a)).await.unwrap();
        service.mark_today("owner_a", mark(&b)).await.unwrap();
        clock.advance_days(1);
        service.mark_today("owner_a", mark(&a)).await.unwrap();

        let summary = service.get_summary("owner_a").await.unwrap();
        assert_eq!(
            summary,
            TrackerSummary {
                total_trackers: 3,
                total_days_tracked: 3,
                active_streaks: 2,
                highest_streak: 2,
            }
        );

        let empty = service.get_summary("nobody").await.unwrap();
        assert_eq!(empty, TrackerSummary::default());
    }

    #[tokio::test]
    async fn test_calendar_month() {
        let (service, _clock) = setup_test(ymd(2024, 2, 10)).await;
        let id = service
            .create_tracker("owner_a", defined("Run", 10, "2024-02-05"))
            .await
            .unwrap()
            .tracker
            .id;
        service.mark_today("owner_a", mark(&id)).await.unwrap();

        let month = service
            .get_calendar_month(
                "owner_a",
                TrackerCalendarQuery {
                    tracker_id: id.clone(),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!((month.year, month.month), (2024, 2));
        // February 1st 2024 is a Thursday
        assert_eq!(month.first_day_of_week, 4);
        assert_eq!(month.days.len(), 29);

        let tenth = &month.days[9];
        assert_eq!(tenth.date, ymd(2024, 2, 10));
        assert!(tenth.is_marked && tenth.is_today && tenth.in_period);
        assert!(!month.days[3].in_period);
        assert!(month.days[13].in_period);
        assert!(!month.days[14].in_period);
        assert_eq!(month.days.iter().filter(|d| d.is_marked).count(), 1);
    }

    #[tokio::test]
    async fn test_calendar_month_validation() {
        let (service, _clock) = setup_test(ymd(2024, 2, 10)).await;
        let id = service.create_tracker("owner_a", open_ended("Walk")).await.unwrap().tracker.id;

        let bad_month = service
            .get_calendar_month(
                "owner_a",
                TrackerCalendarQuery {
                    tracker_id: id.clone(),
                    year: Some(2024),
                    month: Some(13),
                },
            )
            .await;
        assert!(matches!(bad_month, Err(TrackerError::Invalid(_))));

        let foreign = service
            .get_calendar_month(
                "owner_b",
                TrackerCalendarQuery {
                    tracker_id: id,
                    ..Default::default()
                },
            )
            .await;
        assert!(matches!(foreign, Err(TrackerError::NotFound)));
    }

    /// Lets another writer land its mark first, so the caller's write is stale
    struct RacingStorage {
        inner: TrackerRepository,
    }

    #[async_trait]
    impl TrackerStorage for RacingStorage {
        async fn store_tracker(&self, tracker: &DomainTracker) -> anyhow::Result<()> {
            self.inner.store_tracker(tracker).await
        }

        async fn get_tracker(
            &self,
            owner_id: &str,
            tracker_id: &str,
        ) -> anyhow::Result<Option<DomainTracker>> {
            self.inner.get_tracker(owner_id, tracker_id).await
        }

        async fn list_trackers(&self, owner_id: &str) -> anyhow::Result<Vec<DomainTracker>> {
            self.inner.list_trackers(owner_id).await
        }

        async fn record_mark(
            &self,
            tracker: &DomainTracker,
            day: NaiveDate,
            expected_version: i64,
        ) -> anyhow::Result<bool> {
            self.inner.record_mark(tracker, day, expected_version).await?;
            self.inner.record_mark(tracker, day, expected_version).await
        }

        async fn delete_tracker(&self, owner_id: &str, tracker_id: &str) -> anyhow::Result<bool> {
            self.inner.delete_tracker(owner_id, tracker_id).await
        }
    }

    #[tokio::test]
    async fn test_concurrent_mark_reports_conflict() {
        let db = DbConnection::init_test().await.unwrap();
        let storage = RacingStorage {
            inner: TrackerRepository::new(db),
        };
        let service = TrackerService::new(Arc::new(storage), Arc::new(FixedClock::on(ymd(2024, 5, 1))));
        let id = service.create_tracker("owner_a", open_ended("Race")).await.unwrap().tracker.id;

        let result = service.mark_today("owner_a", mark(&id)).await;
        assert!(matches!(result, Err(TrackerError::Conflict)));

        // Only the winning write is stored
        let listed = service.list_trackers("owner_a").await.unwrap();
        assert_eq!(listed.trackers[0].tracker.marked_days.len(), 1);
        assert_eq!(listed.trackers[0].tracker.version, 1);
    }
}
