use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{sqlite::SqliteRow, Row};
use std::collections::{BTreeSet, HashMap};
use tracing::{debug, info};

use crate::domain::models::tracker::DomainTracker;
use crate::storage::connection::DbConnection;
use crate::storage::traits::TrackerStorage;

const DAY_FORMAT: &str = "%Y-%m-%d";

const TRACKER_COLUMNS: &str = "id, owner_id, name, is_defined_period, target_days, start_date, \
     end_date, streak, longest_streak, created_at, version";

/// SQLite repository for trackers and their marked days
#[derive(Clone)]
pub struct TrackerRepository {
    db: DbConnection,
}

impl TrackerRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    fn format_day(day: NaiveDate) -> String {
        day.format(DAY_FORMAT).to_string()
    }

    fn parse_day(raw: &str) -> Result<NaiveDate> {
        NaiveDate::parse_from_str(raw, DAY_FORMAT)
            .with_context(|| format!("Invalid stored day '{}'", raw))
    }

    fn parse_optional_day(raw: Option<String>) -> Result<Option<NaiveDate>> {
        raw.as_deref().map(Self::parse_day).transpose()
    }

    /// Map a `trackers` row; marked days are attached by the caller
    fn row_to_tracker(row: &SqliteRow) -> Result<DomainTracker> {
        let created_at: String = row.try_get("created_at")?;
        let created_at = DateTime::parse_from_rfc3339(&created_at)
            .with_context(|| format!("Invalid stored timestamp '{}'", created_at))?
            .with_timezone(&Utc);

        Ok(DomainTracker {
            id: row.try_get("id")?,
            owner_id: row.try_get("owner_id")?,
            name: row.try_get("name")?,
            marked_days: BTreeSet::new(),
            is_defined_period: row.try_get("is_defined_period")?,
            target_days: u32::try_from(row.try_get::<i64, _>("target_days")?)?,
            start_date: Self::parse_optional_day(row.try_get("start_date")?)?,
            end_date: Self::parse_optional_day(row.try_get("end_date")?)?,
            streak: u32::try_from(row.try_get::<i64, _>("streak")?)?,
            longest_streak: u32::try_from(row.try_get::<i64, _>("longest_streak")?)?,
            created_at,
            version: row.try_get("version")?,
        })
    }

    async fn fetch_marked_days(&self, tracker_id: &str) -> Result<BTreeSet<NaiveDate>> {
        let rows = sqlx::query("SELECT day FROM tracker_marked_days WHERE tracker_id = ?")
            .bind(tracker_id)
            .fetch_all(self.db.pool())
            .await?;

        rows.iter()
            .map(|row| Self::parse_day(&row.try_get::<String, _>("day")?))
            .collect()
    }
}

#[async_trait]
impl TrackerStorage for TrackerRepository {
    async fn store_tracker(&self, tracker: &DomainTracker) -> Result<()> {
        debug!("Storing tracker {} for owner {}", tracker.id, tracker.owner_id);

        let mut tx = self.db.pool().begin().await?;

        sqlx::query(
            r#"
            INSERT INTO trackers (id, owner_id, name, is_defined_period, target_days,
                                  start_date, end_date, streak, longest_streak, created_at, version)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&tracker.id)
        .bind(&tracker.owner_id)
        .bind(&tracker.name)
        .bind(tracker.is_defined_period)
        .bind(i64::from(tracker.target_days))
        .bind(tracker.start_date.map(Self::format_day))
        .bind(tracker.end_date.map(Self::format_day))
        .bind(i64::from(tracker.streak))
        .bind(i64::from(tracker.longest_streak))
        .bind(tracker.created_at.to_rfc3339())
        .bind(tracker.version)
        .execute(&mut *tx)
        .await?;

        for day in &tracker.marked_days {
            sqlx::query("INSERT INTO tracker_marked_days (tracker_id, day) VALUES (?, ?)")
                .bind(&tracker.id)
                .bind(Self::format_day(*day))
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn get_tracker(&self, owner_id: &str, tracker_id: &str) -> Result<Option<DomainTracker>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM trackers WHERE id = ? AND owner_id = ?",
            TRACKER_COLUMNS
        ))
        .bind(tracker_id)
        .bind(owner_id)
        .fetch_optional(self.db.pool())
        .await?;

        match row {
            Some(row) => {
                let mut tracker = Self::row_to_tracker(&row)?;
                tracker.marked_days = self.fetch_marked_days(&tracker.id).await?;
                Ok(Some(tracker))
            }
            None => Ok(None),
        }
    }

    async fn list_trackers(&self, owner_id: &str) -> Result<Vec<DomainTracker>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM trackers WHERE owner_id = ? ORDER BY created_at ASC, rowid ASC",
            TRACKER_COLUMNS
        ))
        .bind(owner_id)
        .fetch_all(self.db.pool())
        .await?;

        let day_rows = sqlx::query(
            r#"
            SELECT d.tracker_id, d.day
            FROM tracker_marked_days d
            JOIN trackers t ON t.id = d.tracker_id
            WHERE t.owner_id = ?
            "#,
        )
        .bind(owner_id)
        .fetch_all(self.db.pool())
        .await?;

        let mut days_by_tracker: HashMap<String, BTreeSet<NaiveDate>> = HashMap::new();
        for row in &day_rows {
            let tracker_id: String = row.try_get("tracker_id")?;
            let day = Self::parse_day(&row.try_get::<String, _>("day")?)?;
            days_by_tracker.entry(tracker_id).or_default().insert(day);
        }

        rows.iter()
            .map(|row| {
                let mut tracker = Self::row_to_tracker(row)?;
                tracker.marked_days = days_by_tracker.remove(&tracker.id).unwrap_or_default();
                Ok::<_, anyhow::Error>(tracker)
            })
            .collect()
    }

    async fn record_mark(
        &self,
        tracker: &DomainTracker,
        day: NaiveDate,
        expected_version: i64,
    ) -> Result<bool> {
        let mut tx = self.db.pool().begin().await?;

        let updated = sqlx::query(
            r#"
            UPDATE trackers
            SET streak = ?, longest_streak = ?, version = version + 1
            WHERE id = ? AND owner_id = ? AND version = ?
            "#,
        )
        .bind(i64::from(tracker.streak))
        .bind(i64::from(tracker.longest_streak))
        .bind(&tracker.id)
        .bind(&tracker.owner_id)
        .bind(expected_version)
        .execute(&mut *tx)
        .await?;

        if updated.rows_affected() == 0 {
            info!(
                "Version conflict recording mark on tracker {} (expected version {})",
                tracker.id, expected_version
            );
            tx.rollback().await?;
            return Ok(false);
        }

        sqlx::query("INSERT INTO tracker_marked_days (tracker_id, day) VALUES (?, ?)")
            .bind(&tracker.id)
            .bind(Self::format_day(day))
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(true)
    }

    async fn delete_tracker(&self, owner_id: &str, tracker_id: &str) -> Result<bool> {
        let mut tx = self.db.pool().begin().await?;

        let deleted = sqlx::query("DELETE FROM trackers WHERE id = ? AND owner_id = ?")
            .bind(tracker_id)
            .bind(owner_id)
            .execute(&mut *tx)
            .await?;

        if deleted.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(false);
        }

        sqlx::query("DELETE FROM tracker_marked_days WHERE tracker_id = ?")
            .bind(tracker_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(true)
    }
}
