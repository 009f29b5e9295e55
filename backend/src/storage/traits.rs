//! # Storage Traits
//!
//! Storage abstraction used by the domain layer. Every operation is scoped
//! by the owner id, so a tracker owned by someone else looks exactly like a
//! tracker that does not exist.

use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;

use crate::domain::models::tracker::DomainTracker;

#[async_trait]
pub trait TrackerStorage: Send + Sync {
    /// Store a freshly created tracker (with no marked days)
    async fn store_tracker(&self, tracker: &DomainTracker) -> Result<()>;

    /// Retrieve a tracker with all of its marked days
    async fn get_tracker(&self, owner_id: &str, tracker_id: &str) -> Result<Option<DomainTracker>>;

    /// List every tracker of an owner, oldest first
    async fn list_trackers(&self, owner_id: &str) -> Result<Vec<DomainTracker>>;

    /// Persist a newly marked `day` together with the recomputed streak fields.
    ///
    /// The write only happens if the stored version still equals
    /// `expected_version`; returns false (and writes nothing) otherwise.
    async fn record_mark(
        &self,
        tracker: &DomainTracker,
        day: NaiveDate,
        expected_version: i64,
    ) -> Result<bool>;

    /// Delete a tracker and its marked days.
    /// Returns true if the tracker was found and deleted, false otherwise
    async fn delete_tracker(&self, owner_id: &str, tracker_id: &str) -> Result<bool>;
}
