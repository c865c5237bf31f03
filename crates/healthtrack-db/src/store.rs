//! Store trait abstraction for user-scoped document persistence
//!
//! This module defines the HealthStore trait that abstracts document-store
//! operations, allowing for different implementations (Firestore, in-memory).

use async_trait::async_trait;
use healthtrack_core::{
    HealthInsight, HealthRecord, HealthRecordType, InsightId, RecordId, UserId, UserProfile,
};

use crate::error::StoreResult;

/// Query parameters for listing a user's health records
#[derive(Debug, Clone, PartialEq)]
pub struct RecordQuery {
    /// Maximum number of records to return
    pub limit: usize,

    /// Restrict results to one record kind
    pub record_type: Option<HealthRecordType>,
}

impl RecordQuery {
    /// Create a query returning at most `limit` records
    pub fn new(limit: usize) -> Self {
        Self {
            limit,
            record_type: None,
        }
    }

    /// Restrict to one record type
    pub fn record_type(mut self, record_type: HealthRecordType) -> Self {
        self.record_type = Some(record_type);
        self
    }
}

/// Repository trait for user-scoped document persistence
///
/// All record and insight operations take the owning user's id and resolve to
/// that user's collection path; there is no way to address another user's
/// documents through this interface. Implementations must be thread-safe
/// (Send + Sync) for use in async contexts.
#[async_trait]
pub trait HealthStore: Send + Sync {
    /// Fetch a user's profile document
    ///
    /// # Returns
    /// * `Ok(Some(UserProfile))` - The profile if it exists
    /// * `Ok(None)` - If the user has no profile yet
    async fn get_profile(&self, user: &UserId) -> StoreResult<Option<UserProfile>>;

    /// Create a profile only if none exists, returning the stored profile
    ///
    /// This is the idempotent lazy-create primitive: when a profile already
    /// exists it is returned unchanged and the supplied one is discarded.
    async fn create_profile_if_absent(&self, profile: UserProfile) -> StoreResult<UserProfile>;

    /// Write a profile document, replacing any existing one
    async fn put_profile(&self, profile: &UserProfile) -> StoreResult<()>;

    /// Insert a health record into the user's collection
    async fn insert_record(&self, user: &UserId, record: &HealthRecord) -> StoreResult<()>;

    /// Fetch one health record by id from the user's collection
    ///
    /// # Returns
    /// * `Ok(None)` - If no record with that id exists under this user
    async fn get_record(&self, user: &UserId, id: &RecordId) -> StoreResult<Option<HealthRecord>>;

    /// List the user's health records, ordered by recorded-at descending
    async fn list_records(
        &self,
        user: &UserId,
        query: &RecordQuery,
    ) -> StoreResult<Vec<HealthRecord>>;

    /// Replace an existing health record
    async fn put_record(&self, user: &UserId, record: &HealthRecord) -> StoreResult<()>;

    /// Delete a health record, returning whether a document existed
    ///
    /// Deleting an absent id is not an error; it returns `Ok(false)`.
    async fn delete_record(&self, user: &UserId, id: &RecordId) -> StoreResult<bool>;

    /// Insert an insight into the user's collection
    async fn insert_insight(&self, user: &UserId, insight: &HealthInsight) -> StoreResult<()>;

    /// Fetch one insight by id from the user's collection
    async fn get_insight(
        &self,
        user: &UserId,
        id: &InsightId,
    ) -> StoreResult<Option<HealthInsight>>;

    /// List the user's insights, newest first
    async fn list_insights(&self, user: &UserId, limit: usize) -> StoreResult<Vec<HealthInsight>>;

    /// Replace an existing insight
    async fn put_insight(&self, user: &UserId, insight: &HealthInsight) -> StoreResult<()>;

    /// Health check - verify the store is reachable
    async fn health_check(&self) -> StoreResult<()>;
}
