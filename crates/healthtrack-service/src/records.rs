//! Health record service
//!
//! Every operation is scoped to the owning user's collection; a record id
//! belonging to another user is indistinguishable from one that does not
//! exist.

use async_trait::async_trait;
use chrono::Utc;
use healthtrack_core::{HealthRecord, HealthRecordDraft, HealthRecordType, RecordId, UserId};
use healthtrack_db::{HealthStore, RecordQuery};
use std::sync::Arc;
use tracing::{debug, instrument};

use crate::error::ServiceResult;

/// Listing limit applied when the caller supplies none
pub const DEFAULT_RECORDS_LIMIT: usize = 10;

/// Server-side cap on caller-supplied listing limits
pub const MAX_RECORDS_LIMIT: usize = 100;

/// Trait for health record operations
#[async_trait]
pub trait RecordsService: Send + Sync {
    /// Store a new record; server assigns id and creation timestamp
    async fn add_record(
        &self,
        user: &UserId,
        draft: HealthRecordDraft,
    ) -> ServiceResult<HealthRecord>;

    /// Fetch one record; absent or foreign-owned ids yield `None`
    async fn get_record(&self, user: &UserId, id: &RecordId)
        -> ServiceResult<Option<HealthRecord>>;

    /// List records newest-first, bounded by the capped limit
    async fn list_records(
        &self,
        user: &UserId,
        limit: Option<usize>,
        record_type: Option<HealthRecordType>,
    ) -> ServiceResult<Vec<HealthRecord>>;

    /// Replace a record's content; absent ids yield `None`
    async fn update_record(
        &self,
        user: &UserId,
        id: &RecordId,
        draft: HealthRecordDraft,
    ) -> ServiceResult<Option<HealthRecord>>;

    /// Delete a record; absent ids are a no-op success returning `false`
    async fn delete_record(&self, user: &UserId, id: &RecordId) -> ServiceResult<bool>;
}

/// Clamp a caller-supplied limit to the server-side bounds
pub(crate) fn effective_limit(limit: Option<usize>) -> usize {
    match limit {
        Some(0) => 0,
        Some(n) => n.min(MAX_RECORDS_LIMIT),
        None => DEFAULT_RECORDS_LIMIT,
    }
}

/// Default implementation of RecordsService
pub struct DefaultRecordsService {
    store: Arc<dyn HealthStore>,
}

impl DefaultRecordsService {
    pub fn new(store: Arc<dyn HealthStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl RecordsService for DefaultRecordsService {
    #[instrument(skip(self, draft), fields(user = %user, record_type = %draft.record_type))]
    async fn add_record(
        &self,
        user: &UserId,
        draft: HealthRecordDraft,
    ) -> ServiceResult<HealthRecord> {
        let record = draft.into_record(Utc::now());
        self.store.insert_record(user, &record).await?;
        debug!(record = %record.id, "health record added");
        Ok(record)
    }

    async fn get_record(
        &self,
        user: &UserId,
        id: &RecordId,
    ) -> ServiceResult<Option<HealthRecord>> {
        Ok(self.store.get_record(user, id).await?)
    }

    #[instrument(skip(self), fields(user = %user))]
    async fn list_records(
        &self,
        user: &UserId,
        limit: Option<usize>,
        record_type: Option<HealthRecordType>,
    ) -> ServiceResult<Vec<HealthRecord>> {
        let mut query = RecordQuery::new(effective_limit(limit));
        if let Some(record_type) = record_type {
            query = query.record_type(record_type);
        }
        Ok(self.store.list_records(user, &query).await?)
    }

    #[instrument(skip(self, draft), fields(user = %user, record = %id))]
    async fn update_record(
        &self,
        user: &UserId,
        id: &RecordId,
        draft: HealthRecordDraft,
    ) -> ServiceResult<Option<HealthRecord>> {
        let Some(mut record) = self.store.get_record(user, id).await? else {
            return Ok(None);
        };

        record.apply_draft(draft, Utc::now());
        self.store.put_record(user, &record).await?;
        Ok(Some(record))
    }

    #[instrument(skip(self), fields(user = %user, record = %id))]
    async fn delete_record(&self, user: &UserId, id: &RecordId) -> ServiceResult<bool> {
        let existed = self.store.delete_record(user, id).await?;
        debug!(existed, "health record delete");
        Ok(existed)
    }
}
