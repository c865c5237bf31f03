//! In-memory store implementation
//!
//! Used by tests and local development. Every trait call bumps an operation
//! counter so tests can assert that a code path performed zero store access.

use async_trait::async_trait;
use healthtrack_core::{
    HealthInsight, HealthRecord, InsightId, RecordId, UserId, UserProfile,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;

use crate::error::{StoreError, StoreResult};
use crate::store::{HealthStore, RecordQuery};

#[derive(Default)]
struct UserDocuments {
    profile: Option<UserProfile>,
    records: HashMap<RecordId, HealthRecord>,
    insights: HashMap<InsightId, HealthInsight>,
}

/// In-process document store keyed by user id
#[derive(Default)]
pub struct MemoryStore {
    users: RwLock<HashMap<UserId, UserDocuments>>,
    ops: AtomicU64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of store operations performed since creation
    pub fn op_count(&self) -> u64 {
        self.ops.load(Ordering::SeqCst)
    }

    /// Number of profile documents currently stored
    pub fn profile_count(&self) -> usize {
        self.users
            .read()
            .expect("store lock poisoned")
            .values()
            .filter(|docs| docs.profile.is_some())
            .count()
    }

    fn tick(&self) {
        self.ops.fetch_add(1, Ordering::SeqCst);
    }

    fn with_user<T>(&self, user: &UserId, f: impl FnOnce(&UserDocuments) -> T) -> T {
        let users = self.users.read().expect("store lock poisoned");
        match users.get(user) {
            Some(docs) => f(docs),
            None => f(&UserDocuments::default()),
        }
    }

    fn with_user_mut<T>(&self, user: &UserId, f: impl FnOnce(&mut UserDocuments) -> T) -> T {
        let mut users = self.users.write().expect("store lock poisoned");
        f(users.entry(user.clone()).or_default())
    }
}

#[async_trait]
impl HealthStore for MemoryStore {
    async fn get_profile(&self, user: &UserId) -> StoreResult<Option<UserProfile>> {
        self.tick();
        Ok(self.with_user(user, |docs| docs.profile.clone()))
    }

    async fn create_profile_if_absent(&self, profile: UserProfile) -> StoreResult<UserProfile> {
        self.tick();
        let user = profile.id.clone();
        Ok(self.with_user_mut(&user, |docs| {
            docs.profile.get_or_insert(profile).clone()
        }))
    }

    async fn put_profile(&self, profile: &UserProfile) -> StoreResult<()> {
        self.tick();
        self.with_user_mut(&profile.id, |docs| {
            docs.profile = Some(profile.clone());
        });
        Ok(())
    }

    async fn insert_record(&self, user: &UserId, record: &HealthRecord) -> StoreResult<()> {
        self.tick();
        self.with_user_mut(user, |docs| {
            if docs.records.contains_key(&record.id) {
                return Err(StoreError::AlreadyExists(record.id.to_string()));
            }
            docs.records.insert(record.id, record.clone());
            Ok(())
        })
    }

    async fn get_record(&self, user: &UserId, id: &RecordId) -> StoreResult<Option<HealthRecord>> {
        self.tick();
        Ok(self.with_user(user, |docs| docs.records.get(id).cloned()))
    }

    async fn list_records(
        &self,
        user: &UserId,
        query: &RecordQuery,
    ) -> StoreResult<Vec<HealthRecord>> {
        self.tick();
        let mut records = self.with_user(user, |docs| {
            docs.records
                .values()
                .filter(|r| query.record_type.map_or(true, |t| r.record_type == t))
                .cloned()
                .collect::<Vec<_>>()
        });
        records.sort_by(|a, b| b.recorded_at.cmp(&a.recorded_at));
        records.truncate(query.limit);
        Ok(records)
    }

    async fn put_record(&self, user: &UserId, record: &HealthRecord) -> StoreResult<()> {
        self.tick();
        self.with_user_mut(user, |docs| {
            docs.records.insert(record.id, record.clone());
        });
        Ok(())
    }

    async fn delete_record(&self, user: &UserId, id: &RecordId) -> StoreResult<bool> {
        self.tick();
        Ok(self.with_user_mut(user, |docs| docs.records.remove(id).is_some()))
    }

    async fn insert_insight(&self, user: &UserId, insight: &HealthInsight) -> StoreResult<()> {
        self.tick();
        self.with_user_mut(user, |docs| {
            docs.insights.insert(insight.id, insight.clone());
        });
        Ok(())
    }

    async fn get_insight(
        &self,
        user: &UserId,
        id: &InsightId,
    ) -> StoreResult<Option<HealthInsight>> {
        self.tick();
        Ok(self.with_user(user, |docs| docs.insights.get(id).cloned()))
    }

    async fn list_insights(&self, user: &UserId, limit: usize) -> StoreResult<Vec<HealthInsight>> {
        self.tick();
        let mut insights = self.with_user(user, |docs| {
            docs.insights.values().cloned().collect::<Vec<_>>()
        });
        insights.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        insights.truncate(limit);
        Ok(insights)
    }

    async fn put_insight(&self, user: &UserId, insight: &HealthInsight) -> StoreResult<()> {
        self.tick();
        self.with_user_mut(user, |docs| {
            docs.insights.insert(insight.id, insight.clone());
        });
        Ok(())
    }

    async fn health_check(&self) -> StoreResult<()> {
        Ok(())
    }
}
