//! Profile service
//!
//! Profiles are created lazily: the first authenticated access writes a
//! minimal document, and retries must never overwrite an existing one.

use async_trait::async_trait;
use chrono::Utc;
use healthtrack_core::{ProfileUpdate, UserId, UserProfile};
use healthtrack_db::HealthStore;
use std::sync::Arc;
use tracing::{debug, instrument};

use crate::error::ServiceResult;

/// Trait for user profile operations
#[async_trait]
pub trait ProfileService: Send + Sync {
    /// Fetch the caller's profile, creating a minimal one if absent
    async fn current_profile(&self, id: &UserId, email: &str) -> ServiceResult<UserProfile>;

    /// Apply a partial update to the caller's profile
    ///
    /// Unspecified fields keep their prior value; `updated_at` is set on
    /// every successful call. The profile is lazily created first if the
    /// caller has none yet.
    async fn update_profile(
        &self,
        id: &UserId,
        email: &str,
        update: ProfileUpdate,
    ) -> ServiceResult<UserProfile>;
}

/// Default implementation of ProfileService
pub struct DefaultProfileService {
    store: Arc<dyn HealthStore>,
}

impl DefaultProfileService {
    pub fn new(store: Arc<dyn HealthStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl ProfileService for DefaultProfileService {
    #[instrument(skip(self, email), fields(user = %id))]
    async fn current_profile(&self, id: &UserId, email: &str) -> ServiceResult<UserProfile> {
        if let Some(profile) = self.store.get_profile(id).await? {
            return Ok(profile);
        }

        debug!("lazily creating profile");
        let minimal = UserProfile::minimal(id.clone(), email, Utc::now());
        let stored = self.store.create_profile_if_absent(minimal).await?;
        Ok(stored)
    }

    #[instrument(skip(self, email, update), fields(user = %id))]
    async fn update_profile(
        &self,
        id: &UserId,
        email: &str,
        update: ProfileUpdate,
    ) -> ServiceResult<UserProfile> {
        let mut profile = self.current_profile(id, email).await?;
        profile.apply_update(update, Utc::now());
        self.store.put_profile(&profile).await?;
        Ok(profile)
    }
}
