//! Service layer for the HealthTrack backend
//!
//! This crate sits between the GraphQL API and the document store. It owns
//! the business rules the resolvers delegate to:
//!
//! - **ProfileService**: lazy idempotent profile creation, partial updates
//! - **RecordsService**: record CRUD with a server-side listing cap
//! - **InsightsService**: summary aggregation, insight generation, mark-read
//! - **RecommendationClient**: external generative-text call for
//!   natural-language recommendations

pub mod ai;
pub mod error;
pub mod insights;
pub mod profile;
pub mod records;

pub use ai::{GeminiClient, GeminiConfig, RecommendationClient, StaticRecommendationClient};
pub use error::{ServiceError, ServiceResult};
pub use insights::{DefaultInsightsService, InsightsService};
pub use profile::{DefaultProfileService, ProfileService};
pub use records::{DefaultRecordsService, RecordsService, DEFAULT_RECORDS_LIMIT, MAX_RECORDS_LIMIT};

use healthtrack_db::HealthStore;
use std::sync::Arc;

/// Service registry that holds all service instances
///
/// Built once at process start and injected into the GraphQL schema; there is
/// no other cross-request shared mutable state in the core.
#[derive(Clone)]
pub struct ServiceRegistry {
    store: Arc<dyn HealthStore>,
    profile: Arc<dyn ProfileService>,
    records: Arc<dyn RecordsService>,
    insights: Arc<dyn InsightsService>,
}

impl ServiceRegistry {
    /// Create a registry with default implementations over one store
    pub fn new(store: Arc<dyn HealthStore>, recommender: Arc<dyn RecommendationClient>) -> Self {
        let profile = Arc::new(DefaultProfileService::new(store.clone()));
        let records = Arc::new(DefaultRecordsService::new(store.clone()));
        let insights = Arc::new(DefaultInsightsService::new(store.clone(), recommender));

        Self {
            store,
            profile,
            records,
            insights,
        }
    }

    /// Create a registry with custom implementations, for tests
    pub fn with_services(
        store: Arc<dyn HealthStore>,
        profile: Arc<dyn ProfileService>,
        records: Arc<dyn RecordsService>,
        insights: Arc<dyn InsightsService>,
    ) -> Self {
        Self {
            store,
            profile,
            records,
            insights,
        }
    }

    /// Verify the backing store is reachable
    pub async fn health_check(&self) -> ServiceResult<()> {
        self.store.health_check().await?;
        Ok(())
    }

    pub fn profile(&self) -> &Arc<dyn ProfileService> {
        &self.profile
    }

    pub fn records(&self) -> &Arc<dyn RecordsService> {
        &self.records
    }

    pub fn insights(&self) -> &Arc<dyn InsightsService> {
        &self.insights
    }
}
