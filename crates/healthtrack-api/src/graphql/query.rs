//! GraphQL query resolvers

use async_graphql::{Context, Object, Result, ID};
use healthtrack_core::{RecordId, UserRole};
use healthtrack_service::ServiceRegistry;
use std::sync::Arc;

use super::types::{
    GqlHealthInsight, GqlHealthRecord, GqlHealthRecordType, GqlHealthSummary, GqlUser,
};
use crate::context::request_context;
use crate::error::from_service_error;

/// Root Query type
pub struct Query;

#[Object]
impl Query {
    /// The caller's profile, created on first access
    async fn me(&self, ctx: &Context<'_>) -> Result<GqlUser> {
        let request = request_context(ctx)?;
        let user = request.require_auth()?;
        let services = ctx.data::<Arc<ServiceRegistry>>()?;

        let profile = services
            .profile()
            .current_profile(&user.id, user.email.as_deref().unwrap_or_default())
            .await
            .map_err(from_service_error)?;
        Ok(GqlUser(profile))
    }

    /// One of the caller's health records; null when the id does not exist
    /// in their collection
    async fn health_record(&self, ctx: &Context<'_>, id: ID) -> Result<Option<GqlHealthRecord>> {
        let request = request_context(ctx)?;
        let user = request.require_auth()?;
        let services = ctx.data::<Arc<ServiceRegistry>>()?;

        // a malformed id resolves like an absent one
        let Ok(record_id) = id.parse::<RecordId>() else {
            return Ok(None);
        };

        let record = services
            .records()
            .get_record(&user.id, &record_id)
            .await
            .map_err(from_service_error)?;
        Ok(record.map(GqlHealthRecord))
    }

    /// The caller's health records, newest first
    async fn health_records(
        &self,
        ctx: &Context<'_>,
        #[graphql(desc = "Maximum records to return")] limit: Option<i32>,
        #[graphql(desc = "Restrict to one record kind")] record_type: Option<GqlHealthRecordType>,
    ) -> Result<Vec<GqlHealthRecord>> {
        let request = request_context(ctx)?;
        let user = request.require_auth()?;
        let services = ctx.data::<Arc<ServiceRegistry>>()?;

        let records = services
            .records()
            .list_records(
                &user.id,
                limit.map(|l| l.max(0) as usize),
                record_type.map(GqlHealthRecordType::to_core),
            )
            .await
            .map_err(from_service_error)?;
        Ok(records.into_iter().map(GqlHealthRecord).collect())
    }

    /// Aggregate view over the caller's recent records
    async fn health_summary(&self, ctx: &Context<'_>) -> Result<GqlHealthSummary> {
        let request = request_context(ctx)?;
        let user = request.require_auth()?;
        let services = ctx.data::<Arc<ServiceRegistry>>()?;

        let summary = services
            .insights()
            .summary(&user.id)
            .await
            .map_err(from_service_error)?;
        Ok(GqlHealthSummary(summary))
    }

    /// The caller's stored insights, newest first
    async fn health_insights(&self, ctx: &Context<'_>) -> Result<Vec<GqlHealthInsight>> {
        let request = request_context(ctx)?;
        let user = request.require_auth()?;
        let services = ctx.data::<Arc<ServiceRegistry>>()?;

        let insights = services
            .insights()
            .list_insights(&user.id)
            .await
            .map_err(from_service_error)?;
        Ok(insights.into_iter().map(GqlHealthInsight).collect())
    }

    /// Analyze the caller's records, persist the resulting insights, and
    /// return them
    async fn generate_health_insights(
        &self,
        ctx: &Context<'_>,
    ) -> Result<Vec<GqlHealthInsight>> {
        let request = request_context(ctx)?;
        // every recognized role may generate; tokens without a mapped role
        // (absent or unrecognized claim) are refused
        let user =
            request.require_role(&[UserRole::Patient, UserRole::Provider, UserRole::Admin])?;
        let services = ctx.data::<Arc<ServiceRegistry>>()?;

        let insights = services
            .insights()
            .generate_insights(&user.id)
            .await
            .map_err(from_service_error)?;
        Ok(insights.into_iter().map(GqlHealthInsight).collect())
    }

    /// API version string
    async fn version(&self) -> &'static str {
        env!("CARGO_PKG_VERSION")
    }
}
