//! GraphQL mutation resolvers

use async_graphql::{Context, Object, Result, ID};
use healthtrack_core::{InsightId, ProfileUpdate, RecordId};
use healthtrack_service::ServiceRegistry;
use std::sync::Arc;

use super::scalars::GqlDate;
use super::types::{GqlGender, GqlHealthInsight, GqlHealthRecord, GqlUser, HealthRecordInput};
use crate::context::request_context;
use crate::error::from_service_error;

/// Root Mutation type
pub struct Mutation;

#[Object]
impl Mutation {
    /// Partially update the caller's profile; omitted arguments keep their
    /// prior value
    async fn update_profile(
        &self,
        ctx: &Context<'_>,
        full_name: Option<String>,
        date_of_birth: Option<GqlDate>,
        gender: Option<GqlGender>,
        height_cm: Option<i32>,
    ) -> Result<GqlUser> {
        let request = request_context(ctx)?;
        let user = request.require_auth()?;
        let services = ctx.data::<Arc<ServiceRegistry>>()?;

        let update = ProfileUpdate {
            full_name,
            date_of_birth: date_of_birth.map(|d| d.0),
            gender: gender.map(GqlGender::to_core),
            height_cm,
        };

        let profile = services
            .profile()
            .update_profile(&user.id, user.email.as_deref().unwrap_or_default(), update)
            .await
            .map_err(from_service_error)?;
        Ok(GqlUser(profile))
    }

    /// Store a new health record owned by the caller
    async fn add_health_record(
        &self,
        ctx: &Context<'_>,
        input: HealthRecordInput,
    ) -> Result<GqlHealthRecord> {
        let request = request_context(ctx)?;
        let user = request.require_auth()?;
        let services = ctx.data::<Arc<ServiceRegistry>>()?;

        let record = services
            .records()
            .add_record(&user.id, input.into_draft())
            .await
            .map_err(from_service_error)?;
        Ok(GqlHealthRecord(record))
    }

    /// Replace a record's content; null when the id is not in the caller's
    /// collection
    async fn update_health_record(
        &self,
        ctx: &Context<'_>,
        id: ID,
        input: HealthRecordInput,
    ) -> Result<Option<GqlHealthRecord>> {
        let request = request_context(ctx)?;
        let user = request.require_auth()?;
        let services = ctx.data::<Arc<ServiceRegistry>>()?;

        let Ok(record_id) = id.parse::<RecordId>() else {
            return Ok(None);
        };

        let record = services
            .records()
            .update_record(&user.id, &record_id, input.into_draft())
            .await
            .map_err(from_service_error)?;
        Ok(record.map(GqlHealthRecord))
    }

    /// Delete one of the caller's records; false when nothing existed
    async fn delete_health_record(&self, ctx: &Context<'_>, id: ID) -> Result<bool> {
        let request = request_context(ctx)?;
        let user = request.require_auth()?;
        let services = ctx.data::<Arc<ServiceRegistry>>()?;

        let Ok(record_id) = id.parse::<RecordId>() else {
            return Ok(false);
        };

        let deleted = services
            .records()
            .delete_record(&user.id, &record_id)
            .await
            .map_err(from_service_error)?;
        Ok(deleted)
    }

    /// Mark an insight as read; repeat calls succeed with read=true
    async fn mark_insight_as_read(
        &self,
        ctx: &Context<'_>,
        id: ID,
    ) -> Result<Option<GqlHealthInsight>> {
        let request = request_context(ctx)?;
        let user = request.require_auth()?;
        let services = ctx.data::<Arc<ServiceRegistry>>()?;

        let Ok(insight_id) = id.parse::<InsightId>() else {
            return Ok(None);
        };

        let insight = services
            .insights()
            .mark_read(&user.id, &insight_id)
            .await
            .map_err(from_service_error)?;
        Ok(insight.map(GqlHealthInsight))
    }
}
