//! GraphQL schema types
//!
//! Thin wrappers over the core domain types. Conversion between the GraphQL
//! enums and their core counterparts is explicit so the wire names stay
//! stable even if the core types evolve.

use async_graphql::{Context, Enum, InputObject, Object, Result, ID};
use healthtrack_core::{
    Gender, HealthInsight, HealthRecord, HealthRecordDraft, HealthRecordType, HealthSummary,
    InsightType, TrendData, UserProfile, UserRole,
};
use healthtrack_service::ServiceRegistry;
use std::sync::Arc;

use super::scalars::{GqlDate, GqlDateTime};
use crate::error::from_service_error;

/// GraphQL representation of a health record kind
#[derive(Enum, Copy, Clone, Eq, PartialEq)]
#[graphql(name = "HealthRecordType")]
pub enum GqlHealthRecordType {
    BloodPressure,
    HeartRate,
    Weight,
    BloodGlucose,
    Sleep,
    Exercise,
    Temperature,
    Medication,
}

impl GqlHealthRecordType {
    pub fn from_core(value: HealthRecordType) -> Self {
        match value {
            HealthRecordType::BloodPressure => Self::BloodPressure,
            HealthRecordType::HeartRate => Self::HeartRate,
            HealthRecordType::Weight => Self::Weight,
            HealthRecordType::BloodGlucose => Self::BloodGlucose,
            HealthRecordType::Sleep => Self::Sleep,
            HealthRecordType::Exercise => Self::Exercise,
            HealthRecordType::Temperature => Self::Temperature,
            HealthRecordType::Medication => Self::Medication,
        }
    }

    pub fn to_core(self) -> HealthRecordType {
        match self {
            Self::BloodPressure => HealthRecordType::BloodPressure,
            Self::HeartRate => HealthRecordType::HeartRate,
            Self::Weight => HealthRecordType::Weight,
            Self::BloodGlucose => HealthRecordType::BloodGlucose,
            Self::Sleep => HealthRecordType::Sleep,
            Self::Exercise => HealthRecordType::Exercise,
            Self::Temperature => HealthRecordType::Temperature,
            Self::Medication => HealthRecordType::Medication,
        }
    }
}

#[derive(Enum, Copy, Clone, Eq, PartialEq)]
#[graphql(name = "Gender")]
pub enum GqlGender {
    Male,
    Female,
    Other,
    PreferNotToSay,
}

impl GqlGender {
    pub fn from_core(value: Gender) -> Self {
        match value {
            Gender::Male => Self::Male,
            Gender::Female => Self::Female,
            Gender::Other => Self::Other,
            Gender::PreferNotToSay => Self::PreferNotToSay,
        }
    }

    pub fn to_core(self) -> Gender {
        match self {
            Self::Male => Gender::Male,
            Self::Female => Gender::Female,
            Self::Other => Gender::Other,
            Self::PreferNotToSay => Gender::PreferNotToSay,
        }
    }
}

#[derive(Enum, Copy, Clone, Eq, PartialEq)]
#[graphql(name = "UserRole")]
pub enum GqlUserRole {
    Patient,
    Provider,
    Admin,
}

impl GqlUserRole {
    pub fn from_core(value: UserRole) -> Self {
        match value {
            UserRole::Patient => Self::Patient,
            UserRole::Provider => Self::Provider,
            UserRole::Admin => Self::Admin,
        }
    }
}

#[derive(Enum, Copy, Clone, Eq, PartialEq)]
#[graphql(name = "InsightType")]
pub enum GqlInsightType {
    TrendAnalysis,
    Recommendation,
    RiskAlert,
    Achievement,
}

impl GqlInsightType {
    pub fn from_core(value: InsightType) -> Self {
        match value {
            InsightType::TrendAnalysis => Self::TrendAnalysis,
            InsightType::Recommendation => Self::Recommendation,
            InsightType::RiskAlert => Self::RiskAlert,
            InsightType::Achievement => Self::Achievement,
        }
    }
}

/// GraphQL representation of a user profile
#[derive(Clone)]
pub struct GqlUser(pub UserProfile);

#[Object(name = "User")]
impl GqlUser {
    async fn id(&self) -> ID {
        ID(self.0.id.to_string())
    }

    async fn email(&self) -> &str {
        &self.0.email
    }

    async fn full_name(&self) -> Option<&str> {
        self.0.full_name.as_deref()
    }

    async fn date_of_birth(&self) -> Option<GqlDate> {
        self.0.date_of_birth.map(GqlDate)
    }

    async fn gender(&self) -> Option<GqlGender> {
        self.0.gender.map(GqlGender::from_core)
    }

    async fn height_cm(&self) -> Option<i32> {
        self.0.height_cm
    }

    async fn role(&self) -> GqlUserRole {
        GqlUserRole::from_core(self.0.role)
    }

    async fn created_at(&self) -> GqlDateTime {
        GqlDateTime(self.0.created_at)
    }

    async fn updated_at(&self) -> Option<GqlDateTime> {
        self.0.updated_at.map(GqlDateTime)
    }

    /// The user's health records, newest first
    async fn health_records(
        &self,
        ctx: &Context<'_>,
        #[graphql(desc = "Maximum records to return")] limit: Option<i32>,
        #[graphql(desc = "Restrict to one record kind")] record_type: Option<GqlHealthRecordType>,
    ) -> Result<Vec<GqlHealthRecord>> {
        let services = ctx.data::<Arc<ServiceRegistry>>()?;
        let records = services
            .records()
            .list_records(
                &self.0.id,
                limit.map(|l| l.max(0) as usize),
                record_type.map(GqlHealthRecordType::to_core),
            )
            .await
            .map_err(from_service_error)?;
        Ok(records.into_iter().map(GqlHealthRecord).collect())
    }
}

/// GraphQL representation of a health record
#[derive(Clone)]
pub struct GqlHealthRecord(pub HealthRecord);

#[Object(name = "HealthRecord")]
impl GqlHealthRecord {
    async fn id(&self) -> ID {
        ID(self.0.id.to_string())
    }

    async fn record_type(&self) -> GqlHealthRecordType {
        GqlHealthRecordType::from_core(self.0.record_type)
    }

    async fn value_numeric(&self) -> Option<f64> {
        self.0.value_numeric
    }

    async fn value_text(&self) -> Option<&str> {
        self.0.value_text.as_deref()
    }

    async fn unit(&self) -> Option<&str> {
        self.0.unit.as_deref()
    }

    async fn systolic(&self) -> Option<i32> {
        self.0.systolic
    }

    async fn diastolic(&self) -> Option<i32> {
        self.0.diastolic
    }

    async fn notes(&self) -> Option<&str> {
        self.0.notes.as_deref()
    }

    async fn recorded_at(&self) -> GqlDateTime {
        GqlDateTime(self.0.recorded_at)
    }

    async fn created_at(&self) -> GqlDateTime {
        GqlDateTime(self.0.created_at)
    }
}

/// GraphQL representation of a generated insight
#[derive(Clone)]
pub struct GqlHealthInsight(pub HealthInsight);

#[Object(name = "HealthInsight")]
impl GqlHealthInsight {
    async fn id(&self) -> ID {
        ID(self.0.id.to_string())
    }

    async fn insight_type(&self) -> GqlInsightType {
        GqlInsightType::from_core(self.0.insight_type)
    }

    async fn title(&self) -> &str {
        &self.0.title
    }

    async fn description(&self) -> &str {
        &self.0.description
    }

    async fn confidence_score(&self) -> Option<f64> {
        self.0.confidence_score
    }

    async fn is_read(&self) -> bool {
        self.0.is_read
    }

    async fn created_at(&self) -> GqlDateTime {
        GqlDateTime(self.0.created_at)
    }

    async fn source_record_ids(&self) -> Vec<ID> {
        self.0
            .source_record_ids
            .iter()
            .map(|id| ID(id.to_string()))
            .collect()
    }
}

/// GraphQL representation of the aggregate summary
#[derive(Clone)]
pub struct GqlHealthSummary(pub HealthSummary);

#[Object(name = "HealthSummary")]
impl GqlHealthSummary {
    async fn total_records(&self) -> i64 {
        self.0.total_records as i64
    }

    async fn recent_trends(&self) -> Vec<GqlTrendData> {
        self.0.recent_trends.iter().cloned().map(GqlTrendData).collect()
    }

    async fn last_recorded_at(&self) -> Option<GqlDateTime> {
        self.0.last_recorded_at.map(GqlDateTime)
    }

    async fn avg_heart_rate(&self) -> Option<f64> {
        self.0.avg_heart_rate
    }

    /// Averaged "systolic/diastolic" reading
    async fn avg_blood_pressure(&self) -> Option<&str> {
        self.0.avg_blood_pressure.as_deref()
    }

    async fn latest_weight(&self) -> Option<f64> {
        self.0.latest_weight
    }
}

#[derive(Clone)]
pub struct GqlTrendData(pub TrendData);

#[Object(name = "TrendData")]
impl GqlTrendData {
    async fn record_type(&self) -> GqlHealthRecordType {
        GqlHealthRecordType::from_core(self.0.record_type)
    }

    /// "rising", "falling", or "stable"
    async fn trend(&self) -> &str {
        &self.0.trend
    }

    async fn change_percentage(&self) -> Option<f64> {
        self.0.change_percentage
    }

    async fn period(&self) -> &str {
        &self.0.period
    }
}

/// Input for creating or replacing a health record
#[derive(InputObject)]
#[graphql(name = "HealthRecordInput")]
pub struct HealthRecordInput {
    pub record_type: GqlHealthRecordType,
    pub value_numeric: Option<f64>,
    pub value_text: Option<String>,
    pub unit: Option<String>,
    pub systolic: Option<i32>,
    pub diastolic: Option<i32>,
    pub notes: Option<String>,
    /// Measurement time; defaults to the server clock when absent
    pub recorded_at: Option<GqlDateTime>,
}

impl HealthRecordInput {
    pub fn into_draft(self) -> HealthRecordDraft {
        HealthRecordDraft {
            record_type: self.record_type.to_core(),
            value_numeric: self.value_numeric,
            value_text: self.value_text,
            unit: self.unit,
            systolic: self.systolic,
            diastolic: self.diastolic,
            notes: self.notes,
            recorded_at: self.recorded_at.map(|dt| dt.0),
        }
    }
}
