//! Health summary aggregation and insight generation
//!
//! Summaries are computed on demand from recent records and never persisted.
//! Generated insights are persisted to the user's insight collection so they
//! can be listed and marked as read later.

use async_trait::async_trait;
use chrono::Utc;
use healthtrack_core::{
    HealthInsight, HealthRecord, HealthRecordType, HealthSummary, InsightId, InsightType,
    TrendData, UserId,
};
use healthtrack_db::{HealthStore, RecordQuery};
use std::sync::Arc;
use tracing::{debug, info, instrument};

use crate::ai::RecommendationClient;
use crate::error::ServiceResult;

/// How many recent records feed summary and insight computation
const ANALYSIS_WINDOW: usize = 100;

/// Minimum readings of one type before a trend is computed
const MIN_TREND_READINGS: usize = 3;

/// Change below this magnitude (percent) is reported as stable
const STABLE_THRESHOLD_PCT: f64 = 2.0;

/// Change above this magnitude (percent) is worth an insight
const INSIGHT_THRESHOLD_PCT: f64 = 5.0;

/// Average systolic pressure above this triggers a risk alert
const SYSTOLIC_ALERT_THRESHOLD: f64 = 140.0;

/// Maximum stored insights returned by a listing
const INSIGHTS_LIMIT: usize = 50;

/// Trait for summary and insight operations
#[async_trait]
pub trait InsightsService: Send + Sync {
    /// Compute an aggregate summary over the user's recent records
    async fn summary(&self, user: &UserId) -> ServiceResult<HealthSummary>;

    /// Analyze recent records, persist the resulting insights, return them
    async fn generate_insights(&self, user: &UserId) -> ServiceResult<Vec<HealthInsight>>;

    /// List the user's stored insights, newest first
    async fn list_insights(&self, user: &UserId) -> ServiceResult<Vec<HealthInsight>>;

    /// Mark an insight as read; absent ids yield `None`, re-marking is a no-op
    async fn mark_read(
        &self,
        user: &UserId,
        id: &InsightId,
    ) -> ServiceResult<Option<HealthInsight>>;
}

/// Default implementation of InsightsService
pub struct DefaultInsightsService {
    store: Arc<dyn HealthStore>,
    recommender: Arc<dyn RecommendationClient>,
}

impl DefaultInsightsService {
    pub fn new(store: Arc<dyn HealthStore>, recommender: Arc<dyn RecommendationClient>) -> Self {
        Self { store, recommender }
    }

    async fn recent_records(&self, user: &UserId) -> ServiceResult<Vec<HealthRecord>> {
        let query = RecordQuery::new(ANALYSIS_WINDOW);
        Ok(self.store.list_records(user, &query).await?)
    }
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Numeric readings of one type, oldest first
fn readings_of(records: &[HealthRecord], kind: HealthRecordType) -> Vec<f64> {
    let mut values: Vec<(chrono::DateTime<Utc>, f64)> = records
        .iter()
        .filter(|r| r.record_type == kind)
        .filter_map(|r| r.value_numeric.map(|v| (r.recorded_at, v)))
        .collect();
    values.sort_by_key(|(at, _)| *at);
    values.into_iter().map(|(_, v)| v).collect()
}

/// Percentage change between the older and newer halves of a series.
///
/// Returns `None` when there are too few readings or the older-half average
/// is zero.
pub(crate) fn change_percentage(values: &[f64]) -> Option<f64> {
    if values.len() < MIN_TREND_READINGS {
        return None;
    }
    let mid = values.len() / 2;
    let older = mean(&values[..mid])?;
    let newer = mean(&values[mid..])?;
    if older == 0.0 {
        return None;
    }
    Some((newer - older) / older * 100.0)
}

pub(crate) fn trend_label(change_pct: f64) -> &'static str {
    if change_pct > STABLE_THRESHOLD_PCT {
        "rising"
    } else if change_pct < -STABLE_THRESHOLD_PCT {
        "falling"
    } else {
        "stable"
    }
}

/// Compute per-type trends over the analysis window
pub(crate) fn compute_trends(records: &[HealthRecord]) -> Vec<TrendData> {
    let mut trends = Vec::new();
    for kind in HealthRecordType::ALL {
        let values = readings_of(records, kind);
        let Some(change) = change_percentage(&values) else {
            continue;
        };
        trends.push(TrendData {
            record_type: kind,
            trend: trend_label(change).to_string(),
            change_percentage: Some(change),
            period: format!("last {} readings", values.len()),
        });
    }
    trends
}

/// Build the summary from a newest-first record slice
pub(crate) fn build_summary(records: &[HealthRecord]) -> HealthSummary {
    let last_recorded_at = records.iter().map(|r| r.recorded_at).max();

    let heart_rates = readings_of(records, HealthRecordType::HeartRate);
    let weights = readings_of(records, HealthRecordType::Weight);

    let systolics: Vec<f64> = records
        .iter()
        .filter(|r| r.record_type == HealthRecordType::BloodPressure)
        .filter_map(|r| r.systolic.map(f64::from))
        .collect();
    let diastolics: Vec<f64> = records
        .iter()
        .filter(|r| r.record_type == HealthRecordType::BloodPressure)
        .filter_map(|r| r.diastolic.map(f64::from))
        .collect();

    let avg_blood_pressure = match (mean(&systolics), mean(&diastolics)) {
        (Some(sys), Some(dia)) => Some(format!("{:.0}/{:.0}", sys, dia)),
        _ => None,
    };

    HealthSummary {
        total_records: records.len(),
        recent_trends: compute_trends(records),
        last_recorded_at,
        avg_heart_rate: mean(&heart_rates),
        avg_blood_pressure,
        latest_weight: weights.last().copied(),
    }
}

#[async_trait]
impl InsightsService for DefaultInsightsService {
    #[instrument(skip(self), fields(user = %user))]
    async fn summary(&self, user: &UserId) -> ServiceResult<HealthSummary> {
        let records = self.recent_records(user).await?;
        Ok(build_summary(&records))
    }

    #[instrument(skip(self), fields(user = %user))]
    async fn generate_insights(&self, user: &UserId) -> ServiceResult<Vec<HealthInsight>> {
        let records = self.recent_records(user).await?;
        let now = Utc::now();
        let mut insights = Vec::new();

        // Trend insights for types with enough readings and a material change
        for kind in HealthRecordType::ALL {
            let values = readings_of(&records, kind);
            let Some(change) = change_percentage(&values) else {
                continue;
            };
            if change.abs() < INSIGHT_THRESHOLD_PCT {
                continue;
            }
            let sources = records
                .iter()
                .filter(|r| r.record_type == kind)
                .map(|r| r.id)
                .collect();
            insights.push(
                HealthInsight::new(
                    InsightType::TrendAnalysis,
                    format!("{} is {}", kind, trend_label(change)),
                    format!(
                        "Your {} readings have changed by {:.1}% over your last {} entries.",
                        kind,
                        change,
                        values.len()
                    ),
                    now,
                )
                .with_confidence(0.8)
                .with_sources(sources),
            );
        }

        // Elevated blood pressure alert
        let systolics: Vec<f64> = records
            .iter()
            .filter(|r| r.record_type == HealthRecordType::BloodPressure)
            .filter_map(|r| r.systolic.map(f64::from))
            .collect();
        if let Some(avg_systolic) = mean(&systolics) {
            if avg_systolic > SYSTOLIC_ALERT_THRESHOLD {
                let sources = records
                    .iter()
                    .filter(|r| r.record_type == HealthRecordType::BloodPressure)
                    .map(|r| r.id)
                    .collect();
                insights.push(
                    HealthInsight::new(
                        InsightType::RiskAlert,
                        "Elevated blood pressure",
                        format!(
                            "Your average systolic pressure of {:.0} mmHg is above the normal \
                             range. Consider discussing this with your healthcare provider.",
                            avg_systolic
                        ),
                        now,
                    )
                    .with_confidence(0.9)
                    .with_sources(sources),
                );
            }
        }

        // One generated recommendation from the most measured numeric metric
        if let Some((kind, values)) = HealthRecordType::ALL
            .into_iter()
            .map(|kind| (kind, readings_of(&records, kind)))
            .filter(|(_, values)| !values.is_empty())
            .max_by_key(|(_, values)| values.len())
        {
            let text = self
                .recommender
                .generate_recommendation(&kind.to_string(), &values, None)
                .await?;
            insights.push(
                HealthInsight::new(InsightType::Recommendation, "Recommendation", text, now)
                    .with_confidence(0.7),
            );
        }

        for insight in &insights {
            self.store.insert_insight(user, insight).await?;
        }
        info!(count = insights.len(), "insights generated");
        Ok(insights)
    }

    async fn list_insights(&self, user: &UserId) -> ServiceResult<Vec<HealthInsight>> {
        Ok(self.store.list_insights(user, INSIGHTS_LIMIT).await?)
    }

    #[instrument(skip(self), fields(user = %user, insight = %id))]
    async fn mark_read(
        &self,
        user: &UserId,
        id: &InsightId,
    ) -> ServiceResult<Option<HealthInsight>> {
        let Some(mut insight) = self.store.get_insight(user, id).await? else {
            return Ok(None);
        };
        if !insight.is_read {
            insight.is_read = true;
            self.store.put_insight(user, &insight).await?;
            debug!("insight marked as read");
        }
        Ok(Some(insight))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::StaticRecommendationClient;
    use crate::error::ServiceError;
    use chrono::{Duration, TimeZone};
    use healthtrack_core::HealthRecordDraft;
    use healthtrack_db::MemoryStore;

    mockall::mock! {
        Recommender {}

        #[async_trait]
        impl RecommendationClient for Recommender {
            async fn generate_recommendation(
                &self,
                metric: &str,
                recent_values: &[f64],
                target: Option<f64>,
            ) -> ServiceResult<String>;
        }
    }

    fn record(
        kind: HealthRecordType,
        value: f64,
        minutes_ago: i64,
    ) -> HealthRecord {
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
        let mut draft = HealthRecordDraft::new(kind);
        draft.value_numeric = Some(value);
        draft.recorded_at = Some(now - Duration::minutes(minutes_ago));
        draft.into_record(now)
    }

    fn bp_record(systolic: i32, diastolic: i32, minutes_ago: i64) -> HealthRecord {
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
        let mut draft = HealthRecordDraft::new(HealthRecordType::BloodPressure);
        draft.systolic = Some(systolic);
        draft.diastolic = Some(diastolic);
        draft.recorded_at = Some(now - Duration::minutes(minutes_ago));
        draft.into_record(now)
    }

    fn service_with(store: Arc<MemoryStore>) -> DefaultInsightsService {
        DefaultInsightsService::new(store, Arc::new(StaticRecommendationClient::default()))
    }

    #[test]
    fn test_change_percentage_needs_enough_readings() {
        assert!(change_percentage(&[70.0, 72.0]).is_none());
        assert!(change_percentage(&[]).is_none());
    }

    #[test]
    fn test_change_percentage_older_vs_newer_halves() {
        // older half avg 100, newer half avg 110
        let change = change_percentage(&[100.0, 100.0, 110.0, 110.0]).unwrap();
        assert!((change - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_trend_labels() {
        assert_eq!(trend_label(5.0), "rising");
        assert_eq!(trend_label(-5.0), "falling");
        assert_eq!(trend_label(1.5), "stable");
        assert_eq!(trend_label(-1.5), "stable");
    }

    #[test]
    fn test_summary_aggregates() {
        let records = vec![
            record(HealthRecordType::HeartRate, 60.0, 30),
            record(HealthRecordType::HeartRate, 70.0, 20),
            record(HealthRecordType::Weight, 81.0, 60),
            record(HealthRecordType::Weight, 80.0, 10),
            bp_record(120, 80, 15),
            bp_record(130, 86, 5),
        ];

        let summary = build_summary(&records);
        assert_eq!(summary.total_records, 6);
        assert_eq!(summary.avg_heart_rate, Some(65.0));
        assert_eq!(summary.avg_blood_pressure.as_deref(), Some("125/83"));
        // latest by recorded_at, not slice order
        assert_eq!(summary.latest_weight, Some(80.0));
        assert!(summary.last_recorded_at.is_some());
    }

    #[test]
    fn test_empty_summary() {
        let summary = build_summary(&[]);
        assert_eq!(summary.total_records, 0);
        assert!(summary.recent_trends.is_empty());
        assert!(summary.last_recorded_at.is_none());
        assert!(summary.avg_heart_rate.is_none());
        assert!(summary.avg_blood_pressure.is_none());
        assert!(summary.latest_weight.is_none());
    }

    #[tokio::test]
    async fn test_generate_insights_persists_them() {
        let store = Arc::new(MemoryStore::new());
        let user = UserId::from("u1");
        // steadily rising weight, enough readings for a trend insight
        for (i, value) in [78.0, 79.0, 83.0, 85.0].iter().enumerate() {
            store
                .insert_record(&user, &record(HealthRecordType::Weight, *value, 100 - i as i64))
                .await
                .unwrap();
        }

        let service = service_with(store.clone());
        let generated = service.generate_insights(&user).await.unwrap();
        assert!(generated
            .iter()
            .any(|i| i.insight_type == InsightType::TrendAnalysis));
        assert!(generated
            .iter()
            .any(|i| i.insight_type == InsightType::Recommendation));

        let stored = service.list_insights(&user).await.unwrap();
        assert_eq!(stored.len(), generated.len());
    }

    #[tokio::test]
    async fn test_recommender_failure_propagates() {
        let store = Arc::new(MemoryStore::new());
        let user = UserId::from("u1");
        for (i, value) in [78.0, 79.0, 83.0, 85.0].iter().enumerate() {
            store
                .insert_record(&user, &record(HealthRecordType::Weight, *value, 100 - i as i64))
                .await
                .unwrap();
        }

        let mut recommender = MockRecommender::new();
        recommender
            .expect_generate_recommendation()
            .returning(|_, _, _| Err(ServiceError::Unavailable("model offline".into())));

        let service = DefaultInsightsService::new(store.clone(), Arc::new(recommender));
        let result = service.generate_insights(&user).await;
        assert!(matches!(result, Err(ServiceError::Unavailable(_))));

        // nothing is persisted when generation fails partway
        let stored = store.list_insights(&user, 10).await.unwrap();
        assert!(stored.is_empty());
    }

    #[tokio::test]
    async fn test_high_blood_pressure_raises_alert() {
        let store = Arc::new(MemoryStore::new());
        let user = UserId::from("u1");
        for i in 0..3 {
            store
                .insert_record(&user, &bp_record(150, 95, 30 - i))
                .await
                .unwrap();
        }

        let service = service_with(store);
        let generated = service.generate_insights(&user).await.unwrap();
        let alert = generated
            .iter()
            .find(|i| i.insight_type == InsightType::RiskAlert)
            .expect("risk alert expected");
        assert!(alert.description.contains("150"));
        assert!(!alert.source_record_ids.is_empty());
    }

    #[tokio::test]
    async fn test_mark_read_is_idempotent() {
        let store = Arc::new(MemoryStore::new());
        let user = UserId::from("u1");
        let insight = HealthInsight::new(
            InsightType::Achievement,
            "First week logged",
            "You recorded data every day this week.",
            Utc::now(),
        );
        store.insert_insight(&user, &insight).await.unwrap();

        let service = service_with(store);
        let first = service.mark_read(&user, &insight.id).await.unwrap().unwrap();
        assert!(first.is_read);
        let second = service.mark_read(&user, &insight.id).await.unwrap().unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_mark_read_absent_returns_none() {
        let service = service_with(Arc::new(MemoryStore::new()));
        let result = service
            .mark_read(&UserId::from("u1"), &InsightId::new())
            .await
            .unwrap();
        assert!(result.is_none());
    }
}
