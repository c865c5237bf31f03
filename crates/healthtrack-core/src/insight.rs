//! Health insight and summary entities

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{HealthRecordType, InsightId, InsightType, RecordId};

/// Generated analysis output, persisted per user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthInsight {
    pub id: InsightId,
    pub insight_type: InsightType,
    pub title: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence_score: Option<f64>,
    #[serde(default)]
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
    /// Records the insight was derived from
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub source_record_ids: Vec<RecordId>,
}

impl HealthInsight {
    pub fn new(
        insight_type: InsightType,
        title: impl Into<String>,
        description: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: InsightId::new(),
            insight_type,
            title: title.into(),
            description: description.into(),
            confidence_score: None,
            is_read: false,
            created_at: now,
            source_record_ids: Vec::new(),
        }
    }

    pub fn with_confidence(mut self, score: f64) -> Self {
        self.confidence_score = Some(score);
        self
    }

    pub fn with_sources(mut self, ids: Vec<RecordId>) -> Self {
        self.source_record_ids = ids;
        self
    }
}

/// Aggregate view over a user's recent records
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HealthSummary {
    pub total_records: usize,
    pub recent_trends: Vec<TrendData>,
    pub last_recorded_at: Option<DateTime<Utc>>,
    pub avg_heart_rate: Option<f64>,
    /// Formatted "systolic/diastolic" average
    pub avg_blood_pressure: Option<String>,
    pub latest_weight: Option<f64>,
}

/// Direction of a record type's recent readings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendData {
    pub record_type: HealthRecordType,
    /// "rising", "falling", or "stable"
    pub trend: String,
    pub change_percentage: Option<f64>,
    /// Window the trend was computed over
    pub period: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_insight_is_unread() {
        let insight = HealthInsight::new(
            InsightType::Recommendation,
            "Hydration",
            "Drink more water before workouts.",
            Utc::now(),
        );
        assert!(!insight.is_read);
        assert!(insight.confidence_score.is_none());
        assert!(insight.source_record_ids.is_empty());
    }

    #[test]
    fn test_builder_helpers() {
        let source = RecordId::new();
        let insight = HealthInsight::new(
            InsightType::TrendAnalysis,
            "Heart rate stable",
            "No significant change this week.",
            Utc::now(),
        )
        .with_confidence(0.87)
        .with_sources(vec![source]);

        assert_eq!(insight.confidence_score, Some(0.87));
        assert_eq!(insight.source_record_ids, vec![source]);
    }
}
