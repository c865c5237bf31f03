//! Health record entity

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{HealthRecordType, RecordId};

/// A single health measurement or entry owned by one user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthRecord {
    pub id: RecordId,

    /// One of the closed set of record kinds
    pub record_type: HealthRecordType,

    /// Numeric reading (heart rate, weight, glucose, ...)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_numeric: Option<f64>,

    /// Free-text reading (medication name, exercise description, ...)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_text: Option<String>,

    /// Unit string for the numeric reading
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,

    /// Systolic pressure; only meaningful for blood-pressure records
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub systolic: Option<i32>,

    /// Diastolic pressure; only meaningful for blood-pressure records
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diastolic: Option<i32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,

    /// When the measurement was taken; caller-supplied or defaulted to now
    pub recorded_at: DateTime<Utc>,

    /// Server-assigned creation timestamp, never caller-suppliable
    pub created_at: DateTime<Utc>,
}

impl HealthRecord {
    /// Replace the record's content with the draft, keeping id and created-at
    pub fn apply_draft(&mut self, draft: HealthRecordDraft, now: DateTime<Utc>) {
        self.record_type = draft.record_type;
        self.value_numeric = draft.value_numeric;
        self.value_text = draft.value_text;
        self.unit = draft.unit;
        self.systolic = draft.systolic;
        self.diastolic = draft.diastolic;
        self.notes = draft.notes;
        self.recorded_at = draft.recorded_at.unwrap_or(now);
    }
}

/// Caller-supplied record content, before server-side fields are assigned
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthRecordDraft {
    pub record_type: HealthRecordType,
    #[serde(default)]
    pub value_numeric: Option<f64>,
    #[serde(default)]
    pub value_text: Option<String>,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub systolic: Option<i32>,
    #[serde(default)]
    pub diastolic: Option<i32>,
    #[serde(default)]
    pub notes: Option<String>,
    /// Optional measurement timestamp; the server uses now() when absent
    #[serde(default)]
    pub recorded_at: Option<DateTime<Utc>>,
}

impl HealthRecordDraft {
    /// Create a draft carrying only a record type
    pub fn new(record_type: HealthRecordType) -> Self {
        Self {
            record_type,
            value_numeric: None,
            value_text: None,
            unit: None,
            systolic: None,
            diastolic: None,
            notes: None,
            recorded_at: None,
        }
    }

    /// Materialize the draft into a stored record with server-assigned fields
    pub fn into_record(self, now: DateTime<Utc>) -> HealthRecord {
        HealthRecord {
            id: RecordId::new(),
            record_type: self.record_type,
            value_numeric: self.value_numeric,
            value_text: self.value_text,
            unit: self.unit,
            systolic: self.systolic,
            diastolic: self.diastolic,
            notes: self.notes,
            recorded_at: self.recorded_at.unwrap_or(now),
            created_at: now,
        }
    }
}
