//! Test data fixtures

#![allow(dead_code)]

use serde_json::json;

pub const ADD_RECORD: &str = r#"
    mutation AddRecord($input: HealthRecordInput!) {
        addHealthRecord(input: $input) {
            id recordType valueNumeric unit systolic diastolic recordedAt
        }
    }
"#;

pub const LIST_RECORDS: &str = r#"
    query {
        healthRecords { id recordType valueNumeric recordedAt }
    }
"#;

pub const ME: &str = "{ me { id email fullName role createdAt } }";

pub fn heart_rate_input(bpm: f64) -> serde_json::Value {
    json!({
        "input": {
            "recordType": "HEART_RATE",
            "valueNumeric": bpm,
            "unit": "bpm"
        }
    })
}

pub fn weight_input(kg: f64) -> serde_json::Value {
    json!({
        "input": {
            "recordType": "WEIGHT",
            "valueNumeric": kg,
            "unit": "kg"
        }
    })
}

pub fn blood_pressure_input(systolic: i32, diastolic: i32) -> serde_json::Value {
    json!({
        "input": {
            "recordType": "BLOOD_PRESSURE",
            "systolic": systolic,
            "diastolic": diastolic,
            "unit": "mmHg"
        }
    })
}
