//! GraphQL API integration tests
//!
//! Full-stack tests over real HTTP: adapter behavior, CRUD operations,
//! per-user scoping, and scalar round trips.

mod common;

use common::fixtures::{blood_pressure_input, heart_rate_input, weight_input, ADD_RECORD, LIST_RECORDS, ME};
use common::TestApp;
use reqwest::StatusCode;
use serde_json::json;

#[tokio::test]
async fn test_me_lazily_creates_exactly_one_profile() {
    let app = TestApp::new().await;

    let first = app.execute("u1", ME).await;
    assert_eq!(first["me"]["id"], "u1");
    assert_eq!(first["me"]["email"], "u1@example.com");
    assert_eq!(first["me"]["role"], "PATIENT");
    assert!(first["me"]["fullName"].is_null());

    let second = app.execute("u1", ME).await;
    assert_eq!(second["me"]["id"], "u1");

    assert_eq!(app.store.profile_count(), 1);
}

#[tokio::test]
async fn test_add_record_is_scoped_to_its_owner() {
    let app = TestApp::new().await;

    let added = app
        .execute_with_variables("u1", ADD_RECORD, heart_rate_input(72.0))
        .await;
    let id = added["addHealthRecord"]["id"].as_str().unwrap().to_string();
    assert_eq!(added["addHealthRecord"]["recordType"], "HEART_RATE");
    assert_eq!(added["addHealthRecord"]["valueNumeric"], 72.0);

    let mine = app.execute("u1", LIST_RECORDS).await;
    let ids: Vec<&str> = mine["healthRecords"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["id"].as_str().unwrap())
        .collect();
    assert!(ids.contains(&id.as_str()));

    let theirs = app.execute("u2", LIST_RECORDS).await;
    assert_eq!(theirs["healthRecords"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_records_are_listed_newest_first() {
    let app = TestApp::new().await;

    let query = r#"
        mutation {
            older: addHealthRecord(input: {recordType: WEIGHT, valueNumeric: 80.0, recordedAt: "2025-01-01T08:00:00Z"}) { id }
            newer: addHealthRecord(input: {recordType: WEIGHT, valueNumeric: 79.0, recordedAt: "2025-02-01T08:00:00Z"}) { id }
        }
    "#;
    app.execute("u1", query).await;

    let listed = app.execute("u1", LIST_RECORDS).await;
    let records = listed["healthRecords"].as_array().unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0]["valueNumeric"], 79.0);
    assert_eq!(records[1]["valueNumeric"], 80.0);
}

#[tokio::test]
async fn test_invalid_record_type_is_rejected() {
    let app = TestApp::new().await;

    let token = app.token("u1");
    let response = app
        .graphql_post(
            Some(&token),
            &json!({
                "query": ADD_RECORD,
                "variables": {"input": {"recordType": "STEPS"}}
            }),
        )
        .await;

    // enum validation fails before any resolver runs
    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = response.json().await.unwrap();
    assert!(body["errors"].is_array());
    assert_eq!(app.store.op_count(), 0);
}

#[tokio::test]
async fn test_get_request_form() {
    let app = TestApp::new().await;
    let token = app.token("u1");

    let query = urlencoding_encode("{ me { id } }");
    let response = app
        .client()
        .get(format!("{}?query={}", app.graphql_url(), query))
        .header("Authorization", format!("Bearer {token}"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["data"]["me"]["id"], "u1");
}

#[tokio::test]
async fn test_preflight_answers_without_executing() {
    let app = TestApp::new().await;

    let response = app
        .client()
        .request(reqwest::Method::OPTIONS, app.graphql_url())
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["access-control-allow-origin"], "*");
    assert_eq!(
        response.headers()["access-control-allow-methods"],
        "GET, POST, OPTIONS"
    );
    assert!(response.headers().contains_key("x-healthtrack-version"));
    assert!(response.bytes().await.unwrap().is_empty());
    assert_eq!(app.store.op_count(), 0);
}

#[tokio::test]
async fn test_malformed_body_produces_internal_error_envelope() {
    let app = TestApp::new().await;

    let response = app
        .client()
        .post(app.graphql_url())
        .header("content-type", "application/json")
        .body("{broken")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["errors"][0]["message"], "Internal server error");
    assert_eq!(body["errors"][0]["extensions"]["code"], "INTERNAL_ERROR");
    assert!(body["errors"][0]["extensions"]["timestamp"].is_string());
}

#[tokio::test]
async fn test_update_profile_and_date_scalar_round_trip() {
    let app = TestApp::new().await;

    let mutation = r#"
        mutation {
            updateProfile(fullName: "Jo Birch", dateOfBirth: "1990-02-14", gender: OTHER, heightCm: 172) {
                fullName dateOfBirth gender heightCm updatedAt
            }
        }
    "#;
    let data = app.execute("u1", mutation).await;
    let profile = &data["updateProfile"];
    assert_eq!(profile["fullName"], "Jo Birch");
    assert_eq!(profile["dateOfBirth"], "1990-02-14");
    assert_eq!(profile["gender"], "OTHER");
    assert_eq!(profile["heightCm"], 172);
    assert!(profile["updatedAt"].is_string());

    // a partial update keeps the other fields
    let partial = app
        .execute("u1", r#"mutation { updateProfile(heightCm: 175) { fullName heightCm } }"#)
        .await;
    assert_eq!(partial["updateProfile"]["fullName"], "Jo Birch");
    assert_eq!(partial["updateProfile"]["heightCm"], 175);
}

#[tokio::test]
async fn test_datetime_scalar_round_trip() {
    let app = TestApp::new().await;

    let data = app
        .execute_with_variables(
            "u1",
            ADD_RECORD,
            json!({
                "input": {
                    "recordType": "HEART_RATE",
                    "valueNumeric": 64.0,
                    "recordedAt": "2025-03-01T08:30:00+00:00"
                }
            }),
        )
        .await;
    assert_eq!(
        data["addHealthRecord"]["recordedAt"],
        "2025-03-01T08:30:00+00:00"
    );
}

#[tokio::test]
async fn test_update_record_replaces_content() {
    let app = TestApp::new().await;

    let added = app
        .execute_with_variables("u1", ADD_RECORD, weight_input(81.0))
        .await;
    let id = added["addHealthRecord"]["id"].as_str().unwrap();

    let mutation = format!(
        r#"mutation {{ updateHealthRecord(id: "{id}", input: {{recordType: WEIGHT, valueNumeric: 80.2, unit: "kg"}}) {{ id valueNumeric }} }}"#
    );
    let updated = app.execute("u1", &mutation).await;
    assert_eq!(updated["updateHealthRecord"]["id"], id);
    assert_eq!(updated["updateHealthRecord"]["valueNumeric"], 80.2);
}

#[tokio::test]
async fn test_update_absent_record_returns_null() {
    let app = TestApp::new().await;

    let mutation = r#"
        mutation {
            updateHealthRecord(id: "01ARZ3NDEKTSV4RRFFQ69G5FAV", input: {recordType: WEIGHT}) { id }
        }
    "#;
    let data = app.execute("u1", mutation).await;
    assert!(data["updateHealthRecord"].is_null());
}

#[tokio::test]
async fn test_delete_absent_or_foreign_record_returns_false() {
    let app = TestApp::new().await;

    let added = app
        .execute_with_variables("u1", ADD_RECORD, weight_input(80.0))
        .await;
    let id = added["addHealthRecord"]["id"].as_str().unwrap().to_string();

    // another user cannot delete it, and learns nothing from trying
    let foreign = app
        .execute("u2", &format!(r#"mutation {{ deleteHealthRecord(id: "{id}") }}"#))
        .await;
    assert_eq!(foreign["deleteHealthRecord"], false);

    // a malformed id behaves like an absent one
    let garbage = app
        .execute("u1", r#"mutation { deleteHealthRecord(id: "not-a-ulid") }"#)
        .await;
    assert_eq!(garbage["deleteHealthRecord"], false);

    let owner = app
        .execute("u1", &format!(r#"mutation {{ deleteHealthRecord(id: "{id}") }}"#))
        .await;
    assert_eq!(owner["deleteHealthRecord"], true);

    let again = app
        .execute("u1", &format!(r#"mutation {{ deleteHealthRecord(id: "{id}") }}"#))
        .await;
    assert_eq!(again["deleteHealthRecord"], false);
}

#[tokio::test]
async fn test_health_summary_aggregates() {
    let app = TestApp::new().await;

    for bpm in [60.0, 70.0] {
        app.execute_with_variables("u1", ADD_RECORD, heart_rate_input(bpm))
            .await;
    }
    app.execute_with_variables("u1", ADD_RECORD, blood_pressure_input(120, 80))
        .await;
    app.execute_with_variables("u1", ADD_RECORD, blood_pressure_input(130, 86))
        .await;

    let data = app
        .execute(
            "u1",
            "{ healthSummary { totalRecords avgHeartRate avgBloodPressure lastRecordedAt } }",
        )
        .await;
    let summary = &data["healthSummary"];
    assert_eq!(summary["totalRecords"], 4);
    assert_eq!(summary["avgHeartRate"], 65.0);
    assert_eq!(summary["avgBloodPressure"], "125/83");
    assert!(summary["lastRecordedAt"].is_string());
}

#[tokio::test]
async fn test_generate_and_mark_insight_as_read() {
    let app = TestApp::new().await;

    // enough rising weight readings for a trend insight plus a recommendation
    for kg in [78.0, 79.0, 83.0, 85.0] {
        app.execute_with_variables("u1", ADD_RECORD, weight_input(kg))
            .await;
    }

    let generated = app
        .execute(
            "u1",
            "query { generateHealthInsights { id insightType title isRead } }",
        )
        .await;
    let insights = generated["generateHealthInsights"].as_array().unwrap();
    assert!(!insights.is_empty());
    assert!(insights.iter().all(|i| i["isRead"] == false));
    assert!(insights
        .iter()
        .any(|i| i["insightType"] == "RECOMMENDATION"));

    let id = insights[0]["id"].as_str().unwrap();
    let mark = format!(r#"mutation {{ markInsightAsRead(id: "{id}") {{ id isRead }} }}"#);

    let first = app.execute("u1", &mark).await;
    assert_eq!(first["markInsightAsRead"]["isRead"], true);

    // marking again is a harmless no-op
    let second = app.execute("u1", &mark).await;
    assert_eq!(second["markInsightAsRead"]["isRead"], true);

    // the stored copy reflects the flag
    let listed = app
        .execute("u1", "{ healthInsights { id isRead } }")
        .await;
    let stored = listed["healthInsights"]
        .as_array()
        .unwrap()
        .iter()
        .find(|i| i["id"] == id)
        .unwrap();
    assert_eq!(stored["isRead"], true);
}

#[tokio::test]
async fn test_nested_health_records_field() {
    let app = TestApp::new().await;

    app.execute_with_variables("u1", ADD_RECORD, heart_rate_input(66.0))
        .await;

    let data = app
        .execute(
            "u1",
            "{ me { id healthRecords(recordType: HEART_RATE) { recordType valueNumeric } } }",
        )
        .await;
    let records = data["me"]["healthRecords"].as_array().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["valueNumeric"], 66.0);
}

fn urlencoding_encode(s: &str) -> String {
    url::form_urlencoded::byte_serialize(s.as_bytes()).collect()
}
