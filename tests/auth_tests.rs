//! Authentication and authorization integration tests

mod common;

use common::fixtures::ME;
use common::TestApp;

#[tokio::test]
async fn test_unauthenticated_request_is_rejected_before_any_store_access() {
    let app = TestApp::new().await;

    let error = app.execute_expecting_error(None, ME).await;
    assert_eq!(error["message"], "Authentication required");
    assert_eq!(error["extensions"]["code"], "UNAUTHENTICATED");
    assert_eq!(app.store.op_count(), 0);
}

#[tokio::test]
async fn test_invalid_token_degrades_to_anonymous() {
    let app = TestApp::new().await;

    let error = app
        .execute_expecting_error(Some("not.a.valid.token"), ME)
        .await;
    assert_eq!(error["extensions"]["code"], "UNAUTHENTICATED");
}

#[tokio::test]
async fn test_expired_token_degrades_to_anonymous() {
    let app = TestApp::new().await;

    let expired = app.issue(
        healthtrack_api::Claims::new("u1", common::TEST_ISSUER, -300).with_role("patient"),
    );
    let error = app.execute_expecting_error(Some(&expired), ME).await;
    assert_eq!(error["extensions"]["code"], "UNAUTHENTICATED");
}

#[tokio::test]
async fn test_valid_token_is_accepted() {
    let app = TestApp::new().await;

    let data = app.execute("u1", ME).await;
    assert_eq!(data["me"]["id"], "u1");
}

#[tokio::test]
async fn test_role_less_token_cannot_generate_insights() {
    let app = TestApp::new().await;

    let token = app.token_without_role("u1");
    let error = app
        .execute_expecting_error(
            Some(&token),
            "query { generateHealthInsights { id } }",
        )
        .await;
    assert_eq!(error["message"], "Insufficient permissions");
    assert_eq!(error["extensions"]["code"], "FORBIDDEN");
}

#[tokio::test]
async fn test_role_less_token_can_still_read_profile() {
    let app = TestApp::new().await;

    let token = app.token_without_role("u1");
    let response = app
        .graphql_post(Some(&token), &serde_json::json!({"query": ME}))
        .await;
    let body: serde_json::Value = response.json().await.unwrap();
    assert!(body.get("errors").is_none());
    assert_eq!(body["data"]["me"]["id"], "u1");
}

#[tokio::test]
async fn test_unknown_role_string_is_forbidden() {
    let app = TestApp::new().await;

    let token = app.issue(
        healthtrack_api::Claims::new("u1", common::TEST_ISSUER, 3600).with_role("superuser"),
    );
    let error = app
        .execute_expecting_error(
            Some(&token),
            "query { generateHealthInsights { id } }",
        )
        .await;
    assert_eq!(error["extensions"]["code"], "FORBIDDEN");
}
