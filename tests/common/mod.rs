//! Shared integration-test harness
//!
//! Boots the full API server over an in-memory store on a random port and
//! talks to it over real HTTP.

#![allow(dead_code)]

use healthtrack_api::{build_api_server, AuthState, Claims, TokenConfig, TokenVerifier};
use healthtrack_db::MemoryStore;
use healthtrack_service::{ServiceRegistry, StaticRecommendationClient};
use std::sync::Arc;
use tokio::net::TcpListener;

pub mod fixtures;

pub const TEST_ISSUER: &str = "test-issuer";
const TEST_SECRET: &str = "test-secret-key-for-integration-tests";

/// A running server instance under test
pub struct TestApp {
    pub address: String,
    pub store: Arc<MemoryStore>,
    pub verifier: Arc<TokenVerifier>,
}

impl TestApp {
    pub async fn new() -> Self {
        let store = Arc::new(MemoryStore::new());
        let services = Arc::new(ServiceRegistry::new(
            store.clone(),
            Arc::new(StaticRecommendationClient::default()),
        ));

        let verifier = Arc::new(
            TokenVerifier::new(TokenConfig::new(TEST_SECRET, TEST_ISSUER))
                .expect("failed to build verifier"),
        );
        let auth_verifier = TokenVerifier::new(TokenConfig::new(TEST_SECRET, TEST_ISSUER))
            .expect("failed to build verifier");

        let app = build_api_server(services, AuthState::new(auth_verifier));

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind random port");
        let address = listener.local_addr().expect("failed to get local address");

        tokio::spawn(async move {
            axum::serve(listener, app)
                .await
                .expect("test server failed");
        });

        Self {
            address: format!("http://{}", address),
            store,
            verifier,
        }
    }

    pub fn graphql_url(&self) -> String {
        format!("{}/api/graphql", self.address)
    }

    pub fn client(&self) -> reqwest::Client {
        reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(5))
            .build()
            .expect("failed to build client")
    }

    /// Token with a patient role, the common case
    pub fn token(&self, user_id: &str) -> String {
        self.issue(
            Claims::new(user_id, TEST_ISSUER, 3600)
                .with_email(format!("{user_id}@example.com"))
                .with_role("patient"),
        )
    }

    /// Token whose claims carry no role at all
    pub fn token_without_role(&self, user_id: &str) -> String {
        self.issue(Claims::new(user_id, TEST_ISSUER, 3600).with_email(format!("{user_id}@example.com")))
    }

    pub fn issue(&self, claims: Claims) -> String {
        self.verifier.issue(claims).expect("failed to issue token")
    }

    /// POST a GraphQL request, optionally authenticated
    pub async fn graphql_post(
        &self,
        token: Option<&str>,
        body: &serde_json::Value,
    ) -> reqwest::Response {
        let mut request = self.client().post(self.graphql_url()).json(body);
        if let Some(token) = token {
            request = request.header("Authorization", format!("Bearer {token}"));
        }
        request.send().await.expect("request failed")
    }

    /// Execute a query as `user_id` and return the `data` value, panicking on
    /// any GraphQL error
    pub async fn execute(&self, user_id: &str, query: &str) -> serde_json::Value {
        self.execute_with_variables(user_id, query, serde_json::json!({})).await
    }

    pub async fn execute_with_variables(
        &self,
        user_id: &str,
        query: &str,
        variables: serde_json::Value,
    ) -> serde_json::Value {
        let token = self.token(user_id);
        let response = self
            .graphql_post(
                Some(&token),
                &serde_json::json!({"query": query, "variables": variables}),
            )
            .await;
        assert_eq!(response.status(), reqwest::StatusCode::OK);
        let body: serde_json::Value = response.json().await.expect("invalid json body");
        assert!(
            body.get("errors").is_none(),
            "unexpected graphql errors: {}",
            body["errors"]
        );
        body["data"].clone()
    }

    /// Execute a query and return the first error's extensions code
    pub async fn execute_expecting_error(
        &self,
        token: Option<&str>,
        query: &str,
    ) -> serde_json::Value {
        let response = self
            .graphql_post(token, &serde_json::json!({"query": query}))
            .await;
        assert_eq!(response.status(), reqwest::StatusCode::OK);
        let body: serde_json::Value = response.json().await.expect("invalid json body");
        assert!(body["errors"].is_array(), "expected errors, got: {body}");
        body["errors"][0].clone()
    }
}
