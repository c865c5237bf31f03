//! HTTP adapter for the GraphQL API
//!
//! One route, three methods. The adapter accepts POST with a JSON body and
//! GET with query parameters, executes the schema exactly once per inbound
//! request, and answers OPTIONS preflights without touching the schema.
//! Failures of the adapter itself (malformed body or variables, missing
//! query) produce a fixed 500 envelope; the raw detail only ever reaches the
//! logs.

use async_graphql::Variables;
use axum::{
    body::Bytes,
    extract::{RawQuery, State},
    http::{
        header::{
            ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS,
            ACCESS_CONTROL_ALLOW_ORIGIN,
        },
        HeaderMap, HeaderName, HeaderValue, StatusCode,
    },
    response::{IntoResponse, Response},
    routing::get,
    Extension, Json, Router,
};
use healthtrack_service::ServiceRegistry;
use serde::Deserialize;
use std::sync::Arc;
use tracing::error;

use crate::auth::AuthUser;
use crate::context::RequestContext;
use crate::error::ErrorEnvelope;
use crate::graphql::{build_schema, AppSchema};

pub const GRAPHQL_PATH: &str = "/api/graphql";

const VERSION_HEADER: HeaderName = HeaderName::from_static("x-healthtrack-version");

/// Shared router state
#[derive(Clone)]
pub struct AppState {
    pub schema: AppSchema,
    pub services: Arc<ServiceRegistry>,
}

impl AppState {
    pub fn new(services: Arc<ServiceRegistry>) -> Self {
        Self {
            schema: build_schema(services.clone()),
            services,
        }
    }
}

/// Build the router with the GraphQL and health routes
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route(
            GRAPHQL_PATH,
            get(graphql_get).post(graphql_post).options(graphql_preflight),
        )
        .with_state(state)
}

/// The decoded wire form of a GraphQL request
#[derive(Debug, Deserialize)]
struct GraphqlPayload {
    query: Option<String>,
    #[serde(default)]
    variables: Option<serde_json::Value>,
    #[serde(default, rename = "operationName")]
    operation_name: Option<String>,
}

async fn health_check(State(state): State<AppState>) -> Response {
    match state.services.health_check().await {
        Ok(()) => (
            StatusCode::OK,
            Json(serde_json::json!({"status": "ok", "version": env!("CARGO_PKG_VERSION")})),
        )
            .into_response(),
        Err(e) => {
            error!(error = %e, "health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(serde_json::json!({"status": "unavailable"})),
            )
                .into_response()
        }
    }
}

async fn graphql_post(
    State(state): State<AppState>,
    auth_user: Option<Extension<AuthUser>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let payload: GraphqlPayload = match serde_json::from_slice(&body) {
        Ok(payload) => payload,
        Err(e) => {
            error!(error = %e, "malformed graphql request body");
            return adapter_failure();
        }
    };

    execute(state, auth_user.map(|Extension(u)| u), headers, payload).await
}

async fn graphql_get(
    State(state): State<AppState>,
    auth_user: Option<Extension<AuthUser>>,
    headers: HeaderMap,
    RawQuery(query_string): RawQuery,
) -> Response {
    let mut payload = GraphqlPayload {
        query: None,
        variables: None,
        operation_name: None,
    };

    for (key, value) in url::form_urlencoded::parse(query_string.unwrap_or_default().as_bytes()) {
        match key.as_ref() {
            "query" => payload.query = Some(value.into_owned()),
            "variables" => match serde_json::from_str(&value) {
                Ok(parsed) => payload.variables = Some(parsed),
                Err(e) => {
                    error!(error = %e, "malformed variables query parameter");
                    return adapter_failure();
                }
            },
            "operationName" => payload.operation_name = Some(value.into_owned()),
            _ => {}
        }
    }

    execute(state, auth_user.map(|Extension(u)| u), headers, payload).await
}

/// Preflight response, produced without schema execution
async fn graphql_preflight() -> Response {
    with_api_headers(StatusCode::OK.into_response())
}

async fn execute(
    state: AppState,
    user: Option<AuthUser>,
    headers: HeaderMap,
    payload: GraphqlPayload,
) -> Response {
    let Some(query) = payload.query else {
        error!("graphql request without a query");
        return adapter_failure();
    };

    let mut request = async_graphql::Request::new(query);
    if let Some(variables) = payload.variables {
        if !variables.is_object() && !variables.is_null() {
            error!("graphql variables must be an object");
            return adapter_failure();
        }
        request = request.variables(Variables::from_json(variables));
    }
    if let Some(operation_name) = payload.operation_name {
        request = request.operation_name(operation_name);
    }
    request = request.data(RequestContext::new(user, &headers));

    let response = state.schema.execute(request).await;
    match serde_json::to_value(&response) {
        Ok(body) => with_api_headers((StatusCode::OK, Json(body)).into_response()),
        Err(e) => {
            error!(error = %e, "failed to serialize graphql response");
            adapter_failure()
        }
    }
}

fn adapter_failure() -> Response {
    with_api_headers(
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorEnvelope::internal()),
        )
            .into_response(),
    )
}

fn with_api_headers(mut response: Response) -> Response {
    let headers = response.headers_mut();
    headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    headers.insert(
        ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static("GET, POST, OPTIONS"),
    );
    headers.insert(
        ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static("content-type, authorization"),
    );
    headers.insert(
        VERSION_HEADER,
        HeaderValue::from_static(env!("CARGO_PKG_VERSION")),
    );
    response
}
