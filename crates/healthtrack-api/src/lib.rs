//! HTTP and GraphQL layer for the HealthTrack backend
//!
//! This crate owns everything between the wire and the service layer:
//!
//! - **graphql**: schema, resolvers, scalar and wrapper types
//! - **routes**: the hand-rolled GraphQL HTTP adapter and health route
//! - **auth** / **token**: bearer-token verification middleware
//! - **context**: per-request context the resolvers authorize against
//! - **middleware**: tracing and request-id layers

pub mod auth;
pub mod context;
pub mod error;
pub mod graphql;
pub mod middleware;
pub mod routes;
pub mod token;

pub use auth::{optional_auth, AuthState, AuthUser};
pub use context::{client_ip, RequestContext};
pub use error::{ErrorEnvelope, BAD_USER_INPUT, FORBIDDEN, INTERNAL_ERROR, SERVICE_UNAVAILABLE, UNAUTHENTICATED};
pub use graphql::{build_schema, AppSchema, Mutation, Query};
pub use middleware::{trace_layer, UuidRequestIdGenerator};
pub use routes::{build_router, AppState, GRAPHQL_PATH};
pub use token::{Claims, TokenConfig, TokenError, TokenVerifier};

use axum::middleware::from_fn_with_state;
use axum::Router;
use healthtrack_service::ServiceRegistry;
use std::sync::Arc;
use tower_http::request_id::{PropagateRequestIdLayer, SetRequestIdLayer};

/// Build the complete API server with middleware applied
pub fn build_api_server(services: Arc<ServiceRegistry>, auth_state: AuthState) -> Router {
    let state = AppState::new(services);

    build_router(state)
        .layer(from_fn_with_state(auth_state, optional_auth))
        .layer(trace_layer())
        .layer(SetRequestIdLayer::x_request_id(
            UuidRequestIdGenerator::default(),
        ))
        .layer(PropagateRequestIdLayer::x_request_id())
}
