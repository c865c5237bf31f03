//! GraphQL API implementation
//!
//! Schema assembly for the health data API using async-graphql. The HTTP
//! adapter lives in [`crate::routes`]; this module only owns the schema and
//! its resolver types.

pub mod mutation;
pub mod query;
pub mod scalars;
pub mod types;

use async_graphql::{EmptySubscription, Schema};
use healthtrack_service::ServiceRegistry;
use std::sync::Arc;

pub use mutation::Mutation;
pub use query::Query;

/// GraphQL schema type
pub type AppSchema = Schema<Query, Mutation, EmptySubscription>;

/// Build the GraphQL schema with the service registry attached
pub fn build_schema(services: Arc<ServiceRegistry>) -> AppSchema {
    Schema::build(Query, Mutation, EmptySubscription)
        .data(services)
        .finish()
}
