//! Per-request GraphQL context
//!
//! One `RequestContext` is built for every GraphQL request and injected into
//! the execution data. Resolvers pull their authorization decisions from it.

use async_graphql::Context;
use axum::http::HeaderMap;
use chrono::{DateTime, Utc};
use healthtrack_core::UserRole;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::error::{forbidden, unauthenticated};

const UNKNOWN: &str = "unknown";

/// Request-scoped data available to every resolver
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// Verified caller, absent for anonymous requests
    pub user: Option<AuthUser>,

    /// Best-effort client address
    pub ip: String,

    pub user_agent: String,

    /// When the request entered GraphQL execution
    pub timestamp: DateTime<Utc>,

    /// Correlates the log lines of one request
    pub session_id: Uuid,
}

impl RequestContext {
    pub fn new(user: Option<AuthUser>, headers: &HeaderMap) -> Self {
        let ctx = Self {
            user,
            ip: client_ip(headers),
            user_agent: header_str(headers, "user-agent"),
            timestamp: Utc::now(),
            session_id: Uuid::new_v4(),
        };

        // request audit line, kept out of release builds
        #[cfg(debug_assertions)]
        tracing::debug!(
            session = %ctx.session_id,
            user = ctx.user.as_ref().map(|u| u.id.to_string()),
            ip = %ctx.ip,
            user_agent = %ctx.user_agent,
            "graphql request context"
        );

        ctx
    }

    /// The authenticated caller, or an UNAUTHENTICATED error
    pub fn require_auth(&self) -> async_graphql::Result<&AuthUser> {
        self.user.as_ref().ok_or_else(unauthenticated)
    }

    /// The authenticated caller if their role is in `allowed`; a missing or
    /// unmapped role is FORBIDDEN, not an error distinct from a wrong role.
    pub fn require_role(&self, allowed: &[UserRole]) -> async_graphql::Result<&AuthUser> {
        let user = self.require_auth()?;
        match user.role {
            Some(role) if allowed.contains(&role) => Ok(user),
            _ => Err(forbidden()),
        }
    }
}

/// Fetch the request context out of GraphQL execution data
pub fn request_context<'a>(ctx: &Context<'a>) -> async_graphql::Result<&'a RequestContext> {
    ctx.data::<RequestContext>()
}

fn header_str(headers: &HeaderMap, name: &str) -> String {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or(UNKNOWN)
        .to_string()
}

/// Client address resolution: first x-forwarded-for entry, then x-real-ip,
/// then "unknown". The socket address is not consulted; this service always
/// sits behind a proxy in deployment.
pub fn client_ip(headers: &HeaderMap) -> String {
    if let Some(forwarded) = headers.get("x-forwarded-for").and_then(|v| v.to_str().ok()) {
        if let Some(first) = forwarded.split(',').next() {
            let first = first.trim();
            if !first.is_empty() {
                return first.to_string();
            }
        }
    }
    header_str(headers, "x-real-ip")
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use healthtrack_core::UserId;

    fn headers(pairs: &[(&str, &str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(
                axum::http::HeaderName::from_bytes(name.as_bytes()).unwrap(),
                HeaderValue::from_str(value).unwrap(),
            );
        }
        map
    }

    fn user_with_role(role: Option<UserRole>) -> AuthUser {
        AuthUser {
            id: UserId::from("u1"),
            email: None,
            role,
        }
    }

    #[test]
    fn test_client_ip_prefers_first_forwarded_entry() {
        let headers = headers(&[
            ("x-forwarded-for", "203.0.113.7, 10.0.0.1"),
            ("x-real-ip", "10.0.0.2"),
        ]);
        assert_eq!(client_ip(&headers), "203.0.113.7");
    }

    #[test]
    fn test_client_ip_falls_back_to_real_ip() {
        let headers = headers(&[("x-real-ip", "10.0.0.2")]);
        assert_eq!(client_ip(&headers), "10.0.0.2");
    }

    #[test]
    fn test_client_ip_unknown_without_headers() {
        assert_eq!(client_ip(&HeaderMap::new()), "unknown");
    }

    #[test]
    fn test_user_agent_defaults_to_unknown() {
        let ctx = RequestContext::new(None, &HeaderMap::new());
        assert_eq!(ctx.user_agent, "unknown");
        assert_eq!(ctx.ip, "unknown");
    }

    #[test]
    fn test_require_auth_without_user_fails() {
        let ctx = RequestContext::new(None, &HeaderMap::new());
        assert!(ctx.require_auth().is_err());
    }

    #[test]
    fn test_require_role_without_role_is_forbidden() {
        let ctx = RequestContext::new(Some(user_with_role(None)), &HeaderMap::new());
        assert!(ctx.require_role(&[UserRole::Patient]).is_err());
    }

    #[test]
    fn test_require_role_with_allowed_role_succeeds() {
        let ctx = RequestContext::new(
            Some(user_with_role(Some(UserRole::Provider))),
            &HeaderMap::new(),
        );
        assert!(ctx
            .require_role(&[UserRole::Patient, UserRole::Provider])
            .is_ok());
    }
}
