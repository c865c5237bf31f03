//! Authentication middleware
//!
//! Token verification happens once per request, before GraphQL execution.
//! Verification failure never fails the request here; unauthenticated
//! requests reach the resolvers, which decide per operation whether a user
//! is required.

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use healthtrack_core::{UserId, UserRole};
use std::sync::Arc;
use tracing::debug;

use crate::token::{Claims, TokenVerifier};

/// Verified identity attached to a request
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: UserId,
    pub email: Option<String>,
    /// Role from the token; operations that need one treat absence as
    /// insufficient permission
    pub role: Option<UserRole>,
}

impl AuthUser {
    pub fn from_claims(claims: &Claims) -> Self {
        Self {
            id: UserId::new(claims.sub.clone()),
            email: claims.email.clone(),
            // an unknown role string is treated the same as no role
            role: claims.role.as_deref().and_then(|r| r.parse().ok()),
        }
    }
}

/// Authentication state shared with the middleware
#[derive(Clone)]
pub struct AuthState {
    verifier: Arc<TokenVerifier>,
}

impl AuthState {
    pub fn new(verifier: TokenVerifier) -> Self {
        Self {
            verifier: Arc::new(verifier),
        }
    }

    pub fn verifier(&self) -> &TokenVerifier {
        &self.verifier
    }
}

/// Attach the verified user to the request when a valid bearer token is
/// present; pass the request through untouched otherwise.
pub async fn optional_auth(
    State(auth_state): State<AuthState>,
    mut request: Request,
    next: Next,
) -> Response {
    if let Some(header) = request.headers().get(AUTHORIZATION) {
        if let Ok(header_str) = header.to_str() {
            if let Ok(token) = TokenVerifier::extract_bearer(header_str) {
                match auth_state.verifier.verify(token) {
                    Ok(claims) => {
                        debug!(user = %claims.sub, "request authenticated");
                        request
                            .extensions_mut()
                            .insert(AuthUser::from_claims(&claims));
                    }
                    Err(e) => {
                        debug!(error = %e, "bearer token rejected");
                    }
                }
            }
        }
    }

    next.run(request).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::TokenConfig;
    use axum::{
        body::Body, extract::Extension, http::Request as HttpRequest, http::StatusCode,
        middleware, routing::get, Router,
    };
    use tower::ServiceExt;

    fn verifier() -> TokenVerifier {
        TokenVerifier::new(TokenConfig::new("test-secret-key", "test-issuer")).unwrap()
    }

    async fn whoami(user: Option<Extension<AuthUser>>) -> String {
        match user {
            Some(Extension(u)) => u.id.to_string(),
            None => "anonymous".to_string(),
        }
    }

    fn app(auth_state: AuthState) -> Router {
        Router::new()
            .route("/whoami", get(whoami))
            .layer(middleware::from_fn_with_state(auth_state, optional_auth))
    }

    #[tokio::test]
    async fn test_valid_token_attaches_user() {
        let verifier = verifier();
        let token = verifier.issue_for("user-1").unwrap();
        let app = app(AuthState::new(verifier));

        let request = HttpRequest::builder()
            .uri("/whoami")
            .header(AUTHORIZATION, format!("Bearer {token}"))
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), 1024).await.unwrap();
        assert_eq!(&body[..], b"user-1");
    }

    #[tokio::test]
    async fn test_invalid_token_passes_through_anonymous() {
        let app = app(AuthState::new(verifier()));

        let request = HttpRequest::builder()
            .uri("/whoami")
            .header(AUTHORIZATION, "Bearer invalid.token.here")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), 1024).await.unwrap();
        assert_eq!(&body[..], b"anonymous");
    }

    #[tokio::test]
    async fn test_missing_header_passes_through_anonymous() {
        let app = app(AuthState::new(verifier()));

        let request = HttpRequest::builder()
            .uri("/whoami")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[test]
    fn test_unknown_role_maps_to_none() {
        let claims = crate::token::Claims::new("u", "iss", 60).with_role("superuser");
        let user = AuthUser::from_claims(&claims);
        assert!(user.role.is_none());

        let claims = crate::token::Claims::new("u", "iss", 60).with_role("provider");
        let user = AuthUser::from_claims(&claims);
        assert_eq!(user.role, Some(UserRole::Provider));
    }
}
