//! Identity token verification
//!
//! Tokens are issued by an external identity provider; this service only
//! verifies them. Signing support exists so tests and local tooling can mint
//! tokens against a shared secret.

use chrono::{Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::Error as JwtError, Algorithm, DecodingKey, EncodingKey, Header,
    Validation,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Token verification configuration
#[derive(Debug, Clone)]
pub struct TokenConfig {
    /// Shared secret the identity provider signs with
    pub secret: String,

    /// Expected token issuer
    pub issuer: String,

    /// Lifetime of locally minted tokens, in seconds
    pub expiration_seconds: i64,
}

impl TokenConfig {
    pub fn new(secret: impl Into<String>, issuer: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            issuer: issuer.into(),
            expiration_seconds: 3600,
        }
    }

    pub fn with_expiration(mut self, seconds: i64) -> Self {
        self.expiration_seconds = seconds;
        self
    }

    pub fn validate(&self) -> Result<(), TokenError> {
        if self.secret.is_empty() {
            return Err(TokenError::Configuration("secret cannot be empty".into()));
        }
        if self.issuer.is_empty() {
            return Err(TokenError::Configuration("issuer cannot be empty".into()));
        }
        Ok(())
    }
}

/// Claims carried by an identity token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject, the identity provider's opaque user id
    pub sub: String,

    /// Issuer
    pub iss: String,

    /// Expiration time (Unix timestamp)
    pub exp: i64,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// User email, when the provider supplies one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    /// Application role, when the provider supplies one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

impl Claims {
    pub fn new(user_id: impl Into<String>, issuer: impl Into<String>, ttl_seconds: i64) -> Self {
        let now = Utc::now();
        Self {
            sub: user_id.into(),
            iss: issuer.into(),
            exp: (now + Duration::seconds(ttl_seconds)).timestamp(),
            iat: now.timestamp(),
            email: None,
            role: None,
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = Some(role.into());
        self
    }
}

/// Token errors
#[derive(Debug, Error)]
pub enum TokenError {
    #[error("invalid token configuration: {0}")]
    Configuration(String),

    #[error("invalid Authorization header format")]
    InvalidFormat,

    #[error("token rejected: {0}")]
    Rejected(#[from] JwtError),
}

/// Verifies and (for tests) issues HS256 identity tokens
pub struct TokenVerifier {
    config: TokenConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl TokenVerifier {
    pub fn new(config: TokenConfig) -> Result<Self, TokenError> {
        config.validate()?;

        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());

        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&config.issuer]);
        validation.validate_exp = true;
        validation.set_required_spec_claims(&["sub", "iss", "exp"]);

        Ok(Self {
            config,
            encoding_key,
            decoding_key,
            validation,
        })
    }

    pub fn issuer(&self) -> &str {
        &self.config.issuer
    }

    /// Verify a token's signature, issuer, and expiry
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation)?;
        Ok(data.claims)
    }

    /// Mint a token with the default lifetime
    pub fn issue(&self, claims: Claims) -> Result<String, TokenError> {
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(TokenError::from)
    }

    /// Mint a token for the given subject with the configured lifetime
    pub fn issue_for(&self, user_id: impl Into<String>) -> Result<String, TokenError> {
        self.issue(Claims::new(
            user_id,
            &self.config.issuer,
            self.config.expiration_seconds,
        ))
    }

    /// Extract the bearer token from an Authorization header value
    pub fn extract_bearer(header_value: &str) -> Result<&str, TokenError> {
        let parts: Vec<&str> = header_value.split_whitespace().collect();
        if parts.len() != 2 || !parts[0].eq_ignore_ascii_case("bearer") {
            return Err(TokenError::InvalidFormat);
        }
        Ok(parts[1])
    }
}
