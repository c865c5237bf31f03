//! Server configuration
//!
//! Hierarchical configuration loading: `config/default.toml`, then
//! `config/{environment}.toml`, then `HEALTHTRACK_*` environment variables
//! (`HEALTHTRACK_SERVER__PORT=8080`), then command-line overrides. Required
//! secrets are validated before the server starts; a missing or malformed
//! value aborts the process.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::PathBuf;
use url::Url;

/// Top-level server configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServerConfig {
    #[serde(default)]
    pub server: HttpServerConfig,

    #[serde(default)]
    pub identity: IdentityConfig,

    #[serde(default)]
    pub firestore: FirestoreSettings,

    #[serde(default)]
    pub gemini: GeminiSettings,

    #[serde(default)]
    pub app: AppSettings,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct HttpServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_true")]
    pub graceful_shutdown: bool,

    #[serde(default = "default_shutdown_timeout")]
    pub shutdown_timeout_seconds: u64,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    4000
}

fn default_true() -> bool {
    true
}

fn default_shutdown_timeout() -> u64 {
    30
}

impl Default for HttpServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            graceful_shutdown: default_true(),
            shutdown_timeout_seconds: default_shutdown_timeout(),
        }
    }
}

/// Identity-token verification settings
#[derive(Debug, Clone, Deserialize)]
pub struct IdentityConfig {
    /// Shared HS256 signing secret
    #[serde(default)]
    pub secret: String,

    /// Expected token issuer
    #[serde(default = "default_issuer")]
    pub issuer: String,
}

fn default_issuer() -> String {
    "healthtrack-identity".to_string()
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            secret: String::new(),
            issuer: default_issuer(),
        }
    }
}

/// Firestore connection settings
#[derive(Debug, Clone, Deserialize)]
pub struct FirestoreSettings {
    #[serde(default)]
    pub project_id: String,

    /// OAuth bearer token for the REST API
    #[serde(default)]
    pub access_token: String,

    /// Override for emulators; empty means the public endpoint
    #[serde(default)]
    pub base_url: String,

    #[serde(default = "default_database")]
    pub database: String,
}

fn default_database() -> String {
    "(default)".to_string()
}

impl Default for FirestoreSettings {
    fn default() -> Self {
        Self {
            project_id: String::new(),
            access_token: String::new(),
            base_url: String::new(),
            database: default_database(),
        }
    }
}

/// Gemini API settings
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GeminiSettings {
    #[serde(default)]
    pub api_key: String,

    /// Empty means the client default model
    #[serde(default)]
    pub model: String,

    /// Override for tests; empty means the public endpoint
    #[serde(default)]
    pub base_url: String,
}

/// Application-level settings
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppSettings {
    /// Public base URL this deployment is reachable at
    #[serde(default)]
    pub base_url: String,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default)]
    pub json_format: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json_format: false,
        }
    }
}

impl ServerConfig {
    /// Load configuration from files and environment
    pub fn load(config_dir: impl Into<PathBuf>, environment: &str) -> Result<Self, ConfigError> {
        let config_dir = config_dir.into();

        let config = Config::builder()
            .add_source(File::from(config_dir.join("default.toml")).required(false))
            .add_source(
                File::from(config_dir.join(format!("{}.toml", environment))).required(false),
            )
            .add_source(
                Environment::with_prefix("HEALTHTRACK")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Reject configurations the server cannot safely start with
    pub fn validate(&self) -> Result<(), String> {
        if self.identity.secret.is_empty() {
            return Err("identity.secret is required".to_string());
        }
        if self.identity.issuer.is_empty() {
            return Err("identity.issuer is required".to_string());
        }
        if self.firestore.project_id.is_empty() {
            return Err("firestore.project_id is required".to_string());
        }
        if self.firestore.access_token.is_empty() {
            return Err("firestore.access_token is required".to_string());
        }
        if self.gemini.api_key.is_empty() {
            return Err("gemini.api_key is required".to_string());
        }
        if self.app.base_url.is_empty() {
            return Err("app.base_url is required".to_string());
        }
        Url::parse(&self.app.base_url)
            .map_err(|e| format!("app.base_url is not a valid URL: {e}"))?;
        Ok(())
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete() -> ServerConfig {
        let mut config = ServerConfig::default();
        config.identity.secret = "secret".to_string();
        config.firestore.project_id = "healthtrack-dev".to_string();
        config.firestore.access_token = "ya29.token".to_string();
        config.gemini.api_key = "key".to_string();
        config.app.base_url = "https://api.healthtrack.example".to_string();
        config
    }

    #[test]
    fn test_defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 4000);
        assert_eq!(config.firestore.database, "(default)");
        assert_eq!(config.identity.issuer, "healthtrack-identity");
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.bind_address(), "0.0.0.0:4000");
    }

    #[test]
    fn test_complete_config_validates() {
        assert!(complete().validate().is_ok());
    }

    #[test]
    fn test_missing_secret_is_rejected() {
        let mut config = complete();
        config.identity.secret.clear();
        assert!(config.validate().unwrap_err().contains("identity.secret"));
    }

    #[test]
    fn test_malformed_base_url_is_rejected() {
        let mut config = complete();
        config.app.base_url = "not a url".to_string();
        assert!(config.validate().is_err());
    }
}
