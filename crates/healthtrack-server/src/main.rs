//! HealthTrack backend server
//!
//! Entry point wiring configuration, the Firestore store, the service layer,
//! and the GraphQL HTTP server with graceful shutdown.

mod config;
mod telemetry;

use anyhow::{bail, Context, Result};
use clap::Parser;
use healthtrack_api::{build_api_server, AuthState, TokenConfig, TokenVerifier};
use healthtrack_db::{FirestoreConfig, FirestoreStore};
use healthtrack_service::{GeminiClient, GeminiConfig, ServiceRegistry};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tracing::{info, warn};

use config::ServerConfig;

/// Command-line arguments
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration directory
    #[arg(short, long, env = "CONFIG_DIR", default_value = "config")]
    config_dir: String,

    /// Environment (development, production, etc.)
    #[arg(short, long, env = "ENVIRONMENT", default_value = "development")]
    environment: String,

    /// Server host override
    #[arg(long, env = "SERVER_HOST")]
    host: Option<String>,

    /// Server port override
    #[arg(short, long, env = "SERVER_PORT")]
    port: Option<u16>,

    /// Log level override
    #[arg(long, env = "RUST_LOG")]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    let mut config = ServerConfig::load(&args.config_dir, &args.environment)
        .context("failed to load configuration")?;

    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(log_level) = args.log_level {
        config.logging.level = log_level;
    }

    if let Err(reason) = config.validate() {
        bail!("invalid configuration: {reason}");
    }

    telemetry::init_with_config(
        telemetry::TelemetryConfig::new()
            .with_log_level(config.logging.level.clone())
            .with_json_format(config.logging.json_format),
    );

    info!("starting healthtrack server");
    info!(environment = %args.environment, address = %config.bind_address());

    let mut firestore_config = FirestoreConfig::new(
        &config.firestore.project_id,
        &config.firestore.access_token,
    )
    .with_database(&config.firestore.database);
    if !config.firestore.base_url.is_empty() {
        firestore_config = firestore_config.with_base_url(&config.firestore.base_url);
    }
    let store = Arc::new(
        FirestoreStore::new(firestore_config).context("failed to build firestore client")?,
    );

    let mut gemini_config = GeminiConfig::new(&config.gemini.api_key);
    if !config.gemini.model.is_empty() {
        gemini_config = gemini_config.with_model(&config.gemini.model);
    }
    if !config.gemini.base_url.is_empty() {
        gemini_config = gemini_config.with_base_url(&config.gemini.base_url);
    }
    let recommender =
        Arc::new(GeminiClient::new(gemini_config).context("failed to build gemini client")?);

    let services = Arc::new(ServiceRegistry::new(store, recommender));

    match services.health_check().await {
        Ok(()) => info!("document store reachable"),
        Err(e) => warn!(error = %e, "document store unreachable at startup"),
    }

    let verifier = TokenVerifier::new(TokenConfig::new(
        &config.identity.secret,
        &config.identity.issuer,
    ))
    .context("failed to build token verifier")?;

    let app = build_api_server(services, AuthState::new(verifier));

    let addr: SocketAddr = config
        .bind_address()
        .parse()
        .context("invalid bind address")?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("failed to bind server address")?;

    info!("listening on http://{addr}");

    if config.server.graceful_shutdown {
        axum::serve(listener, app.into_make_service())
            .with_graceful_shutdown(shutdown_signal(config.server.shutdown_timeout_seconds))
            .await
            .context("server error")?;
    } else {
        axum::serve(listener, app.into_make_service())
            .await
            .context("server error")?;
    }

    info!("server shutdown complete");
    Ok(())
}

/// Waits for SIGTERM or SIGINT before initiating graceful shutdown
async fn shutdown_signal(timeout_seconds: u64) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("received Ctrl+C, starting graceful shutdown"),
        _ = terminate => info!("received SIGTERM, starting graceful shutdown"),
    }

    info!("waiting up to {timeout_seconds}s for in-flight requests");
}
