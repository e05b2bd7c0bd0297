//! Fragments server binary.

use anyhow::{Context, Result};
use clap::Parser;
use figment::Figment;
use figment::providers::{Env, Format, Toml};
use fragments_core::config::AppConfig;
use fragments_model::Stores;
use fragments_server::{AppState, create_router};
use std::net::SocketAddr;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Fragments - a multi-tenant content store
#[derive(Parser, Debug)]
#[command(name = "fragmentsd")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(
        short,
        long,
        env = "FRAGMENTS_CONFIG",
        default_value = "config/server.toml"
    )]
    config: String,
}

fn load_config(path: &str) -> Result<AppConfig> {
    let mut figment = Figment::new();

    if std::path::Path::new(path).exists() {
        tracing::info!(config_path = %path, "Loading configuration from file");
        figment = figment.merge(Toml::file(path));
    } else {
        tracing::info!(config_path = %path, "No config file found, using defaults and environment");
    }

    let config: AppConfig = figment
        .merge(Env::prefixed("FRAGMENTS_").split("__"))
        .extract()
        .context("failed to load configuration")?;

    config
        .validate()
        .map_err(|e| anyhow::anyhow!("invalid configuration: {e}"))?;

    if config.auth.users.is_empty() {
        anyhow::bail!(
            "No users configured.\n\n\
             Add at least one [[auth.users]] entry with an email and the SHA-256 hex of the password.\n\
             See config/server.example.toml for example configuration."
        );
    }

    Ok(config)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        return;
    }
    tracing::info!("Shutdown signal received");
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Fragments v{}", env!("CARGO_PKG_VERSION"));

    let config = load_config(&args.config)?;

    fragments_server::metrics::register_metrics();
    tracing::info!("Prometheus metrics registered");

    let data = fragments_storage::from_config(&config.storage)
        .await
        .context("failed to initialize data store")?;
    data.health_check()
        .await
        .context("data store health check failed")?;
    tracing::info!(backend = data.backend_name(), "Data store initialized");

    let metadata = fragments_metadata::from_config(&config.metadata)
        .await
        .context("failed to initialize metadata store")?;
    metadata
        .health_check()
        .await
        .context("metadata store health check failed")?;
    tracing::info!(backend = metadata.backend_name(), "Metadata store initialized");

    let addr: SocketAddr = config.server.bind.parse().context("invalid bind address")?;
    let state = AppState::new(config, Stores::new(metadata, data));
    if !state.policy.allows_images() {
        tracing::info!("Image fragments disabled, accepting text types only");
    }
    tracing::info!(users = state.users.len(), "Authentication configured");

    let app = create_router(state);

    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind to {}", addr))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}
