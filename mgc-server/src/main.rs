//! mgc-server - Music genre classification service
//!
//! Accepts short audio clips, forwards them to the external classifier and keeps a
//! per-user prediction history with genre statistics.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use mgc_common::config::{ConfigOverrides, FallbackPolicy, ServiceConfig};
use mgc_server::services::PredictionClient;
use mgc_server::AppState;
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for mgc-server
///
/// Every option also has an `MGC_*` environment variable and a TOML key;
/// command-line values win.
#[derive(Parser, Debug)]
#[command(name = "mgc-server")]
#[command(about = "Music genre classification service")]
#[command(version)]
struct Args {
    /// TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Address to listen on, e.g. 127.0.0.1:5780
    #[arg(short, long)]
    bind: Option<String>,

    /// SQLite database file
    #[arg(short, long)]
    database: Option<PathBuf>,

    /// Classifier URL receiving multipart POSTs
    #[arg(long)]
    classifier_endpoint: Option<String>,

    /// Classifier request timeout in milliseconds
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// What to do when the classifier fails: substitute or surface
    #[arg(long)]
    fallback: Option<String>,

    /// Default log filter when RUST_LOG is unset
    #[arg(long)]
    log_level: Option<String>,
}

impl Args {
    fn into_overrides(self) -> Result<ConfigOverrides> {
        let fallback_policy = self
            .fallback
            .as_deref()
            .map(str::parse::<FallbackPolicy>)
            .transpose()
            .context("Invalid --fallback")?;

        Ok(ConfigOverrides {
            config_path: self.config,
            bind_address: self.bind,
            database_path: self.database,
            classifier_endpoint: self.classifier_endpoint,
            classifier_timeout_ms: self.timeout_ms,
            fallback_policy,
            log_level: self.log_level,
        })
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = ServiceConfig::resolve(&args.into_overrides()?)
        .context("Failed to resolve configuration")?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.log_level.as_str().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Starting mgc-server v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );
    info!("Database: {}", config.database_path.display());
    info!(
        "Classifier: {} (timeout {:?}, fallback {})",
        config.classifier_endpoint, config.classifier_timeout, config.fallback_policy
    );

    let db = mgc_common::db::init_database(&config.database_path)
        .await
        .context("Failed to initialize database")?;

    let classifier = PredictionClient::new(
        config.classifier_endpoint.clone(),
        config.classifier_timeout,
        config.fallback_policy,
    )
    .context("Failed to create classifier client")?;

    let app = mgc_server::build_router(AppState::new(db, classifier));

    let listener = tokio::net::TcpListener::bind(config.bind_address)
        .await
        .with_context(|| format!("Failed to bind to {}", config.bind_address))?;
    info!("Listening on http://{}", config.bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, shutting down"),
        _ = terminate => info!("Received terminate signal, shutting down"),
    }
}
