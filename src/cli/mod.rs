use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio::net::TcpListener;

use crate::api::{AppServices, build_app};
use crate::config::Config;
use crate::storage::Database;
use crate::telemetry;

/// mini-ledger - accounts and an append-only journal over HTTP
#[derive(Parser)]
#[command(name = "mini-ledger")]
#[command(about = "A minimal accounts-and-journal ledger backend")]
#[command(version)]
pub struct Cli {
    #[command(flatten)]
    pub config: Config,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Apply the schema and serve the HTTP API (default)
    Serve,

    /// Apply the schema and exit
    Migrate,
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        telemetry::init(self.config.log_format);

        match self.command.unwrap_or(Commands::Serve) {
            Commands::Serve => serve(&self.config).await,
            Commands::Migrate => {
                let db = Database::init(&self.config.database).await?;
                db.close().await;
                tracing::info!("schema is up to date");
                Ok(())
            }
        }
    }
}

async fn serve(config: &Config) -> Result<()> {
    let db = Database::init(&config.database).await?;
    let services = Arc::new(AppServices::new(db.clone()));
    let app = build_app(services, config.request_timeout());

    let addr = config.listen_addr()?;
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!("mini-ledger listening on {}", listener.local_addr()?);

    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed");

    db.close().await;
    tracing::info!("database pool closed");
    served
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to listen for ctrl-c: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to listen for SIGTERM: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("shutdown signal received");
}
