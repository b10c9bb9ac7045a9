//! Serve command implementation

use crate::api;
use crate::cache::PriceCache;
use crate::config::Config;
use crate::scheduler::Scheduler;
use crate::source::{FiatRateClient, OracleClient};
use anyhow::Context;
use clap::Args;
use std::sync::Arc;
use tokio::net::TcpListener;

#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Override the HTTP listener port
    #[arg(short, long)]
    pub port: Option<u16>,
}

impl ServeArgs {
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        if config.fiat.client_id.is_empty() {
            tracing::warn!("No fiat API client id configured (FIAT_CLIENT_ID); exchange rate requests will be rejected");
        }

        let cache = Arc::new(PriceCache::new());
        let oracle = Arc::new(OracleClient::new(config.oracle.clone())?);
        let fiat = Arc::new(FiatRateClient::new(config.fiat.clone())?);

        let scheduler = Scheduler::new(cache.clone())
            .with_job(oracle, config.oracle.refresh_interval())
            .with_job(fiat, config.fiat.refresh_interval())
            .start();

        let port = self.port.unwrap_or(config.server.port);
        let addr = format!("{}:{}", config.server.host, port);
        let listener = TcpListener::bind(&addr)
            .await
            .with_context(|| format!("Failed to bind to {}", addr))?;

        tracing::info!(addr = %addr, "Oracle API webserver started");

        let result = api::serve(listener, cache, shutdown_signal()).await;
        scheduler.shutdown();

        tracing::info!("Oracle API webserver stopped");
        result
    }
}

/// Resolves on Ctrl-C, or SIGTERM on Unix
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Ctrl-C received"),
        _ = terminate => tracing::info!("SIGTERM received"),
    }
    tracing::info!("Shutting down");
}
