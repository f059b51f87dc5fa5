use std::net::SocketAddr;

use anyhow::{Context, Result};
use clap::Args;
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::config::Config;
use crate::server::{build_collector_router, CollectorState};

#[derive(Args, Clone)]
pub struct ServeArgs {
    /// Interface to bind (overrides collector.host)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to listen on (overrides collector.port)
    #[arg(long)]
    pub port: Option<u16>,

    /// Reject payloads that are not page-view or duration records
    #[arg(long)]
    pub strict: bool,
}

pub async fn cmd_serve(args: ServeArgs, config: &Config) -> Result<()> {
    let mut settings = config.collector.clone();
    if let Some(host) = args.host {
        settings.host = host;
    }
    if let Some(port) = args.port {
        settings.port = port;
    }
    settings.strict |= args.strict;

    let state = CollectorState::new(settings.strictness());
    let router = build_collector_router(state);

    let listener = TcpListener::bind((settings.host.as_str(), settings.port))
        .await
        .with_context(|| {
            format!(
                "failed to bind collector on {}:{}",
                settings.host, settings.port
            )
        })?;
    let addr: SocketAddr = listener
        .local_addr()
        .context("collector listener has no local address")?;
    info!(
        %addr,
        mode = %settings.strictness(),
        "Collector running at {}",
        settings.url("")
    );
    if settings.host != "127.0.0.1" && settings.host != "localhost" {
        warn!("Collector has no authentication; do not expose this port publicly");
    }

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("collector exited unexpectedly")?;
    info!("Collector stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(?err, "failed to listen for ctrl-c; collector runs until killed");
        std::future::pending::<()>().await;
    }
}
