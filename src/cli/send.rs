use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use clap::Args;
use tokio::time::timeout;
use tracing::info;

use tabtrail_relay::{EventRelay, HttpTransport, RelayOutcome};
use tabtrail_tracker::{PageObserver, StaticPage, SystemClock};

use crate::config::Config;

#[derive(Args, Clone)]
pub struct SendArgs {
    /// Page URL to report
    #[arg(long)]
    pub url: String,

    /// Document title to report
    #[arg(long, default_value = "")]
    pub title: String,

    /// Collector record URL (overrides relay.endpoint)
    #[arg(long)]
    pub endpoint: Option<String>,
}

pub async fn cmd_send(args: SendArgs, config: &Config) -> Result<()> {
    let mut relay_config = config.relay_config();
    if let Some(endpoint) = args.endpoint {
        relay_config.endpoint = endpoint;
    }

    let transport = HttpTransport::new(&relay_config.endpoint, relay_config.request_timeout)
        .context("invalid relay endpoint")?;
    let relay = Arc::new(EventRelay::spawn(&relay_config, Arc::new(transport)));
    let mut outcomes = relay.subscribe();

    let observer = PageObserver::new(Arc::new(SystemClock), relay.clone());
    let event = observer
        .on_page_load(&StaticPage::new(args.url.as_str(), args.title))
        .ok_or_else(|| anyhow!("{} is not an absolute URL", args.url))?;
    info!(url = %event.url, domain = %event.domain, "page view queued");

    let budget = outcome_budget(&relay_config);
    let outcome = timeout(budget, outcomes.recv())
        .await
        .context("relay produced no outcome in time")?
        .context("relay outcome channel closed")?;
    relay.shutdown().await;

    println!("{}", serde_json::to_string_pretty(&outcome)?);
    match outcome {
        RelayOutcome::Delivered { .. } => Ok(()),
        _ => Err(anyhow!("event was not delivered")),
    }
}

fn outcome_budget(config: &tabtrail_relay::RelayConfig) -> Duration {
    let attempts = config.retry.max_attempts.max(1);
    let per_attempt = config.request_timeout + config.retry.max_backoff;
    per_attempt.saturating_mul(attempts) + Duration::from_secs(1)
}
