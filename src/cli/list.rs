use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Args;
use reqwest::Client;
use serde_json::Value;
use tracing::debug;

use crate::config::Config;

#[derive(Args, Clone)]
pub struct ListArgs {
    /// Listing URL (defaults to the configured collector's /visits)
    #[arg(long)]
    pub endpoint: Option<String>,
}

pub async fn cmd_list(args: ListArgs, config: &Config) -> Result<()> {
    let endpoint = args
        .endpoint
        .unwrap_or_else(|| config.collector.url("/visits"));
    debug!(%endpoint, "fetching collected events");

    let client = Client::builder()
        .timeout(Duration::from_millis(config.relay.request_timeout_ms))
        .build()
        .context("failed to build http client")?;
    let response = client
        .get(&endpoint)
        .send()
        .await
        .with_context(|| format!("collector unreachable at {}", endpoint))?;
    if !response.status().is_success() {
        bail!("collector answered {} for {}", response.status(), endpoint);
    }
    let events: Vec<Value> = response
        .json()
        .await
        .context("collector returned something other than a JSON array")?;

    println!("{}", serde_json::to_string_pretty(&events)?);
    eprintln!("{} event(s)", events.len());
    Ok(())
}
