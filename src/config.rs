//! Configuration file model.
//!
//! Every field has a default, so an empty or partial YAML file is valid.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tabtrail_event_log::Strictness;
use tabtrail_relay::{RelayConfig, RetryPolicy};

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub collector: CollectorSettings,
    pub relay: RelaySettings,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollectorSettings {
    pub host: String,
    pub port: u16,
    /// Reject payloads that are not page-view or duration records.
    pub strict: bool,
}

impl Default for CollectorSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            strict: false,
        }
    }
}

impl CollectorSettings {
    pub fn strictness(&self) -> Strictness {
        Strictness::from_flag(self.strict)
    }

    pub fn url(&self, path: &str) -> String {
        let host = match self.host.as_str() {
            "0.0.0.0" | "::" => "localhost",
            other => other,
        };
        format!("http://{}:{}{}", host, self.port, path)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RelaySettings {
    /// Defaults to the collector's `/log-visit` route.
    pub endpoint: Option<String>,
    pub queue_capacity: usize,
    pub request_timeout_ms: u64,
    pub max_attempts: u32,
    pub initial_backoff_ms: u64,
    pub max_backoff_ms: u64,
    pub dead_letter_capacity: usize,
}

impl Default for RelaySettings {
    fn default() -> Self {
        Self {
            endpoint: None,
            queue_capacity: 256,
            request_timeout_ms: 5_000,
            max_attempts: 1,
            initial_backoff_ms: 200,
            max_backoff_ms: 5_000,
            dead_letter_capacity: 0,
        }
    }
}

impl Config {
    pub fn relay_config(&self) -> RelayConfig {
        let relay = &self.relay;
        RelayConfig {
            endpoint: relay
                .endpoint
                .clone()
                .unwrap_or_else(|| self.collector.url("/log-visit")),
            queue_capacity: relay.queue_capacity,
            request_timeout: Duration::from_millis(relay.request_timeout_ms),
            retry: RetryPolicy {
                max_attempts: relay.max_attempts,
                initial_backoff: Duration::from_millis(relay.initial_backoff_ms),
                max_backoff: Duration::from_millis(relay.max_backoff_ms),
            },
            dead_letter_capacity: relay.dead_letter_capacity,
            ..RelayConfig::default()
        }
    }
}
