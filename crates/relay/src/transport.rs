use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use url::Url;

use tabtrail_core_types::ActivityEvent;

use crate::errors::RelayError;

/// Collector acknowledgement. Every field is optional; older collectors
/// answer with only `{"success": true}`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct DeliveryAck {
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub total: Option<u64>,
}

/// One delivery attempt to the collector.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn deliver(&self, event: &ActivityEvent) -> Result<DeliveryAck, RelayError>;
}

/// JSON-over-HTTP transport posting each event to the collector endpoint.
#[derive(Clone, Debug)]
pub struct HttpTransport {
    client: Client,
    endpoint: Url,
}

impl HttpTransport {
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self, RelayError> {
        let endpoint = Url::parse(endpoint)
            .map_err(|err| RelayError::Config(format!("endpoint {endpoint:?}: {err}")))?;
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| RelayError::Config(err.to_string()))?;
        Ok(Self { client, endpoint })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn deliver(&self, event: &ActivityEvent) -> Result<DeliveryAck, RelayError> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .json(event)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(RelayError::Status(status.as_u16()));
        }
        let ack = response.json::<DeliveryAck>().await?;
        Ok(ack)
    }
}
