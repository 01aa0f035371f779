//! HTTP ingestion endpoint

use crate::config::{SinkConfig, UserAgentConfig};
use crate::model::Product;
use crate::sink::IngestEndpoint;
use crate::source::user_agent_string;
use crate::{SinkError, SinkResult};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

/// POSTs batches as a JSON array to the ingestion API
pub struct HttpIngestEndpoint {
    client: Client,
    endpoint: String,
}

impl HttpIngestEndpoint {
    /// Creates an endpoint with its own client and request timeout
    pub fn new(
        endpoint: impl Into<String>,
        timeout: Duration,
        user_agent: &UserAgentConfig,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .user_agent(user_agent_string(user_agent))
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    /// Builds the endpoint from the `[sink]` section
    pub fn from_config(
        config: &SinkConfig,
        user_agent: &UserAgentConfig,
    ) -> Result<Self, reqwest::Error> {
        Self::new(
            config.endpoint.as_str(),
            Duration::from_secs(config.timeout_secs),
            user_agent,
        )
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl IngestEndpoint for HttpIngestEndpoint {
    async fn submit(&self, products: &[Product]) -> SinkResult<()> {
        let body = serde_json::to_vec(products)?;

        let response = self
            .client
            .post(&self.endpoint)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    SinkError::Timeout
                } else {
                    SinkError::Network(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(SinkError::Rejected {
                status: status.as_u16(),
            });
        }

        tracing::debug!(
            "Ingestion endpoint accepted {} products with {}",
            products.len(),
            status
        );
        Ok(())
    }
}
