//! Submission Gateway
//!
//! Delivers one submission to the remote API. A single request/response
//! exchange: no retries, and no timeout beyond what the transport enforces.

use crate::client::config::Config;
use crate::client::error::GatewayError;
use crate::shared::{ServerAck, SubmissionFields};
use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, warn};

/// One-shot delivery of a submission
#[async_trait]
pub trait SubmissionGateway: Send + Sync {
    async fn submit(&self, fields: &SubmissionFields) -> Result<ServerAck, GatewayError>;
}

/// Gateway that POSTs the fields as JSON and expects `{"id": <int>, ...}` back
#[derive(Debug, Clone)]
pub struct HttpGateway {
    client: Client,
    endpoint: String,
}

impl HttpGateway {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.into(),
        }
    }

    /// Gateway using the configured endpoint and request timeout
    pub fn from_config(config: &Config) -> Result<Self, GatewayError> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| GatewayError::transport(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self {
            client,
            endpoint: config.api_url().to_string(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl SubmissionGateway for HttpGateway {
    async fn submit(&self, fields: &SubmissionFields) -> Result<ServerAck, GatewayError> {
        debug!(endpoint = %self.endpoint, "posting submission");

        let response = self
            .client
            .post(&self.endpoint)
            .json(fields)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "submission request failed");
                GatewayError::transport(format!("Network error: {}", e))
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "submission rejected by server");
            return Err(GatewayError::status(status.as_u16(), body));
        }

        let body = response
            .text()
            .await
            .map_err(|e| GatewayError::transport(format!("Failed to read response: {}", e)))?;

        serde_json::from_str::<ServerAck>(&body)
            .map_err(|e| GatewayError::invalid_response(format!("{}: {}", e, body)))
    }
}
