//! HTTP Ledger Client
//!
//! reqwest-based implementation: one POST to the configured base URL + path
//! with a camelCase JSON body, expecting a plain status-string response body.

use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

use super::{LedgerClient, LedgerError, LedgerInstruction};

/// Configuration for the outbound ledger endpoint
#[derive(Debug, Clone, serde::Deserialize, serde::Serialize)]
pub struct LedgerEndpointConfig {
    /// e.g. "http://localhost:8081"
    pub base_url: String,
    /// e.g. "/ledger/entry"
    pub path: String,
    /// Request timeout for the single attempt
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    10
}

impl LedgerEndpointConfig {
    pub fn url(&self) -> String {
        format!("{}{}", self.base_url, self.path)
    }
}

/// HTTP implementation of [`LedgerClient`]
pub struct HttpLedgerClient {
    client: reqwest::Client,
    url: String,
}

impl HttpLedgerClient {
    /// Build a client with the configured request timeout
    pub fn new(config: &LedgerEndpointConfig) -> Result<Self, LedgerError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| LedgerError::Transport(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            url: config.url(),
        })
    }
}

#[async_trait]
impl LedgerClient for HttpLedgerClient {
    async fn submit(&self, instruction: &LedgerInstruction) -> Result<String, LedgerError> {
        debug!(
            transfer_id = %instruction.transfer_id,
            url = %self.url,
            "Submitting transfer to ledger"
        );

        let response = self
            .client
            .post(&self.url)
            .json(instruction)
            .send()
            .await
            .map_err(|e| LedgerError::Transport(e.to_string()))?;

        let http_status = response.status();
        if !http_status.is_success() {
            return Err(LedgerError::Status(http_status.as_u16()));
        }

        let token = response
            .text()
            .await
            .map_err(|e| LedgerError::Body(e.to_string()))?;

        Ok(token.trim().to_string())
    }
}
