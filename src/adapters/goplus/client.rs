//! GoPlus Client
//!
//! One GET per call. Retrying until the token is indexed is the screener's job, so
//! this client only classifies the failure.

use std::time::Duration;

use async_trait::async_trait;
use ethers::types::Address;
use reqwest::{Client, StatusCode};
use serde_json::Value;

use crate::domain::address_key;
use crate::ports::{ReportSourceError, RiskReportSource};

pub const DEFAULT_API_URL: &str = "https://api.gopluslabs.io";

/// Configuration for the GoPlusClient
#[derive(Debug, Clone)]
pub struct GoPlusConfig {
    /// API base URL, without trailing path
    pub api_url: String,
    /// Chain id used in the request path
    pub chain_id: u64,
    /// Request timeout
    pub timeout: Duration,
}

impl Default for GoPlusConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            chain_id: 1,
            timeout: Duration::from_secs(10),
        }
    }
}

impl GoPlusConfig {
    pub fn for_chain(chain_id: u64) -> Self {
        Self {
            chain_id,
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone)]
pub struct GoPlusClient {
    config: GoPlusConfig,
    http: Client,
}

impl GoPlusClient {
    pub fn with_config(config: GoPlusConfig) -> Result<Self, ReportSourceError> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ReportSourceError::Http(e.to_string()))?;

        Ok(Self { config, http })
    }

    fn report_url(&self, token: &Address) -> String {
        format!(
            "{}/api/v1/token_security/{}?contract_addresses={}",
            self.config.api_url.trim_end_matches('/'),
            self.config.chain_id,
            address_key(token)
        )
    }
}

#[async_trait]
impl RiskReportSource for GoPlusClient {
    async fn fetch_report(&self, token: Address) -> Result<Value, ReportSourceError> {
        let url = self.report_url(&token);
        tracing::debug!("GET {}", url);

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| ReportSourceError::Http(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(ReportSourceError::RateLimited);
        }
        if !status.is_success() {
            return Err(ReportSourceError::Status {
                status: status.as_u16(),
                body: response.text().await.unwrap_or_default(),
            });
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| ReportSourceError::Decode(e.to_string()))
    }
}
