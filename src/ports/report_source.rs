use async_trait::async_trait;
use ethers::types::Address;
use serde_json::Value;
use thiserror::Error;

/// Report source error type
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ReportSourceError {
    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("Rate limited by report API")]
    RateLimited,

    #[error("Report API returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Response is not JSON: {0}")]
    Decode(String),
}

/// Source of raw token security reports
///
/// Returns the response body untouched; structural checks belong to the validator.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RiskReportSource: Send + Sync {
    async fn fetch_report(&self, token: Address) -> Result<Value, ReportSourceError>;
}
