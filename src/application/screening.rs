//! Token Screening
//!
//! Fetch → validate → evaluate for one token. The report API lags behind pair
//! creation, so fetching retries on a fixed interval until a valid report that
//! covers the token arrives or the attempt budget runs out.

use std::sync::Arc;
use std::time::Duration;

use ethers::types::Address;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::domain::{address_key, validate, RiskReport, SafetyEngine, Verdict};
use crate::ports::RiskReportSource;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub interval: Duration,
    pub max_attempts: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(2500),
            max_attempts: 24,
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ScreeningError {
    #[error("No usable report after {attempts} attempts")]
    TimedOut { attempts: u32 },
    #[error("Screening cancelled")]
    Cancelled,
}

pub struct Screener {
    source: Arc<dyn RiskReportSource>,
    engine: SafetyEngine,
    retry: RetryPolicy,
}

impl Screener {
    pub fn new(source: Arc<dyn RiskReportSource>, engine: SafetyEngine, retry: RetryPolicy) -> Self {
        Self {
            source,
            engine,
            retry,
        }
    }

    pub fn engine(&self) -> &SafetyEngine {
        &self.engine
    }

    /// Fetch until a structurally valid report covering `token` arrives
    pub async fn fetch_report(
        &self,
        token: Address,
        cancel: &CancellationToken,
    ) -> Result<RiskReport, ScreeningError> {
        let key = address_key(&token);
        let max = self.retry.max_attempts;

        for attempt in 1..=max {
            if cancel.is_cancelled() {
                return Err(ScreeningError::Cancelled);
            }

            match self.source.fetch_report(token).await {
                Ok(raw) => match validate(raw) {
                    Ok(report) if report.covers(&token) => return Ok(report),
                    Ok(_) => tracing::debug!("{} not indexed yet ({}/{})", key, attempt, max),
                    Err(e) => tracing::debug!("Invalid report for {}: {} ({}/{})", key, e, attempt, max),
                },
                Err(e) => tracing::debug!("Report fetch for {} failed: {} ({}/{})", key, e, attempt, max),
            }

            if attempt < max {
                tokio::select! {
                    _ = cancel.cancelled() => return Err(ScreeningError::Cancelled),
                    _ = tokio::time::sleep(self.retry.interval) => {}
                }
            }
        }

        tracing::warn!("Gave up on report for {} after {} attempts", key, max);
        Err(ScreeningError::TimedOut { attempts: max })
    }

    /// Fetch the report and run the rule set
    pub async fn screen(
        &self,
        token: Address,
        cancel: &CancellationToken,
    ) -> Result<Verdict, ScreeningError> {
        let report = self.fetch_report(token, cancel).await?;
        Ok(self.engine.evaluate(&token, &report))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::report_validator::fixtures::{entry, report, report_with, TOKEN};
    use crate::domain::{RuleConfig, RuleName};
    use crate::ports::report_source::MockRiskReportSource;
    use crate::ports::ReportSourceError;
    use serde_json::json;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn token() -> Address {
        TOKEN.parse().unwrap()
    }

    fn fast_retry(max_attempts: u32) -> RetryPolicy {
        RetryPolicy {
            interval: Duration::from_millis(1),
            max_attempts,
        }
    }

    fn screener(source: MockRiskReportSource, max_attempts: u32) -> Screener {
        Screener::new(
            Arc::new(source),
            SafetyEngine::from_config(&RuleConfig::default()),
            fast_retry(max_attempts),
        )
    }

    #[tokio::test]
    async fn test_valid_report_first_try() {
        let mut source = MockRiskReportSource::new();
        source
            .expect_fetch_report()
            .times(1)
            .returning(|_| Ok(report()));

        let verdict = screener(source, 5)
            .screen(token(), &CancellationToken::new())
            .await
            .unwrap();
        assert!(verdict.safe);
    }

    #[tokio::test]
    async fn test_retries_until_token_indexed() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();

        let mut source = MockRiskReportSource::new();
        source.expect_fetch_report().returning(move |_| {
            match counter.fetch_add(1, Ordering::SeqCst) {
                0 => Err(ReportSourceError::RateLimited),
                1 => Ok(json!({ "code": 1, "message": "OK", "result": {} })),
                2 => Ok(json!({ "code": 1, "message": "OK", "result": { TOKEN: { "token_name": "partial" } } })),
                _ => Ok(report()),
            }
        });

        let report = screener(source, 10)
            .fetch_report(token(), &CancellationToken::new())
            .await
            .unwrap();

        assert!(report.covers(&token()));
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_times_out_after_budget() {
        let mut source = MockRiskReportSource::new();
        source
            .expect_fetch_report()
            .times(3)
            .returning(|_| Ok(json!({ "code": 1, "message": "OK", "result": {} })));

        let result = screener(source, 3)
            .screen(token(), &CancellationToken::new())
            .await;
        assert_eq!(result, Err(ScreeningError::TimedOut { attempts: 3 }));
    }

    #[tokio::test]
    async fn test_invalid_report_never_evaluated() {
        // Would fail the honeypot rule if it reached the engine
        let mut bad = entry();
        bad["is_honeypot"] = json!("1");
        bad.as_object_mut().unwrap().remove("holders");

        let mut source = MockRiskReportSource::new();
        source
            .expect_fetch_report()
            .times(2)
            .returning(move |_| Ok(report_with(bad.clone())));

        let result = screener(source, 2)
            .screen(token(), &CancellationToken::new())
            .await;
        assert_eq!(result, Err(ScreeningError::TimedOut { attempts: 2 }));
    }

    #[tokio::test]
    async fn test_rejection_verdict() {
        let mut risky = entry();
        risky["is_honeypot"] = json!("1");

        let mut source = MockRiskReportSource::new();
        source
            .expect_fetch_report()
            .returning(move |_| Ok(report_with(risky.clone())));

        let verdict = screener(source, 1)
            .screen(token(), &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(verdict.failing_rule, Some(RuleName::NotHoneypot));
    }

    #[tokio::test]
    async fn test_cancelled_before_fetch() {
        let mut source = MockRiskReportSource::new();
        source.expect_fetch_report().never();

        let cancel = CancellationToken::new();
        cancel.cancel();

        let result = screener(source, 5).screen(token(), &cancel).await;
        assert_eq!(result, Err(ScreeningError::Cancelled));
    }
}
