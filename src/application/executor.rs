//! Acquisition Executor
//!
//! Router swaps for entering and exiting positions. Both directions use a zero
//! minimum output: fills are accepted at any price and only the deadline bounds
//! how stale the trade can get.

use std::sync::Arc;

use ethers::types::{Address, U256};
use thiserror::Error;

use crate::domain::address_key;
use crate::ports::{BlockInfo, ChainError, ChainPort};

/// Router revert reasons that mean "too late or too little", not "broken"
const RECOVERABLE_REVERTS: &[&str] = &["EXPIRED", "INSUFFICIENT_OUTPUT_AMOUNT"];

#[derive(Debug, Clone, PartialEq)]
pub struct ExecutorConfig {
    pub base_asset: Address,
    pub buy_deadline_buffer_secs: u64,
    pub fallback_deadline_secs: u64,
    pub sell_deadline_secs: u64,
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum BuyFailure {
    /// Deadline or output condition not met at inclusion, abandon the token
    #[error("Buy reverted: {0}")]
    Reverted(String),
    #[error("Buy failed: {0}")]
    Fatal(ChainError),
}

impl BuyFailure {
    pub fn is_fatal(&self) -> bool {
        matches!(self, BuyFailure::Fatal(_))
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum SellFailure {
    #[error("Sell failed: {0}")]
    Chain(ChainError),
    #[error("Sell returned {0} amounts")]
    MissingAmount(usize),
}

/// Split buy errors into recoverable reverts and everything else
pub fn classify_buy_error(error: ChainError) -> BuyFailure {
    match &error {
        ChainError::Reverted { reason: None } => BuyFailure::Reverted("no reason given".to_string()),
        ChainError::Reverted {
            reason: Some(reason),
        } if RECOVERABLE_REVERTS.iter().any(|r| reason.contains(r)) => {
            BuyFailure::Reverted(reason.clone())
        }
        _ => BuyFailure::Fatal(error),
    }
}

pub struct AcquisitionExecutor {
    chain: Arc<dyn ChainPort>,
    config: ExecutorConfig,
}

impl AcquisitionExecutor {
    pub fn new(chain: Arc<dyn ChainPort>, config: ExecutorConfig) -> Self {
        Self { chain, config }
    }

    pub fn base_asset(&self) -> Address {
        self.config.base_asset
    }

    /// Spend `amount` of base asset on `token`, returning the token amount received
    pub async fn buy(&self, token: Address, amount: U256) -> Result<U256, BuyFailure> {
        let deadline = self.buy_deadline().await;
        let path = vec![self.config.base_asset, token];

        tracing::info!("Buying {} with {} wei (deadline {})", address_key(&token), amount, deadline);

        let amounts = self
            .chain
            .swap_exact_eth_for_tokens(
                U256::zero(),
                path,
                self.chain.wallet_address(),
                deadline,
                amount,
            )
            .await
            .map_err(classify_buy_error)?;

        amounts.get(1).copied().ok_or_else(|| {
            BuyFailure::Fatal(ChainError::UnexpectedResponse(format!(
                "swap returned {} amounts",
                amounts.len()
            )))
        })
    }

    /// Sell all of `amount`, returning the base asset received
    pub async fn sell(&self, token: Address, amount: U256) -> Result<U256, SellFailure> {
        let deadline = wall_clock_deadline(self.config.sell_deadline_secs);
        let path = vec![token, self.config.base_asset];

        tracing::info!("Selling {} of {} (deadline {})", amount, address_key(&token), deadline);

        let amounts = self
            .chain
            .swap_exact_tokens_for_eth(
                amount,
                U256::zero(),
                path,
                self.chain.wallet_address(),
                deadline,
            )
            .await
            .map_err(SellFailure::Chain)?;

        amounts
            .get(1)
            .copied()
            .ok_or(SellFailure::MissingAmount(amounts.len()))
    }

    /// Latest block time plus buffer, or wall clock plus fallback
    async fn buy_deadline(&self) -> U256 {
        match self.chain.latest_block().await {
            Ok(BlockInfo {
                timestamp: Some(timestamp),
                ..
            }) => U256::from(timestamp.saturating_add(self.config.buy_deadline_buffer_secs)),
            Ok(_) => wall_clock_deadline(self.config.fallback_deadline_secs),
            Err(e) => {
                tracing::warn!("Latest block unavailable, using wall clock deadline: {}", e);
                wall_clock_deadline(self.config.fallback_deadline_secs)
            }
        }
    }
}

fn wall_clock_deadline(offset_secs: u64) -> U256 {
    let now = chrono::Utc::now().timestamp().max(0) as u64;
    U256::from(now.saturating_add(offset_secs))
}
