//! Position Monitor
//!
//! Quotes the held amount on every new block and exits once the value ratio
//! crosses take-profit or stop-loss. The exit is claimed on the position and the
//! block subscription is cancelled before the sell is sent, so a later tick can
//! never produce a second sell.

use std::sync::Arc;

use ethers::types::{Address, U256};
use thiserror::Error;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio_util::sync::CancellationToken;

use super::executor::{AcquisitionExecutor, SellFailure};
use crate::domain::{address_key, ExitThresholds, ExitTrigger, Position, PositionError, Ratio};
use crate::ports::{BlockTick, ChainPort};

#[derive(Debug, Error, Clone, PartialEq)]
pub enum MonitorError {
    #[error("Block stream lost: {0}")]
    Subscription(String),
    #[error("Monitoring cancelled")]
    Cancelled,
    #[error(transparent)]
    Position(#[from] PositionError),
    #[error(transparent)]
    Sell(#[from] SellFailure),
}

/// How a position was closed
#[derive(Debug, Clone, PartialEq)]
pub struct ExitReport {
    pub trigger: ExitTrigger,
    pub ratio: Ratio,
    pub block: u64,
    /// Base asset received from the sell
    pub received: U256,
}

pub struct PositionMonitor {
    chain: Arc<dyn ChainPort>,
    executor: Arc<AcquisitionExecutor>,
    thresholds: ExitThresholds,
}

impl PositionMonitor {
    pub fn new(
        chain: Arc<dyn ChainPort>,
        executor: Arc<AcquisitionExecutor>,
        thresholds: ExitThresholds,
    ) -> Self {
        Self {
            chain,
            executor,
            thresholds,
        }
    }

    /// Watch a `Holding` position until it exits. `cancel` is cancelled on exit.
    pub async fn run(
        &self,
        position: &mut Position,
        mut blocks: broadcast::Receiver<BlockTick>,
        cancel: CancellationToken,
    ) -> Result<ExitReport, MonitorError> {
        let key = address_key(&position.token);
        let path = vec![position.token, self.executor.base_asset()];

        let (trigger, ratio, block) = loop {
            let received = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(MonitorError::Cancelled),
                received = blocks.recv() => received,
            };

            let tick = match received {
                Ok(tick) => tick,
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!("{} monitor lagged, skipped {} blocks", key, skipped);
                    continue;
                }
                Err(RecvError::Closed) => {
                    return Err(MonitorError::Subscription("block stream closed".to_string()))
                }
            };

            if let Some((trigger, ratio)) = self.check(position, &path, tick).await {
                break (trigger, ratio, tick.number);
            }
        };

        position.begin_exit()?;
        cancel.cancel();
        drop(blocks);

        tracing::info!("{} hit {} at ratio {} (block {}), selling", key, trigger, ratio, block);
        let received = self.executor.sell(position.token, position.amount_held).await?;
        position.close()?;

        tracing::info!("{} closed, received {} wei", key, received);
        Ok(ExitReport {
            trigger,
            ratio,
            block,
            received,
        })
    }

    /// Quote the position; `None` keeps holding
    async fn check(
        &self,
        position: &Position,
        path: &[Address],
        tick: BlockTick,
    ) -> Option<(ExitTrigger, Ratio)> {
        let key = address_key(&position.token);

        let amounts = match self.chain.get_amounts_out(position.amount_held, path.to_vec()).await {
            Ok(amounts) => amounts,
            Err(e) => {
                tracing::warn!("Quote for {} failed at block {}: {}", key, tick.number, e);
                return None;
            }
        };
        let Some(value) = amounts.get(1).copied() else {
            tracing::warn!("Quote for {} returned {} amounts", key, amounts.len());
            return None;
        };

        let ratio = match position.ratio(value) {
            Ok(ratio) => ratio,
            Err(e) => {
                tracing::warn!("Cannot value {}: {}", key, e);
                return None;
            }
        };

        tracing::info!("{} block {}: worth {} wei, ratio {}", key, tick.number, value, ratio);
        self.thresholds.exit_trigger(ratio).map(|trigger| (trigger, ratio))
    }
}
