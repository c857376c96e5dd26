use async_trait::async_trait;
use ethers::types::{Address, U256};
use thiserror::Error;
use tokio::sync::{broadcast, mpsc};

/// Chain error type
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ChainError {
    #[error("Transaction reverted: {}", .reason.as_deref().unwrap_or("no reason"))]
    Reverted { reason: Option<String> },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Subscription error: {0}")]
    Subscription(String),

    #[error("Signing error: {0}")]
    Signing(String),

    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),
}

/// Factory `PairCreated` notification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PairCreated {
    pub token0: Address,
    pub token1: Address,
    pub pair: Address,
}

impl PairCreated {
    /// The side of the pair that is not `base`, if exactly one side is
    pub fn candidate(&self, base: Address) -> Option<Address> {
        match (self.token0 == base, self.token1 == base) {
            (true, false) => Some(self.token1),
            (false, true) => Some(self.token0),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockTick {
    pub number: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockInfo {
    pub number: u64,
    /// Unix seconds, `None` when the node did not return it
    pub timestamp: Option<u64>,
}

/// Chain port trait: factory events, block stream and V2 router calls
#[async_trait]
pub trait ChainPort: Send + Sync {
    /// Stream of new pairs from the factory
    async fn subscribe_pairs(&self) -> Result<mpsc::Receiver<PairCreated>, ChainError>;

    /// New receiver on the shared block stream
    async fn subscribe_blocks(&self) -> Result<broadcast::Receiver<BlockTick>, ChainError>;

    async fn latest_block(&self) -> Result<BlockInfo, ChainError>;

    /// Router `swapExactETHForTokens`, returns the swap amounts
    async fn swap_exact_eth_for_tokens(
        &self,
        amount_out_min: U256,
        path: Vec<Address>,
        recipient: Address,
        deadline: U256,
        value: U256,
    ) -> Result<Vec<U256>, ChainError>;

    /// Router `swapExactTokensForETH`, returns the swap amounts
    async fn swap_exact_tokens_for_eth(
        &self,
        amount_in: U256,
        amount_out_min: U256,
        path: Vec<Address>,
        recipient: Address,
        deadline: U256,
    ) -> Result<Vec<U256>, ChainError>;

    /// Router `getAmountsOut` quote, no trade
    async fn get_amounts_out(
        &self,
        amount_in: U256,
        path: Vec<Address>,
    ) -> Result<Vec<U256>, ChainError>;

    fn wallet_address(&self) -> Address;
}
