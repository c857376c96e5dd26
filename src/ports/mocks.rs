//! Recording test doubles for the ports
//!
//! Responses are scripted up front; every call is recorded so tests can assert on
//! exactly what the pipeline asked the chain or report API to do.

use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use ethers::types::{Address, U256};
use serde_json::Value;
use tokio::sync::{broadcast, mpsc};

use super::chain::{BlockInfo, BlockTick, ChainError, ChainPort, PairCreated};
use super::report_source::{ReportSourceError, RiskReportSource};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Recorded router swap call
#[derive(Debug, Clone, PartialEq)]
pub struct SwapCall {
    /// ETH value for buys, token amount for sells
    pub amount_in: U256,
    pub amount_out_min: U256,
    pub path: Vec<Address>,
    pub recipient: Address,
    pub deadline: U256,
}

/// Mock chain that replays scripted events and swap results
#[derive(Debug)]
pub struct MockChain {
    wallet: Address,
    latest_block: Mutex<Result<BlockInfo, ChainError>>,
    pairs: Mutex<Vec<PairCreated>>,
    keep_pairs_open: bool,
    pair_senders: Mutex<Vec<mpsc::Sender<PairCreated>>>,
    ticks: Mutex<Vec<BlockTick>>,
    keep_blocks_open: bool,
    block_senders: Mutex<Vec<broadcast::Sender<BlockTick>>>,
    quotes: Mutex<VecDeque<Result<U256, ChainError>>>,
    buy_responses: Mutex<VecDeque<Result<Vec<U256>, ChainError>>>,
    sell_responses: Mutex<VecDeque<Result<Vec<U256>, ChainError>>>,
    buys: Mutex<Vec<SwapCall>>,
    sells: Mutex<Vec<SwapCall>>,
    quote_calls: Mutex<Vec<(U256, Vec<Address>)>>,
}

impl Default for MockChain {
    fn default() -> Self {
        Self::new()
    }
}

impl MockChain {
    pub fn new() -> Self {
        Self {
            wallet: Address::repeat_byte(0xaa),
            latest_block: Mutex::new(Ok(BlockInfo {
                number: 100,
                timestamp: Some(1_700_000_000),
            })),
            pairs: Mutex::new(Vec::new()),
            keep_pairs_open: false,
            pair_senders: Mutex::new(Vec::new()),
            ticks: Mutex::new(Vec::new()),
            keep_blocks_open: false,
            block_senders: Mutex::new(Vec::new()),
            quotes: Mutex::new(VecDeque::new()),
            buy_responses: Mutex::new(VecDeque::new()),
            sell_responses: Mutex::new(VecDeque::new()),
            buys: Mutex::new(Vec::new()),
            sells: Mutex::new(Vec::new()),
            quote_calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_latest_block(self, block: Result<BlockInfo, ChainError>) -> Self {
        *lock(&self.latest_block) = block;
        self
    }

    /// Pairs delivered on `subscribe_pairs`; the stream closes after the last one
    pub fn with_pairs(self, pairs: Vec<PairCreated>) -> Self {
        *lock(&self.pairs) = pairs;
        self
    }

    /// Keep the pair stream open after the scripted pairs instead of closing it
    pub fn with_open_pair_stream(mut self) -> Self {
        self.keep_pairs_open = true;
        self
    }

    /// Ticks delivered to every block subscriber, numbered from 1
    pub fn with_ticks(self, count: u64) -> Self {
        *lock(&self.ticks) = (1..=count).map(|number| BlockTick { number }).collect();
        self
    }

    /// Keep block streams open after the scripted ticks instead of closing them
    pub fn with_open_block_stream(mut self) -> Self {
        self.keep_blocks_open = true;
        self
    }

    /// Base-asset value returned by successive `get_amounts_out` calls
    pub fn with_quotes(self, quotes: Vec<Result<U256, ChainError>>) -> Self {
        lock(&self.quotes).extend(quotes);
        self
    }

    pub fn with_buy_response(self, response: Result<Vec<U256>, ChainError>) -> Self {
        lock(&self.buy_responses).push_back(response);
        self
    }

    pub fn with_sell_response(self, response: Result<Vec<U256>, ChainError>) -> Self {
        lock(&self.sell_responses).push_back(response);
        self
    }

    pub fn wallet(&self) -> Address {
        self.wallet
    }

    pub fn get_buys(&self) -> Vec<SwapCall> {
        lock(&self.buys).clone()
    }

    pub fn get_sells(&self) -> Vec<SwapCall> {
        lock(&self.sells).clone()
    }

    pub fn get_quote_calls(&self) -> Vec<(U256, Vec<Address>)> {
        lock(&self.quote_calls).clone()
    }
}

#[async_trait]
impl ChainPort for MockChain {
    async fn subscribe_pairs(&self) -> Result<mpsc::Receiver<PairCreated>, ChainError> {
        let pairs = std::mem::take(&mut *lock(&self.pairs));
        let (tx, rx) = mpsc::channel(pairs.len().max(1));
        for pair in pairs {
            tx.try_send(pair)
                .map_err(|e| ChainError::Subscription(e.to_string()))?;
        }
        if self.keep_pairs_open {
            lock(&self.pair_senders).push(tx);
        }
        Ok(rx)
    }

    async fn subscribe_blocks(&self) -> Result<broadcast::Receiver<BlockTick>, ChainError> {
        let ticks = lock(&self.ticks).clone();
        let (tx, rx) = broadcast::channel(ticks.len().max(16));
        for tick in ticks {
            tx.send(tick)
                .map_err(|e| ChainError::Subscription(e.to_string()))?;
        }
        if self.keep_blocks_open {
            lock(&self.block_senders).push(tx);
        }
        Ok(rx)
    }

    async fn latest_block(&self) -> Result<BlockInfo, ChainError> {
        lock(&self.latest_block).clone()
    }

    async fn swap_exact_eth_for_tokens(
        &self,
        amount_out_min: U256,
        path: Vec<Address>,
        recipient: Address,
        deadline: U256,
        value: U256,
    ) -> Result<Vec<U256>, ChainError> {
        lock(&self.buys).push(SwapCall {
            amount_in: value,
            amount_out_min,
            path,
            recipient,
            deadline,
        });
        lock(&self.buy_responses)
            .pop_front()
            .unwrap_or_else(|| Err(ChainError::UnexpectedResponse("no buy scripted".into())))
    }

    async fn swap_exact_tokens_for_eth(
        &self,
        amount_in: U256,
        amount_out_min: U256,
        path: Vec<Address>,
        recipient: Address,
        deadline: U256,
    ) -> Result<Vec<U256>, ChainError> {
        lock(&self.sells).push(SwapCall {
            amount_in,
            amount_out_min,
            path,
            recipient,
            deadline,
        });
        lock(&self.sell_responses)
            .pop_front()
            .unwrap_or_else(|| Ok(vec![amount_in, U256::zero()]))
    }

    async fn get_amounts_out(
        &self,
        amount_in: U256,
        path: Vec<Address>,
    ) -> Result<Vec<U256>, ChainError> {
        lock(&self.quote_calls).push((amount_in, path));
        lock(&self.quotes)
            .pop_front()
            .unwrap_or_else(|| Err(ChainError::UnexpectedResponse("no quote scripted".into())))
            .map(|value| vec![amount_in, value])
    }

    fn wallet_address(&self) -> Address {
        self.wallet
    }
}

/// Mock report source with per-token response scripts.
/// The last scripted response for a token repeats forever.
#[derive(Debug, Default)]
pub struct MockReportSource {
    responses: Mutex<HashMap<Address, VecDeque<Result<Value, ReportSourceError>>>>,
    calls: Mutex<Vec<Address>>,
}

impl MockReportSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_response(self, token: Address, response: Result<Value, ReportSourceError>) -> Self {
        lock(&self.responses)
            .entry(token)
            .or_default()
            .push_back(response);
        self
    }

    pub fn get_calls(&self) -> Vec<Address> {
        lock(&self.calls).clone()
    }

    pub fn call_count(&self, token: Address) -> usize {
        lock(&self.calls).iter().filter(|t| **t == token).count()
    }
}

#[async_trait]
impl RiskReportSource for MockReportSource {
    async fn fetch_report(&self, token: Address) -> Result<Value, ReportSourceError> {
        lock(&self.calls).push(token);

        let mut responses = lock(&self.responses);
        match responses.get_mut(&token) {
            Some(script) if script.len() > 1 => script
                .pop_front()
                .unwrap_or_else(|| Err(ReportSourceError::Http("empty script".into()))),
            Some(script) => script
                .front()
                .cloned()
                .unwrap_or_else(|| Err(ReportSourceError::Http("empty script".into()))),
            None => Err(ReportSourceError::Http("no response scripted".into())),
        }
    }
}
