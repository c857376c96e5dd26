//! Discovery Dispatcher
//!
//! Entry point of the pipeline. Each factory `PairCreated` event spawns an
//! independent task that screens the candidate token, buys it if it passes and
//! then monitors the position until it exits.
//!
//! Key features:
//! - One task per token on a `JoinSet`, no ordering between tokens
//! - `PositionBook` enforces one pipeline per token and never re-screens a token
//! - Watch mode screens and logs without trading
//! - Optional halt of new buys after a fatal execution error

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use ethers::types::{Address, U256};
use thiserror::Error;
use tokio::sync::RwLock;
use tokio::task::{JoinError, JoinSet};
use tokio_util::sync::CancellationToken;

use super::executor::{AcquisitionExecutor, BuyFailure};
use super::monitor::{ExitReport, MonitorError, PositionMonitor};
use super::screening::{Screener, ScreeningError};
use crate::domain::{address_key, Position, PositionError, Verdict};
use crate::ports::{ChainError, ChainPort, PairCreated};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchMode {
    /// Screen, buy and monitor
    Snipe,
    /// Screen and log only
    Watch,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DispatcherConfig {
    pub base_asset: Address,
    /// Base asset spent per buy, in wei
    pub buy_amount: U256,
    pub mode: DispatchMode,
    /// Stop opening new positions after a fatal buy or sell error
    pub halt_on_fatal: bool,
}

/// Pipeline stage of a token currently being handled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackedToken {
    Screening,
    Acquiring,
    Holding,
}

#[derive(Debug, Default)]
struct BookState {
    active: HashMap<Address, TrackedToken>,
    seen: HashSet<Address>,
}

/// Tokens in flight plus every token ever claimed
#[derive(Debug, Default)]
pub struct PositionBook {
    state: RwLock<BookState>,
}

impl PositionBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check-and-insert under one write lock. `false` if the token was seen before.
    pub async fn claim(&self, token: Address) -> bool {
        let mut state = self.state.write().await;
        if !state.seen.insert(token) {
            return false;
        }
        state.active.insert(token, TrackedToken::Screening);
        true
    }

    pub async fn advance(&self, token: Address, stage: TrackedToken) {
        if let Some(current) = self.state.write().await.active.get_mut(&token) {
            *current = stage;
        }
    }

    /// Stop tracking the token. It stays in the seen set.
    pub async fn release(&self, token: Address) {
        self.state.write().await.active.remove(&token);
    }

    pub async fn stage(&self, token: Address) -> Option<TrackedToken> {
        self.state.read().await.active.get(&token).copied()
    }

    pub async fn active_count(&self) -> usize {
        self.state.read().await.active.len()
    }
}

/// How a pair notification was resolved
#[derive(Debug, Clone, PartialEq)]
pub enum TokenOutcome {
    /// Neither side of the pair is the base asset
    NoCandidate,
    Duplicate,
    /// No usable report in time, or shutdown during screening
    Unscreened(ScreeningError),
    Rejected(Verdict),
    /// Passed screening in watch mode
    Approved,
    /// Passed screening while buying is halted
    BuysHalted,
    BuyReverted(String),
    Closed(ExitReport),
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum PipelineError {
    #[error(transparent)]
    Buy(#[from] BuyFailure),

    #[error("Block subscription failed: {0}")]
    Blocks(ChainError),

    #[error(transparent)]
    Position(#[from] PositionError),

    #[error(transparent)]
    Monitor(#[from] MonitorError),
}

impl PipelineError {
    /// Errors that trip `halt_on_fatal`
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            PipelineError::Buy(BuyFailure::Fatal(_)) | PipelineError::Monitor(MonitorError::Sell(_))
        ) || self.stream_loss().is_some()
    }

    /// The block stream failed or closed under an open position
    pub fn stream_loss(&self) -> Option<ChainError> {
        match self {
            PipelineError::Blocks(e) => Some(e.clone()),
            PipelineError::Monitor(MonitorError::Subscription(reason)) => {
                Some(ChainError::Subscription(reason.clone()))
            }
            _ => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("Pair subscription closed")]
    SubscriptionClosed,

    #[error("Pair subscription failed: {0}")]
    Subscription(ChainError),
}

pub struct DiscoveryDispatcher {
    chain: Arc<dyn ChainPort>,
    screener: Arc<Screener>,
    executor: Arc<AcquisitionExecutor>,
    monitor: Arc<PositionMonitor>,
    book: PositionBook,
    config: DispatcherConfig,
    halted: AtomicBool,
}

impl DiscoveryDispatcher {
    pub fn new(
        chain: Arc<dyn ChainPort>,
        screener: Arc<Screener>,
        executor: Arc<AcquisitionExecutor>,
        monitor: Arc<PositionMonitor>,
        config: DispatcherConfig,
    ) -> Self {
        Self {
            chain,
            screener,
            executor,
            monitor,
            book: PositionBook::new(),
            config,
            halted: AtomicBool::new(false),
        }
    }

    pub fn book(&self) -> &PositionBook {
        &self.book
    }

    pub fn is_halted(&self) -> bool {
        self.halted.load(Ordering::SeqCst)
    }

    /// Consume pair events until `cancel` fires or a chain stream is lost.
    /// In-flight token tasks are cancelled and awaited before returning.
    pub async fn run(self: Arc<Self>, cancel: CancellationToken) -> Result<(), DispatchError> {
        let mut pairs = self
            .chain
            .subscribe_pairs()
            .await
            .map_err(DispatchError::Subscription)?;

        let shutdown = cancel.child_token();
        let mut tasks = JoinSet::new();
        tracing::info!("Listening for new pairs ({:?} mode)", self.config.mode);

        let result = loop {
            tokio::select! {
                biased;
                _ = shutdown.cancelled() => break Ok(()),
                event = pairs.recv() => match event {
                    Some(event) => {
                        let dispatcher = Arc::clone(&self);
                        let token_cancel = shutdown.child_token();
                        tasks.spawn(async move { dispatcher.handle_pair(event, token_cancel).await });
                    }
                    None => {
                        tracing::error!("Pair subscription closed");
                        break Err(DispatchError::SubscriptionClosed);
                    }
                },
                Some(joined) = tasks.join_next() => {
                    if let Some(lost) = stream_loss(joined) {
                        tracing::error!("Block stream lost, stopping dispatcher");
                        break Err(DispatchError::Subscription(lost));
                    }
                }
            }
        };

        shutdown.cancel();
        while let Some(joined) = tasks.join_next().await {
            stream_loss(joined);
        }
        tracing::info!("Dispatcher stopped");
        result
    }

    /// Run the full pipeline for one pair notification and log how it ended
    pub async fn handle_pair(
        &self,
        event: PairCreated,
        cancel: CancellationToken,
    ) -> Result<TokenOutcome, PipelineError> {
        let Some(token) = event.candidate(self.config.base_asset) else {
            tracing::debug!("Pair {} has no base asset side, skipping", address_key(&event.pair));
            return Ok(TokenOutcome::NoCandidate);
        };

        if !self.book.claim(token).await {
            tracing::debug!("{} already handled, ignoring pair {}", address_key(&token), address_key(&event.pair));
            return Ok(TokenOutcome::Duplicate);
        }

        tracing::info!("New pair {} for token {}", address_key(&event.pair), address_key(&token));
        let result = self.process(token, &cancel).await;
        self.book.release(token).await;

        self.log_result(token, &result);
        result
    }

    async fn process(
        &self,
        token: Address,
        cancel: &CancellationToken,
    ) -> Result<TokenOutcome, PipelineError> {
        let verdict = match self.screener.screen(token, cancel).await {
            Ok(verdict) => verdict,
            Err(e) => return Ok(TokenOutcome::Unscreened(e)),
        };
        if !verdict.safe {
            return Ok(TokenOutcome::Rejected(verdict));
        }

        if self.config.mode == DispatchMode::Watch {
            return Ok(TokenOutcome::Approved);
        }
        if self.is_halted() {
            return Ok(TokenOutcome::BuysHalted);
        }

        self.book.advance(token, TrackedToken::Acquiring).await;
        let mut position = Position::new(token, self.config.buy_amount)?;

        let filled = match self.executor.buy(token, self.config.buy_amount).await {
            Ok(filled) => filled,
            Err(BuyFailure::Reverted(reason)) => {
                position.abort()?;
                return Ok(TokenOutcome::BuyReverted(reason));
            }
            Err(e) => {
                position.abort()?;
                return Err(e.into());
            }
        };
        position.filled(filled)?;

        self.book.advance(token, TrackedToken::Holding).await;
        tracing::info!("Bought {} of {} for {} wei", filled, address_key(&token), self.config.buy_amount);

        let blocks = self
            .chain
            .subscribe_blocks()
            .await
            .map_err(PipelineError::Blocks)?;
        let report = self
            .monitor
            .run(&mut position, blocks, cancel.child_token())
            .await?;

        Ok(TokenOutcome::Closed(report))
    }

    fn log_result(&self, token: Address, result: &Result<TokenOutcome, PipelineError>) {
        let key = address_key(&token);
        match result {
            Ok(TokenOutcome::Unscreened(ScreeningError::Cancelled)) => {
                tracing::info!("{} screening cancelled", key)
            }
            Ok(TokenOutcome::Unscreened(e)) => tracing::warn!("{} skipped: {}", key, e),
            Ok(TokenOutcome::Rejected(verdict)) => {
                tracing::warn!("{} rejected: {}", key, verdict.message)
            }
            Ok(TokenOutcome::Approved) => tracing::info!("{} passed all checks (watch mode)", key),
            Ok(TokenOutcome::BuysHalted) => {
                tracing::warn!("{} passed all checks but buying is halted", key)
            }
            Ok(TokenOutcome::BuyReverted(reason)) => {
                tracing::warn!("{} buy reverted, abandoning: {}", key, reason)
            }
            Ok(TokenOutcome::Closed(report)) => tracing::info!(
                "{} position closed on {} at ratio {}",
                key,
                report.trigger,
                report.ratio
            ),
            Ok(TokenOutcome::NoCandidate | TokenOutcome::Duplicate) => {}
            Err(PipelineError::Monitor(MonitorError::Cancelled)) => {
                tracing::info!("{} monitoring stopped with position open", key)
            }
            Err(e) => {
                tracing::error!("{} pipeline failed: {}", key, e);
                if e.is_fatal() && self.config.halt_on_fatal && !self.halted.swap(true, Ordering::SeqCst) {
                    tracing::error!("Halting new buys after fatal error");
                }
            }
        }
    }
}

/// Outcomes are logged by `handle_pair`; only panics and stream loss surface here
fn stream_loss(joined: Result<Result<TokenOutcome, PipelineError>, JoinError>) -> Option<ChainError> {
    match joined {
        Ok(Err(e)) => e.stream_loss(),
        Ok(Ok(_)) => None,
        Err(e) => {
            if !e.is_cancelled() {
                tracing::error!("Token task aborted: {}", e);
            }
            None
        }
    }
}
