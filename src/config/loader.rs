//! Configuration Loader
//!
//! Loads and validates configuration from TOML files matching sniper.toml structure.
//! Secrets never live in the file: the wallet key comes from `SNIPER_PRIVATE_KEY`.

use std::path::Path;
use std::time::Duration;

use ethers::types::{Address, U256};
use ethers::utils::parse_ether;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Deserialize;
use thiserror::Error;

use crate::adapters::evm::EvmChainConfig;
use crate::adapters::goplus::{GoPlusConfig, DEFAULT_API_URL};
use crate::application::{ExecutorConfig, RetryPolicy};
use crate::domain::{ExitThresholds, RuleConfig, NO_CONCENTRATION_LIMIT};

pub const PRIVATE_KEY_ENV: &str = "SNIPER_PRIVATE_KEY";
pub const WS_URL_ENV: &str = "SNIPER_WS_URL";

/// Main configuration structure matching sniper.toml
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub chain: ChainSection,
    #[serde(default)]
    pub report: ReportSection,
    #[serde(default)]
    pub rules: RuleConfig,
    pub sniper: SniperSection,
    #[serde(default)]
    pub logging: LoggingSection,
}

/// Chain endpoint and contract addresses
#[derive(Debug, Clone, Deserialize)]
pub struct ChainSection {
    /// WebSocket endpoint (subscriptions need ws/wss)
    pub ws_url: String,
    /// Uniswap-V2 style factory emitting `PairCreated`
    pub factory_address: Address,
    /// Router used for swaps and quotes
    pub router_address: Address,
    /// Wrapped native asset (WETH on mainnet)
    pub base_asset_address: Address,
}

impl ChainSection {
    /// Get WebSocket URL with environment variable override
    /// Checks SNIPER_WS_URL env var first, falls back to config value
    pub fn get_ws_url(&self) -> String {
        std::env::var(WS_URL_ENV).unwrap_or_else(|_| self.ws_url.clone())
    }

    /// Wallet private key from SNIPER_PRIVATE_KEY
    pub fn get_private_key(&self) -> Result<String, ConfigError> {
        std::env::var(PRIVATE_KEY_ENV)
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| ConfigError::ValidationError(format!("{} is not set", PRIVATE_KEY_ENV)))
    }
}

/// Token security report API section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ReportSection {
    pub api_url: String,
    pub chain_id: u64,
    /// Delay between report attempts while the token is not indexed yet
    pub retry_interval_ms: u64,
    /// Attempts before giving up on a token
    pub max_attempts: u32,
    /// Per-request HTTP timeout
    pub timeout_secs: u64,
}

impl Default for ReportSection {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            chain_id: 1,
            retry_interval_ms: 2500,
            max_attempts: 24,
            timeout_secs: 10,
        }
    }
}

/// Trade sizing, exits and deadlines
#[derive(Debug, Clone, Deserialize)]
pub struct SniperSection {
    /// Base asset spent per buy, in ether units
    pub buy_amount_eth: Decimal,
    /// Exit when value / spent >= take_profit
    pub take_profit: Decimal,
    /// Exit when value / spent <= stop_loss
    pub stop_loss: Decimal,
    /// Added to the latest block timestamp for the buy deadline
    #[serde(default = "default_buy_deadline_buffer")]
    pub buy_deadline_buffer_secs: u64,
    /// Added to wall clock when the block timestamp is unavailable
    #[serde(default = "default_fallback_deadline")]
    pub fallback_deadline_secs: u64,
    /// Sell deadline from wall clock
    #[serde(default = "default_sell_deadline")]
    pub sell_deadline_secs: u64,
    /// Stop opening new positions after a fatal execution error
    #[serde(default)]
    pub halt_on_fatal: bool,
}

fn default_buy_deadline_buffer() -> u64 {
    14
}

fn default_fallback_deadline() -> u64 {
    13
}

fn default_sell_deadline() -> u64 {
    30
}

impl SniperSection {
    pub fn buy_amount_wei(&self) -> Result<U256, ConfigError> {
        parse_ether(self.buy_amount_eth.normalize().to_string()).map_err(|e| {
            ConfigError::ValidationError(format!(
                "buy_amount_eth {} is not a valid ether amount: {}",
                self.buy_amount_eth, e
            ))
        })
    }

    pub fn exit_thresholds(&self) -> Result<ExitThresholds, ConfigError> {
        ExitThresholds::from_decimal(self.take_profit, self.stop_loss)
            .map_err(|e| ConfigError::ValidationError(e.to_string()))
    }
}

/// Logging configuration section
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSection {
    /// Log level: "trace", "debug", "info", "warn", "error"
    pub level: String,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Validation failed: {0}")]
    ValidationError(String),
}

/// Load configuration from a TOML file
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let path = shellexpand::tilde(&path.as_ref().to_string_lossy()).to_string();
    let content = std::fs::read_to_string(path)?;
    let config: Config = toml::from_str(&content)?;
    config.validate()?;
    Ok(config)
}

impl Config {
    /// Validate all configuration parameters
    pub fn validate(&self) -> Result<(), ConfigError> {
        // Chain
        if self.chain.ws_url.is_empty() {
            return Err(ConfigError::ValidationError(
                "ws_url cannot be empty".to_string(),
            ));
        }

        for (name, address) in [
            ("factory_address", self.chain.factory_address),
            ("router_address", self.chain.router_address),
            ("base_asset_address", self.chain.base_asset_address),
        ] {
            if address.is_zero() {
                return Err(ConfigError::ValidationError(format!(
                    "{} cannot be the zero address",
                    name
                )));
            }
        }

        // Report API
        if self.report.api_url.is_empty() {
            return Err(ConfigError::ValidationError(
                "api_url cannot be empty".to_string(),
            ));
        }

        if self.report.max_attempts == 0 {
            return Err(ConfigError::ValidationError(
                "max_attempts must be > 0".to_string(),
            ));
        }

        // Rules
        for (name, value) in [
            ("max_buy_tax", self.rules.max_buy_tax),
            ("max_sell_tax", self.rules.max_sell_tax),
        ] {
            if value.is_sign_negative() {
                return Err(ConfigError::ValidationError(format!(
                    "{} must be >= 0, got {}",
                    name, value
                )));
            }
        }

        if self.rules.max_top10_holders < Decimal::ZERO
            || self.rules.max_top10_holders > NO_CONCENTRATION_LIMIT
        {
            return Err(ConfigError::ValidationError(format!(
                "max_top10_holders must be 0-101, got {}",
                self.rules.max_top10_holders
            )));
        }

        // Sniper
        if self.sniper.buy_amount_eth <= dec!(0) {
            return Err(ConfigError::ValidationError(format!(
                "buy_amount_eth must be > 0, got {}",
                self.sniper.buy_amount_eth
            )));
        }

        if self.sniper.stop_loss < dec!(0) {
            return Err(ConfigError::ValidationError(format!(
                "stop_loss must be >= 0, got {}",
                self.sniper.stop_loss
            )));
        }

        if self.sniper.stop_loss >= self.sniper.take_profit {
            return Err(ConfigError::ValidationError(format!(
                "stop_loss ({}) must be below take_profit ({})",
                self.sniper.stop_loss, self.sniper.take_profit
            )));
        }

        if self.sniper.sell_deadline_secs == 0 {
            return Err(ConfigError::ValidationError(
                "sell_deadline_secs must be > 0".to_string(),
            ));
        }

        self.sniper.buy_amount_wei()?;
        Ok(())
    }

    pub fn executor_config(&self) -> ExecutorConfig {
        ExecutorConfig {
            base_asset: self.chain.base_asset_address,
            buy_deadline_buffer_secs: self.sniper.buy_deadline_buffer_secs,
            fallback_deadline_secs: self.sniper.fallback_deadline_secs,
            sell_deadline_secs: self.sniper.sell_deadline_secs,
        }
    }

    pub fn chain_config(&self) -> EvmChainConfig {
        EvmChainConfig {
            ws_url: self.chain.get_ws_url(),
            factory: self.chain.factory_address,
            router: self.chain.router_address,
        }
    }
}

impl From<&ReportSection> for RetryPolicy {
    fn from(section: &ReportSection) -> Self {
        RetryPolicy {
            interval: Duration::from_millis(section.retry_interval_ms),
            max_attempts: section.max_attempts,
        }
    }
}

impl From<&ReportSection> for GoPlusConfig {
    fn from(section: &ReportSection) -> Self {
        GoPlusConfig {
            api_url: section.api_url.clone(),
            chain_id: section.chain_id,
            timeout: Duration::from_secs(section.timeout_secs),
        }
    }
}
