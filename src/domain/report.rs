//! Token Security Report
//!
//! Typed view of a GoPlus `token_security` response. Instances are only produced by
//! [`validate`](super::report_validator::validate), so every required field is known to be
//! present with the right type. Optional risk flags are parsed leniently: anything that is
//! not a `"0"`/`"1"` string becomes `None` and is treated as "risk present" by the rules.

use std::collections::HashMap;

use ethers::types::Address;
use serde::{Deserialize, Deserializer};

/// `code` value of a successful response
pub const SUCCESS_CODE: i64 = 1;

/// `message` value of a successful response
pub const SUCCESS_MESSAGE: &str = "OK";

/// Map key used by the report for a token address (`0x` + 40 lower-case hex digits)
pub fn address_key(address: &Address) -> String {
    format!("{:#x}", address)
}

/// Validated risk report, keyed by lower-cased token address
#[derive(Debug, Clone, Deserialize)]
pub struct RiskReport {
    pub code: i64,
    pub message: String,
    result: HashMap<String, TokenSecurity>,
}

impl RiskReport {
    /// Security entry for a token, if the report covers it
    pub fn token(&self, address: &Address) -> Option<&TokenSecurity> {
        self.result.get(&address_key(address))
    }

    /// Whether the report has an entry for this token
    pub fn covers(&self, address: &Address) -> bool {
        self.token(address).is_some()
    }

    pub fn len(&self) -> usize {
        self.result.len()
    }

    pub fn is_empty(&self) -> bool {
        self.result.is_empty()
    }

    /// Upstream keys are not guaranteed to be lower-case
    pub(crate) fn normalize_keys(mut self) -> Self {
        self.result = self
            .result
            .into_iter()
            .map(|(key, entry)| (key.to_lowercase(), entry))
            .collect();
        self
    }
}

/// Security attributes for one token contract
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TokenSecurity {
    #[serde(default)]
    pub token_name: String,
    #[serde(default)]
    pub token_symbol: String,
    #[serde(default)]
    pub total_supply: String,
    #[serde(default)]
    pub holder_count: String,
    #[serde(default)]
    pub creator_address: String,
    #[serde(default)]
    pub creator_percent: String,
    #[serde(default)]
    pub owner_address: String,
    /// Number of honeypots launched by the same creator
    #[serde(default)]
    pub honeypot_with_same_creator: String,

    #[serde(default, deserialize_with = "flag")]
    pub is_open_source: Option<bool>,
    #[serde(default, deserialize_with = "flag")]
    pub is_in_dex: Option<bool>,

    /// Buy tax as a fraction of trade value ("0.05" = 5%)
    #[serde(default, deserialize_with = "text")]
    pub buy_tax: Option<String>,
    /// Sell tax as a fraction of trade value
    #[serde(default, deserialize_with = "text")]
    pub sell_tax: Option<String>,

    #[serde(default, deserialize_with = "flag")]
    pub is_mintable: Option<bool>,
    #[serde(default, deserialize_with = "flag")]
    pub is_honeypot: Option<bool>,
    #[serde(default, deserialize_with = "flag")]
    pub owner_change_balance: Option<bool>,
    #[serde(default, deserialize_with = "flag")]
    pub hidden_owner: Option<bool>,
    #[serde(default, deserialize_with = "flag")]
    pub cannot_sell_all: Option<bool>,
    /// Trading tax can be modified by the owner
    #[serde(default, deserialize_with = "flag")]
    pub slippage_modifiable: Option<bool>,
    #[serde(default, deserialize_with = "flag")]
    pub transfer_pausable: Option<bool>,
    #[serde(default, deserialize_with = "flag")]
    pub is_proxy: Option<bool>,
    #[serde(default, deserialize_with = "flag")]
    pub can_take_back_ownership: Option<bool>,

    // Informational only, no rule reads these
    #[serde(default, deserialize_with = "flag")]
    pub is_blacklisted: Option<bool>,
    #[serde(default, deserialize_with = "flag")]
    pub is_whitelisted: Option<bool>,
    #[serde(default, deserialize_with = "flag")]
    pub is_anti_whale: Option<bool>,
    #[serde(default, deserialize_with = "flag")]
    pub trading_cooldown: Option<bool>,
    #[serde(default, deserialize_with = "flag")]
    pub selfdestruct: Option<bool>,

    #[serde(default)]
    pub dex: Vec<DexLiquidity>,
    /// Top token holders, largest first
    #[serde(default)]
    pub holders: Vec<HolderRecord>,
    /// Top LP token holders
    #[serde(default)]
    pub lp_holders: Vec<HolderRecord>,
}

/// Liquidity listing on one DEX
#[derive(Debug, Clone, Deserialize)]
pub struct DexLiquidity {
    pub name: String,
    /// Liquidity in USD
    pub liquidity: String,
    #[serde(default)]
    pub pair: Option<String>,
}

/// Token or LP holder entry
#[derive(Debug, Clone, Deserialize)]
pub struct HolderRecord {
    pub address: String,
    pub balance: String,
    /// Share of supply as a fraction ("0.12" = 12%)
    pub percent: String,
    pub tag: String,
    pub is_contract: i64,
    pub is_locked: i64,
    pub locked_detail: Vec<LockDetail>,
}

impl HolderRecord {
    pub fn is_locked(&self) -> bool {
        self.is_locked == 1
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LockDetail {
    pub amount: String,
    pub end_time: String,
    pub opt_time: String,
}

/// `"1"` → true, `"0"` → false, anything else → unknown
fn flag<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value.as_ref().and_then(|v| v.as_str()) {
        Some("1") => Some(true),
        Some("0") => Some(false),
        _ => None,
    })
}

fn text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| v.as_str().map(str::to_string)))
}
