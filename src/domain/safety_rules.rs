//! Safety Rule Engine
//!
//! Turns a validated [`RiskReport`] into an accept/reject [`Verdict`]. The rule set is
//! built once from [`RuleConfig`] and evaluated in a fixed order, stopping at the first
//! failing rule.
//!
//! Unknown data counts against the token: a toggle that is on fails when its report
//! field is missing or malformed, and a tax that does not parse fails its threshold.

use std::fmt;
use std::str::FromStr;

use ethers::types::Address;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::report::{address_key, HolderRecord, RiskReport, TokenSecurity};

/// Concentration threshold that disables the top-10 holder check
pub const NO_CONCENTRATION_LIMIT: Decimal = dec!(101);

/// Number of holders summed by the concentration check
pub const TOP_HOLDER_COUNT: usize = 10;

/// Verdict message when every rule passes
pub const ALL_CHECKS_PASSED: &str = "all checks passed";

/// Operator policy: a toggle or threshold for every rule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleConfig {
    /// Require verified (open source) contract code
    pub check_open_source: bool,
    /// Maximum buy tax as a fraction (0.25 = 25%), exclusive
    pub max_buy_tax: Decimal,
    /// Maximum sell tax as a fraction, exclusive
    pub max_sell_tax: Decimal,
    pub check_is_mintable: bool,
    /// Maximum combined top-10 holder share in percent, inclusive. 101 disables.
    pub max_top10_holders: Decimal,
    pub check_is_honeypot: bool,
    pub check_lp_locked: bool,
    pub check_owner_can_change_balance: bool,
    pub check_hidden_owner: bool,
    pub check_cannot_sell_all: bool,
    pub check_modifiable_tax: bool,
    pub check_pausable_transfer: bool,
    pub check_is_proxy: bool,
    pub check_can_take_back_ownership: bool,
}

impl Default for RuleConfig {
    fn default() -> Self {
        Self {
            check_open_source: true,
            max_buy_tax: dec!(0.25),
            max_sell_tax: dec!(0.25),
            check_is_mintable: true,
            max_top10_holders: dec!(15),
            check_is_honeypot: true,
            check_lp_locked: true,
            check_owner_can_change_balance: true,
            check_hidden_owner: true,
            check_cannot_sell_all: true,
            check_modifiable_tax: true,
            check_pausable_transfer: true,
            check_is_proxy: true,
            check_can_take_back_ownership: true,
        }
    }
}

/// Rule identifier, in evaluation order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleName {
    OpenSource,
    MaxBuyTax,
    MaxSellTax,
    NonMintable,
    MaxTop10Holders,
    NotHoneypot,
    LpLocked,
    OwnerCannotChangeBalance,
    NoHiddenOwner,
    CanSellAll,
    TaxNotModifiable,
    TransferNotPausable,
    NotProxy,
    OwnershipNotReclaimable,
}

impl RuleName {
    pub const ALL: [RuleName; 14] = [
        RuleName::OpenSource,
        RuleName::MaxBuyTax,
        RuleName::MaxSellTax,
        RuleName::NonMintable,
        RuleName::MaxTop10Holders,
        RuleName::NotHoneypot,
        RuleName::LpLocked,
        RuleName::OwnerCannotChangeBalance,
        RuleName::NoHiddenOwner,
        RuleName::CanSellAll,
        RuleName::TaxNotModifiable,
        RuleName::TransferNotPausable,
        RuleName::NotProxy,
        RuleName::OwnershipNotReclaimable,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RuleName::OpenSource => "open_source",
            RuleName::MaxBuyTax => "max_buy_tax",
            RuleName::MaxSellTax => "max_sell_tax",
            RuleName::NonMintable => "non_mintable",
            RuleName::MaxTop10Holders => "max_top10_holders",
            RuleName::NotHoneypot => "not_honeypot",
            RuleName::LpLocked => "lp_locked",
            RuleName::OwnerCannotChangeBalance => "owner_cannot_change_balance",
            RuleName::NoHiddenOwner => "no_hidden_owner",
            RuleName::CanSellAll => "can_sell_all",
            RuleName::TaxNotModifiable => "tax_not_modifiable",
            RuleName::TransferNotPausable => "transfer_not_pausable",
            RuleName::NotProxy => "not_proxy",
            RuleName::OwnershipNotReclaimable => "ownership_not_reclaimable",
        }
    }

    /// Operator-facing reason shown when this rule rejects a token
    pub fn failure_message(&self) -> &'static str {
        match self {
            RuleName::OpenSource => "Contract is not open source",
            RuleName::MaxBuyTax => "Buy tax exceeds maximum",
            RuleName::MaxSellTax => "Sell tax exceeds maximum",
            RuleName::NonMintable => "Mint function exists",
            RuleName::MaxTop10Holders => "Top ten holders own too much",
            RuleName::NotHoneypot => "Token contains honeypot code",
            RuleName::LpLocked => "LP is not locked",
            RuleName::OwnerCannotChangeBalance => "Owner can change balance",
            RuleName::NoHiddenOwner => "Token has hidden owner",
            RuleName::CanSellAll => "Not all of the token can be sold",
            RuleName::TaxNotModifiable => "Token has modifiable tax",
            RuleName::TransferNotPausable => "Transfer is pausable",
            RuleName::NotProxy => "Token has proxy contract",
            RuleName::OwnershipNotReclaimable => "Token ownership can be taken back",
        }
    }
}

impl fmt::Display for RuleName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A rule together with its configured condition
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SafetyRule {
    OpenSource { enabled: bool },
    MaxBuyTax { max: Decimal },
    MaxSellTax { max: Decimal },
    NonMintable { enabled: bool },
    MaxTop10Holders { max_percent: Decimal },
    NotHoneypot { enabled: bool },
    LpLocked { enabled: bool },
    OwnerCannotChangeBalance { enabled: bool },
    NoHiddenOwner { enabled: bool },
    CanSellAll { enabled: bool },
    TaxNotModifiable { enabled: bool },
    TransferNotPausable { enabled: bool },
    NotProxy { enabled: bool },
    OwnershipNotReclaimable { enabled: bool },
}

impl SafetyRule {
    pub fn name(&self) -> RuleName {
        match self {
            SafetyRule::OpenSource { .. } => RuleName::OpenSource,
            SafetyRule::MaxBuyTax { .. } => RuleName::MaxBuyTax,
            SafetyRule::MaxSellTax { .. } => RuleName::MaxSellTax,
            SafetyRule::NonMintable { .. } => RuleName::NonMintable,
            SafetyRule::MaxTop10Holders { .. } => RuleName::MaxTop10Holders,
            SafetyRule::NotHoneypot { .. } => RuleName::NotHoneypot,
            SafetyRule::LpLocked { .. } => RuleName::LpLocked,
            SafetyRule::OwnerCannotChangeBalance { .. } => RuleName::OwnerCannotChangeBalance,
            SafetyRule::NoHiddenOwner { .. } => RuleName::NoHiddenOwner,
            SafetyRule::CanSellAll { .. } => RuleName::CanSellAll,
            SafetyRule::TaxNotModifiable { .. } => RuleName::TaxNotModifiable,
            SafetyRule::TransferNotPausable { .. } => RuleName::TransferNotPausable,
            SafetyRule::NotProxy { .. } => RuleName::NotProxy,
            SafetyRule::OwnershipNotReclaimable { .. } => RuleName::OwnershipNotReclaimable,
        }
    }

    /// False when the configuration turns the check off. Tax limits are always on.
    pub fn is_active(&self) -> bool {
        match *self {
            SafetyRule::MaxBuyTax { .. } | SafetyRule::MaxSellTax { .. } => true,
            SafetyRule::MaxTop10Holders { max_percent } => max_percent != NO_CONCENTRATION_LIMIT,
            SafetyRule::OpenSource { enabled }
            | SafetyRule::NonMintable { enabled }
            | SafetyRule::NotHoneypot { enabled }
            | SafetyRule::LpLocked { enabled }
            | SafetyRule::OwnerCannotChangeBalance { enabled }
            | SafetyRule::NoHiddenOwner { enabled }
            | SafetyRule::CanSellAll { enabled }
            | SafetyRule::TaxNotModifiable { enabled }
            | SafetyRule::TransferNotPausable { enabled }
            | SafetyRule::NotProxy { enabled }
            | SafetyRule::OwnershipNotReclaimable { enabled } => enabled,
        }
    }

    /// Whether the token passes this rule
    pub fn passes(&self, security: &TokenSecurity) -> bool {
        match *self {
            SafetyRule::OpenSource { enabled } => {
                !enabled || security.is_open_source == Some(true)
            }
            SafetyRule::MaxBuyTax { max } => tax_below(security.buy_tax.as_deref(), max),
            SafetyRule::MaxSellTax { max } => tax_below(security.sell_tax.as_deref(), max),
            SafetyRule::NonMintable { enabled } => risk_absent(enabled, security.is_mintable),
            SafetyRule::MaxTop10Holders { max_percent } => {
                max_percent == NO_CONCENTRATION_LIMIT
                    || top_holder_percent(&security.holders)
                        .map_or(false, |total| total <= max_percent)
            }
            SafetyRule::NotHoneypot { enabled } => risk_absent(enabled, security.is_honeypot),
            SafetyRule::LpLocked { enabled } => {
                !enabled || security.lp_holders.iter().all(HolderRecord::is_locked)
            }
            SafetyRule::OwnerCannotChangeBalance { enabled } => {
                risk_absent(enabled, security.owner_change_balance)
            }
            SafetyRule::NoHiddenOwner { enabled } => risk_absent(enabled, security.hidden_owner),
            SafetyRule::CanSellAll { enabled } => risk_absent(enabled, security.cannot_sell_all),
            SafetyRule::TaxNotModifiable { enabled } => {
                risk_absent(enabled, security.slippage_modifiable)
            }
            SafetyRule::TransferNotPausable { enabled } => {
                risk_absent(enabled, security.transfer_pausable)
            }
            SafetyRule::NotProxy { enabled } => risk_absent(enabled, security.is_proxy),
            SafetyRule::OwnershipNotReclaimable { enabled } => {
                risk_absent(enabled, security.can_take_back_ownership)
            }
        }
    }
}

/// Flag must be explicitly "0" when the check is on
fn risk_absent(enabled: bool, flag: Option<bool>) -> bool {
    !enabled || flag == Some(false)
}

fn tax_below(tax: Option<&str>, max: Decimal) -> bool {
    tax.and_then(|t| Decimal::from_str(t.trim()).ok())
        .map_or(false, |tax| tax < max)
}

/// Sum of the top holders' shares in percent, `None` if any share is unparsable
fn top_holder_percent(holders: &[HolderRecord]) -> Option<Decimal> {
    holders
        .iter()
        .take(TOP_HOLDER_COUNT)
        .try_fold(Decimal::ZERO, |total, holder| {
            let share = Decimal::from_str(holder.percent.trim()).ok()?;
            total.checked_add(share.checked_mul(dec!(100))?)
        })
}

/// Ordered, immutable rule registry
#[derive(Debug, Clone, PartialEq)]
pub struct RuleSet {
    rules: Vec<SafetyRule>,
}

impl RuleSet {
    pub fn from_config(config: &RuleConfig) -> Self {
        let rules = vec![
            SafetyRule::OpenSource { enabled: config.check_open_source },
            SafetyRule::MaxBuyTax { max: config.max_buy_tax },
            SafetyRule::MaxSellTax { max: config.max_sell_tax },
            SafetyRule::NonMintable { enabled: config.check_is_mintable },
            SafetyRule::MaxTop10Holders { max_percent: config.max_top10_holders },
            SafetyRule::NotHoneypot { enabled: config.check_is_honeypot },
            SafetyRule::LpLocked { enabled: config.check_lp_locked },
            SafetyRule::OwnerCannotChangeBalance {
                enabled: config.check_owner_can_change_balance,
            },
            SafetyRule::NoHiddenOwner { enabled: config.check_hidden_owner },
            SafetyRule::CanSellAll { enabled: config.check_cannot_sell_all },
            SafetyRule::TaxNotModifiable { enabled: config.check_modifiable_tax },
            SafetyRule::TransferNotPausable { enabled: config.check_pausable_transfer },
            SafetyRule::NotProxy { enabled: config.check_is_proxy },
            SafetyRule::OwnershipNotReclaimable {
                enabled: config.check_can_take_back_ownership,
            },
        ];
        debug_assert!(rules.iter().map(SafetyRule::name).eq(RuleName::ALL));
        Self { rules }
    }

    pub fn rules(&self) -> &[SafetyRule] {
        &self.rules
    }

    pub fn active_count(&self) -> usize {
        self.rules.iter().filter(|rule| rule.is_active()).count()
    }
}

/// Accept/reject decision for one token
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Verdict {
    pub safe: bool,
    pub failing_rule: Option<RuleName>,
    pub message: String,
}

impl Verdict {
    pub fn passed() -> Self {
        Self {
            safe: true,
            failing_rule: None,
            message: ALL_CHECKS_PASSED.to_string(),
        }
    }

    pub fn failed(rule: RuleName) -> Self {
        Self {
            safe: false,
            failing_rule: Some(rule),
            message: rule.failure_message().to_string(),
        }
    }
}

/// Evaluates tokens against a [`RuleSet`]
#[derive(Debug, Clone)]
pub struct SafetyEngine {
    rules: RuleSet,
}

impl SafetyEngine {
    pub fn new(rules: RuleSet) -> Self {
        Self { rules }
    }

    pub fn from_config(config: &RuleConfig) -> Self {
        Self::new(RuleSet::from_config(config))
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// Evaluate a token; a report without an entry for it is judged on empty data
    pub fn evaluate(&self, token: &Address, report: &RiskReport) -> Verdict {
        let empty = TokenSecurity::default();
        let security = report.token(token).unwrap_or(&empty);

        match self.rules.rules().iter().find(|rule| !rule.passes(security)) {
            Some(rule) => {
                tracing::debug!("{} failed rule {}", address_key(token), rule.name());
                Verdict::failed(rule.name())
            }
            None => Verdict::passed(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::report_validator::fixtures::{entry, report_with, TOKEN};
    use crate::domain::report_validator::validate;
    use serde_json::{json, Value};

    fn security(entry: Value) -> TokenSecurity {
        serde_json::from_value(entry).unwrap()
    }

    fn holders(percents: &[&str]) -> Value {
        Value::Array(
            percents
                .iter()
                .enumerate()
                .map(|(i, p)| {
                    json!({
                        "address": format!("0x{:040x}", i + 1),
                        "balance": "1",
                        "is_contract": 0,
                        "is_locked": 0,
                        "locked_detail": [],
                        "percent": p,
                        "tag": ""
                    })
                })
                .collect(),
        )
    }

    /// Every toggle rule paired with the report field it reads
    fn toggle_rules(enabled: bool) -> Vec<(SafetyRule, &'static str)> {
        vec![
            (SafetyRule::OpenSource { enabled }, "is_open_source"),
            (SafetyRule::NonMintable { enabled }, "is_mintable"),
            (SafetyRule::NotHoneypot { enabled }, "is_honeypot"),
            (SafetyRule::OwnerCannotChangeBalance { enabled }, "owner_change_balance"),
            (SafetyRule::NoHiddenOwner { enabled }, "hidden_owner"),
            (SafetyRule::CanSellAll { enabled }, "cannot_sell_all"),
            (SafetyRule::TaxNotModifiable { enabled }, "slippage_modifiable"),
            (SafetyRule::TransferNotPausable { enabled }, "transfer_pausable"),
            (SafetyRule::NotProxy { enabled }, "is_proxy"),
            (SafetyRule::OwnershipNotReclaimable { enabled }, "can_take_back_ownership"),
        ]
    }

    fn engine(config: RuleConfig) -> SafetyEngine {
        SafetyEngine::from_config(&config)
    }

    fn token() -> Address {
        TOKEN.parse().unwrap()
    }

    #[test]
    fn test_clean_fixture_passes_every_rule() {
        let report = validate(report_with(entry())).unwrap();
        let verdict = engine(RuleConfig::default()).evaluate(&token(), &report);

        assert_eq!(verdict, Verdict::passed());
        assert_eq!(verdict.message, "all checks passed");
    }

    #[test]
    fn test_toggle_off_always_passes() {
        let risky = security(json!({
            "is_open_source": "0",
            "is_mintable": "1",
            "is_honeypot": "1",
            "owner_change_balance": "1",
            "hidden_owner": "1",
            "cannot_sell_all": "1",
            "slippage_modifiable": "1",
            "transfer_pausable": "1",
            "is_proxy": "1",
            "can_take_back_ownership": "1",
            "lp_holders": [{
                "address": "0x1", "balance": "1", "percent": "1", "tag": "",
                "is_contract": 0, "is_locked": 0, "locked_detail": []
            }]
        }));
        let empty = TokenSecurity::default();

        for (rule, _) in toggle_rules(false) {
            assert!(rule.passes(&risky), "{} should pass when off", rule.name());
            assert!(rule.passes(&empty), "{} should pass when off", rule.name());
        }
        assert!(SafetyRule::LpLocked { enabled: false }.passes(&risky));
    }

    #[test]
    fn test_toggle_on_missing_field_fails() {
        for (rule, field) in toggle_rules(true) {
            let mut entry = entry();
            entry.as_object_mut().unwrap().remove(field);
            assert!(!rule.passes(&security(entry)), "{} should fail without {}", rule.name(), field);
        }
    }

    #[test]
    fn test_toggle_on_malformed_field_fails() {
        for (rule, field) in toggle_rules(true) {
            for bad in [json!("true"), json!(0), json!(null), json!("")] {
                let mut entry = entry();
                entry[field] = bad.clone();
                assert!(
                    !rule.passes(&security(entry)),
                    "{} should fail when {} = {}",
                    rule.name(),
                    field,
                    bad
                );
            }
        }
    }

    #[test]
    fn test_toggle_on_clean_field_passes() {
        let clean = security(entry());
        for (rule, _) in toggle_rules(true) {
            assert!(rule.passes(&clean), "{} should pass", rule.name());
        }
    }

    #[test]
    fn test_tax_threshold_is_exclusive() {
        let rule = SafetyRule::MaxBuyTax { max: dec!(0.1) };
        let mut entry = entry();

        entry["buy_tax"] = json!("0.1");
        assert!(!rule.passes(&security(entry.clone())));

        entry["buy_tax"] = json!("0.0999");
        assert!(rule.passes(&security(entry)));
    }

    #[test]
    fn test_tax_missing_or_unparsable_fails() {
        let rule = SafetyRule::MaxSellTax { max: dec!(0.5) };
        let mut entry = entry();

        entry["sell_tax"] = json!("");
        assert!(!rule.passes(&security(entry.clone())));

        entry["sell_tax"] = json!("unknown");
        assert!(!rule.passes(&security(entry.clone())));

        entry.as_object_mut().unwrap().remove("sell_tax");
        assert!(!rule.passes(&security(entry)));
    }

    #[test]
    fn test_top10_sentinel_disables_check() {
        let rule = SafetyRule::MaxTop10Holders { max_percent: NO_CONCENTRATION_LIMIT };
        let mut entry = entry();
        entry["holders"] = holders(&["0.9", "0.1", "garbage"]);

        assert!(rule.passes(&security(entry)));
    }

    #[test]
    fn test_top10_boundary_inclusive() {
        let mut entry = entry();
        // 0.05 + 0.07 + 0.03 = 15%
        entry["holders"] = holders(&["0.05", "0.07", "0.03"]);
        let security = security(entry);

        assert!(SafetyRule::MaxTop10Holders { max_percent: dec!(15) }.passes(&security));
        assert!(!SafetyRule::MaxTop10Holders { max_percent: dec!(14) }.passes(&security));
    }

    #[test]
    fn test_top10_one_unit_above_fails() {
        let mut entry = entry();
        entry["holders"] = holders(&["0.10", "0.06"]);
        let rule = SafetyRule::MaxTop10Holders { max_percent: dec!(15) };

        assert!(!rule.passes(&security(entry)));
    }

    #[test]
    fn test_top10_only_counts_ten_holders() {
        let mut entry = entry();
        let mut shares = vec!["0.01"; 10];
        shares.push("0.50");
        entry["holders"] = holders(&shares);
        let rule = SafetyRule::MaxTop10Holders { max_percent: dec!(10) };

        assert!(rule.passes(&security(entry)));
    }

    #[test]
    fn test_top10_unparsable_percent_fails() {
        let mut entry = entry();
        entry["holders"] = holders(&["0.01", "n/a"]);
        let rule = SafetyRule::MaxTop10Holders { max_percent: dec!(50) };

        assert!(!rule.passes(&security(entry)));
    }

    #[test]
    fn test_lp_locked_requires_every_holder() {
        let mut entry = entry();
        let mut unlocked = entry["lp_holders"][0].clone();
        unlocked["is_locked"] = json!(0);
        entry["lp_holders"].as_array_mut().unwrap().push(unlocked);

        assert!(!SafetyRule::LpLocked { enabled: true }.passes(&security(entry)));
    }

    #[test]
    fn test_short_circuit_names_first_failure() {
        // Fails rule #3 (sell tax) and rule #7 (lp locked)
        let mut entry = entry();
        entry["sell_tax"] = json!("0.9");
        entry["lp_holders"][0]["is_locked"] = json!(0);
        let report = validate(report_with(entry)).unwrap();

        let verdict = engine(RuleConfig::default()).evaluate(&token(), &report);
        assert!(!verdict.safe);
        assert_eq!(verdict.failing_rule, Some(RuleName::MaxSellTax));
        assert_eq!(verdict.message, "Sell tax exceeds maximum");
    }

    #[test]
    fn test_buy_tax_scenario_safe() {
        let config = RuleConfig {
            max_buy_tax: dec!(0.25),
            check_is_honeypot: true,
            ..RuleConfig::default()
        };
        let mut entry = entry();
        entry["buy_tax"] = json!("0.1");
        entry["is_honeypot"] = json!("0");
        let report = validate(report_with(entry)).unwrap();

        assert!(engine(config).evaluate(&token(), &report).safe);
    }

    #[test]
    fn test_buy_tax_scenario_rejected() {
        let config = RuleConfig {
            max_buy_tax: dec!(0.25),
            check_is_honeypot: true,
            ..RuleConfig::default()
        };
        let mut entry = entry();
        entry["buy_tax"] = json!("0.3");
        entry["is_honeypot"] = json!("0");
        let report = validate(report_with(entry)).unwrap();

        let verdict = engine(config).evaluate(&token(), &report);
        assert!(!verdict.safe);
        assert_eq!(verdict.failing_rule, Some(RuleName::MaxBuyTax));
    }

    #[test]
    fn test_report_without_token_entry_fails() {
        let report = validate(json!({ "code": 1, "message": "OK", "result": {} })).unwrap();
        let verdict = engine(RuleConfig::default()).evaluate(&token(), &report);

        assert_eq!(verdict.failing_rule, Some(RuleName::OpenSource));
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let raw = json!({
            "code": 1,
            "message": "OK",
            "result": { "0xABCDEFabcdefABCDEFabcdefABCDEFabcdefABCD": entry() }
        });
        let report = validate(raw).unwrap();
        let token: Address = "0xabcdefabcdefabcdefabcdefabcdefabcdefabcd".parse().unwrap();

        assert!(engine(RuleConfig::default()).evaluate(&token, &report).safe);
    }

    #[test]
    fn test_rule_set_order() {
        let set = RuleSet::from_config(&RuleConfig::default());
        let names: Vec<RuleName> = set.rules().iter().map(SafetyRule::name).collect();
        assert_eq!(names, RuleName::ALL.to_vec());
    }

    #[test]
    fn test_active_count_skips_disabled_checks() {
        let all_on = RuleSet::from_config(&RuleConfig::default());
        assert_eq!(all_on.active_count(), RuleName::ALL.len());

        let config = RuleConfig {
            check_is_proxy: false,
            check_lp_locked: false,
            max_top10_holders: NO_CONCENTRATION_LIMIT,
            ..RuleConfig::default()
        };
        let set = RuleSet::from_config(&config);
        assert_eq!(set.rules().len(), RuleName::ALL.len());
        assert_eq!(set.active_count(), RuleName::ALL.len() - 3);
    }

    #[test]
    fn test_every_rule_has_message() {
        for name in RuleName::ALL {
            assert!(!name.failure_message().is_empty());
            assert_eq!(Verdict::failed(name).message, name.failure_message());
        }
    }
}
