//! Domain Layer - Core screening and position logic
//!
//! Pure types and decisions with no I/O. All chain and HTTP access goes through
//! the ports layer.
//!
//! - `report`: typed GoPlus token security report
//! - `report_validator`: all-or-nothing structural check of raw reports
//! - `safety_rules`: ordered rule set producing a `Verdict`
//! - `ratio`: 18-decimal fixed-point value ratio
//! - `position`: position lifecycle and exit thresholds

pub mod report;
pub mod report_validator;
pub mod safety_rules;
pub mod ratio;
pub mod position;

pub use report::{address_key, DexLiquidity, HolderRecord, LockDetail, RiskReport, TokenSecurity};
pub use report_validator::{validate, ReportInvalid};
pub use safety_rules::{
    RuleConfig, RuleName, RuleSet, SafetyEngine, SafetyRule, Verdict, ALL_CHECKS_PASSED,
    NO_CONCENTRATION_LIMIT,
};
pub use ratio::{Ratio, RatioError, WAD};
pub use position::{ExitThresholds, ExitTrigger, Position, PositionError, PositionStatus};
