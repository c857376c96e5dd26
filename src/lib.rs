//! Pair Sniper - Uniswap-V2 New Pair Sniper Library
//!
//! Screens newly listed tokens against a GoPlus security report before buying,
//! then exits each position on take-profit or stop-loss.
//!
//! # Modules
//!
//! - `domain`: Core logic (RiskReport, report validation, SafetyEngine, Position, Ratio)
//! - `ports`: Trait abstractions (ChainPort, RiskReportSource) and test doubles
//! - `adapters`: External implementations (EVM chain, GoPlus, CLI)
//! - `config`: Configuration loading and validation
//! - `application`: Screening, execution, monitoring and the dispatcher

pub mod domain;
pub mod ports;
pub mod adapters;
pub mod config;
pub mod application;
