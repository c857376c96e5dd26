//! Ports Layer - Trait definitions for external dependencies
//!
//! Following hexagonal architecture, these traits abstract:
//! - The chain (factory events, block stream, router swaps and quotes)
//! - The token security report API

pub mod chain;
pub mod report_source;
pub mod mocks;

pub use chain::{BlockInfo, BlockTick, ChainError, ChainPort, PairCreated};
pub use report_source::{ReportSourceError, RiskReportSource};
