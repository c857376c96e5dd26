//! Adapters Layer - External System Implementations
//!
//! This module contains implementations of the port traits:
//! - EVM: WebSocket chain client (factory events, blocks, router swaps)
//! - GoPlus: token security report API client
//! - CLI: command-line argument definitions

pub mod evm;
pub mod goplus;
pub mod cli;

pub use evm::{EvmChainClient, EvmChainConfig};
pub use goplus::{GoPlusClient, GoPlusConfig};
pub use cli::CliApp;
