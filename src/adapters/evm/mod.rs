//! EVM Chain Adapter
//!
//! Implements `ChainPort` over a WebSocket node with `ethers`:
//! - `PairCreated` logs from the V2 factory
//! - New block headers, fanned out to every open position
//! - Router swaps and `getAmountsOut` quotes signed by a local wallet

mod client;

pub use client::{decode_pair_created, EvmChainClient, EvmChainConfig, PAIR_CREATED_EVENT};
