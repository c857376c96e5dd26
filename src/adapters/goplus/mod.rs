//! GoPlus Security Adapter
//!
//! Fetches raw token security reports from the GoPlus `token_security` endpoint.
//! The response is returned as JSON and checked by the report validator before use.
//!
//! # Example
//!
//! ```rust,ignore
//! use pair_sniper::adapters::goplus::{GoPlusClient, GoPlusConfig};
//!
//! let client = GoPlusClient::with_config(GoPlusConfig::for_chain(1))?;
//! let raw = client.fetch_report(token).await?;
//! ```

mod client;

pub use client::{GoPlusClient, GoPlusConfig, DEFAULT_API_URL};
