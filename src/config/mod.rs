//! Configuration Module
//!
//! Loads and validates configuration from TOML files.

pub mod loader;

pub use loader::{
    load_config, ChainSection, Config, ConfigError, LoggingSection, ReportSection, SniperSection,
    PRIVATE_KEY_ENV, WS_URL_ENV,
};
