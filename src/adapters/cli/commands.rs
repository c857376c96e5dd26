//! CLI Commands
//!
//! Argument definitions for the pair sniper. Handlers live in `main.rs`.

use clap::{Parser, Subcommand};
use ethers::types::Address;
use std::path::PathBuf;

/// Default configuration file
pub const DEFAULT_CONFIG: &str = "config/sniper.toml";

/// Pair Sniper - screens and buys newly listed Uniswap-V2 tokens
#[derive(Parser, Debug)]
#[command(
    name = "pair-sniper",
    version = env!("CARGO_PKG_VERSION"),
    author = env!("CARGO_PKG_AUTHORS"),
    about = "New-pair sniper for Uniswap-V2 style DEXes",
    long_about = "Pair Sniper listens for PairCreated events, screens each new token against \
                  a GoPlus token security report and a configurable rule set, buys the tokens \
                  that pass and sells them on take-profit or stop-loss."
)]
pub struct CliApp {
    /// The command to execute
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Snipe new pairs: screen, buy and monitor
    Run(RunCmd),

    /// Screen new pairs and log verdicts without trading
    Watch(WatchCmd),

    /// Screen a single token and print the verdict
    Check(CheckCmd),
}

/// Start sniping
#[derive(Parser, Debug)]
pub struct RunCmd {
    /// Path to configuration file
    #[arg(short, long, value_name = "FILE", default_value = DEFAULT_CONFIG)]
    pub config: PathBuf,
}

/// Screen-only mode
#[derive(Parser, Debug)]
pub struct WatchCmd {
    /// Path to configuration file
    #[arg(short, long, value_name = "FILE", default_value = DEFAULT_CONFIG)]
    pub config: PathBuf,
}

/// Screen one token
#[derive(Parser, Debug)]
pub struct CheckCmd {
    /// Token contract address
    #[arg(value_name = "TOKEN")]
    pub token: Address,

    /// Path to configuration file
    #[arg(short, long, value_name = "FILE", default_value = DEFAULT_CONFIG)]
    pub config: PathBuf,

    /// Print the verdict as JSON
    #[arg(long)]
    pub json: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_defaults() {
        let app = CliApp::try_parse_from(["pair-sniper", "run"]).unwrap();
        match app.command {
            Command::Run(cmd) => assert_eq!(cmd.config, PathBuf::from(DEFAULT_CONFIG)),
            other => panic!("unexpected command {:?}", other),
        }
        assert!(!app.verbose);
        assert!(!app.debug);
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let app = CliApp::try_parse_from(["pair-sniper", "watch", "--config", "my.toml", "-v"]).unwrap();
        assert!(app.verbose);
        match app.command {
            Command::Watch(cmd) => assert_eq!(cmd.config, PathBuf::from("my.toml")),
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_check_parses_address() {
        let app = CliApp::try_parse_from([
            "pair-sniper",
            "--debug",
            "check",
            "0x1111111111111111111111111111111111111111",
            "--json",
        ])
        .unwrap();

        assert!(app.debug);
        match app.command {
            Command::Check(cmd) => {
                assert_eq!(cmd.token, Address::repeat_byte(0x11));
                assert!(cmd.json);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_check_rejects_bad_address() {
        assert!(CliApp::try_parse_from(["pair-sniper", "check", "not-an-address"]).is_err());
    }
}
