//! CLI interface for cross-rate-oracle
//!
//! Provides subcommands for:
//! - `serve`: Poll both sources and serve the cross rate over HTTP
//! - `fetch`: Query both sources once and print the result
//! - `config`: Show the effective configuration

mod fetch;
mod serve;

pub use fetch::FetchArgs;
pub use serve::ServeArgs;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "cross-rate-oracle")]
#[command(about = "Serves a token to fiat cross rate from an on-chain oracle and a fiat rate API")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    pub config: String,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Poll both rate sources and serve the cross rate
    Serve(ServeArgs),
    /// Fetch both rates once and print the snapshot
    Fetch(FetchArgs),
    /// Show the effective configuration
    Config,
}
