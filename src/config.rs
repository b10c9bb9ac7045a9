//! Configuration types for cross-rate-oracle

use crate::telemetry::LogFormat;
use anyhow::Context;
use serde::Deserialize;
use std::time::Duration;

/// Default HTTP listener port
pub const DEFAULT_PORT: u16 = 3066;

/// Root configuration structure
///
/// Every section is optional so an empty file yields the defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub oracle: OracleConfig,
    #[serde(default)]
    pub fiat: FiatConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

/// HTTP listener configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    DEFAULT_PORT
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: DEFAULT_PORT,
        }
    }
}

/// On-chain oracle configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OracleConfig {
    /// JSON-RPC endpoint of the chain
    #[serde(default = "default_rpc_url")]
    pub rpc_url: String,

    /// Address of the oracle contract
    #[serde(default = "default_contract_address")]
    pub contract_address: String,

    /// Solidity signature of the read-only price method
    #[serde(default = "default_method")]
    pub method: String,

    /// Fixed-point decimals of the returned integer
    #[serde(default = "default_decimals")]
    pub decimals: u32,

    #[serde(default = "default_oracle_refresh")]
    pub refresh_interval_secs: u64,

    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_rpc_url() -> String {
    "https://rpc-l1.jibchain.net".to_string()
}
fn default_contract_address() -> String {
    "0xA21B21fe4263Ef932D0359E1e733a54f1838f793".to_string()
}
fn default_method() -> String {
    "getLatestPrice()".to_string()
}
fn default_decimals() -> u32 {
    8
}
fn default_oracle_refresh() -> u64 {
    60 // every minute
}
fn default_timeout() -> u64 {
    10
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            rpc_url: default_rpc_url(),
            contract_address: default_contract_address(),
            method: default_method(),
            decimals: default_decimals(),
            refresh_interval_secs: default_oracle_refresh(),
            timeout_secs: default_timeout(),
        }
    }
}

impl OracleConfig {
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Fiat exchange rate API configuration
#[derive(Debug, Clone, Deserialize)]
pub struct FiatConfig {
    /// Daily average exchange rate endpoint
    #[serde(default = "default_fiat_api_url")]
    pub api_url: String,

    /// Value of the `x-ibm-client-id` header
    #[serde(default)]
    pub client_id: String,

    /// Quoted currency code
    #[serde(default = "default_currency")]
    pub currency: String,

    /// IANA timezone used to determine "yesterday"
    #[serde(default = "default_timezone")]
    pub timezone: String,

    #[serde(default = "default_fiat_refresh")]
    pub refresh_interval_secs: u64,

    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_fiat_api_url() -> String {
    "https://apigw1.bot.or.th/bot/public/Stat-ExchangeRate/v2/DAILY_AVG_EXG_RATE/".to_string()
}
fn default_currency() -> String {
    "USD".to_string()
}
fn default_timezone() -> String {
    "Asia/Bangkok".to_string()
}
fn default_fiat_refresh() -> u64 {
    300 // every 5 minutes
}

impl Default for FiatConfig {
    fn default() -> Self {
        Self {
            api_url: default_fiat_api_url(),
            client_id: String::new(),
            currency: default_currency(),
            timezone: default_timezone(),
            refresh_interval_secs: default_fiat_refresh(),
            timeout_secs: default_timeout(),
        }
    }
}

impl FiatConfig {
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Telemetry configuration
#[derive(Debug, Clone, Deserialize)]
pub struct TelemetryConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub log_format: LogFormat,
    /// Prometheus exporter port; no exporter when unset
    #[serde(default)]
    pub metrics_port: Option<u16>,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: LogFormat::default(),
            metrics_port: None,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<std::path::Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Apply overrides from the process environment
    pub fn apply_env_overrides(&mut self) -> anyhow::Result<()> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary key lookup; empty values are ignored
    pub fn apply_overrides<F>(&mut self, lookup: F) -> anyhow::Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(port) = get("PORT") {
            self.server.port = port
                .trim()
                .parse()
                .with_context(|| format!("Invalid PORT value: {}", port))?;
        }
        if let Some(url) = get("ORACLE_RPC_URL") {
            self.oracle.rpc_url = url;
        }
        if let Some(address) = get("ORACLE_CONTRACT_ADDRESS") {
            self.oracle.contract_address = address;
        }
        if let Some(url) = get("FIAT_API_URL") {
            self.fiat.api_url = url;
        }
        if let Some(client_id) = get("FIAT_CLIENT_ID") {
            self.fiat.client_id = client_id;
        }

        Ok(())
    }

    /// Reject values the service cannot run with
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.oracle.refresh_interval_secs == 0 || self.fiat.refresh_interval_secs == 0 {
            anyhow::bail!("refresh_interval_secs must be greater than zero");
        }
        if self.oracle.timeout_secs == 0 || self.fiat.timeout_secs == 0 {
            anyhow::bail!("timeout_secs must be greater than zero");
        }
        // rust_decimal carries at most 28 fractional digits
        if self.oracle.decimals > 28 {
            anyhow::bail!("oracle.decimals must be at most 28, got {}", self.oracle.decimals);
        }
        Ok(())
    }

    /// Socket address string for the HTTP listener
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
