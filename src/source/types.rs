//! Rate source types

use crate::cache::CacheError;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Which cached rate a source produces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateKind {
    /// On-chain token price in USD
    TokenToUsd,
    /// USD to fiat exchange rate
    UsdToFiat,
}

impl RateKind {
    /// Stable label used in logs and metrics
    pub fn as_str(&self) -> &'static str {
        match self {
            RateKind::TokenToUsd => "token_to_usd",
            RateKind::UsdToFiat => "usd_to_fiat",
        }
    }
}

impl fmt::Display for RateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors raised while fetching a rate from an upstream source
#[derive(Debug, Error)]
pub enum FetchError {
    /// Connection failure, timeout, or non-success HTTP status
    #[error("Network error: {0}")]
    Network(String),
    /// Bad JSON-RPC response or undecodable return data
    #[error("Contract call failed: {0}")]
    ContractCall(String),
    /// Response did not have the expected shape
    #[error("Parse error: {0}")]
    Parse(String),
    /// Fetched value the cache cannot hold alongside the other rate
    #[error("Rejected by cache: {0}")]
    Rejected(#[from] CacheError),
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        FetchError::Network(err.to_string())
    }
}
