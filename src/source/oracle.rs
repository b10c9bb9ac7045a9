//! On-chain oracle client
//!
//! Reads the latest token price from a read-only oracle contract with a
//! plain JSON-RPC `eth_call`. The price method takes no arguments, so the
//! call data is just its 4-byte selector.

use super::{FetchError, RateKind, RateSource};
use crate::config::OracleConfig;
use async_trait::async_trait;
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;
use sha3::{Digest, Keccak256};

/// JSON-RPC response envelope
#[derive(Debug, Deserialize)]
struct RpcResponse {
    result: Option<String>,
    error: Option<RpcError>,
}

#[derive(Debug, Deserialize)]
struct RpcError {
    code: i64,
    message: String,
}

/// Client for the on-chain price oracle
pub struct OracleClient {
    config: OracleConfig,
    client: Client,
    selector: [u8; 4],
}

impl OracleClient {
    /// Create a new oracle client
    pub fn new(config: OracleConfig) -> anyhow::Result<Self> {
        let client = Client::builder().timeout(config.timeout()).build()?;
        let selector = function_selector(&config.method);

        Ok(Self {
            config,
            client,
            selector,
        })
    }

    fn call_data(&self) -> String {
        format!("0x{}", hex::encode(self.selector))
    }

    fn request_body(&self) -> serde_json::Value {
        json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "eth_call",
            "params": [
                {
                    "to": self.config.contract_address,
                    "data": self.call_data(),
                },
                "latest"
            ]
        })
    }

    /// Fetch the latest token price in USD
    pub async fn fetch_token_price(&self) -> Result<Decimal, FetchError> {
        tracing::debug!(
            rpc_url = %self.config.rpc_url,
            contract = %self.config.contract_address,
            method = %self.config.method,
            "Calling oracle contract"
        );

        let response = self
            .client
            .post(&self.config.rpc_url)
            .json(&self.request_body())
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::Network(format!(
                "RPC endpoint returned {} - {}",
                status, body
            )));
        }

        let body = response.text().await?;
        let data = parse_rpc_response(&body)?;
        decode_price(&data, self.config.decimals)
    }
}

#[async_trait]
impl RateSource for OracleClient {
    fn kind(&self) -> RateKind {
        RateKind::TokenToUsd
    }

    async fn fetch(&self) -> Result<Decimal, FetchError> {
        self.fetch_token_price().await
    }
}

/// Extract the hex return data from a JSON-RPC response body
fn parse_rpc_response(body: &str) -> Result<String, FetchError> {
    let response: RpcResponse = serde_json::from_str(body)
        .map_err(|e| FetchError::ContractCall(format!("Malformed JSON-RPC response: {}", e)))?;

    if let Some(err) = response.error {
        return Err(FetchError::ContractCall(format!(
            "RPC error {}: {}",
            err.code, err.message
        )));
    }

    response
        .result
        .ok_or_else(|| FetchError::ContractCall("JSON-RPC response has no result".to_string()))
}

/// First four bytes of the Keccak-256 hash of a function signature
pub fn function_selector(signature: &str) -> [u8; 4] {
    let hash = Keccak256::digest(signature.as_bytes());
    let mut selector = [0u8; 4];
    selector.copy_from_slice(&hash[..4]);
    selector
}

/// Decode an ABI-encoded `int256` return word into a scaled price
///
/// Only values that fit in an `i128` are accepted; the oracle reports
/// prices far below that bound.
pub fn decode_price(data: &str, decimals: u32) -> Result<Decimal, FetchError> {
    let hex_str = data.strip_prefix("0x").unwrap_or(data);
    let bytes = hex::decode(hex_str)
        .map_err(|e| FetchError::ContractCall(format!("Invalid hex return data: {}", e)))?;

    if bytes.len() < 32 {
        return Err(FetchError::ContractCall(format!(
            "Expected a 32-byte return value, got {} bytes",
            bytes.len()
        )));
    }

    let (high, low) = bytes[..32].split_at(16);
    let sign_fill = if low[0] & 0x80 != 0 { 0xff } else { 0x00 };
    if high.iter().any(|b| *b != sign_fill) {
        return Err(FetchError::ContractCall(
            "Price does not fit in 128 bits".to_string(),
        ));
    }

    let mut buf = [0u8; 16];
    buf.copy_from_slice(low);
    let raw = i128::from_be_bytes(buf);

    if raw <= 0 {
        return Err(FetchError::ContractCall(format!(
            "Non-positive price: {}",
            raw
        )));
    }

    Decimal::try_from_i128_with_scale(raw, decimals)
        .map(|price| price.normalize())
        .map_err(|e| FetchError::ContractCall(format!("Price {} out of range: {}", raw, e)))
}
