//! Fiat exchange rate client
//!
//! Fetches the previous day's average USD selling rate from the central
//! bank statistics API. Rates are published per business day, so the
//! query always targets "yesterday" in the bank's local timezone.

use super::{FetchError, RateKind, RateSource};
use crate::cache::{Clock, SystemClock};
use crate::config::FiatConfig;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use reqwest::header::ACCEPT;
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::str::FromStr;
use std::sync::Arc;

/// Header carrying the API client identifier
const CLIENT_ID_HEADER: &str = "x-ibm-client-id";

/// Client for the daily average exchange rate API
pub struct FiatRateClient {
    config: FiatConfig,
    client: Client,
    timezone: Tz,
    clock: Arc<dyn Clock>,
}

impl FiatRateClient {
    /// Create a new client, validating the configured timezone
    pub fn new(config: FiatConfig) -> anyhow::Result<Self> {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Create a client that reads "now" from `clock`
    pub fn with_clock(config: FiatConfig, clock: Arc<dyn Clock>) -> anyhow::Result<Self> {
        let timezone: Tz = config
            .timezone
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid timezone {}: {}", config.timezone, e))?;

        let client = Client::builder().timeout(config.timeout()).build()?;

        Ok(Self {
            config,
            client,
            timezone,
            clock,
        })
    }

    /// Fetch yesterday's USD to fiat selling rate
    pub async fn fetch_fiat_rate(&self) -> Result<Decimal, FetchError> {
        let period = report_date(self.clock.now(), self.timezone)
            .format("%Y-%m-%d")
            .to_string();

        tracing::debug!(
            url = %self.config.api_url,
            period = %period,
            currency = %self.config.currency,
            "Fetching daily exchange rate"
        );

        let response = self
            .client
            .get(&self.config.api_url)
            .query(&[
                ("start_period", period.as_str()),
                ("end_period", period.as_str()),
                ("currency", self.config.currency.as_str()),
            ])
            .header(CLIENT_ID_HEADER, self.config.client_id.as_str())
            .header(ACCEPT, "application/json")
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::Network(format!(
                "Exchange rate API error: {} - {}",
                status, body
            )));
        }

        let body = response.text().await?;
        parse_fiat_response(&body)
    }
}

#[async_trait]
impl RateSource for FiatRateClient {
    fn kind(&self) -> RateKind {
        RateKind::UsdToFiat
    }

    async fn fetch(&self) -> Result<Decimal, FetchError> {
        self.fetch_fiat_rate().await
    }
}

/// The day before `now`, as seen in `timezone`
pub fn report_date(now: DateTime<Utc>, timezone: Tz) -> NaiveDate {
    (now.with_timezone(&timezone) - chrono::Duration::days(1)).date_naive()
}

#[derive(Debug, Deserialize)]
struct ExchangeRateResponse {
    result: ExchangeRateResult,
}

#[derive(Debug, Deserialize)]
struct ExchangeRateResult {
    data: ExchangeRateData,
}

#[derive(Debug, Deserialize)]
struct ExchangeRateData {
    data_detail: Vec<DailyRate>,
}

/// One published daily rate
#[derive(Debug, Deserialize)]
struct DailyRate {
    #[serde(default)]
    selling: Option<RateValue>,
}

/// Rates are published as decimal strings, occasionally as bare numbers
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RateValue {
    Text(String),
    Number(serde_json::Number),
}

impl RateValue {
    fn into_text(self) -> String {
        match self {
            RateValue::Text(s) => s.trim().to_string(),
            RateValue::Number(n) => n.to_string(),
        }
    }
}

/// Extract `result.data.data_detail[0].selling` as a decimal rate
pub fn parse_fiat_response(body: &str) -> Result<Decimal, FetchError> {
    let response: ExchangeRateResponse = serde_json::from_str(body)
        .map_err(|e| FetchError::Parse(format!("Unexpected exchange rate response: {}", e)))?;

    let first = response
        .result
        .data
        .data_detail
        .into_iter()
        .next()
        .ok_or_else(|| FetchError::Parse("No rate published for the requested period".to_string()))?;

    let selling = first
        .selling
        .map(RateValue::into_text)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| FetchError::Parse("Missing selling rate".to_string()))?;

    let rate = Decimal::from_str(&selling)
        .or_else(|_| Decimal::from_scientific(&selling))
        .map_err(|e| FetchError::Parse(format!("Invalid selling rate {:?}: {}", selling, e)))?;

    if rate <= Decimal::ZERO {
        return Err(FetchError::Parse(format!("Non-positive selling rate: {}", rate)));
    }

    Ok(rate)
}
