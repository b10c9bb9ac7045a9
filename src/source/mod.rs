//! Rate source clients
//!
//! One client per upstream: the on-chain oracle contract for the token
//! price and the central bank REST API for the USD/fiat rate.

mod fiat;
mod oracle;
mod types;

pub use fiat::{parse_fiat_response, report_date, FiatRateClient};
pub use oracle::{decode_price, function_selector, OracleClient};
pub use types::{FetchError, RateKind};

use async_trait::async_trait;
use rust_decimal::Decimal;

/// Trait for upstream rate sources
#[async_trait]
pub trait RateSource: Send + Sync {
    /// The cache field this source feeds
    fn kind(&self) -> RateKind;

    /// Fetch the current value from upstream
    async fn fetch(&self) -> Result<Decimal, FetchError>;
}
