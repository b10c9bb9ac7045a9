//! In-memory price cache
//!
//! Holds the last successfully fetched value from each rate source and
//! derives the cross rate once both are known.

mod clock;

pub use clock::{Clock, ManualClock, SystemClock};

use crate::source::RateKind;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;

/// Errors raised when a value cannot be written to the cache
#[derive(Debug, Error)]
pub enum CacheError {
    /// The product of the two rates does not fit in a `Decimal`
    #[error("Cross rate of {token_to_usd} and {usd_to_fiat} is out of range")]
    CrossRateOverflow {
        token_to_usd: Decimal,
        usd_to_fiat: Decimal,
    },
}

/// Derived view of a ready cache, as served over HTTP
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    #[serde(with = "rust_decimal::serde::float")]
    pub token_to_usd: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub usd_to_fiat: Decimal,
    /// `token_to_usd * usd_to_fiat`
    #[serde(with = "rust_decimal::serde::float")]
    pub cross_rate: Decimal,
    pub last_update_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default)]
struct CacheState {
    token_to_usd: Option<Decimal>,
    usd_to_fiat: Option<Decimal>,
    last_update_at: Option<DateTime<Utc>>,
}

impl CacheState {
    fn snapshot(&self) -> Option<Snapshot> {
        let token_to_usd = self.token_to_usd?;
        let usd_to_fiat = self.usd_to_fiat?;
        let last_update_at = self.last_update_at?;

        Some(Snapshot {
            token_to_usd,
            usd_to_fiat,
            cross_rate: token_to_usd.checked_mul(usd_to_fiat)?,
            last_update_at,
        })
    }
}

/// Latest token and fiat rates, shared between the scheduler and the API
pub struct PriceCache {
    state: RwLock<CacheState>,
    clock: Arc<dyn Clock>,
}

impl PriceCache {
    /// Create an empty cache on the wall clock
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Create an empty cache on the given clock
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            state: RwLock::new(CacheState::default()),
            clock,
        }
    }

    /// Overwrite one rate and stamp the update time
    ///
    /// `last_update_at` never moves backward, even if the clock does. A value
    /// whose cross rate with the other cached rate overflows is rejected and
    /// the cache is left unchanged.
    pub async fn update(&self, kind: RateKind, value: Decimal) -> Result<(), CacheError> {
        let now = self.clock.now();
        let mut state = self.state.write().await;

        let (token_to_usd, usd_to_fiat) = match kind {
            RateKind::TokenToUsd => (Some(value), state.usd_to_fiat),
            RateKind::UsdToFiat => (state.token_to_usd, Some(value)),
        };
        if let (Some(token_to_usd), Some(usd_to_fiat)) = (token_to_usd, usd_to_fiat) {
            if token_to_usd.checked_mul(usd_to_fiat).is_none() {
                return Err(CacheError::CrossRateOverflow {
                    token_to_usd,
                    usd_to_fiat,
                });
            }
        }

        state.token_to_usd = token_to_usd;
        state.usd_to_fiat = usd_to_fiat;

        state.last_update_at = match state.last_update_at {
            Some(prev) if prev >= now => Some(prev),
            _ => Some(now),
        };
        Ok(())
    }

    /// Current value of one rate, if fetched yet
    pub async fn get(&self, kind: RateKind) -> Option<Decimal> {
        let state = self.state.read().await;
        match kind {
            RateKind::TokenToUsd => state.token_to_usd,
            RateKind::UsdToFiat => state.usd_to_fiat,
        }
    }

    /// True once both rates have been fetched at least once
    pub async fn is_ready(&self) -> bool {
        let state = self.state.read().await;
        state.token_to_usd.is_some() && state.usd_to_fiat.is_some()
    }

    /// Derived view, or `None` while not ready
    pub async fn snapshot(&self) -> Option<Snapshot> {
        self.state.read().await.snapshot()
    }

    /// Time of the most recent successful update
    pub async fn last_update_at(&self) -> Option<DateTime<Utc>> {
        self.state.read().await.last_update_at
    }
}

impl Default for PriceCache {
    fn default() -> Self {
        Self::new()
    }
}
