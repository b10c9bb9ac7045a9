//! Single scheduled fetch

use crate::cache::PriceCache;
use crate::source::{FetchError, RateSource};
use crate::telemetry::{self, FetchOutcome, GaugeMetric};
use rust_decimal::Decimal;
use std::time::Instant;

/// Fetch one source and, on success, write the value into the cache
///
/// A failed fetch, or a value the cache rejects, leaves the cache untouched
/// and is returned to the caller.
pub async fn run_once(source: &dyn RateSource, cache: &PriceCache) -> Result<Decimal, FetchError> {
    let kind = source.kind();
    let started = Instant::now();
    let result = source.fetch().await;
    let elapsed = started.elapsed();

    let stored = match result {
        Ok(value) => cache
            .update(kind, value)
            .await
            .map(|()| value)
            .map_err(FetchError::from),
        Err(err) => Err(err),
    };
    let value = match stored {
        Ok(value) => value,
        Err(err) => {
            telemetry::record_fetch(kind, FetchOutcome::Failure, elapsed);
            return Err(err);
        }
    };

    telemetry::record_fetch(kind, FetchOutcome::Success, elapsed);
    telemetry::set_gauge(GaugeMetric::from(kind), value);

    tracing::info!(
        source = %kind,
        value = %value,
        elapsed_ms = elapsed.as_millis() as u64,
        "Rate updated"
    );

    match cache.snapshot().await {
        Some(snapshot) => {
            telemetry::set_gauge(GaugeMetric::CrossRate, snapshot.cross_rate);
            tracing::info!(
                token_to_usd = %snapshot.token_to_usd,
                usd_to_fiat = %snapshot.usd_to_fiat,
                cross_rate = %snapshot.cross_rate,
                last_update_at = %snapshot.last_update_at,
                "Price data ready"
            );
        }
        None => tracing::info!("Price data not ready yet"),
    }

    Ok(value)
}
