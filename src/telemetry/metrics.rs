//! Prometheus metrics

use crate::source::RateKind;
use metrics_exporter_prometheus::PrometheusBuilder;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::net::SocketAddr;
use std::time::Duration;

/// Result of one scheduled fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    Success,
    Failure,
}

impl FetchOutcome {
    fn as_str(&self) -> &'static str {
        match self {
            FetchOutcome::Success => "success",
            FetchOutcome::Failure => "failure",
        }
    }
}

/// Gauge metric types
#[derive(Debug, Clone, Copy)]
pub enum GaugeMetric {
    /// Latest token price in USD
    TokenToUsd,
    /// Latest USD to fiat rate
    UsdToFiat,
    /// Derived token to fiat rate
    CrossRate,
}

impl From<RateKind> for GaugeMetric {
    fn from(kind: RateKind) -> Self {
        match kind {
            RateKind::TokenToUsd => GaugeMetric::TokenToUsd,
            RateKind::UsdToFiat => GaugeMetric::UsdToFiat,
        }
    }
}

/// Start the Prometheus exporter on the given port
pub fn init_metrics(port: u16) -> anyhow::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));

    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| anyhow::anyhow!("Failed to install Prometheus exporter: {}", e))?;

    tracing::info!(addr = %addr, "Prometheus exporter listening");
    Ok(())
}

/// Count a fetch attempt and record its latency
pub fn record_fetch(kind: RateKind, outcome: FetchOutcome, duration: Duration) {
    ::metrics::counter!(
        "oracle_fetch_total",
        "source" => kind.as_str(),
        "outcome" => outcome.as_str()
    )
    .increment(1);

    ::metrics::histogram!("oracle_fetch_duration_seconds", "source" => kind.as_str())
        .record(duration.as_secs_f64());
}

/// Set a gauge value
pub fn set_gauge(metric: GaugeMetric, value: Decimal) {
    let metric_name = match metric {
        GaugeMetric::TokenToUsd => "oracle_token_to_usd",
        GaugeMetric::UsdToFiat => "oracle_usd_to_fiat",
        GaugeMetric::CrossRate => "oracle_cross_rate",
    };

    ::metrics::gauge!(metric_name).set(value.to_f64().unwrap_or(f64::NAN));
}
