//! cross-rate-oracle: token to fiat cross rate service
//!
//! This library provides the core components for:
//! - Reading the token price from an on-chain oracle contract
//! - Fetching the daily USD to fiat rate from a central bank API
//! - Caching the latest values in memory
//! - Refreshing both on independent schedules
//! - Serving the derived cross rate over HTTP
//! - Structured logging and Prometheus metrics

pub mod api;
pub mod cache;
pub mod cli;
pub mod config;
pub mod scheduler;
pub mod source;
pub mod telemetry;
