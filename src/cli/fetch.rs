//! Fetch command implementation

use crate::api::NOT_READY_MESSAGE;
use crate::cache::PriceCache;
use crate::config::Config;
use crate::scheduler::run_once;
use crate::source::{FiatRateClient, OracleClient, RateSource};
use clap::Args;

#[derive(Args, Debug)]
pub struct FetchArgs {
    /// Print single-line JSON
    #[arg(long)]
    pub compact: bool,
}

impl FetchArgs {
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let cache = PriceCache::new();
        let sources: Vec<Box<dyn RateSource>> = vec![
            Box::new(OracleClient::new(config.oracle.clone())?),
            Box::new(FiatRateClient::new(config.fiat.clone())?),
        ];

        for source in &sources {
            if let Err(err) = run_once(source.as_ref(), &cache).await {
                tracing::error!(source = %source.kind(), error = %err, "Rate fetch failed");
            }
        }

        let snapshot = cache
            .snapshot()
            .await
            .ok_or_else(|| anyhow::anyhow!(NOT_READY_MESSAGE))?;

        let output = if self.compact {
            serde_json::to_string(&snapshot)?
        } else {
            serde_json::to_string_pretty(&snapshot)?
        };
        println!("{}", output);

        Ok(())
    }
}
