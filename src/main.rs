use clap::Parser;
use cross_rate_oracle::cli::{Cli, Commands};
use cross_rate_oracle::config::Config;
use std::path::Path;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    // Load configuration
    let mut config = if Path::new(&cli.config).exists() {
        Config::load(&cli.config)?
    } else {
        eprintln!("Warning: config file {} not found", cli.config);
        eprintln!("Using default configuration");
        Config::default()
    };
    config.apply_env_overrides()?;
    config.validate()?;

    // Initialize telemetry
    let _telemetry = cross_rate_oracle::telemetry::init_telemetry(&config.telemetry)?;

    match cli.command {
        Commands::Serve(args) => {
            tracing::info!("Starting cross rate oracle");
            args.execute(&config).await?;
        }
        Commands::Fetch(args) => {
            args.execute(&config).await?;
        }
        Commands::Config => {
            let client_id = if config.fiat.client_id.is_empty() {
                "(not set)"
            } else {
                "(set)"
            };

            println!("Current configuration:");
            println!("  Listen: {}", config.bind_addr());
            println!(
                "  Oracle: {} {} {} every {}s",
                config.oracle.rpc_url,
                config.oracle.contract_address,
                config.oracle.method,
                config.oracle.refresh_interval_secs
            );
            println!(
                "  Fiat: {} {} ({}) every {}s, client id {}",
                config.fiat.api_url,
                config.fiat.currency,
                config.fiat.timezone,
                config.fiat.refresh_interval_secs,
                client_id
            );
            match config.telemetry.metrics_port {
                Some(port) => println!("  Metrics: port {}", port),
                None => println!("  Metrics: disabled"),
            }
        }
    }

    Ok(())
}
