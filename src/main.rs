use std::path::PathBuf;

use clap::Parser;

use weather_gateway::config::load_from_env;
use weather_gateway::lifecycle;
use weather_gateway::observability::logging::init_tracing;

#[derive(Parser)]
#[command(name = "weather-gateway")]
#[command(about = "Caching, circuit-broken gateway for a weather API", long_about = None)]
struct Args {
    /// TOML configuration file. Defaults plus environment overrides when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let config = load_from_env(args.config.as_deref())?;

    init_tracing(&config.observability);
    tracing::info!("weather-gateway v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        upstream = %config.upstream.base_url,
        cache_backend = ?config.cache.backend,
        weather_ttl_secs = config.weather.cache_ttl_secs,
        city_ttl_secs = config.city.cache_ttl_secs,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    lifecycle::run(config).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
