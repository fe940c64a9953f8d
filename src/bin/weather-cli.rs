use clap::{Parser, Subcommand};
use serde_json::Value;

#[derive(Parser)]
#[command(name = "weather-cli")]
#[command(about = "Query a running weather gateway", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:4000")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Hourly forecast for a city
    Weather {
        city: String,
        /// Day to fetch (YYYY-MM-DD); today when omitted
        #[arg(short, long)]
        date: Option<String>,
    },
    /// Search cities by name
    Cities { query: String },
    /// Breaker and cache status
    Status,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let base = cli.url.trim_end_matches('/');

    let request = match &cli.command {
        Commands::Weather { city, date } => {
            let mut query = vec![("city", city.as_str())];
            if let Some(date) = date {
                query.push(("date", date.as_str()));
            }
            client.get(format!("{base}/api/v1/weather")).query(&query)
        }
        Commands::Cities { query } => client
            .get(format!("{base}/api/v1/cities"))
            .query(&[("q", query.as_str())]),
        Commands::Status => client.get(format!("{base}/api/v1/status")),
    };

    print_response(request.send().await?).await
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    let request_id = res
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-")
        .to_string();

    if !status.is_success() {
        eprintln!("Error: gateway returned status {status} (request {request_id})");
        if let Ok(text) = res.text().await {
            eprintln!("Response: {text}");
        }
        return Ok(());
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
