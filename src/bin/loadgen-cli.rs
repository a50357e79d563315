use clap::{Args, Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde_json::Value;

use telemetry_loadgen::engine::ConfigUpdate;

#[derive(Parser)]
#[command(name = "loadgen-cli")]
#[command(about = "Control CLI for the telemetry load generator", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080")]
    url: String,

    /// Bearer token, when the server has `control.api_key` set.
    #[arg(short, long, env = "LOADGEN_API_KEY")]
    key: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show run state, live config and counters
    Status,
    /// Start the run loop, optionally changing config first
    Start(ConfigArgs),
    /// Stop the run loop
    Stop,
    /// Change the live config
    Config(ConfigArgs),
    /// Send a single well-formed message
    Invoke,
}

#[derive(Args)]
struct ConfigArgs {
    /// Requests per minute (1-300)
    #[arg(long)]
    rate: Option<i64>,
    /// Synthetic failure percentage (0-100)
    #[arg(long)]
    failure: Option<i64>,
    /// Injected latency in milliseconds
    #[arg(long)]
    latency: Option<i64>,
    /// Corruption percentage (0-100)
    #[arg(long)]
    corruption: Option<i64>,
}

impl From<ConfigArgs> for ConfigUpdate {
    fn from(args: ConfigArgs) -> Self {
        ConfigUpdate {
            rate_per_minute: args.rate,
            failure_rate_pct: args.failure,
            latency_ms: args.latency,
            corruption_pct: args.corruption,
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    let mut headers = HeaderMap::new();
    if let Some(key) = &cli.key {
        headers.insert(AUTHORIZATION, HeaderValue::from_str(&format!("Bearer {}", key))?);
    }

    let base = cli.url.trim_end_matches('/');
    let res = match cli.command {
        Commands::Status => client.get(format!("{}/status", base)).send().await?,
        Commands::Start(args) => {
            client
                .post(format!("{}/start", base))
                .headers(headers)
                .json(&ConfigUpdate::from(args))
                .send()
                .await?
        }
        Commands::Stop => {
            client
                .post(format!("{}/stop", base))
                .headers(headers)
                .send()
                .await?
        }
        Commands::Config(args) => {
            client
                .post(format!("{}/config", base))
                .headers(headers)
                .json(&ConfigUpdate::from(args))
                .send()
                .await?
        }
        Commands::Invoke => {
            client
                .post(format!("{}/invoke-once", base))
                .headers(headers)
                .send()
                .await?
        }
    };

    print_response(res).await
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: control API returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        return Ok(());
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
