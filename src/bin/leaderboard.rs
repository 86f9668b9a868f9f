use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::{info, warn};

use top_traders::client::CodexClient;
use top_traders::config::{AppConfig, CONFIG_PATH};
use top_traders::engine;
use top_traders::error::FetchError;
use top_traders::reporter;
use top_traders::types::{EventQuery, LeaderboardReport, TimeRange, TokenSummary};

#[derive(Parser)]
#[command(name = "leaderboard", about = "Top wallets by swap volume on a trading pair")]
struct Args {
    /// Token name or symbol to look up; its most liquid pair is used
    #[arg(long, required_unless_present = "pair", conflicts_with = "pair")]
    token: Option<String>,

    /// Pair address to query directly
    #[arg(long)]
    pair: Option<String>,

    /// Network id (defaults to the config value)
    #[arg(long)]
    network: Option<u64>,

    /// Minimum USD amount per swap (defaults to the config value)
    #[arg(long)]
    min_usd: Option<f64>,

    /// Lookback window in hours (defaults to the config value)
    #[arg(long)]
    hours: Option<u64>,

    /// Path to the config file
    #[arg(long, default_value = CONFIG_PATH)]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    if dotenvy::dotenv().is_err() {
        info!("No .env file found, using process environment");
    }

    let args = Args::parse();
    match leaderboard(&args).await {
        Ok(report) => {
            reporter::report_leaderboard(&report);
            Ok(())
        }
        Err(e) => {
            reporter::report_failure(&format!("{e:#}"));
            Err(e)
        }
    }
}

/// Resolve settings and the API client, then build the report. Every failure,
/// including bad arguments and config, comes back through here.
async fn leaderboard(args: &Args) -> Result<LeaderboardReport> {
    let config = AppConfig::load_or_default(&args.config)?;

    let network_id = args.network.unwrap_or(config.settings.network_id);
    let min_usd = args.min_usd.unwrap_or(config.settings.min_usd);
    let lookback_hours = args.hours.unwrap_or(config.settings.lookback_hours);
    if network_id == 0 {
        anyhow::bail!("--network must be positive");
    }
    if !(min_usd.is_finite() && min_usd >= 0.0) {
        anyhow::bail!("--min-usd must be a non-negative number");
    }

    let api_key = config.codex.resolve_api_key()?;
    let client = CodexClient::new(&api_key, config.codex.endpoint.clone(), config.codex.timeout())?;

    let report = run(&client, args, network_id, min_usd, lookback_hours).await?;
    if report.traders.is_empty() {
        warn!("No traders above ${min_usd:.2} in the last {lookback_hours}h");
    }
    Ok(report)
}

async fn run(
    client: &CodexClient,
    args: &Args,
    network_id: u64,
    min_usd: f64,
    lookback_hours: u64,
) -> Result<LeaderboardReport, FetchError> {
    let (pair_address, token) = match (&args.pair, &args.token) {
        (Some(pair), _) => (pair.clone(), None),
        (None, Some(phrase)) => {
            info!("Looking up token \"{phrase}\" on network {network_id}...");
            let token = client.find_token(phrase, network_id).await?;
            let pair = token.main_pair().ok_or_else(|| {
                FetchError::NotFound(format!("token {} has no trading pairs", token.address))
            })?;
            info!(
                "Using pair {} (liquidity ${:.2})",
                pair.address,
                pair.liquidity.unwrap_or(0.0)
            );
            (pair.address.clone(), Some(TokenSummary::from(&token)))
        }
        (None, None) => {
            return Err(FetchError::InvalidQuery("either --token or --pair is required".into()));
        }
    };

    let now = chrono::Utc::now();
    let to = now.timestamp();
    let from = to - (lookback_hours as i64) * 3600;

    let query = EventQuery {
        pair_address,
        network_id,
        min_usd,
        from,
        to,
    };
    let traders = engine::top_traders(client, &query).await?;

    Ok(LeaderboardReport {
        success: true,
        generated_at: now.to_rfc3339(),
        token,
        pair_address: query.pair_address,
        network_id,
        time_range: TimeRange { from, to },
        min_usd,
        traders,
    })
}
