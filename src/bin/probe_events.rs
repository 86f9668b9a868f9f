//! Probe: raw `getTokenEvents` page
//!
//! Fetches a single page of swaps for a pair and documents:
//! - Latency of one request
//! - Page info (cursor, hasNextPage)
//! - Shape of the first node

use std::path::Path;
use std::time::Instant;

use anyhow::Result;
use clap::Parser;

use top_traders::api::EventSource;
use top_traders::client::CodexClient;
use top_traders::config::{AppConfig, CONFIG_PATH};
use top_traders::types::EventQuery;

#[derive(Parser)]
#[command(name = "probe_events", about = "Fetch one raw page of swap events")]
struct Args {
    /// Pair address
    #[arg(long)]
    pair: String,

    #[arg(long, default_value_t = 1)]
    network: u64,

    /// Lookback window in hours
    #[arg(long, default_value_t = 1)]
    hours: u64,

    #[arg(long, default_value_t = 10)]
    limit: usize,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();
    let config = AppConfig::load_or_default(Path::new(CONFIG_PATH))?;
    let client = CodexClient::new(
        &config.codex.resolve_api_key()?,
        config.codex.endpoint.clone(),
        config.codex.timeout(),
    )?;

    let to = chrono::Utc::now().timestamp();
    let query = EventQuery {
        pair_address: args.pair.clone(),
        network_id: args.network,
        min_usd: 0.0,
        from: to - (args.hours as i64) * 3600,
        to,
    };

    println!("=== Probe: getTokenEvents ===");
    println!("Endpoint: {}", client.endpoint());
    println!("Pair: {} (network {})", args.pair, args.network);
    println!();

    let start = Instant::now();
    let page = client.fetch_page(&query, args.limit, None).await?;
    let latency = start.elapsed();

    println!("Latency: {:?}", latency);
    println!("Nodes: {}", page.nodes.len());
    println!("End cursor: {:?}", page.page_info.end_cursor);
    println!("Has next page: {}", page.page_info.has_next_page);

    if let Some(first) = page.nodes.first() {
        println!("\nSample event (first):");
        println!("{}", serde_json::to_string_pretty(first)?);
    }

    let malformed = page
        .nodes
        .iter()
        .filter(|e| e.qualifying(0.0).is_none())
        .count();
    println!("\nNodes missing maker/txHash/timestamp/amountUsd: {malformed}");

    println!("\n=== Probe Complete ===");
    Ok(())
}
