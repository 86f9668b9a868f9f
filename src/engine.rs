use tracing::info;

use crate::LEADERBOARD_SIZE;
use crate::api::{EventSource, fetch_events};
use crate::error::FetchError;
use crate::state::TraderBook;
use crate::types::{EventQuery, SwapEvent, TraderAggregate};

/// Build the top-traders leaderboard from a list of swaps.
///
/// Each event is re-checked against `min_usd` regardless of any server-side
/// floor; events missing a maker, tx hash, timestamp or USD amount are
/// skipped. Wallets are grouped by maker address verbatim and ranked by total
/// USD descending, with ties kept in first-seen order. At most
/// `LEADERBOARD_SIZE` wallets are returned.
///
/// A negative or non-finite `min_usd` is treated as zero.
pub fn aggregate(events: &[SwapEvent], min_usd: f64) -> Vec<TraderAggregate> {
    let min_usd = if min_usd.is_finite() && min_usd > 0.0 {
        min_usd
    } else {
        0.0
    };
    let mut book = TraderBook::new();
    for swap in events.iter().filter_map(|e| e.qualifying(min_usd)) {
        book.record(swap);
    }
    book.into_ranked(LEADERBOARD_SIZE)
}

/// Fetch a pair's swaps for the query window and rank its top traders.
///
/// An empty leaderboard is a valid result; only upstream failures are errors.
pub async fn top_traders<S: EventSource>(
    source: &S,
    query: &EventQuery,
) -> Result<Vec<TraderAggregate>, FetchError> {
    let events = fetch_events(source, query).await?;
    let traders = aggregate(&events, query.min_usd);
    info!(
        "Ranked {} trader(s) from {} event(s) on pair {} (min ${:.2})",
        traders.len(),
        events.len(),
        query.pair_address,
        query.min_usd,
    );
    Ok(traders)
}
