use std::collections::HashMap;

use crate::types::{QualifyingSwap, TraderAggregate};

/// Per-wallet accumulators for a single leaderboard call.
///
/// Aggregates live in first-seen order so that ranking ties resolve to the
/// order wallets appeared in the input. `index` maps the maker address,
/// verbatim and case-sensitive, to its slot in `traders`.
#[derive(Debug, Default)]
pub struct TraderBook {
    traders: Vec<TraderAggregate>,
    index: HashMap<String, usize>,
}

impl TraderBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one qualifying swap into its wallet's aggregate.
    pub fn record(&mut self, swap: QualifyingSwap<'_>) {
        let slot = match self.index.get(swap.maker) {
            Some(&i) => i,
            None => {
                self.traders.push(TraderAggregate {
                    wallet: swap.maker.to_string(),
                    total_usd: 0.0,
                    order_count: 0,
                    avg_price: 0.0,
                    first_tx: swap.timestamp,
                    last_tx: swap.timestamp,
                    tx_hashes: Vec::new(),
                });
                let slot = self.traders.len() - 1;
                self.index.insert(swap.maker.to_string(), slot);
                slot
            }
        };

        let trader = &mut self.traders[slot];
        trader.total_usd += swap.amount_usd;
        trader.order_count += 1;
        trader.avg_price = trader.total_usd / trader.order_count as f64;
        trader.first_tx = trader.first_tx.min(swap.timestamp);
        trader.last_tx = trader.last_tx.max(swap.timestamp);
        trader.tx_hashes.push(swap.tx_hash.to_string());
    }

    pub fn len(&self) -> usize {
        self.traders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.traders.is_empty()
    }

    pub fn get(&self, wallet: &str) -> Option<&TraderAggregate> {
        self.index.get(wallet).map(|&i| &self.traders[i])
    }

    /// Consume the book, returning the `limit` largest wallets by total USD.
    /// The sort is stable, so equal totals keep first-seen order.
    pub fn into_ranked(self, limit: usize) -> Vec<TraderAggregate> {
        let mut ranked = self.traders;
        ranked.sort_by(|a, b| b.total_usd.total_cmp(&a.total_usd));
        ranked.truncate(limit);
        ranked
    }
}
