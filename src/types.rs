use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

// ── Upstream shapes ────────────────────────────────────────────────

/// A single swap against a pair, as returned by `getTokenEvents`.
///
/// All fields are optional so one malformed node never fails a whole page.
/// Numeric fields accept JSON numbers or numeric strings; string fields accept
/// only strings. Anything else decodes as `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapEvent {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub tx_hash: Option<String>,
    #[serde(default, deserialize_with = "lenient_i64")]
    pub timestamp: Option<i64>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub side: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub maker: Option<String>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub amount_usd: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub price_usd: Option<f64>,
}

/// The fields of a [`SwapEvent`] the aggregator needs, all present.
#[derive(Debug, Clone, Copy)]
pub struct QualifyingSwap<'a> {
    pub maker: &'a str,
    pub tx_hash: &'a str,
    pub timestamp: i64,
    pub amount_usd: f64,
}

impl SwapEvent {
    /// Returns the event's trade data if it is well-formed and its USD
    /// amount is at least `min_usd`.
    pub fn qualifying(&self, min_usd: f64) -> Option<QualifyingSwap<'_>> {
        let amount_usd = self.amount_usd.filter(|v| v.is_finite())?;
        if amount_usd < min_usd {
            return None;
        }
        Some(QualifyingSwap {
            maker: self.maker.as_deref()?,
            tx_hash: self.tx_hash.as_deref()?,
            timestamp: self.timestamp?,
            amount_usd,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    #[serde(default)]
    pub end_cursor: Option<String>,
    #[serde(default)]
    pub has_next_page: bool,
}

/// One page of `getTokenEvents` results.
///
/// Nodes that are not JSON objects are dropped while decoding.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventPage {
    #[serde(default, deserialize_with = "lenient_nodes")]
    pub nodes: Vec<SwapEvent>,
    pub page_info: PageInfo,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PairInfo {
    pub address: String,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub liquidity: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub volume24: Option<f64>,
}

/// Best match returned by `filterTokens`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenInfo {
    #[serde(default)]
    pub id: Option<String>,
    pub address: String,
    #[serde(default)]
    pub network_id: Option<u64>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub symbol: Option<String>,
    #[serde(default)]
    pub pairs: Vec<PairInfo>,
}

impl TokenInfo {
    /// The pair with the most liquidity. Missing liquidity counts as zero;
    /// on ties the first listed pair wins.
    pub fn main_pair(&self) -> Option<&PairInfo> {
        self.pairs.iter().reduce(|best, pair| {
            if pair.liquidity.unwrap_or(0.0) > best.liquidity.unwrap_or(0.0) {
                pair
            } else {
                best
            }
        })
    }
}

// ── Engine types ───────────────────────────────────────────────────

/// Parameters of a single leaderboard request.
#[derive(Debug, Clone, PartialEq)]
pub struct EventQuery {
    pub pair_address: String,
    pub network_id: u64,
    /// Minimum USD amount per swap. Zero disables the server-side floor.
    pub min_usd: f64,
    /// Window start, Unix seconds.
    pub from: i64,
    /// Window end, Unix seconds.
    pub to: i64,
}

/// Running statistics for one wallet.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TraderAggregate {
    pub wallet: String,
    pub total_usd: f64,
    #[serde(rename = "orders")]
    pub order_count: u64,
    /// `total_usd / order_count`, recomputed on every update.
    pub avg_price: f64,
    pub first_tx: i64,
    pub last_tx: i64,
    /// Transaction hashes in processing order.
    pub tx_hashes: Vec<String>,
}

// ── Report types ───────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenSummary {
    pub name: Option<String>,
    pub symbol: Option<String>,
    pub address: String,
}

impl From<&TokenInfo> for TokenSummary {
    fn from(token: &TokenInfo) -> Self {
        Self {
            name: token.name.clone(),
            symbol: token.symbol.clone(),
            address: token.address.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TimeRange {
    pub from: i64,
    pub to: i64,
}

/// Final output of a leaderboard run.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardReport {
    pub success: bool,
    pub generated_at: String,
    pub token: Option<TokenSummary>,
    pub pair_address: String,
    pub network_id: u64,
    pub time_range: TimeRange,
    pub min_usd: f64,
    pub traders: Vec<TraderAggregate>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FailureReport {
    pub success: bool,
    pub message: String,
}

// ── Lenient decoding ───────────────────────────────────────────────

fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    let parsed = match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    Ok(parsed.filter(|v| v.is_finite()))
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => Some(s),
        _ => None,
    })
}

fn lenient_nodes<'de, D>(deserializer: D) -> Result<Vec<SwapEvent>, D::Error>
where
    D: Deserializer<'de>,
{
    let nodes = Option::<Vec<Value>>::deserialize(deserializer)?.unwrap_or_default();
    Ok(nodes
        .into_iter()
        .filter(Value::is_object)
        .filter_map(|node| serde_json::from_value(node).ok())
        .collect())
}

fn lenient_i64<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Number(n)) => n.as_i64(),
        Some(Value::String(s)) => s.trim().parse::<i64>().ok(),
        _ => None,
    })
}
