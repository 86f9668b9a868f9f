use std::time::Duration;

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tracing::debug;
use url::Url;

use crate::api::EventSource;
use crate::error::FetchError;
use crate::types::{EventPage, EventQuery, TokenInfo};

const FIND_TOKEN_QUERY: &str = r#"
query($phrase: String!, $networkId: Int!) {
    filterTokens(
        phrase: $phrase
        filters: {
            networkIds: [$networkId]
            minVolume24: 10000
            minLiquidityUsd: 5000
        }
        rankings: [{ attribute: trendingScore24, direction: DESC }, { attribute: volume24, direction: DESC }]
        limit: 1
    ) {
        nodes {
            id
            address
            networkId
            name
            symbol
            pairs {
                address
                liquidity
                volume24
            }
        }
    }
}
"#;

const TOKEN_EVENTS_QUERY: &str = r#"
query($pairAddress: String!, $networkId: Int!, $from: Int!, $to: Int!, $minUsd: Float, $limit: Int, $cursor: String) {
    getTokenEvents(
        limit: $limit
        cursor: $cursor
        query: {
            pairAddress: $pairAddress
            networkId: $networkId
            from: $from
            to: $to
            minUsd: $minUsd
            eventTypes: [SWAP]
        }
    ) {
        nodes {
            id
            txHash
            timestamp
            side
            maker
            amountUsd
            priceUsd
        }
        pageInfo {
            endCursor
            hasNextPage
        }
    }
}
"#;

#[derive(Deserialize)]
struct GqlResponse<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Option<Vec<GqlError>>,
}

#[derive(Deserialize)]
struct GqlError {
    message: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct FilterTokensData {
    filter_tokens: Option<TokenNodes>,
}

#[derive(Deserialize)]
struct TokenNodes {
    #[serde(default)]
    nodes: Vec<TokenInfo>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TokenEventsData {
    get_token_events: Option<EventPage>,
}

/// GraphQL client for the Codex (defined.fi) API.
///
/// Cheap to clone; clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct CodexClient {
    http: reqwest::Client,
    endpoint: Url,
    api_key: String,
}

impl CodexClient {
    pub fn new(api_key: &str, endpoint: Url, timeout: Duration) -> Result<Self, FetchError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            endpoint,
            api_key: api_key.to_string(),
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Run a GraphQL query and decode its `data` field.
    pub async fn gql<T: DeserializeOwned>(
        &self,
        query: &str,
        variables: Value,
    ) -> Result<T, FetchError> {
        let resp = self
            .http
            .post(self.endpoint.clone())
            .header("x-api-key", &self.api_key)
            .json(&json!({ "query": query, "variables": variables }))
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await?;
        if !status.is_success() {
            return Err(FetchError::Upstream(format!("HTTP {status}: {body}")));
        }

        let parsed: GqlResponse<T> = serde_json::from_str(&body)?;
        if let Some(errors) = parsed.errors.filter(|e| !e.is_empty()) {
            let messages: Vec<String> = errors.into_iter().map(|e| e.message).collect();
            return Err(FetchError::Upstream(messages.join("; ")));
        }
        parsed
            .data
            .ok_or_else(|| FetchError::Malformed("response has no data".into()))
    }

    /// Look up the best-matching token for a search phrase on a network.
    pub async fn find_token(&self, phrase: &str, network_id: u64) -> Result<TokenInfo, FetchError> {
        let data: FilterTokensData = self
            .gql(
                FIND_TOKEN_QUERY,
                json!({ "phrase": phrase, "networkId": network_id }),
            )
            .await?;
        let token = data
            .filter_tokens
            .and_then(|t| t.nodes.into_iter().next())
            .ok_or_else(|| FetchError::NotFound(format!("no token matching \"{phrase}\"")))?;
        debug!(
            "Found token {} ({} pair(s))",
            token.address,
            token.pairs.len()
        );
        Ok(token)
    }
}

impl EventSource for CodexClient {
    async fn fetch_page(
        &self,
        query: &EventQuery,
        limit: usize,
        cursor: Option<&str>,
    ) -> Result<EventPage, FetchError> {
        let min_usd = (query.min_usd > 0.0).then_some(query.min_usd);
        let data: TokenEventsData = self
            .gql(
                TOKEN_EVENTS_QUERY,
                json!({
                    "pairAddress": query.pair_address,
                    "networkId": query.network_id,
                    "from": query.from,
                    "to": query.to,
                    "minUsd": min_usd,
                    "limit": limit,
                    "cursor": cursor,
                }),
            )
            .await?;
        data.get_token_events
            .ok_or_else(|| FetchError::Malformed("getTokenEvents is null".into()))
    }
}
