use std::future::Future;

use tracing::debug;

use crate::error::FetchError;
use crate::types::{EventPage, EventQuery, SwapEvent};
use crate::{MAX_PAGES, PAGE_SIZE};

/// A paginated source of swap events for a pair.
pub trait EventSource {
    /// Fetch one page of at most `limit` swaps. `cursor` is `None` for the
    /// first page and the previous page's `end_cursor` afterwards.
    fn fetch_page(
        &self,
        query: &EventQuery,
        limit: usize,
        cursor: Option<&str>,
    ) -> impl Future<Output = Result<EventPage, FetchError>> + Send;
}

/// Fetch up to `MAX_PAGES` pages of swaps for the query's pair and window.
///
/// Pages are requested sequentially, each carrying the previous page's
/// cursor. The loop ends at the page cap, when the source reports no next
/// page, or when a page comes back shorter than `PAGE_SIZE`. Any error
/// aborts the whole fetch.
pub async fn fetch_events<S: EventSource>(
    source: &S,
    query: &EventQuery,
) -> Result<Vec<SwapEvent>, FetchError> {
    validate_query(query)?;

    let mut all = Vec::new();
    let mut cursor: Option<String> = None;

    for page_num in 0..MAX_PAGES {
        let page = source.fetch_page(query, PAGE_SIZE, cursor.as_deref()).await?;
        let count = page.nodes.len();
        all.extend(page.nodes);
        debug!(
            "Fetched page {} ({count} events, has_next_page={})",
            page_num + 1,
            page.page_info.has_next_page
        );

        if !page.page_info.has_next_page || count < PAGE_SIZE {
            break;
        }
        match page.page_info.end_cursor {
            Some(next) => cursor = Some(next),
            None => break,
        }
    }

    debug!("Fetched {} events for pair {}", all.len(), query.pair_address);
    Ok(all)
}

fn validate_query(query: &EventQuery) -> Result<(), FetchError> {
    if query.pair_address.trim().is_empty() {
        return Err(FetchError::InvalidQuery("pair address is empty".into()));
    }
    if query.network_id == 0 {
        return Err(FetchError::InvalidQuery("network id must be positive".into()));
    }
    if !query.min_usd.is_finite() || query.min_usd < 0.0 {
        return Err(FetchError::InvalidQuery(format!(
            "min_usd must be a non-negative number, got {}",
            query.min_usd
        )));
    }
    if query.from > query.to {
        return Err(FetchError::InvalidQuery(format!(
            "window start {} is after window end {}",
            query.from, query.to
        )));
    }
    Ok(())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::types::PageInfo;
    use std::sync::Mutex;

    /// Replays a fixed list of pages and records the cursor of every request.
    pub(crate) struct ScriptedSource {
        pages: Vec<Result<EventPage, FetchError>>,
        pub(crate) cursors: Mutex<Vec<Option<String>>>,
    }

    impl ScriptedSource {
        pub(crate) fn new(pages: Vec<Result<EventPage, FetchError>>) -> Self {
            Self {
                pages,
                cursors: Mutex::new(Vec::new()),
            }
        }

        pub(crate) fn requests(&self) -> usize {
            self.cursors.lock().unwrap().len()
        }
    }

    impl EventSource for ScriptedSource {
        async fn fetch_page(
            &self,
            _query: &EventQuery,
            limit: usize,
            cursor: Option<&str>,
        ) -> Result<EventPage, FetchError> {
            assert_eq!(limit, PAGE_SIZE);
            let mut cursors = self.cursors.lock().unwrap();
            let n = cursors.len();
            cursors.push(cursor.map(str::to_string));
            self.pages
                .get(n)
                .cloned()
                .unwrap_or_else(|| panic!("unexpected request for page {}", n + 1))
        }
    }

    pub(crate) fn make_event(maker: &str, tx: &str, ts: i64, usd: f64) -> SwapEvent {
        SwapEvent {
            id: Some(format!("{tx}-0")),
            tx_hash: Some(tx.to_string()),
            timestamp: Some(ts),
            side: Some("BUY".to_string()),
            maker: Some(maker.to_string()),
            amount_usd: Some(usd),
            price_usd: Some(1.0),
        }
    }

    pub(crate) fn make_page(
        start: usize,
        count: usize,
        cursor: Option<&str>,
        has_next: bool,
    ) -> EventPage {
        EventPage {
            nodes: (start..start + count)
                .map(|i| make_event(&format!("w{}", i % 7), &format!("0x{i}"), i as i64, 150.0))
                .collect(),
            page_info: PageInfo {
                end_cursor: cursor.map(str::to_string),
                has_next_page: has_next,
            },
        }
    }

    pub(crate) fn make_query(min_usd: f64) -> EventQuery {
        EventQuery {
            pair_address: "0xpair".to_string(),
            network_id: 1,
            min_usd,
            from: 1_000,
            to: 87_400,
        }
    }

    #[tokio::test]
    async fn stops_at_page_cap() {
        let source = ScriptedSource::new(vec![
            Ok(make_page(0, 100, Some("c1"), true)),
            Ok(make_page(100, 100, Some("c2"), true)),
            Ok(make_page(200, 100, Some("c3"), true)),
            Ok(make_page(300, 100, Some("c4"), true)),
        ]);
        let events = fetch_events(&source, &make_query(0.0)).await.unwrap();
        assert_eq!(events.len(), 300);
        assert_eq!(source.requests(), MAX_PAGES);
    }

    #[tokio::test]
    async fn two_hundred_fifty_events_over_three_pages() {
        let source = ScriptedSource::new(vec![
            Ok(make_page(0, 100, Some("c1"), true)),
            Ok(make_page(100, 100, Some("c2"), true)),
            Ok(make_page(200, 50, Some("c3"), true)),
        ]);
        let events = fetch_events(&source, &make_query(0.0)).await.unwrap();
        assert_eq!(events.len(), 250);
        assert_eq!(source.requests(), 3);
    }

    #[tokio::test]
    async fn chains_cursors() {
        let source = ScriptedSource::new(vec![
            Ok(make_page(0, 100, Some("c1"), true)),
            Ok(make_page(100, 100, Some("c2"), true)),
            Ok(make_page(200, 100, Some("c3"), true)),
        ]);
        fetch_events(&source, &make_query(0.0)).await.unwrap();
        let cursors = source.cursors.lock().unwrap().clone();
        assert_eq!(
            cursors,
            vec![None, Some("c1".to_string()), Some("c2".to_string())]
        );
    }

    #[tokio::test]
    async fn stops_when_no_next_page() {
        let source = ScriptedSource::new(vec![Ok(make_page(0, 100, Some("c1"), false))]);
        let events = fetch_events(&source, &make_query(0.0)).await.unwrap();
        assert_eq!(events.len(), 100);
        assert_eq!(source.requests(), 1);
    }

    #[tokio::test]
    async fn stops_on_short_page_even_if_more_claimed() {
        let source = ScriptedSource::new(vec![Ok(make_page(0, 40, Some("c1"), true))]);
        let events = fetch_events(&source, &make_query(0.0)).await.unwrap();
        assert_eq!(events.len(), 40);
        assert_eq!(source.requests(), 1);
    }

    #[tokio::test]
    async fn stops_when_cursor_missing() {
        let source = ScriptedSource::new(vec![Ok(make_page(0, 100, None, true))]);
        let events = fetch_events(&source, &make_query(0.0)).await.unwrap();
        assert_eq!(events.len(), 100);
        assert_eq!(source.requests(), 1);
    }

    #[tokio::test]
    async fn empty_first_page() {
        let source = ScriptedSource::new(vec![Ok(make_page(0, 0, None, false))]);
        let events = fetch_events(&source, &make_query(0.0)).await.unwrap();
        assert!(events.is_empty());
    }

    #[tokio::test]
    async fn error_aborts_without_partial_result() {
        let source = ScriptedSource::new(vec![
            Ok(make_page(0, 100, Some("c1"), true)),
            Err(FetchError::Upstream("rate limited".into())),
        ]);
        let err = fetch_events(&source, &make_query(0.0)).await.unwrap_err();
        assert_eq!(err, FetchError::Upstream("rate limited".into()));
        assert_eq!(source.requests(), 2);
    }

    #[tokio::test]
    async fn rejects_invalid_queries_before_fetching() {
        let source = ScriptedSource::new(vec![]);

        let mut q = make_query(0.0);
        q.pair_address = "  ".into();
        assert!(matches!(
            fetch_events(&source, &q).await,
            Err(FetchError::InvalidQuery(_))
        ));

        let mut q = make_query(0.0);
        q.network_id = 0;
        assert!(matches!(
            fetch_events(&source, &q).await,
            Err(FetchError::InvalidQuery(_))
        ));

        let q = make_query(-1.0);
        assert!(matches!(
            fetch_events(&source, &q).await,
            Err(FetchError::InvalidQuery(_))
        ));

        let mut q = make_query(0.0);
        q.from = q.to + 1;
        assert!(matches!(
            fetch_events(&source, &q).await,
            Err(FetchError::InvalidQuery(_))
        ));

        assert_eq!(source.requests(), 0);
    }
}
