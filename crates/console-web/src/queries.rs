//! Cached backend reads and their policies.
//!
//! Each resource gets its own cache with the policy the console relies on:
//!
//! | query          | stale window | background poll |
//! |----------------|--------------|-----------------|
//! | clients list   | 5 s          | 10 s (first page) |
//! | single client  | none         | none            |
//! | call history   | none         | none            |
//! | statistics     | 30 s         | 30 s            |
//!
//! Mutations (upload, process) do not cache anything themselves; on success
//! the caller invalidates the clients resource so the next read fetches
//! fresh. That is the only consistency mechanism between writes and reads,
//! and it is eventual: an already in-flight read may still land afterwards
//! (last response wins).

use std::time::Duration;

use collect_api::{
    AnalyticsData, ApiError, CallRecordWithClient, Client, ClientQuery, CollectClient,
    HistoryQuery, Page,
};
use query_cache::{QueryCache, QueryError, QueryKey};
use tokio::task::JoinHandle;

/// How long a clients page stays fresh after a fetch.
pub const CLIENTS_STALE_TIME: Duration = Duration::from_secs(5);
/// Background refresh interval for the first clients page.
pub const CLIENTS_POLL_INTERVAL: Duration = Duration::from_secs(10);
/// Background refresh interval for statistics; also its fresh window, so
/// reads are served from the polled entry.
pub const STATISTICS_POLL_INTERVAL: Duration = Duration::from_secs(30);

/// Result of a cached read.
pub type QueryResult<T> = Result<T, QueryError<ApiError>>;

/// The console's query caches.
#[derive(Clone)]
pub struct Queries {
    clients: QueryCache<Page<Client>, ApiError>,
    client: QueryCache<Client, ApiError>,
    history: QueryCache<Page<CallRecordWithClient>, ApiError>,
    statistics: QueryCache<AnalyticsData, ApiError>,
}

impl Default for Queries {
    fn default() -> Self {
        Self::new()
    }
}

impl Queries {
    pub fn new() -> Self {
        Self {
            clients: QueryCache::with_stale_time(CLIENTS_STALE_TIME),
            client: QueryCache::new(),
            history: QueryCache::new(),
            statistics: QueryCache::with_stale_time(STATISTICS_POLL_INTERVAL),
        }
    }

    /// Paginated clients listing.
    pub async fn clients(
        &self,
        api: &CollectClient,
        query: &ClientQuery,
    ) -> QueryResult<Page<Client>> {
        let api = api.clone();
        let query = query.clone();
        self.clients
            .get_with(clients_key(&query), async move {
                api.list_clients(&query).await
            })
            .await
    }

    /// Single client by id. Skipped entirely for a non-positive id.
    pub async fn client(&self, api: &CollectClient, id: i64) -> Option<QueryResult<Client>> {
        if id < 1 {
            return None;
        }
        let key = QueryKey::with_params("client", [("id", id.to_string())]);
        let api = api.clone();
        Some(
            self.client
                .get_with(key, async move { api.get_client(id).await })
                .await,
        )
    }

    /// Paginated call history.
    pub async fn history(
        &self,
        api: &CollectClient,
        query: &HistoryQuery,
    ) -> QueryResult<Page<CallRecordWithClient>> {
        let key = QueryKey::with_params("history", query.to_params());
        let api = api.clone();
        let query = query.clone();
        self.history
            .get_with(key, async move { api.call_history(&query).await })
            .await
    }

    /// Aggregate statistics (singleton key).
    pub async fn statistics(&self, api: &CollectClient) -> QueryResult<AnalyticsData> {
        let api = api.clone();
        self.statistics
            .get_with(QueryKey::new("statistics"), async move {
                api.statistics().await
            })
            .await
    }

    /// Invalidate the clients resource after a successful mutation.
    pub fn invalidate_clients(&self) {
        self.clients.invalidate("clients");
    }

    /// Start the background pollers that keep hot keys warm.
    pub fn spawn_pollers(&self, api: &CollectClient) -> Vec<JoinHandle<()>> {
        let clients_api = api.clone();
        let first_page = self.clients.spawn_poller(
            clients_key(&ClientQuery::default()),
            CLIENTS_POLL_INTERVAL,
            move || {
                let api = clients_api.clone();
                async move { api.list_clients(&ClientQuery::default()).await }
            },
        );

        let statistics_api = api.clone();
        let statistics = self.statistics.spawn_poller(
            QueryKey::new("statistics"),
            STATISTICS_POLL_INTERVAL,
            move || {
                let api = statistics_api.clone();
                async move { api.statistics().await }
            },
        );

        vec![first_page, statistics]
    }
}

fn clients_key(query: &ClientQuery) -> QueryKey {
    QueryKey::with_params("clients", query.to_params())
}
