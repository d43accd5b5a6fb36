//! The cache itself.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use thiserror::Error;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::key::QueryKey;

/// Outcome of a shared fetch. Errors are reference-counted so every waiter
/// on a de-duplicated request observes the same failure.
type SharedResult<T, E> = Result<T, Arc<E>>;

/// Error returned by cache reads.
#[derive(Debug, Error)]
pub enum QueryError<E> {
    /// The underlying fetch failed.
    #[error("{0}")]
    Fetch(Arc<E>),
    /// The fetch task died without publishing a result.
    #[error("fetch task aborted")]
    Aborted,
}

enum Entry<T, E> {
    /// A settled value and when it was fetched.
    Ready { value: T, fetched_at: Instant },
    /// A fetch is running; waiters subscribe to its outcome.
    InFlight(watch::Receiver<Option<SharedResult<T, E>>>),
}

/// Cache for one resource type, keyed by [`QueryKey`].
///
/// `stale_time` controls the fresh window: a cached value younger than the
/// window is served without fetching. A cache built with [`QueryCache::new`]
/// has no fresh window — every read refetches, though concurrent reads still
/// share one request.
pub struct QueryCache<T, E> {
    stale_time: Option<Duration>,
    entries: Arc<Mutex<HashMap<QueryKey, Entry<T, E>>>>,
}

impl<T, E> Clone for QueryCache<T, E> {
    fn clone(&self) -> Self {
        Self {
            stale_time: self.stale_time,
            entries: Arc::clone(&self.entries),
        }
    }
}

impl<T, E> Default for QueryCache<T, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, E> QueryCache<T, E> {
    /// Cache without a fresh window: every read refetches.
    pub fn new() -> Self {
        Self {
            stale_time: None,
            entries: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Cache that serves values younger than `stale_time` without fetching.
    pub fn with_stale_time(stale_time: Duration) -> Self {
        Self {
            stale_time: Some(stale_time),
            ..Self::new()
        }
    }

    /// Read through the cache.
    ///
    /// Returns the cached value when it is still fresh; joins an in-flight
    /// request when one exists for this key; otherwise starts `fetch` on a
    /// spawned task, stores its result and shares the outcome with every
    /// concurrent caller. A successful fetch overwrites the entry
    /// unconditionally (last response wins); a failed fetch is not cached,
    /// so the next read retries.
    pub async fn get_with<F>(&self, key: QueryKey, fetch: F) -> Result<T, QueryError<E>>
    where
        T: Clone + Send + Sync + 'static,
        E: Send + Sync + 'static,
        F: Future<Output = Result<T, E>> + Send + 'static,
    {
        let mut started = None;
        let rx = {
            let mut entries = self.lock();
            let joined = match entries.get(&key) {
                Some(Entry::Ready { value, fetched_at }) if self.is_fresh(*fetched_at) => {
                    return Ok(value.clone());
                }
                Some(Entry::InFlight(rx)) => Some(rx.clone()),
                _ => None,
            };
            match joined {
                Some(rx) => rx,
                None => {
                    let (tx, rx) = watch::channel(None);
                    entries.insert(key.clone(), Entry::InFlight(rx.clone()));
                    started = Some(tx);
                    rx
                }
            }
        };

        if let Some(tx) = started {
            let entries = Arc::clone(&self.entries);
            let key = key.clone();
            tokio::spawn(async move {
                let result: SharedResult<T, E> = fetch.await.map_err(Arc::new);
                {
                    let mut entries =
                        entries.lock().unwrap_or_else(PoisonError::into_inner);
                    match &result {
                        Ok(value) => {
                            entries.insert(
                                key,
                                Entry::Ready {
                                    value: value.clone(),
                                    fetched_at: Instant::now(),
                                },
                            );
                        }
                        Err(_) => {
                            entries.remove(&key);
                        }
                    }
                }
                let _ = tx.send(Some(result));
            });
        }

        Self::wait(rx).await
    }

    /// Drop every settled entry belonging to `resource`.
    ///
    /// In-flight fetches are left alone: their waiters still resolve, and
    /// their results land under last-response-wins like any other.
    pub fn invalidate(&self, resource: &str) {
        let mut entries = self.lock();
        let before = entries.len();
        entries.retain(|key, entry| {
            key.resource() != resource || matches!(entry, Entry::InFlight(_))
        });
        let removed = before - entries.len();
        if removed > 0 {
            debug!(resource, removed, "Invalidated cached queries");
        }
    }

    /// Drop every settled entry in the cache.
    pub fn invalidate_all(&self) {
        let mut entries = self.lock();
        entries.retain(|_, entry| matches!(entry, Entry::InFlight(_)));
    }

    /// Start a background refresh loop for one key.
    ///
    /// Each tick refreshes the entry in place; failures are logged and
    /// counted until the next success, in case the backend goes away for a
    /// while.
    pub fn spawn_poller<F, Fut>(
        &self,
        key: QueryKey,
        interval: Duration,
        mut fetch: F,
    ) -> JoinHandle<()>
    where
        T: Clone + Send + Sync + 'static,
        E: std::fmt::Display + Send + Sync + 'static,
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
    {
        let entries = Arc::clone(&self.entries);

        tokio::spawn(async move {
            let mut consecutive_failures = 0u32;

            loop {
                tokio::time::sleep(interval).await;

                match fetch().await {
                    Ok(value) => {
                        if consecutive_failures > 0 {
                            info!(key = %key, "Background refresh recovered");
                        }
                        consecutive_failures = 0;
                        entries
                            .lock()
                            .unwrap_or_else(PoisonError::into_inner)
                            .insert(
                                key.clone(),
                                Entry::Ready {
                                    value,
                                    fetched_at: Instant::now(),
                                },
                            );
                    }
                    Err(err) => {
                        consecutive_failures += 1;
                        warn!(
                            key = %key,
                            failures = consecutive_failures,
                            "Background refresh failed: {}",
                            err
                        );
                    }
                }
            }
        })
    }

    async fn wait(
        mut rx: watch::Receiver<Option<SharedResult<T, E>>>,
    ) -> Result<T, QueryError<E>>
    where
        T: Clone,
    {
        loop {
            {
                let current = rx.borrow_and_update();
                if let Some(result) = current.as_ref() {
                    return match result {
                        Ok(value) => Ok(value.clone()),
                        Err(err) => Err(QueryError::Fetch(Arc::clone(err))),
                    };
                }
            }
            if rx.changed().await.is_err() {
                let current = rx.borrow();
                return match current.as_ref() {
                    Some(Ok(value)) => Ok(value.clone()),
                    Some(Err(err)) => Err(QueryError::Fetch(Arc::clone(err))),
                    None => Err(QueryError::Aborted),
                };
            }
        }
    }

    fn is_fresh(&self, fetched_at: Instant) -> bool {
        match self.stale_time {
            Some(window) => fetched_at.elapsed() < window,
            None => false,
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<QueryKey, Entry<T, E>>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<T, E> std::fmt::Debug for QueryCache<T, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryCache")
            .field("stale_time", &self.stale_time)
            .field("entries", &self.lock().len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counting_fetch(
        counter: &Arc<AtomicUsize>,
        value: i64,
        delay: Duration,
    ) -> impl Future<Output = Result<i64, String>> + Send + 'static {
        let counter = Arc::clone(counter);
        async move {
            counter.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(delay).await;
            Ok(value)
        }
    }

    #[tokio::test]
    async fn concurrent_readers_share_one_fetch() {
        let cache: QueryCache<i64, String> = QueryCache::new();
        let counter = Arc::new(AtomicUsize::new(0));
        let key = QueryKey::with_params("clients", [("page", "1")]);

        let first = cache.get_with(
            key.clone(),
            counting_fetch(&counter, 7, Duration::from_millis(50)),
        );
        let second = cache.get_with(
            key.clone(),
            counting_fetch(&counter, 8, Duration::from_millis(50)),
        );

        let (first, second) = tokio::join!(first, second);
        assert_eq!(first.unwrap(), 7);
        assert_eq!(second.unwrap(), 7);
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn fresh_values_are_served_without_fetching() {
        let cache: QueryCache<i64, String> = QueryCache::with_stale_time(Duration::from_secs(60));
        let counter = Arc::new(AtomicUsize::new(0));
        let key = QueryKey::new("statistics");

        let first = cache
            .get_with(key.clone(), counting_fetch(&counter, 1, Duration::ZERO))
            .await
            .unwrap();
        let second = cache
            .get_with(key.clone(), counting_fetch(&counter, 2, Duration::ZERO))
            .await
            .unwrap();

        assert_eq!(first, 1);
        assert_eq!(second, 1);
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn without_a_fresh_window_every_read_refetches() {
        let cache: QueryCache<i64, String> = QueryCache::new();
        let counter = Arc::new(AtomicUsize::new(0));
        let key = QueryKey::new("history");

        cache
            .get_with(key.clone(), counting_fetch(&counter, 1, Duration::ZERO))
            .await
            .unwrap();
        let second = cache
            .get_with(key.clone(), counting_fetch(&counter, 2, Duration::ZERO))
            .await
            .unwrap();

        assert_eq!(second, 2);
        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn invalidation_forces_the_next_read_to_fetch() {
        let cache: QueryCache<i64, String> = QueryCache::with_stale_time(Duration::from_secs(60));
        let counter = Arc::new(AtomicUsize::new(0));
        let key = QueryKey::with_params("clients", [("page", "1")]);

        cache
            .get_with(key.clone(), counting_fetch(&counter, 1, Duration::ZERO))
            .await
            .unwrap();
        cache.invalidate("clients");
        let refreshed = cache
            .get_with(key.clone(), counting_fetch(&counter, 2, Duration::ZERO))
            .await
            .unwrap();

        assert_eq!(refreshed, 2);
        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn invalidation_only_touches_the_named_resource() {
        let cache: QueryCache<i64, String> = QueryCache::with_stale_time(Duration::from_secs(60));
        let counter = Arc::new(AtomicUsize::new(0));
        let clients = QueryKey::with_params("clients", [("page", "1")]);
        let history = QueryKey::with_params("history", [("page", "1")]);

        cache
            .get_with(clients.clone(), counting_fetch(&counter, 1, Duration::ZERO))
            .await
            .unwrap();
        cache
            .get_with(history.clone(), counting_fetch(&counter, 2, Duration::ZERO))
            .await
            .unwrap();

        cache.invalidate("clients");

        let untouched = cache
            .get_with(history, counting_fetch(&counter, 3, Duration::ZERO))
            .await
            .unwrap();
        assert_eq!(untouched, 2);
        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn errors_are_shared_but_not_cached() {
        let cache: QueryCache<i64, String> = QueryCache::with_stale_time(Duration::from_secs(60));
        let counter = Arc::new(AtomicUsize::new(0));
        let key = QueryKey::new("statistics");

        let failing = |counter: &Arc<AtomicUsize>| {
            let counter = Arc::clone(counter);
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(30)).await;
                Err::<i64, String>("backend down".to_string())
            }
        };

        let first = cache.get_with(key.clone(), failing(&counter));
        let second = cache.get_with(key.clone(), failing(&counter));
        let (first, second) = tokio::join!(first, second);

        assert!(matches!(first, Err(QueryError::Fetch(_))));
        assert!(matches!(second, Err(QueryError::Fetch(_))));
        assert_eq!(counter.load(Ordering::SeqCst), 1);

        // The failure was not cached: a later read retries and succeeds.
        let recovered = cache
            .get_with(key, counting_fetch(&counter, 5, Duration::ZERO))
            .await
            .unwrap();
        assert_eq!(recovered, 5);
        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn a_dropped_reader_does_not_lose_the_fetch() {
        let cache: QueryCache<i64, String> = QueryCache::with_stale_time(Duration::from_secs(60));
        let counter = Arc::new(AtomicUsize::new(0));
        let key = QueryKey::with_params("clients", [("page", "1")]);

        let reader = {
            let cache = cache.clone();
            let fetch = counting_fetch(&counter, 9, Duration::from_millis(40));
            let key = key.clone();
            tokio::spawn(async move { cache.get_with(key, fetch).await })
        };
        tokio::time::sleep(Duration::from_millis(5)).await;
        reader.abort();
        tokio::time::sleep(Duration::from_millis(80)).await;

        // The abandoned fetch still completed and settled the entry.
        let value = cache
            .get_with(key, counting_fetch(&counter, 10, Duration::ZERO))
            .await
            .unwrap();
        assert_eq!(value, 9);
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn poller_keeps_the_entry_warm() {
        let cache: QueryCache<i64, String> = QueryCache::with_stale_time(Duration::from_secs(60));
        let counter = Arc::new(AtomicUsize::new(0));
        let key = QueryKey::new("statistics");

        let poll_counter = Arc::clone(&counter);
        let handle = cache.spawn_poller(key.clone(), Duration::from_millis(10), move || {
            let counter = Arc::clone(&poll_counter);
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok::<i64, String>(42)
            }
        });

        tokio::time::sleep(Duration::from_millis(100)).await;
        handle.abort();

        let read_counter = Arc::new(AtomicUsize::new(0));
        let value = cache
            .get_with(key, counting_fetch(&read_counter, 0, Duration::ZERO))
            .await
            .unwrap();

        assert_eq!(value, 42);
        // The read was served from the poller's entry, not a fresh fetch.
        assert_eq!(read_counter.load(Ordering::SeqCst), 0);
        assert!(counter.load(Ordering::SeqCst) >= 1);
    }
}
