//! Query gating and the in-memory response cache

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use super::invalidation::{InvalidationBus, InvalidationMessage};
use super::key::{build_key, CacheKey, KeyArg, TenantSegment};
use crate::config::CacheConfig;
use crate::models::FilterState;

/// A query's key plus whether it may be issued
///
/// A query whose required arguments are not all known yet is disabled; it is
/// simply not sent, and becomes enabled once a later render supplies them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuerySpec {
    pub key: CacheKey,
    pub enabled: bool,
}

impl QuerySpec {
    /// Build from possibly-missing positional arguments.
    ///
    /// Any `None` disables the query; missing arguments are left out of the key.
    pub fn build(
        domain: &str,
        resource: &str,
        args: &[Option<KeyArg>],
        filters: Option<&FilterState>,
        tenant: impl Into<TenantSegment>,
    ) -> Self {
        let enabled = args.iter().all(Option::is_some);
        let key = build_key(domain, resource, args.iter().flatten().cloned(), filters, tenant);
        Self { key, enabled }
    }

    #[must_use]
    pub const fn enabled(key: CacheKey) -> Self {
        Self { key, enabled: true }
    }
}

/// Response cache keyed by [`CacheKey`]
///
/// Entries are immutable once stored; a different tenant or filter state is a
/// different key and never touches existing entries.
pub struct QueryCache<V> {
    entries: moka::future::Cache<CacheKey, Arc<V>>,
}

impl<V> Clone for QueryCache<V> {
    fn clone(&self) -> Self {
        Self {
            entries: self.entries.clone(),
        }
    }
}

impl<V> std::fmt::Debug for QueryCache<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryCache")
            .field("entries", &self.entries.entry_count())
            .finish()
    }
}

impl<V: Send + Sync + 'static> QueryCache<V> {
    #[must_use]
    pub fn new(config: &CacheConfig) -> Self {
        Self {
            entries: moka::future::CacheBuilder::new(config.max_capacity)
                .time_to_live(Duration::from_secs(config.ttl_seconds))
                .build(),
        }
    }

    pub async fn get(&self, key: &CacheKey) -> Option<Arc<V>> {
        self.entries.get(key).await
    }

    pub async fn insert(&self, key: CacheKey, value: V) -> Arc<V> {
        let value = Arc::new(value);
        self.entries.insert(key, value.clone()).await;
        value
    }

    /// Cached value for the query, fetching on a miss.
    ///
    /// Returns `Ok(None)` without calling `fetch` when the query is disabled.
    /// Concurrent misses on the same key share one fetch. Failures are not
    /// cached.
    pub async fn fetch<F, Fut, E>(
        &self,
        spec: &QuerySpec,
        fetch: F,
    ) -> Result<Option<Arc<V>>, Arc<E>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
        E: Send + Sync + 'static,
    {
        if !spec.enabled {
            debug!(key = %spec.key, "Query disabled, not fetching");
            return Ok(None);
        }

        if let Some(hit) = self.entries.get(&spec.key).await {
            debug!(key = %spec.key, "Query cache hit");
            return Ok(Some(hit));
        }

        debug!(key = %spec.key, "Query cache miss");
        self.entries
            .try_get_with(spec.key.clone(), async move { fetch().await.map(Arc::new) })
            .await
            .map(Some)
    }

    /// Drop every entry `message` covers. Returns how many were dropped.
    pub async fn invalidate(&self, message: &InvalidationMessage) -> usize {
        let stale: Vec<Arc<CacheKey>> = self
            .entries
            .iter()
            .filter(|(key, _)| message.matches(key))
            .map(|(key, _)| key)
            .collect();

        for key in &stale {
            self.entries.invalidate(key.as_ref()).await;
        }

        debug!(?message, dropped = stale.len(), "Query cache invalidated");
        stale.len()
    }

    /// Apply every message published on `bus` until the bus is dropped.
    ///
    /// Must be called inside a tokio runtime.
    pub fn attach(&self, bus: &InvalidationBus) -> JoinHandle<()> {
        let cache = self.clone();
        let mut receiver = bus.subscribe();

        tokio::spawn(async move {
            loop {
                match receiver.recv().await {
                    Ok(message) => {
                        cache.invalidate(&message).await;
                    }
                    Err(RecvError::Lagged(missed)) => {
                        // Unknown messages were lost, nothing can be trusted
                        warn!(missed, "Invalidation receiver lagged, dropping all entries");
                        cache.entries.invalidate_all();
                    }
                    Err(RecvError::Closed) => break,
                }
            }
            debug!("Query cache detached from invalidation bus");
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::key::NO_ARGS;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn cache() -> QueryCache<String> {
        QueryCache::new(&CacheConfig::default())
    }

    fn overview() -> QuerySpec {
        QuerySpec::enabled(build_key("analytics", "overview", NO_ARGS, None, TenantSegment::own()))
    }

    #[test]
    fn test_missing_argument_disables_query() {
        let spec = QuerySpec::build(
            "transactions",
            "detail",
            &[None],
            None,
            TenantSegment::own(),
        );
        assert!(!spec.enabled);

        let spec = QuerySpec::build(
            "transactions",
            "detail",
            &[Some(KeyArg::Int(42))],
            None,
            TenantSegment::own(),
        );
        assert!(spec.enabled);
        assert_eq!(spec.key.args(), &[KeyArg::Int(42)]);
    }

    #[tokio::test]
    async fn test_disabled_query_never_fetches() {
        let cache = cache();
        let calls = AtomicUsize::new(0);
        let counter = &calls;
        let spec = QuerySpec::build(
            "transactions",
            "detail",
            &[None],
            None,
            TenantSegment::own(),
        );

        let result = cache
            .fetch(&spec, || async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok::<_, String>("row".to_string())
            })
            .await
            .unwrap();

        assert!(result.is_none());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_second_fetch_is_a_hit() {
        let cache = cache();
        let calls = AtomicUsize::new(0);
        let counter = &calls;
        let spec = overview();

        for _ in 0..2 {
            let value = cache
                .fetch(&spec, || async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Ok::<_, String>("summary".to_string())
                })
                .await
                .unwrap()
                .unwrap();
            assert_eq!(value.as_str(), "summary");
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_errors_are_not_cached() {
        let cache = cache();
        let spec = overview();

        let err = cache
            .fetch(&spec, || async { Err::<String, _>("offline".to_string()) })
            .await
            .unwrap_err();
        assert_eq!(err.as_str(), "offline");
        assert!(cache.get(&spec.key).await.is_none());
    }

    #[tokio::test]
    async fn test_tenants_are_partitioned() {
        let cache = cache();
        let own = build_key("analytics", "overview", NO_ARGS, None, TenantSegment::own());
        let org1 = build_key("analytics", "overview", NO_ARGS, None, TenantSegment::org(1));

        cache.insert(own.clone(), "mine".to_string()).await;

        assert!(cache.get(&org1).await.is_none());
        assert_eq!(cache.get(&own).await.unwrap().as_str(), "mine");
    }

    #[tokio::test]
    async fn test_invalidate_by_domain() {
        let cache = cache();
        let overview = build_key("analytics", "overview", NO_ARGS, None, TenantSegment::own());
        let list = build_key("transactions", "list", [1_i64], None, TenantSegment::own());

        cache.insert(overview.clone(), "a".to_string()).await;
        cache.insert(list.clone(), "b".to_string()).await;

        let dropped = cache
            .invalidate(&InvalidationMessage::domain("transactions"))
            .await;

        assert_eq!(dropped, 1);
        assert!(cache.get(&list).await.is_none());
        assert!(cache.get(&overview).await.is_some());
    }

    #[tokio::test]
    async fn test_attached_cache_follows_bus() {
        let cache = cache();
        let bus = InvalidationBus::new(8);
        let handle = cache.attach(&bus);

        let key = build_key("analytics", "overview", NO_ARGS, None, TenantSegment::org(5));
        cache.insert(key.clone(), "stale".to_string()).await;

        bus.publish(InvalidationMessage::tenant(TenantSegment::org(5)));

        for _ in 0..100 {
            if cache.get(&key).await.is_none() {
                break;
            }
            tokio::task::yield_now().await;
        }
        assert!(cache.get(&key).await.is_none());

        drop(bus);
        handle.await.unwrap();
    }
}
