// crates/serve/src/cache.rs

//! Query-keyed cache with cache-and-network semantics.
//!
//! One [`QueryCache`] is constructed at startup and handed to consumers as
//! a reference; there is no ambient global. Values are replaced whole by
//! key and never edited in place, and nothing is evicted — the cache lives
//! as long as the process.
//!
//! Concurrent fetches for one key inside one refresh window share a single
//! upstream call: the first caller installs a shared future, later callers
//! clone it, and exactly one of them commits the outcome.

use crate::source::{QueryKey, SharedQueryClient};
use domain::error::FetchError;
use futures::future::{BoxFuture, FutureExt, Shared};
use parking_lot::Mutex;
use serde_json::Value as Json;
use std::{collections::HashMap, sync::Arc};
use tokio::sync::broadcast;

type FetchOutcome = Result<Arc<Json>, FetchError>;
type SharedFetch = Shared<BoxFuture<'static, FetchOutcome>>;

/// Capacity of each per-key notification channel. A receiver that falls
/// further behind than this observes a lag error, not a crash.
const NOTIFY_DEPTH: usize = 32;

struct Entry {
    /// Last-known good value. Failed refreshes never clear it.
    value: Option<Arc<Json>>,
    inflight: Option<SharedFetch>,
    /// Monotonic refresh-window id; guards settlement so exactly one
    /// coalesced waiter commits each window.
    window: u64,
    notify: broadcast::Sender<Arc<Json>>,
}

impl Entry {
    fn new() -> Self {
        let (notify, _) = broadcast::channel(NOTIFY_DEPTH);
        Self {
            value: None,
            inflight: None,
            window: 0,
            notify,
        }
    }
}

pub struct QueryCache {
    client: SharedQueryClient,
    entries: Mutex<HashMap<QueryKey, Entry>>,
}

impl QueryCache {
    pub fn new(client: SharedQueryClient) -> Self {
        Self {
            client,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Most recent cached value, without touching the network.
    pub fn cached(&self, key: &QueryKey) -> Option<Arc<Json>> {
        self.entries
            .lock()
            .get(key)
            .and_then(|entry| entry.value.clone())
    }

    /// Cache-and-network: hand back whatever we have and refresh
    /// regardless. The refresh runs detached; subscribers see its result.
    #[tracing::instrument(skip_all)]
    pub fn get(self: &Arc<Self>, key: &QueryKey) -> Option<Arc<Json>> {
        let hit = self.cached(key);
        let this = Arc::clone(self);
        let key = key.clone();
        tokio::spawn(async move {
            let _ = this.fetch(&key).await;
        });
        hit
    }

    /// Await a fresh value.
    ///
    /// Callers that arrive while a refresh for the same key is in flight
    /// await that same upstream call instead of issuing another.
    #[tracing::instrument(skip_all)]
    pub async fn fetch(&self, key: &QueryKey) -> FetchOutcome {
        let (shared, window) = {
            let mut entries = self.entries.lock();
            let entry = entries.entry(key.clone()).or_insert_with(Entry::new);
            match &entry.inflight {
                Some(inflight) => (inflight.clone(), entry.window),
                None => {
                    entry.window += 1;
                    let client = Arc::clone(&self.client);
                    let name = key.name().to_owned();
                    let variables: Json =
                        serde_json::from_str(key.variables_json()).unwrap_or(Json::Null);
                    let fut = async move { client.execute(&name, variables).await.map(Arc::new) }
                        .boxed()
                        .shared();
                    entry.inflight = Some(fut.clone());
                    (fut, entry.window)
                }
            }
        };

        let result = shared.await;
        self.settle(key, window, &result);
        result
    }

    /// Every value transition, delivered once per transition. Dropping the
    /// receiver is the unsubscribe; no other teardown exists.
    pub fn subscribe(&self, key: &QueryKey) -> broadcast::Receiver<Arc<Json>> {
        let mut entries = self.entries.lock();
        entries
            .entry(key.clone())
            .or_insert_with(Entry::new)
            .notify
            .subscribe()
    }

    /// Direct write for values that arrive out of band (an admin update,
    /// a seeded fixture). Subscribers are notified like any refresh.
    pub fn put(&self, key: &QueryKey, value: Json) {
        let value = Arc::new(value);
        let mut entries = self.entries.lock();
        let entry = entries.entry(key.clone()).or_insert_with(Entry::new);
        if entry.value.as_ref() != Some(&value) {
            entry.value = Some(Arc::clone(&value));
            let _ = entry.notify.send(value);
        }
    }

    /// Commit one refresh window. Only the first waiter back for the
    /// current window commits; everyone else finds the window already
    /// settled and leaves the entry alone.
    fn settle(&self, key: &QueryKey, window: u64, result: &FetchOutcome) {
        let mut entries = self.entries.lock();
        let Some(entry) = entries.get_mut(key) else {
            return;
        };
        if entry.window != window || entry.inflight.is_none() {
            return;
        }
        entry.inflight = None;
        match result {
            Ok(value) => {
                if entry.value.as_ref() != Some(value) {
                    entry.value = Some(Arc::clone(value));
                    let _ = entry.notify.send(Arc::clone(value));
                }
            }
            Err(error) => {
                tracing::warn!(
                    query = %key.name(),
                    variables = %key.variables_json(),
                    %error,
                    "query refresh failed; keeping last-known value"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::QueryClient;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Counts upstream calls and answers slowly enough that concurrent
    /// callers land in the same refresh window.
    struct CountingClient {
        calls: AtomicUsize,
        reply: Json,
    }

    #[async_trait]
    impl QueryClient for CountingClient {
        async fn execute(&self, _name: &str, _variables: Json) -> Result<Json, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(25)).await;
            Ok(self.reply.clone())
        }
    }

    /// Replays a script of responses, repeating the last one.
    struct ScriptedClient {
        script: Mutex<Vec<Json>>,
    }

    #[async_trait]
    impl QueryClient for ScriptedClient {
        async fn execute(&self, _name: &str, _variables: Json) -> Result<Json, FetchError> {
            let mut script = self.script.lock();
            if script.len() > 1 {
                Ok(script.remove(0))
            } else {
                Ok(script[0].clone())
            }
        }
    }

    struct FailingClient;

    #[async_trait]
    impl QueryClient for FailingClient {
        async fn execute(&self, _name: &str, _variables: Json) -> Result<Json, FetchError> {
            Err(FetchError::Network("connection refused".into()))
        }
    }

    #[tokio::test]
    async fn concurrent_fetches_share_one_upstream_call() {
        let client = Arc::new(CountingClient {
            calls: AtomicUsize::new(0),
            reply: json!({ "posts": { "nodes": [] } }),
        });
        let cache = Arc::new(QueryCache::new(client.clone()));
        let key = QueryKey::new("posts", &json!({ "first": 10 }));

        let (a, b) = tokio::join!(cache.fetch(&key), cache.fetch(&key));
        assert_eq!(client.calls.load(Ordering::SeqCst), 1);
        assert_eq!(a.unwrap(), b.unwrap());

        // The window is settled, so the next fetch opens a new one.
        cache.fetch(&key).await.unwrap();
        assert_eq!(client.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn get_returns_stale_value_and_refreshes_in_background() {
        let cache = Arc::new(QueryCache::new(Arc::new(ScriptedClient {
            script: Mutex::new(vec![json!({ "v": 2 })]),
        })));
        let key = QueryKey::bare("navbar");
        cache.put(&key, json!({ "v": 1 }));

        let mut rx = cache.subscribe(&key);
        let stale = cache.get(&key);
        assert_eq!(stale.as_deref(), Some(&json!({ "v": 1 })));

        let fresh = rx.recv().await.unwrap();
        assert_eq!(*fresh, json!({ "v": 2 }));
        assert_eq!(cache.cached(&key).as_deref(), Some(&json!({ "v": 2 })));
    }

    #[tokio::test]
    async fn subscribers_see_each_transition_exactly_once() {
        let cache = QueryCache::new(Arc::new(ScriptedClient {
            script: Mutex::new(vec![json!({ "v": 1 }), json!({ "v": 1 }), json!({ "v": 2 })]),
        }));
        let key = QueryKey::bare("home");
        let mut rx = cache.subscribe(&key);

        cache.fetch(&key).await.unwrap();
        assert_eq!(*rx.recv().await.unwrap(), json!({ "v": 1 }));

        // Same value again: no transition, nothing delivered.
        cache.fetch(&key).await.unwrap();
        assert!(matches!(
            rx.try_recv(),
            Err(broadcast::error::TryRecvError::Empty)
        ));

        cache.fetch(&key).await.unwrap();
        assert_eq!(*rx.recv().await.unwrap(), json!({ "v": 2 }));
    }

    #[tokio::test]
    async fn failed_refresh_keeps_last_known_value() {
        let cache = QueryCache::new(Arc::new(FailingClient));
        let key = QueryKey::bare("services");
        cache.put(&key, json!({ "items": [1] }));
        let mut rx = cache.subscribe(&key);

        let err = cache.fetch(&key).await.unwrap_err();
        assert_eq!(err, FetchError::Network("connection refused".into()));
        assert_eq!(cache.cached(&key).as_deref(), Some(&json!({ "items": [1] })));
        assert!(matches!(
            rx.try_recv(),
            Err(broadcast::error::TryRecvError::Empty)
        ));
    }

    #[tokio::test]
    async fn coalesced_waiters_share_a_failure() {
        let cache = Arc::new(QueryCache::new(Arc::new(FailingClient)));
        let key = QueryKey::bare("about");
        let (a, b) = tokio::join!(cache.fetch(&key), cache.fetch(&key));
        assert_eq!(a.unwrap_err(), b.unwrap_err());
    }
}
