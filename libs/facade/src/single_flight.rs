//! Request coalescing keyed by `(venue, symbol, endpoint)`: concurrent
//! callers for the same key share one in-flight fetch. Cancellation-safe —
//! a cancelled waiter never drives the shared future to completion on its
//! own, so a waiter that drops out before the fetch resolves never causes a
//! cache write that wouldn't otherwise have happened.

use futures::future::{BoxFuture, Shared};
use futures::FutureExt;
use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;
use std::sync::Arc;
use tokio::sync::Mutex;

type SharedFetch<V, E> = Shared<BoxFuture<'static, Result<V, E>>>;

pub struct SingleFlight<K, V, E> {
    inflight: Mutex<HashMap<K, SharedFetch<V, E>>>,
}

impl<K, V, E> SingleFlight<K, V, E>
where
    K: Eq + Hash + Clone + Send + 'static,
    V: Clone + Send + 'static,
    E: Clone + Debug + Send + 'static,
{
    pub fn new() -> Self {
        Self { inflight: Mutex::new(HashMap::new()) }
    }

    /// Runs `fetch` for `key`, coalescing concurrent callers onto one
    /// execution. `fetch` is only invoked when no fetch for `key` is
    /// already in flight.
    pub async fn run<F, Fut>(&self, key: K, fetch: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = Result<V, E>> + Send + 'static,
    {
        let shared = {
            let mut inflight = self.inflight.lock().await;
            if let Some(existing) = inflight.get(&key) {
                existing.clone()
            } else {
                let boxed: BoxFuture<'static, Result<V, E>> = fetch().boxed();
                let shared = boxed.shared();
                inflight.insert(key.clone(), shared.clone());
                shared
            }
        };

        let result = shared.await;

        let mut inflight = self.inflight.lock().await;
        inflight.remove(&key);
        result
    }
}

impl<K, V, E> Default for SingleFlight<K, V, E>
where
    K: Eq + Hash + Clone + Send + 'static,
    V: Clone + Send + 'static,
    E: Clone + Debug + Send + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn concurrent_callers_for_same_key_share_one_fetch() {
        let flight: Arc<SingleFlight<&'static str, u32, String>> = Arc::new(SingleFlight::new());
        let call_count = Arc::new(AtomicU32::new(0));

        let mut handles = Vec::new();
        for _ in 0..5 {
            let flight = flight.clone();
            let call_count = call_count.clone();
            handles.push(tokio::spawn(async move {
                flight
                    .run("btc", move || async move {
                        call_count.fetch_add(1, Ordering::SeqCst);
                        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
                        Ok::<u32, String>(42)
                    })
                    .await
            }));
        }

        for handle in handles {
            assert_eq!(handle.await.unwrap().unwrap(), 42);
        }
        assert_eq!(call_count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn distinct_keys_run_independently() {
        let flight: SingleFlight<&'static str, u32, String> = SingleFlight::new();
        let a = flight.run("a", || async { Ok::<u32, String>(1) });
        let b = flight.run("b", || async { Ok::<u32, String>(2) });
        let (a, b) = tokio::join!(a, b);
        assert_eq!(a.unwrap(), 1);
        assert_eq!(b.unwrap(), 2);
    }
}
