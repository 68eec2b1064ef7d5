//! Collapses concurrent identical requests into one shared outcome.
//!
//! The first caller for a key runs the factory; later callers for the same key
//! join the pending outcome instead. The registration is removed when the
//! outcome settles, whether it succeeded or failed, so the next caller after
//! that starts a fresh request.

pub mod key;

pub use key::{graphql_request_key, url_request_key};

use crate::error::Error;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use std::future::Future;
use std::sync::Arc;

type SharedOutcome<T> = Shared<BoxFuture<'static, Result<T, Error>>>;

/// In-flight request registry.
pub struct RequestDeduplicator<T> {
    in_flight: Arc<DashMap<String, SharedOutcome<T>>>,
}

impl<T> Clone for RequestDeduplicator<T> {
    fn clone(&self) -> Self {
        Self { in_flight: Arc::clone(&self.in_flight) }
    }
}

impl<T> std::fmt::Debug for RequestDeduplicator<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestDeduplicator").field("in_flight", &self.in_flight.len()).finish()
    }
}

impl<T: Clone + Send + Sync + 'static> Default for RequestDeduplicator<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + Send + Sync + 'static> RequestDeduplicator<T> {
    pub fn new() -> Self {
        Self { in_flight: Arc::new(DashMap::new()) }
    }

    /// Await the outcome registered under `key`, creating it with `factory` if
    /// none is pending.
    ///
    /// `factory` runs while the key's slot is locked and must not call back
    /// into this deduplicator synchronously; the future it returns may.
    pub async fn get_or_create<F, Fut>(&self, key: &str, factory: F) -> Result<T, Error>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, Error>> + Send + 'static,
    {
        let outcome = match self.in_flight.entry(key.to_string()) {
            Entry::Occupied(pending) => {
                tracing::debug!(key, "joining in-flight request");
                pending.get().clone()
            }
            Entry::Vacant(slot) => {
                let registry = Arc::clone(&self.in_flight);
                let owned_key = key.to_string();
                let request = factory();
                let shared = async move {
                    let result = request.await;
                    registry.remove(&owned_key);
                    result
                }
                .boxed()
                .shared();
                slot.insert(shared.clone());
                shared
            }
        };

        outcome.await
    }

    /// Number of requests currently pending.
    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[tokio::test]
    async fn test_concurrent_callers_share_one_execution() {
        let dedup = RequestDeduplicator::<usize>::new();
        let executions = Arc::new(AtomicUsize::new(0));

        let mut handles = vec![];
        for _ in 0..5 {
            let dedup = dedup.clone();
            let executions = executions.clone();
            handles.push(tokio::spawn(async move {
                dedup
                    .get_or_create("substances", move || async move {
                        let n = executions.fetch_add(1, Ordering::SeqCst);
                        tokio::time::sleep(Duration::from_millis(50)).await;
                        Ok(n + 100)
                    })
                    .await
            }));
        }

        for handle in handles {
            assert_eq!(handle.await.unwrap().unwrap(), 100);
        }
        assert_eq!(executions.load(Ordering::SeqCst), 1);
        assert_eq!(dedup.in_flight(), 0);
    }

    #[tokio::test]
    async fn test_two_joined_callers_increment_once() {
        let dedup = RequestDeduplicator::<()>::new();
        let counter = Arc::new(AtomicUsize::new(0));

        let make = |counter: Arc<AtomicUsize>| {
            move || async move {
                counter.fetch_add(1, Ordering::SeqCst);
                tokio::task::yield_now().await;
                Ok(())
            }
        };

        let (a, b) = tokio::join!(
            dedup.get_or_create("k", make(counter.clone())),
            dedup.get_or_create("k", make(counter.clone()))
        );
        assert!(a.is_ok() && b.is_ok());
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failure_is_shared_and_cleared() {
        let dedup = RequestDeduplicator::<u32>::new();

        let (a, b) = tokio::join!(
            dedup.get_or_create("k", || async {
                tokio::task::yield_now().await;
                Err(Error::HttpStatus { status: 500 })
            }),
            dedup.get_or_create("k", || async { Ok(7) })
        );
        assert!(matches!(a, Err(Error::HttpStatus { status: 500 })));
        assert!(matches!(b, Err(Error::HttpStatus { status: 500 })));
        assert_eq!(dedup.in_flight(), 0);

        let retry = dedup.get_or_create("k", || async { Ok(7) }).await;
        assert_eq!(retry.unwrap(), 7);
    }

    #[tokio::test]
    async fn test_different_keys_run_separately() {
        let dedup = RequestDeduplicator::<usize>::new();
        let executions = Arc::new(AtomicUsize::new(0));

        let first = executions.clone();
        let second = executions.clone();
        let (a, b) = tokio::join!(
            dedup.get_or_create("a", move || async move { Ok(first.fetch_add(1, Ordering::SeqCst)) }),
            dedup.get_or_create("b", move || async move { Ok(second.fetch_add(1, Ordering::SeqCst)) })
        );

        assert!(a.is_ok() && b.is_ok());
        assert_eq!(executions.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_sequential_calls_are_not_merged() {
        let dedup = RequestDeduplicator::<usize>::new();
        let executions = Arc::new(AtomicUsize::new(0));

        for _ in 0..3 {
            let executions = executions.clone();
            dedup
                .get_or_create("k", move || async move { Ok(executions.fetch_add(1, Ordering::SeqCst)) })
                .await
                .unwrap();
        }
        assert_eq!(executions.load(Ordering::SeqCst), 3);
    }
}
