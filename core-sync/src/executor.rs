//! # Concurrent Executor
//!
//! Bounded fan-out over a batch of independent work items.
//!
//! ## Overview
//!
//! Every pipeline stage has the same shape: a list of items, a worker that
//! turns one item into zero or more results, and a parallelism limit. The
//! executor owns that shape once. Results are flattened in completion order;
//! no ordering is guaranteed and callers must not rely on any.
//!
//! ## Error Handling
//!
//! A worker error or panic is confined to its own item: the failure is
//! logged (and surfaced on the event bus when one is attached), the item
//! contributes no results, and every other item proceeds. The batch itself
//! never fails.

use core_runtime::events::{EventBus, SyncEvent};
use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, error};

use crate::error::Result;

/// Runs a batch of items through an async worker, at most `limit` at a time.
#[derive(Debug, Clone)]
pub struct ConcurrentExecutor {
    limit: usize,
    events: Option<(EventBus, String)>,
}

impl ConcurrentExecutor {
    /// Create an executor with the given parallelism limit (clamped to >= 1).
    pub fn new(limit: usize) -> Self {
        Self {
            limit: limit.max(1),
            events: None,
        }
    }

    /// Attach an event bus; per-item failures are then reported on it,
    /// tagged with `run_id`.
    pub fn with_events(mut self, bus: EventBus, run_id: String) -> Self {
        self.events = Some((bus, run_id));
        self
    }

    /// Fan `items` out through `worker` and collect the flattened results.
    ///
    /// `label` names the batch in logs. Each item's future is admitted by a
    /// semaphore permit, so at most `limit` workers make progress at once.
    pub async fn run<I, R, F, Fut>(&self, label: &str, items: Vec<I>, worker: F) -> Vec<R>
    where
        I: Display,
        R: Send + 'static,
        F: Fn(I) -> Fut,
        Fut: Future<Output = Result<Vec<R>>> + Send + 'static,
    {
        debug!("{}: dispatching {} item(s), limit {}", label, items.len(), self.limit);

        let semaphore = Arc::new(Semaphore::new(self.limit));
        let mut tasks = JoinSet::new();
        for item in items {
            let desc = item.to_string();
            let fut = worker(item);
            let semaphore = semaphore.clone();
            tasks.spawn(async move {
                // The semaphore lives as long as the batch and is never
                // closed; a failed acquire can only mean shutdown, so the
                // item quietly contributes nothing.
                let Ok(_permit) = semaphore.acquire_owned().await else {
                    return (desc, Ok(Vec::new()));
                };
                (desc, fut.await)
            });
        }

        let mut results = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((_, Ok(batch))) => results.extend(batch),
                Ok((desc, Err(e))) => {
                    error!("{}: {} failed: {}", label, desc, e);
                    self.report_failure(&desc, &e.to_string());
                }
                Err(e) => {
                    error!("{}: worker task panicked: {}", label, e);
                }
            }
        }
        results
    }

    fn report_failure(&self, item: &str, message: &str) {
        if let Some((bus, run_id)) = &self.events {
            bus.emit(
                SyncEvent::ItemFailed {
                    run_id: run_id.clone(),
                    item: item.to_string(),
                    message: message.to_string(),
                }
                .into(),
            )
            .ok();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SyncError;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn test_collects_flattened_results() {
        let executor = ConcurrentExecutor::new(4);

        let mut results = executor
            .run("double", vec![1u32, 2, 3], |n| async move { Ok(vec![n, n * 10]) })
            .await;
        results.sort();

        assert_eq!(results, vec![1, 2, 3, 10, 20, 30]);
    }

    #[tokio::test]
    async fn test_failed_item_is_isolated() {
        let executor = ConcurrentExecutor::new(4);

        let mut results = executor
            .run("partial", vec![1u32, 2, 3], |n| async move {
                if n == 2 {
                    Err(SyncError::InvalidConfig("boom".into()))
                } else {
                    Ok(vec![n])
                }
            })
            .await;
        results.sort();

        assert_eq!(results, vec![1, 3]);
    }

    #[tokio::test]
    async fn test_panicking_item_is_isolated() {
        let executor = ConcurrentExecutor::new(4);

        let results = executor
            .run("panicky", vec![1u32, 2], |n| async move {
                if n == 2 {
                    panic!("worker exploded");
                }
                Ok(vec![n])
            })
            .await;

        assert_eq!(results, vec![1]);
    }

    #[tokio::test]
    async fn test_limit_bounds_concurrency() {
        let executor = ConcurrentExecutor::new(2);
        let active = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        executor
            .run("bounded", (0..16u32).collect(), |_| {
                let active = active.clone();
                let peak = peak.clone();
                async move {
                    let now = active.fetch_add(1, Ordering::SeqCst) + 1;
                    peak.fetch_max(now, Ordering::SeqCst);
                    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
                    active.fetch_sub(1, Ordering::SeqCst);
                    Ok(vec![()])
                }
            })
            .await;

        assert!(peak.load(Ordering::SeqCst) <= 2);
    }

    #[tokio::test]
    async fn test_zero_limit_is_clamped() {
        let executor = ConcurrentExecutor::new(0);

        let results = executor
            .run("clamped", vec![7u32], |n| async move { Ok(vec![n]) })
            .await;

        assert_eq!(results, vec![7]);
    }

    #[tokio::test]
    async fn test_empty_batch_is_empty() {
        let executor = ConcurrentExecutor::new(4);

        let results: Vec<u32> = executor
            .run("empty", Vec::<u32>::new(), |n| async move { Ok(vec![n]) })
            .await;

        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_failure_is_reported_on_event_bus() {
        let bus = EventBus::new(16);
        let mut rx = bus.subscribe();
        let executor =
            ConcurrentExecutor::new(2).with_events(bus, "run-1".to_string());

        executor
            .run("reported", vec![1u32], |_| async move {
                Err::<Vec<u32>, _>(SyncError::InvalidConfig("boom".into()))
            })
            .await;

        let event = rx.recv().await.unwrap();
        match event {
            core_runtime::events::CoreEvent::Sync(SyncEvent::ItemFailed {
                run_id,
                item,
                message,
            }) => {
                assert_eq!(run_id, "run-1");
                assert_eq!(item, "1");
                assert!(message.contains("boom"));
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }
}
