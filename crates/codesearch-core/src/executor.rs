//! Bounded concurrency executor (§4.E).
//!
//! Runs a batch of async tasks with at most `N` in flight, preserving input
//! order in the result. Built on `tokio::sync::Semaphore` +
//! `futures::stream::FuturesUnordered`, the same combination the teacher
//! reaches for in `codeprysm-backend` (which already depends on `futures`).

use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use futures::stream::{FuturesUnordered, StreamExt};
use tokio::sync::Semaphore;

/// Minimum permitted concurrency (§4.E: `N ∈ [1,20]`).
pub const MIN_CONCURRENCY: usize = 1;
/// Maximum permitted concurrency (§4.E: `N ∈ [1,20]`).
pub const MAX_CONCURRENCY: usize = 20;

/// A single task's outcome, aligned by index with the input sequence.
pub type TaskResult<T, E> = Result<T, E>;

/// Probe for the "bounded concurrency" testable property (§8): tracks the
/// current and peak number of in-flight tasks.
#[derive(Debug, Default)]
pub struct InflightProbe {
    current: AtomicUsize,
    peak: AtomicUsize,
}

impl InflightProbe {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn enter(&self) {
        let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
    }

    fn exit(&self) {
        self.current.fetch_sub(1, Ordering::SeqCst);
    }

    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    pub fn current(&self) -> usize {
        self.current.load(Ordering::SeqCst)
    }
}

/// Run `tasks` with at most `concurrency` in flight at once (clamped to
/// `[MIN_CONCURRENCY, MAX_CONCURRENCY]`). A per-task failure never aborts
/// the batch: every input index produces exactly one `Result` in the
/// output, in input order.
pub async fn run_bounded<F, Fut, T, E>(
    concurrency: usize,
    tasks: Vec<F>,
    probe: Option<Arc<InflightProbe>>,
) -> Vec<TaskResult<T, E>>
where
    F: FnOnce() -> Fut + Send + 'static,
    Fut: Future<Output = Result<T, E>> + Send + 'static,
    T: Send + 'static,
    E: Send + 'static,
{
    let concurrency = concurrency.clamp(MIN_CONCURRENCY, MAX_CONCURRENCY);
    let semaphore = Arc::new(Semaphore::new(concurrency));
    let mut futs = FuturesUnordered::new();

    for (index, task) in tasks.into_iter().enumerate() {
        let semaphore = semaphore.clone();
        let probe = probe.clone();
        futs.push(async move {
            let _permit = semaphore.acquire_owned().await.expect("semaphore never closed");
            if let Some(probe) = &probe {
                probe.enter();
            }
            let result = task().await;
            if let Some(probe) = &probe {
                probe.exit();
            }
            (index, result)
        });
    }

    let mut indexed = Vec::new();
    while let Some((index, result)) = futs.next().await {
        indexed.push((index, result));
    }
    indexed.sort_by_key(|(index, _)| *index);
    indexed.into_iter().map(|(_, result)| result).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn preserves_input_order() {
        let tasks: Vec<_> = (0..10)
            .map(|i| {
                move || async move {
                    tokio::time::sleep(Duration::from_millis((10 - i) as u64)).await;
                    Ok::<_, ()>(i)
                }
            })
            .collect();

        let results = run_bounded(3, tasks, None).await;
        let values: Vec<i32> = results.into_iter().map(|r| r.unwrap()).collect();
        assert_eq!(values, (0..10).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn per_task_failure_does_not_abort_the_batch() {
        type Task = std::pin::Pin<Box<dyn Future<Output = Result<i32, &'static str>> + Send>>;
        let outcomes: [Result<i32, &'static str>; 3] = [Ok(1), Err("boom"), Ok(1)];
        let tasks: Vec<_> = outcomes
            .into_iter()
            .map(|outcome| move || -> Task { Box::pin(async move { outcome }) })
            .collect();

        let results = run_bounded(2, tasks, None).await;
        assert_eq!(results.len(), 3);
        assert!(results[0].is_ok());
        assert!(results[1].is_err());
        assert!(results[2].is_ok());
    }

    #[tokio::test]
    async fn never_exceeds_the_concurrency_limit() {
        let probe = InflightProbe::new();
        let tasks: Vec<_> = (0..10)
            .map(|_| {
                move || async move {
                    tokio::time::sleep(Duration::from_millis(20)).await;
                    Ok::<_, ()>(())
                }
            })
            .collect();

        run_bounded(3, tasks, Some(probe.clone())).await;
        assert!(probe.peak() <= 3);
        assert_eq!(probe.current(), 0);
    }

    #[tokio::test]
    async fn concurrency_is_clamped_into_range() {
        let probe = InflightProbe::new();
        let tasks: Vec<_> = (0..5)
            .map(|_| {
                move || async move {
                    tokio::time::sleep(Duration::from_millis(5)).await;
                    Ok::<_, ()>(())
                }
            })
            .collect();
        run_bounded(0, tasks, Some(probe.clone())).await;
        assert!(probe.peak() <= MAX_CONCURRENCY);
    }
}
