//! Worker pool over an in-memory batch of items.
//!
//! Spawns `min(max_concurrent, items.len())` workers that claim items by
//! atomically incrementing a shared index, so no item is processed twice and
//! no worker idles while items remain. Each item runs inside its own spawned
//! task: a panic fails only that item, never the pool.
//!
//! The timeout is advisory: when a task exceeds it the pool records
//! [`TaskFailure::TimedOut`] and the worker moves on, but the underlying
//! future keeps running on the runtime and is not aborted.

use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Default worker cap when the caller does not override it.
pub const DEFAULT_MAX_CONCURRENT: usize = 5;

/// Progress callback, invoked as `(completed, total)` each time a task
/// settles. Completion order, not submission order.
pub type ProgressFn = Arc<dyn Fn(usize, usize) + Send + Sync>;

/// Why an individual task produced no result.
#[derive(Debug, thiserror::Error)]
pub enum TaskFailure {
    #[error("task failed: {0}")]
    Failed(String),
    #[error("task timed out after {0:?}")]
    TimedOut(Duration),
    #[error("task panicked")]
    Panicked,
}

/// Per-task result, stored at the same index as the input item.
pub type TaskOutcome<R> = Result<R, TaskFailure>;

#[derive(Clone, Default)]
pub struct PoolOptions {
    /// Worker cap; 0 is treated as 1. `None` uses [`DEFAULT_MAX_CONCURRENT`].
    pub max_concurrent: Option<usize>,
    /// Advisory per-task deadline.
    pub task_timeout: Option<Duration>,
    pub on_progress: Option<ProgressFn>,
}

/// Run `worker` over every item with bounded concurrency.
///
/// The returned vector has the same length and order as `items`: the outcome
/// at index `i` belongs to `items[i]` regardless of completion order. The
/// worker receives each item together with its original index.
pub async fn run<T, R, F, Fut>(items: Vec<T>, worker: F, opts: PoolOptions) -> Vec<TaskOutcome<R>>
where
    T: Send + 'static,
    R: Send + 'static,
    F: Fn(T, usize) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<R, anyhow::Error>> + Send + 'static,
{
    let total = items.len();
    if total == 0 {
        return Vec::new();
    }

    let max_concurrent = opts.max_concurrent.unwrap_or(DEFAULT_MAX_CONCURRENT).max(1);
    let worker_count = max_concurrent.min(total);
    tracing::debug!(total, workers = worker_count, "task pool started");

    let slots: Arc<Vec<Mutex<Option<T>>>> = Arc::new(
        items
            .into_iter()
            .map(|item| Mutex::new(Some(item)))
            .collect(),
    );
    let results: Arc<Vec<Mutex<Option<TaskOutcome<R>>>>> =
        Arc::new((0..total).map(|_| Mutex::new(None)).collect());
    let next = Arc::new(AtomicUsize::new(0));
    let completed = Arc::new(AtomicUsize::new(0));
    let worker = Arc::new(worker);

    let mut handles = Vec::with_capacity(worker_count);
    for _ in 0..worker_count {
        let slots = Arc::clone(&slots);
        let results = Arc::clone(&results);
        let next = Arc::clone(&next);
        let completed = Arc::clone(&completed);
        let worker = Arc::clone(&worker);
        let task_timeout = opts.task_timeout;
        let on_progress = opts.on_progress.clone();

        handles.push(tokio::spawn(async move {
            loop {
                let index = next.fetch_add(1, Ordering::SeqCst);
                if index >= total {
                    break;
                }
                let item = slots[index]
                    .lock()
                    .expect("task slot lock poisoned")
                    .take()
                    .expect("task item claimed twice");

                // Inner spawn so a panicking task surfaces as a JoinError
                // here instead of unwinding through the worker.
                let join = tokio::spawn(worker(item, index));
                let outcome = match task_timeout {
                    Some(deadline) => match tokio::time::timeout(deadline, join).await {
                        Ok(joined) => settle(joined),
                        Err(_) => {
                            tracing::warn!(index, ?deadline, "task exceeded deadline");
                            Err(TaskFailure::TimedOut(deadline))
                        }
                    },
                    None => settle(join.await),
                };

                *results[index].lock().expect("task result lock poisoned") = Some(outcome);
                let done = completed.fetch_add(1, Ordering::SeqCst) + 1;
                if let Some(on_progress) = &on_progress {
                    on_progress(done, total);
                }
            }
        }));
    }

    for handle in handles {
        // Worker loops contain no panicking code outside the inner spawn.
        let _ = handle.await;
    }

    results
        .iter()
        .map(|slot| {
            slot.lock()
                .expect("task result lock poisoned")
                .take()
                .unwrap_or(Err(TaskFailure::Panicked))
        })
        .collect()
}

fn settle<R>(
    joined: Result<Result<R, anyhow::Error>, tokio::task::JoinError>,
) -> TaskOutcome<R> {
    match joined {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => Err(TaskFailure::Failed(format!("{e:#}"))),
        Err(join_err) => {
            tracing::error!(error = %join_err, "task panicked");
            Err(TaskFailure::Panicked)
        }
    }
}
