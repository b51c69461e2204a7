//! Bounded worker pool over a shared FIFO queue.
//!
//! A fixed number of tokio tasks pull items from one queue until it is
//! empty. [`WorkerPool::run`] returns only after every task has exited, so
//! anything the handlers wrote is complete when the caller reads it.

use indicatif::ProgressBar;
use std::collections::VecDeque;
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

/// Number of concurrent workers when none is configured.
pub const DEFAULT_CONCURRENCY: usize = 50;

/// What a pool run did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PoolStats {
    /// Items handed to the pool.
    pub queued: usize,
    /// Items whose handler ran to completion.
    pub processed: usize,
    /// The run was cancelled before the queue drained.
    pub interrupted: bool,
}

/// A fixed-size set of workers sharing one work queue.
pub struct WorkerPool {
    concurrency: usize,
    cancel: CancellationToken,
    progress: Option<ProgressBar>,
}

impl WorkerPool {
    /// Create a pool of `concurrency` workers (at least one).
    pub fn new(concurrency: usize, cancel: CancellationToken) -> Self {
        Self {
            concurrency: concurrency.max(1),
            cancel,
            progress: None,
        }
    }

    /// Tick `progress` once per processed item.
    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = Some(progress);
        self
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Process every item exactly once with `handler`.
    ///
    /// Spawns `min(concurrency, items.len())` workers. Cancellation stops
    /// workers from taking new items and drops any in-flight handler future,
    /// releasing whatever it owned.
    pub async fn run<T, F, Fut>(&self, items: Vec<T>, handler: F) -> PoolStats
    where
        T: Send + 'static,
        F: Fn(T) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let queued = items.len();
        let workers = self.concurrency.min(queued);
        let queue = Arc::new(Mutex::new(VecDeque::from(items)));
        let handler = Arc::new(handler);
        let processed = Arc::new(AtomicUsize::new(0));

        let mut tasks = JoinSet::new();
        for worker in 0..workers {
            let queue = Arc::clone(&queue);
            let handler = Arc::clone(&handler);
            let processed = Arc::clone(&processed);
            let cancel = self.cancel.clone();
            let progress = self.progress.clone();

            tasks.spawn(async move {
                while !cancel.is_cancelled() {
                    let Some(item) = pop_front(&queue) else {
                        break;
                    };

                    tokio::select! {
                        biased;
                        _ = cancel.cancelled() => break,
                        _ = handler(item) => {
                            processed.fetch_add(1, Ordering::Relaxed);
                            if let Some(pb) = &progress {
                                pb.inc(1);
                            }
                        }
                    }
                }
                tracing::trace!(worker, "worker exited");
            });
        }

        while let Some(joined) = tasks.join_next().await {
            if let Err(e) = joined {
                tracing::warn!(error = %e, "scan worker failed");
            }
        }

        let processed = processed.load(Ordering::Relaxed);
        PoolStats {
            queued,
            processed,
            interrupted: self.cancel.is_cancelled() && processed < queued,
        }
    }
}

/// Take the next item; the lock is held only for the pop.
fn pop_front<T>(queue: &Mutex<VecDeque<T>>) -> Option<T> {
    queue
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .pop_front()
}
