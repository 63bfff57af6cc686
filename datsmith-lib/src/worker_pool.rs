//! Worker pool for concurrent processing with backpressure.
//!
//! Spawns N persistent tokio tasks that pull index-tagged work items from a
//! bounded async-channel. Results come back on an unbounded channel tagged
//! with the same index, so callers can restore submission order no matter
//! which worker finished first.
//!
//! Uses `async-channel` for work distribution: its `Receiver` is `Clone`,
//! so each worker gets its own handle with no `Mutex` needed.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Duration;

/// Hard safety-net timeout per work item. If a process_fn hangs beyond this,
/// the worker drops the future and moves on. Parsing a full MAME DAT takes
/// well under a minute, so this only fires as a last resort.
pub const SAFETY_TIMEOUT: Duration = Duration::from_secs(600);

/// A pool of worker tasks that process items concurrently.
///
/// Workers are spawned as persistent tokio tasks that pull from a bounded
/// work channel. This provides:
/// - Natural backpressure when all workers are busy
/// - Clean shutdown by dropping the work sender
/// - Single concurrency control point (worker count)
/// - Safety-net timeout per item to prevent deadlocks
///
/// # Example
///
/// ```ignore
/// let pool = WorkerPool::start(4, paths, |path| async move {
///     load(path).await
/// });
///
/// for (index, result) in pool.collect_ordered().await.into_iter().enumerate() {
///     // `None` means item `index` timed out
/// }
/// ```
pub struct WorkerPool<R: Send + 'static> {
    result_rx: mpsc::UnboundedReceiver<(usize, R)>,
    len: usize,
    _handles: Vec<JoinHandle<()>>,
}

impl<R: Send + 'static> WorkerPool<R> {
    /// Spawn N workers, submit all items, and return a pool for receiving results.
    ///
    /// Items are tagged with their position in `items` and submitted via a
    /// bounded channel (capacity N). A worker count of zero is treated as one.
    pub fn start<W, F, Fut>(n: usize, items: Vec<W>, process_fn: F) -> Self
    where
        W: Send + 'static,
        F: Fn(W) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = R> + Send + 'static,
    {
        Self::start_with_timeout(n, SAFETY_TIMEOUT, items, process_fn)
    }

    /// [`start`](Self::start) with a custom per-item timeout.
    ///
    /// If a `process_fn` call exceeds `timeout`, the future is dropped and
    /// the worker moves to the next item. That item produces no result but
    /// the pool does not deadlock.
    pub fn start_with_timeout<W, F, Fut>(
        n: usize,
        timeout: Duration,
        items: Vec<W>,
        process_fn: F,
    ) -> Self
    where
        W: Send + 'static,
        F: Fn(W) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = R> + Send + 'static,
    {
        let n = n.max(1);
        let len = items.len();
        let (work_tx, work_rx) = async_channel::bounded::<(usize, W)>(n);
        let (result_tx, result_rx) = mpsc::unbounded_channel::<(usize, R)>();
        let process_fn = Arc::new(process_fn);

        // Spawn workers; each gets a cloned Receiver
        let handles: Vec<JoinHandle<()>> = (0..n)
            .map(|_| {
                let work_rx = work_rx.clone();
                let result_tx = result_tx.clone();
                let process_fn = process_fn.clone();
                tokio::spawn(async move {
                    while let Ok((index, item)) = work_rx.recv().await {
                        match tokio::time::timeout(timeout, process_fn(item)).await {
                            Ok(r) => {
                                if result_tx.send((index, r)).is_err() {
                                    break; // Receiver dropped
                                }
                            }
                            Err(_) => {
                                log::error!(
                                    "Worker pool: item {} timed out after {}s, skipping",
                                    index,
                                    timeout.as_secs_f32()
                                );
                            }
                        }
                    }
                    // Channel closed (sender dropped) → worker exits
                })
            })
            .collect();

        // Drop our copy of result_tx so the channel closes when all workers finish
        drop(result_tx);

        // Spawn submission task
        tokio::spawn(async move {
            for tagged in items.into_iter().enumerate() {
                if work_tx.send(tagged).await.is_err() {
                    break;
                }
            }
            // work_tx dropped here -> channel closes -> workers drain remaining items then stop
        });

        Self {
            result_rx,
            len,
            _handles: handles,
        }
    }

    /// Receive the next result in completion order, tagged with its item
    /// index. Returns `None` when all workers have shut down.
    pub async fn recv(&mut self) -> Option<(usize, R)> {
        self.result_rx.recv().await
    }

    /// Wait for every item and return results in submission order.
    ///
    /// Slot `i` holds the result for item `i`, or `None` if it timed out.
    pub async fn collect_ordered(mut self) -> Vec<Option<R>> {
        let mut slots: Vec<Option<R>> = std::iter::repeat_with(|| None).take(self.len).collect();
        while let Some((index, result)) = self.recv().await {
            if let Some(slot) = slots.get_mut(index) {
                *slot = Some(result);
            }
        }
        slots
    }
}
