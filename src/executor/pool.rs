//! Fixed-size worker pool for per-directory transfer jobs.
//!
//! - one bounded `mpsc` queue shared by every worker
//! - each worker pulls a job, runs it on the blocking pool, then pulls the next
//! - explicit sender drop on shutdown before awaiting workers
//!
//! A worker never holds more than one job, so at most `workers` jobs run at once.

use crate::types::MirraError;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::runtime::{Builder, Runtime};
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tracing::error;

/// Work item accepted by the pool: one source directory and its files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferJob {
    pub index: usize,
    pub directory: PathBuf,
    pub files: Vec<PathBuf>,
}

/// Synchronous job body, run on a blocking thread.
pub type JobHandler = dyn Fn(TransferJob) + Send + Sync;

/// Runtime stats for the pool
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolStats {
    pub workers: usize,
    pub enqueued: usize,
    pub completed: usize,
    /// Jobs whose handler panicked
    pub panicked: usize,
    pub per_worker_completed: Vec<usize>,
}

impl PoolStats {
    fn new(workers: usize) -> Self {
        Self {
            workers,
            enqueued: 0,
            completed: 0,
            panicked: 0,
            per_worker_completed: vec![0; workers],
        }
    }
}

/// Worker pool backed by a dedicated multi-thread runtime.
pub struct WorkerPool {
    runtime: Runtime,
    enqueue_tx: Option<mpsc::Sender<TransferJob>>,
    worker_handles: Vec<JoinHandle<()>>,
    stats: Arc<Mutex<PoolStats>>,
}

impl WorkerPool {
    /// Spawn `worker_count` workers (at least one) behind a bounded queue.
    pub fn new(
        worker_count: usize,
        queue_capacity: usize,
        handler: Arc<JobHandler>,
    ) -> Result<Self, MirraError> {
        let workers = worker_count.max(1);
        let capacity = queue_capacity.max(1);
        let runtime = Builder::new_multi_thread()
            .worker_threads(workers)
            .max_blocking_threads(workers)
            .thread_name("mirra-worker")
            .enable_all()
            .build()
            .map_err(MirraError::Io)?;

        let stats = Arc::new(Mutex::new(PoolStats::new(workers)));
        let (enqueue_tx, enqueue_rx) = mpsc::channel::<TransferJob>(capacity);
        let queue = Arc::new(Mutex::new(enqueue_rx));

        let worker_handles = (0..workers)
            .map(|worker_id| {
                runtime.spawn(worker_loop(
                    worker_id,
                    Arc::clone(&queue),
                    Arc::clone(&handler),
                    Arc::clone(&stats),
                ))
            })
            .collect();

        Ok(Self {
            runtime,
            enqueue_tx: Some(enqueue_tx),
            worker_handles,
            stats,
        })
    }

    /// Queue a job, waiting for room if the queue is full.
    pub fn enqueue(&self, job: TransferJob) -> Result<(), MirraError> {
        let sender = self
            .enqueue_tx
            .as_ref()
            .ok_or_else(|| MirraError::Pool("queue is already closed".to_string()))?;
        let stats = Arc::clone(&self.stats);

        self.runtime.block_on(async {
            sender
                .send(job)
                .await
                .map_err(|_| MirraError::Pool("queue receiver is closed".to_string()))?;

            stats.lock().await.enqueued += 1;
            Ok::<(), MirraError>(())
        })
    }

    /// Close the queue and wait until every queued job has run.
    pub fn close_and_wait(mut self) -> Result<PoolStats, MirraError> {
        self.enqueue_tx.take();

        let workers = std::mem::take(&mut self.worker_handles);
        let stats = Arc::clone(&self.stats);

        self.runtime.block_on(async move {
            for handle in workers {
                handle.await.map_err(map_join_error)?;
            }
            Ok::<PoolStats, MirraError>(stats.lock().await.clone())
        })
    }
}

async fn worker_loop(
    worker_id: usize,
    queue: Arc<Mutex<mpsc::Receiver<TransferJob>>>,
    handler: Arc<JobHandler>,
    stats: Arc<Mutex<PoolStats>>,
) {
    loop {
        // Lock only while waiting for the next job
        let next = queue.lock().await.recv().await;
        let Some(job) = next else {
            break;
        };

        let index = job.index;
        let handler = Arc::clone(&handler);
        let outcome = tokio::task::spawn_blocking(move || handler(job)).await;

        let mut guard = stats.lock().await;
        match outcome {
            Ok(()) => {
                guard.completed += 1;
                if let Some(slot) = guard.per_worker_completed.get_mut(worker_id) {
                    *slot += 1;
                }
            }
            Err(e) => {
                guard.panicked += 1;
                error!(job = index, worker = worker_id, "transfer job failed: {}", e);
            }
        }
    }
}

fn map_join_error(error: tokio::task::JoinError) -> MirraError {
    MirraError::Pool(format!("worker task failed: {}", error))
}
