use crate::engine::TranscriptionEngine;
use crate::job::JobRecord;
use crate::metrics::QueueMetrics;
use crate::queue::JobQueue;
use crate::store::JobStore;
use crate::worker::Worker;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

pub const SHUTDOWN_ERROR: &str = "Service shut down before the job could be processed";

/// Fixed set of workers draining one queue.
pub struct WorkerPool {
	num_workers: usize,
	queue: Arc<JobQueue>,
	store: JobStore,
	engine: Arc<dyn TranscriptionEngine>,
	metrics: QueueMetrics,
	cancel: CancellationToken,
	started: AtomicBool,
	workers: Mutex<JoinSet<()>>,
}

impl WorkerPool {
	#[must_use]
	pub fn new(num_workers: usize, queue: Arc<JobQueue>, store: JobStore, engine: Arc<dyn TranscriptionEngine>, metrics: QueueMetrics) -> Self {
		Self {
			num_workers,
			queue,
			store,
			engine,
			metrics,
			cancel: CancellationToken::new(),
			started: AtomicBool::new(false),
			workers: Mutex::new(JoinSet::new()),
		}
	}

	/// Spawns the workers on the current runtime. Later calls, or calls after shutdown, do nothing.
	pub fn start(&self) {
		if self.cancel.is_cancelled() || self.started.swap(true, Ordering::SeqCst) {
			return;
		}

		let mut workers = self.workers.lock().unwrap_or_else(PoisonError::into_inner);
		for id in 0..self.num_workers {
			let worker = Worker::new(
				id,
				Arc::clone(&self.queue),
				self.store.clone(),
				Arc::clone(&self.engine),
				self.metrics.clone(),
				self.cancel.child_token(),
			);
			workers.spawn(worker.run());
		}
		drop(workers);

		info!(workers = self.num_workers, capacity = self.queue.capacity(), "Started transcription workers");
	}

	/// Stops the pool.
	///
	/// Workers finish the job they hold and exit without dequeuing again. The queue is then closed
	/// and every descriptor still in it is failed with [`SHUTDOWN_ERROR`], so each admitted job ends
	/// in a terminal state. Safe to call more than once.
	pub async fn shutdown(&self) {
		self.cancel.cancel();

		let mut workers = std::mem::take(&mut *self.workers.lock().unwrap_or_else(PoisonError::into_inner));
		while let Some(joined) = workers.join_next().await {
			if let Err(e) = joined {
				error!(error = %e, "Worker task ended abnormally");
			}
		}

		let leftovers = self.queue.close_and_drain().await;
		if !leftovers.is_empty() {
			warn!(count = leftovers.len(), "Failing jobs still queued at shutdown");
		}
		for descriptor in leftovers {
			// The pool takes ownership of the job here, so it walks the normal Processing step.
			let failed = self.store.update(&descriptor.id, |record| {
				JobRecord::begin(record)?;
				record.fail(SHUTDOWN_ERROR)
			});
			match failed {
				Ok(()) => self.metrics.jobs_failed.inc(),
				Err(e) => error!(job_id = %descriptor.id, error = %e, "Could not fail queued job at shutdown"),
			}
		}
		self.metrics.set_queue_depth(0);

		info!("Stopped all transcription workers");
	}

	#[must_use]
	pub const fn num_workers(&self) -> usize {
		self.num_workers
	}

	#[must_use]
	pub fn is_running(&self) -> bool {
		self.started.load(Ordering::SeqCst) && !self.cancel.is_cancelled()
	}
}
