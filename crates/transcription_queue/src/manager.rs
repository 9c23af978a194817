use crate::audio::{AudioFormat, SUPPORTED_EXTENSIONS};
use crate::config::QueueConfig;
use crate::engine::TranscriptionEngine;
use crate::error::QueueError;
use crate::job::{JobDescriptor, JobId, JobInput, JobStatusView, ResultLookup};
use crate::metrics::QueueMetrics;
use crate::pool::WorkerPool;
use crate::queue::JobQueue;
use crate::store::JobStore;
use crate::supervisor::{QueueInfo, Supervisor};
use prometheus::Registry;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Submission and lookup facade over the store, the queue and the worker pool.
///
/// Every method except [`QueueManager::shutdown`] is synchronous and never waits on the engine.
pub struct QueueManager {
	store: JobStore,
	queue: Arc<JobQueue>,
	pool: WorkerPool,
	supervisor: Supervisor,
	metrics: QueueMetrics,
}

impl QueueManager {
	///
	/// # Errors
	/// Returns an error if `max_queue_size` is zero or the metrics cannot be registered
	pub fn new(config: &QueueConfig, engine: Arc<dyn TranscriptionEngine>, registry: &Registry) -> Result<Self, QueueError> {
		let queue = Arc::new(JobQueue::new(config.max_queue_size)?);
		let store = JobStore::new();
		let metrics = QueueMetrics::new(registry)?;
		let pool = WorkerPool::new(config.queue_workers, Arc::clone(&queue), store.clone(), engine, metrics.clone());
		let supervisor = Supervisor::new(config.queue_workers, store.clone(), Arc::clone(&queue));

		Ok(Self {
			store,
			queue,
			pool,
			supervisor,
			metrics,
		})
	}

	/// Spawns the workers. Must be called from within a tokio runtime.
	pub fn start(&self) {
		self.pool.start();
	}

	/// Admits a job or rejects it without waiting.
	///
	/// The record exists before the descriptor is enqueued, so a worker never sees an unknown id. A
	/// rejected submission leaves no record behind.
	///
	/// # Errors
	/// - `UnsupportedAudio` if neither the payload nor the filename identify a supported format
	/// - `QueueFull` if the queue is at capacity
	/// - `ShutDown` once [`QueueManager::shutdown`] has been called
	pub fn submit(&self, input: JobInput) -> Result<JobId, QueueError> {
		let Some(format) = AudioFormat::resolve(&input.audio, &input.filename) else {
			return Err(QueueError::UnsupportedAudio(format!(
				"'{}' is not one of: {}",
				input.filename,
				SUPPORTED_EXTENSIONS.join(", ")
			)));
		};

		let id = self.store.create(input.clone());
		if let Err(e) = self.queue.try_enqueue(JobDescriptor { id, input }) {
			self.store.remove(&id);
			self.metrics.jobs_rejected.inc();
			warn!(job_id = %id, queue_depth = self.queue.depth(), error = %e, "Rejected job");
			return Err(e);
		}

		self.metrics.jobs_submitted.inc();
		self.metrics.set_queue_depth(self.queue.depth());
		info!(job_id = %id, format = format.extension(), queue_depth = self.queue.depth(), "Job queued");
		Ok(id)
	}

	///
	/// # Errors
	/// Returns `NotFound` if the id was never issued
	pub fn get_status(&self, id: &JobId) -> Result<JobStatusView, QueueError> {
		self.store.get(id).map(|record| record.view())
	}

	/// Returns the subtitles of a completed job, or why they are not available.
	///
	/// # Errors
	/// Returns `NotFound` if the id was never issued
	pub fn get_result(&self, id: &JobId) -> Result<ResultLookup, QueueError> {
		let lookup = self.store.get(id)?.lookup_result();
		debug!(job_id = %id, ready = matches!(lookup, ResultLookup::Ready(_)), "Result lookup");
		Ok(lookup)
	}

	#[must_use]
	pub fn queue_info(&self) -> QueueInfo {
		self.supervisor.info()
	}

	/// Resamples gauges that only change when a job moves, such as the queue depth.
	pub fn refresh_gauges(&self) {
		self.metrics.set_queue_depth(self.queue.depth());
	}

	/// Stops admission and the workers; waits for in-flight jobs and fails the ones still queued.
	pub async fn shutdown(&self) {
		self.pool.shutdown().await;
	}

	#[must_use]
	pub fn is_running(&self) -> bool {
		self.pool.is_running()
	}
}
