use crate::engine::TranscriptionEngine;
use crate::error::EngineError;
use crate::job::{JobDescriptor, JobRecord};
use crate::metrics::QueueMetrics;
use crate::queue::JobQueue;
use crate::store::JobStore;
use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// One long-lived consumer. Owns each job it dequeues until the job is terminal.
pub struct Worker {
	id: usize,
	queue: Arc<JobQueue>,
	store: JobStore,
	engine: Arc<dyn TranscriptionEngine>,
	metrics: QueueMetrics,
	cancel: CancellationToken,
}

impl Worker {
	#[must_use]
	pub fn new(id: usize, queue: Arc<JobQueue>, store: JobStore, engine: Arc<dyn TranscriptionEngine>, metrics: QueueMetrics, cancel: CancellationToken) -> Self {
		Self {
			id,
			queue,
			store,
			engine,
			metrics,
			cancel,
		}
	}

	pub async fn run(self) {
		info!(worker_id = self.id, engine = self.engine.name(), "Worker started");

		loop {
			// The stop signal wins over a ready descriptor so nothing new starts after it.
			let descriptor = tokio::select! {
				biased;
				() = self.cancel.cancelled() => {
					info!(worker_id = self.id, "Worker stopping (shutdown requested)");
					break;
				}
				next = self.queue.dequeue() => match next {
					Some(descriptor) => descriptor,
					None => {
						info!(worker_id = self.id, "Worker stopping (queue closed)");
						break;
					}
				},
			};

			self.metrics.set_queue_depth(self.queue.depth());
			self.process(descriptor).await;
		}

		info!(worker_id = self.id, "Worker exited");
	}

	/// Runs one job to a terminal state. Never returns an error: engine failures land on the record.
	async fn process(&self, descriptor: JobDescriptor) {
		let JobDescriptor { id, input } = descriptor;

		if let Err(e) = self.store.update(&id, JobRecord::begin) {
			warn!(worker_id = self.id, job_id = %id, error = %e, "Skipping job that cannot start");
			return;
		}

		info!(worker_id = self.id, job_id = %id, filename = %input.filename, bytes = input.audio.len(), "Processing job");
		self.metrics.workers_busy.inc();
		let started = Instant::now();

		// A panicking engine only takes down this task, not the worker loop.
		let engine = Arc::clone(&self.engine);
		let outcome = match tokio::spawn(async move { engine.transcribe(&input).await }).await {
			Ok(outcome) => outcome,
			Err(join_error) => Err(EngineError::Failed(format!("engine task aborted: {join_error}"))),
		};

		let elapsed = started.elapsed();
		self.metrics.job_duration.observe(elapsed.as_secs_f64());
		self.metrics.workers_busy.dec();

		let recorded = match outcome {
			Ok(subtitles) => {
				let written = self.store.update(&id, |record| record.complete(subtitles));
				if written.is_ok() {
					self.metrics.jobs_completed.inc();
					info!(worker_id = self.id, job_id = %id, elapsed_ms = elapsed.as_millis(), "Job completed");
				}
				written
			}
			Err(e) => {
				let message = e.to_string();
				let written = self.store.update(&id, |record| record.fail(message));
				if written.is_ok() {
					self.metrics.jobs_failed.inc();
					warn!(worker_id = self.id, job_id = %id, elapsed_ms = elapsed.as_millis(), error = %e, "Job failed");
				}
				written
			}
		};

		if let Err(e) = recorded {
			error!(worker_id = self.id, job_id = %id, error = %e, "Could not record job outcome");
		}
	}
}
