use prometheus::{Histogram, HistogramOpts, IntCounter, IntGauge, Registry};

/// Prometheus collectors shared by the facade and the workers.
#[derive(Clone)]
pub struct QueueMetrics {
	pub jobs_submitted: IntCounter,
	pub jobs_rejected: IntCounter,
	pub jobs_completed: IntCounter,
	pub jobs_failed: IntCounter,
	pub workers_busy: IntGauge,
	pub queue_depth: IntGauge,
	pub job_duration: Histogram,
}

impl QueueMetrics {
	///
	/// # Errors
	/// Returns an error if a collector cannot be created or is already registered in `registry`
	pub fn new(registry: &Registry) -> Result<Self, prometheus::Error> {
		let jobs_submitted = IntCounter::new("transcription_jobs_submitted_total", "Jobs admitted to the queue")?;
		let jobs_rejected = IntCounter::new("transcription_jobs_rejected_total", "Submissions refused because the queue was full or shut down")?;
		let jobs_completed = IntCounter::new("transcription_jobs_completed_total", "Jobs that finished with subtitles")?;
		let jobs_failed = IntCounter::new("transcription_jobs_failed_total", "Jobs that finished with an error")?;
		let workers_busy = IntGauge::new("transcription_workers_busy", "Workers currently running a job")?;
		let queue_depth = IntGauge::new("transcription_queue_depth", "Jobs waiting in the queue")?;
		let job_duration = Histogram::with_opts(
			HistogramOpts::new("transcription_job_duration_seconds", "Engine time per job").buckets(vec![0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0, 120.0, 300.0, 600.0]),
		)?;

		registry.register(Box::new(jobs_submitted.clone()))?;
		registry.register(Box::new(jobs_rejected.clone()))?;
		registry.register(Box::new(jobs_completed.clone()))?;
		registry.register(Box::new(jobs_failed.clone()))?;
		registry.register(Box::new(workers_busy.clone()))?;
		registry.register(Box::new(queue_depth.clone()))?;
		registry.register(Box::new(job_duration.clone()))?;

		Ok(Self {
			jobs_submitted,
			jobs_rejected,
			jobs_completed,
			jobs_failed,
			workers_busy,
			queue_depth,
			job_duration,
		})
	}

	pub fn set_queue_depth(&self, depth: usize) {
		self.queue_depth.set(i64::try_from(depth).unwrap_or(i64::MAX));
	}
}
