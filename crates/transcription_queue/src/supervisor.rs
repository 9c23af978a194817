use crate::queue::JobQueue;
use crate::store::{JobStore, StatusCounts};
use serde::Serialize;
use std::sync::Arc;

/// Point-in-time view of the queue and the jobs it has admitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct QueueInfo {
	pub workers: usize,
	pub queue_size: usize,
	pub max_queue_size: usize,
	pub total_jobs: usize,
	#[serde(flatten)]
	pub counts: StatusCounts,
}

/// Read-only introspection over the store and the queue.
///
/// `counts` is an exact snapshot: the store moves a job between buckets in one step. `queue_size`
/// is read separately, so a job dequeued between the two reads can show as `pending` while no
/// longer being counted in `queue_size`.
#[derive(Clone)]
pub struct Supervisor {
	workers: usize,
	store: JobStore,
	queue: Arc<JobQueue>,
}

impl Supervisor {
	#[must_use]
	pub const fn new(workers: usize, store: JobStore, queue: Arc<JobQueue>) -> Self {
		Self { workers, store, queue }
	}

	#[must_use]
	pub fn info(&self) -> QueueInfo {
		let counts = self.store.counts();
		QueueInfo {
			workers: self.workers,
			queue_size: self.queue.depth(),
			max_queue_size: self.queue.capacity(),
			total_jobs: counts.total(),
			counts,
		}
	}
}
