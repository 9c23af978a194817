use crate::error::{ConfigError, QueueError};
use crate::job::JobDescriptor;
use tokio::sync::mpsc::error::{TryRecvError, TrySendError};
use tokio::sync::{mpsc, Mutex};

/// Bounded FIFO of admitted jobs
///
/// Uses a bounded MPSC channel to enforce backpressure: producers never wait, they get
/// `QueueFull` back. The single receiver sits behind a fair async mutex so any number of
/// workers can share it; waiters acquire it in arrival order and each `recv` hands out the
/// oldest descriptor, so dequeue order is submission order.
#[derive(Debug)]
pub struct JobQueue {
	tx: mpsc::Sender<JobDescriptor>,
	rx: Mutex<mpsc::Receiver<JobDescriptor>>,
	capacity: usize,
}

impl JobQueue {
	///
	/// # Errors
	/// Returns `ZeroCapacity` if `capacity` is 0
	pub fn new(capacity: usize) -> Result<Self, ConfigError> {
		if capacity == 0 {
			return Err(ConfigError::ZeroCapacity);
		}
		let (tx, rx) = mpsc::channel(capacity);

		Ok(Self {
			tx,
			rx: Mutex::new(rx),
			capacity,
		})
	}

	/// Non-blocking admission.
	///
	/// # Errors
	/// Returns `QueueFull` when `depth() == capacity()`, `ShutDown` once the queue has been closed
	pub fn try_enqueue(&self, descriptor: JobDescriptor) -> Result<(), QueueError> {
		match self.tx.try_send(descriptor) {
			Ok(()) => Ok(()),
			Err(TrySendError::Full(_)) => Err(QueueError::QueueFull { capacity: self.capacity }),
			Err(TrySendError::Closed(_)) => Err(QueueError::ShutDown),
		}
	}

	/// Waits for the next descriptor. Returns `None` once the queue is closed and empty.
	///
	/// Cancel safe: dropping the future before it resolves loses no descriptor.
	pub async fn dequeue(&self) -> Option<JobDescriptor> {
		let mut rx = self.rx.lock().await;
		rx.recv().await
	}

	/// Closes admission and hands back whatever was still waiting, in FIFO order.
	pub async fn close_and_drain(&self) -> Vec<JobDescriptor> {
		let mut rx = self.rx.lock().await;
		rx.close();

		let mut remaining = Vec::new();
		loop {
			match rx.try_recv() {
				Ok(descriptor) => remaining.push(descriptor),
				Err(TryRecvError::Empty | TryRecvError::Disconnected) => break,
			}
		}
		remaining
	}

	/// Descriptors admitted but not yet dequeued.
	#[must_use]
	pub fn depth(&self) -> usize {
		self.tx.max_capacity() - self.tx.capacity()
	}

	#[must_use]
	pub const fn capacity(&self) -> usize {
		self.capacity
	}

	#[must_use]
	pub fn is_full(&self) -> bool {
		self.depth() >= self.capacity
	}

	#[must_use]
	pub fn is_closed(&self) -> bool {
		self.tx.is_closed()
	}
}
