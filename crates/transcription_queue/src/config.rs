use crate::error::ConfigError;
use clap::Parser;
use serde::{Deserialize, Serialize};

#[derive(Parser, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueConfig {
	#[arg(long, env = "QUEUE_WORKERS", default_value = "2", help = "Number of concurrent transcription workers")]
	pub queue_workers: usize,

	#[arg(long, env = "MAX_QUEUE_SIZE", default_value = "100", help = "Maximum number of jobs waiting in the queue")]
	pub max_queue_size: usize,
}

impl QueueConfig {
	#[must_use]
	pub const fn new(queue_workers: usize, max_queue_size: usize) -> Self {
		Self { queue_workers, max_queue_size }
	}

	/// Checks the settings a deployed service needs.
	///
	/// A pool with zero workers is still accepted by [`crate::QueueManager`], which is useful for
	/// holding jobs in the queue; a server refuses it here.
	///
	/// # Errors
	/// Returns the first setting that is out of range
	pub const fn validate(&self) -> Result<(), ConfigError> {
		if self.max_queue_size == 0 {
			return Err(ConfigError::ZeroCapacity);
		}
		if self.queue_workers == 0 {
			return Err(ConfigError::ZeroWorkers);
		}
		Ok(())
	}
}

impl Default for QueueConfig {
	fn default() -> Self {
		Self::new(2, 100)
	}
}
