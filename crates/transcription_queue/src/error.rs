use crate::job::{JobId, JobStatus};
use thiserror::Error;

/// Errors surfaced by the submission and lookup facade.
#[derive(Error, Debug)]
pub enum QueueError {
	#[error("Queue is full (max capacity: {capacity}). Please try again later.")]
	QueueFull { capacity: usize },
	#[error("Job not found: {0}")]
	NotFound(JobId),
	#[error("Queue is shut down")]
	ShutDown,
	#[error("Job {id} cannot move from {from} to {to}")]
	InvalidTransition { id: JobId, from: JobStatus, to: JobStatus },
	#[error("Unsupported audio format: {0}")]
	UnsupportedAudio(String),
	#[error("Invalid configuration: {0}")]
	Config(#[from] ConfigError),
	#[error("Prometheus error: {0}")]
	Prometheus(#[from] prometheus::Error),
}

/// Failure reported by a transcription engine. Workers record it on the job and move on.
#[derive(Error, Debug)]
pub enum EngineError {
	#[error("I/O error: {0}")]
	Io(#[from] std::io::Error),
	#[error("Transcription process exited with status {code:?}: {stderr}")]
	ProcessFailed { code: Option<i32>, stderr: String },
	#[error("Transcription produced no output")]
	EmptyOutput,
	#[error("Transcription failed: {0}")]
	Failed(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
	#[error("max_queue_size must be at least 1")]
	ZeroCapacity,
	#[error("queue_workers must be at least 1")]
	ZeroWorkers,
}
