//! Asynchronous transcription job queue.
//!
//! Jobs are admitted into a bounded FIFO ([`JobQueue`]), processed by a fixed pool of workers
//! ([`WorkerPool`]) that call a [`TranscriptionEngine`], and tracked in a concurrent
//! [`JobStore`]. [`QueueManager`] composes the three behind the submit / status / result / info
//! operations an HTTP layer needs.
//!
//! ```no_run
//! use std::sync::Arc;
//! use transcription_queue::{CommandEngine, JobInput, QueueConfig, QueueManager};
//!
//! # async fn run(audio: Vec<u8>) -> Result<(), transcription_queue::QueueError> {
//! let engine = Arc::new(CommandEngine::new("whisper-cli", vec!["-f".into(), "{input}".into()]));
//! let manager = QueueManager::new(&QueueConfig::default(), engine, &prometheus::Registry::new())?;
//! manager.start();
//!
//! let id = manager.submit(JobInput::new(audio, "talk.wav"))?;
//! println!("{:?}", manager.get_status(&id)?.status);
//!
//! manager.shutdown().await;
//! # Ok(())
//! # }
//! ```

pub mod audio;
pub mod config;
pub mod engine;
pub mod error;
pub mod job;
pub mod manager;
pub mod metrics;
pub mod pool;
pub mod queue;
pub mod store;
pub mod supervisor;
pub mod worker;

pub use audio::AudioFormat;
pub use config::QueueConfig;
pub use engine::{CommandEngine, TranscriptionEngine};
pub use error::{ConfigError, EngineError, QueueError};
pub use job::{JobDescriptor, JobId, JobInput, JobRecord, JobStatus, JobStatusView, ResultLookup};
pub use manager::QueueManager;
pub use metrics::QueueMetrics;
pub use pool::{WorkerPool, SHUTDOWN_ERROR};
pub use queue::JobQueue;
pub use store::{JobStore, StatusCounts};
pub use supervisor::{QueueInfo, Supervisor};
