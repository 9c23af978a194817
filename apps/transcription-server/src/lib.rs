pub mod config;
pub mod error;
pub mod handlers;
pub mod routes;

pub use config::Config;
pub use error::ApiError;
pub use routes::app;

use prometheus::Registry;
use std::sync::Arc;
use transcription_queue::QueueManager;

#[derive(Clone)]
pub struct AppState {
	pub manager: Arc<QueueManager>,
	pub registry: Registry,
}

impl AppState {
	#[must_use]
	pub const fn new(manager: Arc<QueueManager>, registry: Registry) -> Self {
		Self { manager, registry }
	}
}
