use axum::extract::multipart::MultipartError;
use axum::http::header::RETRY_AFTER;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use transcription_queue::{JobId, JobStatus, QueueError};

/// Seconds a client is told to wait before resubmitting to a full queue.
const RETRY_AFTER_SECS: &str = "5";

#[derive(thiserror::Error, Debug)]
pub enum ApiError {
	#[error("{0}")]
	Queue(#[from] QueueError),

	#[error("Invalid job id: {0}")]
	InvalidJobId(String),

	#[error("Invalid multipart body: {0}")]
	Multipart(#[from] MultipartError),

	#[error("No audio file provided")]
	MissingFile,

	#[error("Uploaded file is empty")]
	EmptyFile,

	#[error("Job {id} is still {status}")]
	NotReady { id: JobId, status: JobStatus },

	#[error("Transcription failed: {0}")]
	JobFailed(String),
}

#[derive(Serialize)]
struct ErrorBody<'a> {
	error: &'a str,
	#[serde(skip_serializing_if = "Option::is_none")]
	status: Option<JobStatus>,
}

impl ApiError {
	const fn status_code(&self) -> StatusCode {
		match self {
			Self::Queue(QueueError::NotFound(_)) | Self::InvalidJobId(_) => StatusCode::NOT_FOUND,
			Self::Queue(QueueError::QueueFull { .. } | QueueError::ShutDown) => StatusCode::SERVICE_UNAVAILABLE,
			Self::Queue(QueueError::UnsupportedAudio(_)) | Self::Multipart(_) | Self::MissingFile | Self::EmptyFile => StatusCode::BAD_REQUEST,
			Self::NotReady { .. } => StatusCode::ACCEPTED,
			Self::JobFailed(_) | Self::Queue(_) => StatusCode::INTERNAL_SERVER_ERROR,
		}
	}
}

impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		let status = self.status_code();
		if status.is_server_error() && !matches!(self, Self::Queue(QueueError::QueueFull { .. } | QueueError::ShutDown)) {
			tracing::error!(error = %self, "Request failed");
		}

		let message = self.to_string();
		let body = Json(ErrorBody {
			error: &message,
			status: match self {
				Self::NotReady { status, .. } => Some(status),
				Self::JobFailed(_) => Some(JobStatus::Failed),
				_ => None,
			},
		});

		match self {
			Self::Queue(QueueError::QueueFull { .. }) => (status, [(RETRY_AFTER, RETRY_AFTER_SECS)], body).into_response(),
			_ => (status, body).into_response(),
		}
	}
}
