use crate::error::ApiError;
use crate::AppState;
use axum::extract::{Multipart, Path, State};
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::Serialize;
use transcription_queue::{JobId, JobInput, JobStatus, JobStatusView, QueueInfo, ResultLookup};

#[derive(Debug, Serialize)]
pub struct SubmitResponse {
	pub job_id: JobId,
	pub status: JobStatus,
	pub message: &'static str,
}

/// Accepts a multipart upload with a `file` part and an optional `language` part.
pub async fn submit(State(state): State<AppState>, mut multipart: Multipart) -> Result<(StatusCode, Json<SubmitResponse>), ApiError> {
	let mut upload = None;
	let mut language = None;

	while let Some(field) = multipart.next_field().await? {
		let name = field.name().map(str::to_owned);
		match name.as_deref() {
			Some("file") => {
				let filename = field.file_name().map_or_else(|| "upload".to_owned(), str::to_owned);
				let data = field.bytes().await?;
				upload = Some((filename, data));
			}
			Some("language") => language = Some(field.text().await?),
			_ => {}
		}
	}

	let (filename, data) = upload.ok_or(ApiError::MissingFile)?;
	if data.is_empty() {
		return Err(ApiError::EmptyFile);
	}

	let job_id = state.manager.submit(JobInput::new(data, filename).with_language(language))?;
	Ok((
		StatusCode::ACCEPTED,
		Json(SubmitResponse {
			job_id,
			status: JobStatus::Pending,
			message: "Job queued for transcription",
		}),
	))
}

pub async fn status(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<JobStatusView>, ApiError> {
	let id = parse_job_id(&id)?;
	Ok(Json(state.manager.get_status(&id)?))
}

/// Serves the subtitles of a completed job as a WebVTT attachment.
pub async fn result(State(state): State<AppState>, Path(id): Path<String>) -> Result<Response, ApiError> {
	let id = parse_job_id(&id)?;
	match state.manager.get_result(&id)? {
		ResultLookup::Ready(subtitles) => {
			let filename = state.manager.get_status(&id).map_or_else(|_| id.to_string(), |view| view.filename);
			let disposition = format!("attachment; filename=\"{}.vtt\"", attachment_stem(&filename));
			Ok(([(CONTENT_TYPE, "text/vtt; charset=utf-8".to_owned()), (CONTENT_DISPOSITION, disposition)], subtitles).into_response())
		}
		ResultLookup::NotReady(status) => Err(ApiError::NotReady { id, status }),
		ResultLookup::Failed(error) => Err(ApiError::JobFailed(error)),
	}
}

pub async fn queue_info(State(state): State<AppState>) -> Json<QueueInfo> {
	Json(state.manager.queue_info())
}

fn parse_job_id(raw: &str) -> Result<JobId, ApiError> {
	raw.parse().map_err(|_| ApiError::InvalidJobId(raw.to_owned()))
}

/// Upload name without its extension, reduced to characters safe inside a quoted header value.
fn attachment_stem(filename: &str) -> String {
	let stem = filename.rsplit_once('.').map_or(filename, |(stem, _)| stem);
	let cleaned: String = stem
		.chars()
		.map(|c| if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') { c } else { '_' })
		.collect();
	if cleaned.is_empty() {
		"subtitles".to_owned()
	} else {
		cleaned
	}
}
