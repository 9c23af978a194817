use crate::error::QueueError;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Opaque job identifier, generated once at submission and never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(Uuid);

impl JobId {
	#[must_use]
	pub fn new() -> Self {
		Self(Uuid::new_v4())
	}

	#[must_use]
	pub const fn as_uuid(&self) -> &Uuid {
		&self.0
	}
}

impl Default for JobId {
	fn default() -> Self {
		Self::new()
	}
}

impl fmt::Display for JobId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		self.0.fmt(f)
	}
}

impl FromStr for JobId {
	type Err = uuid::Error;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Uuid::parse_str(s).map(Self)
	}
}

/// Lifecycle of a job: `Pending -> Processing -> {Completed | Failed}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
	Pending,
	Processing,
	Completed,
	Failed,
}

impl JobStatus {
	pub const ALL: [Self; 4] = [Self::Pending, Self::Processing, Self::Completed, Self::Failed];

	#[must_use]
	pub const fn is_terminal(self) -> bool {
		matches!(self, Self::Completed | Self::Failed)
	}

	/// Only forward, single-step moves are legal.
	#[must_use]
	pub const fn can_transition_to(self, next: Self) -> bool {
		matches!(
			(self, next),
			(Self::Pending, Self::Processing) | (Self::Processing, Self::Completed) | (Self::Processing, Self::Failed)
		)
	}

	#[must_use]
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Pending => "pending",
			Self::Processing => "processing",
			Self::Completed => "completed",
			Self::Failed => "failed",
		}
	}
}

impl fmt::Display for JobStatus {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Audio payload plus the hints handed to the engine. Immutable once submitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobInput {
	pub audio: Bytes,
	pub filename: String,
	pub language: Option<String>,
}

impl JobInput {
	pub fn new(audio: impl Into<Bytes>, filename: impl Into<String>) -> Self {
		Self {
			audio: audio.into(),
			filename: filename.into(),
			language: None,
		}
	}

	#[must_use]
	pub fn with_language(mut self, language: Option<String>) -> Self {
		self.language = language.map(|l| l.trim().to_owned()).filter(|l| !l.is_empty());
		self
	}
}

/// What travels through the queue. Ownership moves to exactly one worker on dequeue.
#[derive(Debug, Clone)]
pub struct JobDescriptor {
	pub id: JobId,
	pub input: JobInput,
}

/// Lifecycle state of one job as held by the store.
#[derive(Debug, Clone)]
pub struct JobRecord {
	id: JobId,
	status: JobStatus,
	input: JobInput,
	result: Option<String>,
	error: Option<String>,
	submitted_at: DateTime<Utc>,
	started_at: Option<DateTime<Utc>>,
	completed_at: Option<DateTime<Utc>>,
}

impl JobRecord {
	pub(crate) fn new(id: JobId, input: JobInput) -> Self {
		Self {
			id,
			status: JobStatus::Pending,
			input,
			result: None,
			error: None,
			submitted_at: Utc::now(),
			started_at: None,
			completed_at: None,
		}
	}

	///
	/// # Errors
	/// Returns `InvalidTransition` unless the job is `Pending`
	pub fn begin(&mut self) -> Result<(), QueueError> {
		self.transition(JobStatus::Processing)?;
		self.started_at = Some(Utc::now());
		Ok(())
	}

	///
	/// # Errors
	/// Returns `InvalidTransition` unless the job is `Processing`
	pub fn complete(&mut self, subtitles: String) -> Result<(), QueueError> {
		self.transition(JobStatus::Completed)?;
		self.result = Some(subtitles);
		self.completed_at = Some(Utc::now());
		Ok(())
	}

	///
	/// # Errors
	/// Returns `InvalidTransition` unless the job is `Processing`
	pub fn fail(&mut self, error: impl Into<String>) -> Result<(), QueueError> {
		self.transition(JobStatus::Failed)?;
		let error = error.into();
		self.error = Some(if error.trim().is_empty() { "unknown error".to_owned() } else { error });
		self.completed_at = Some(Utc::now());
		Ok(())
	}

	fn transition(&mut self, next: JobStatus) -> Result<(), QueueError> {
		if !self.status.can_transition_to(next) {
			return Err(QueueError::InvalidTransition {
				id: self.id,
				from: self.status,
				to: next,
			});
		}
		self.status = next;
		Ok(())
	}

	#[must_use]
	pub const fn id(&self) -> JobId {
		self.id
	}

	#[must_use]
	pub const fn status(&self) -> JobStatus {
		self.status
	}

	#[must_use]
	pub const fn input(&self) -> &JobInput {
		&self.input
	}

	#[must_use]
	pub fn result(&self) -> Option<&str> {
		self.result.as_deref()
	}

	#[must_use]
	pub fn error(&self) -> Option<&str> {
		self.error.as_deref()
	}

	#[must_use]
	pub const fn submitted_at(&self) -> DateTime<Utc> {
		self.submitted_at
	}

	#[must_use]
	pub const fn started_at(&self) -> Option<DateTime<Utc>> {
		self.started_at
	}

	#[must_use]
	pub const fn completed_at(&self) -> Option<DateTime<Utc>> {
		self.completed_at
	}

	#[must_use]
	pub fn view(&self) -> JobStatusView {
		JobStatusView {
			job_id: self.id,
			status: self.status,
			filename: self.input.filename.clone(),
			language: self.input.language.clone(),
			submitted_at: self.submitted_at,
			started_at: self.started_at,
			completed_at: self.completed_at,
			error: self.error.clone(),
		}
	}

	#[must_use]
	pub fn lookup_result(&self) -> ResultLookup {
		match (self.status, &self.result, &self.error) {
			(JobStatus::Completed, Some(text), _) => ResultLookup::Ready(text.clone()),
			(JobStatus::Failed, _, Some(error)) => ResultLookup::Failed(error.clone()),
			(status, ..) => ResultLookup::NotReady(status),
		}
	}
}

/// Status snapshot returned by `get_status`; the subtitle text is served separately.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobStatusView {
	pub job_id: JobId,
	pub status: JobStatus,
	pub filename: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub language: Option<String>,
	pub submitted_at: DateTime<Utc>,
	pub started_at: Option<DateTime<Utc>>,
	pub completed_at: Option<DateTime<Utc>>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResultLookup {
	Ready(String),
	/// Not a fault: poll again.
	NotReady(JobStatus),
	Failed(String),
}

#[cfg(test)]
mod tests {
	use super::*;

	fn record() -> JobRecord {
		JobRecord::new(JobId::new(), JobInput::new(&b"RIFF0000WAVEfmt "[..], "clip.wav"))
	}

	#[test]
	fn test_forward_transitions_only() {
		use JobStatus::{Completed, Failed, Pending, Processing};

		assert!(Pending.can_transition_to(Processing));
		assert!(Processing.can_transition_to(Completed));
		assert!(Processing.can_transition_to(Failed));

		assert!(!Pending.can_transition_to(Completed));
		assert!(!Pending.can_transition_to(Failed));
		assert!(!Processing.can_transition_to(Pending));
		assert!(!Completed.can_transition_to(Processing));
		assert!(!Failed.can_transition_to(Completed));
	}

	#[test]
	fn test_completed_lifecycle() {
		let mut job = record();
		assert_eq!(job.status(), JobStatus::Pending);
		assert_eq!(job.lookup_result(), ResultLookup::NotReady(JobStatus::Pending));

		job.begin().unwrap();
		assert_eq!(job.status(), JobStatus::Processing);
		assert!(job.started_at().is_some());
		assert!(job.completed_at().is_none());

		job.complete("WEBVTT\n\n".to_owned()).unwrap();
		assert_eq!(job.status(), JobStatus::Completed);
		assert_eq!(job.result(), Some("WEBVTT\n\n"));
		assert!(job.error().is_none());
		assert!(job.completed_at().is_some());
		assert_eq!(job.lookup_result(), ResultLookup::Ready("WEBVTT\n\n".to_owned()));
	}

	#[test]
	fn test_failed_lifecycle_keeps_result_empty() {
		let mut job = record();
		job.begin().unwrap();
		job.fail("decoder exploded").unwrap();

		assert_eq!(job.status(), JobStatus::Failed);
		assert_eq!(job.error(), Some("decoder exploded"));
		assert!(job.result().is_none());
		assert_eq!(job.lookup_result(), ResultLookup::Failed("decoder exploded".to_owned()));
	}

	#[test]
	fn test_blank_failure_message_is_never_stored_empty() {
		let mut job = record();
		job.begin().unwrap();
		job.fail("  ").unwrap();
		assert_eq!(job.error(), Some("unknown error"));
	}

	#[test]
	fn test_skipping_processing_is_rejected() {
		let mut job = record();
		let err = job.complete("text".to_owned()).unwrap_err();
		assert!(matches!(
			err,
			QueueError::InvalidTransition {
				from: JobStatus::Pending,
				to: JobStatus::Completed,
				..
			}
		));
		assert_eq!(job.status(), JobStatus::Pending);
		assert!(job.result().is_none());
	}

	#[test]
	fn test_terminal_state_is_final() {
		let mut job = record();
		job.begin().unwrap();
		job.complete("a".to_owned()).unwrap();
		assert!(job.begin().is_err());
		assert!(job.fail("late").is_err());
		assert!(job.error().is_none());
	}

	#[test]
	fn test_status_serialization() {
		let json = serde_json::to_string(&JobStatus::Processing).unwrap();
		assert_eq!(json, "\"processing\"");
	}

	#[test]
	fn test_job_id_round_trips_through_text() {
		let id = JobId::new();
		let parsed: JobId = id.to_string().parse().unwrap();
		assert_eq!(id, parsed);
		assert!("not-a-uuid".parse::<JobId>().is_err());
	}

	#[test]
	fn test_blank_language_hint_is_dropped() {
		let input = JobInput::new(Vec::<u8>::new(), "a.wav").with_language(Some("  ".to_owned()));
		assert_eq!(input.language, None);
		let input = JobInput::new(Vec::<u8>::new(), "a.wav").with_language(Some(" en ".to_owned()));
		assert_eq!(input.language.as_deref(), Some("en"));
	}
}
