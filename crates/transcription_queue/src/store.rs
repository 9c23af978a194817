use crate::error::QueueError;
use crate::job::{JobId, JobInput, JobRecord, JobStatus};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use serde::Serialize;
use std::sync::{Arc, Mutex, PoisonError};

/// Per-status job counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
	pub pending: usize,
	pub processing: usize,
	pub completed: usize,
	pub failed: usize,
}

impl StatusCounts {
	#[must_use]
	pub const fn get(&self, status: JobStatus) -> usize {
		match status {
			JobStatus::Pending => self.pending,
			JobStatus::Processing => self.processing,
			JobStatus::Completed => self.completed,
			JobStatus::Failed => self.failed,
		}
	}

	#[must_use]
	pub const fn total(&self) -> usize {
		self.pending + self.processing + self.completed + self.failed
	}

	fn slot(&mut self, status: JobStatus) -> &mut usize {
		match status {
			JobStatus::Pending => &mut self.pending,
			JobStatus::Processing => &mut self.processing,
			JobStatus::Completed => &mut self.completed,
			JobStatus::Failed => &mut self.failed,
		}
	}
}

/// Concurrent map of job id to lifecycle record.
///
/// Records live in a sharded `DashMap`, so updates to different ids only contend when they hash
/// to the same shard. The per-status tally is adjusted while the record's shard lock is still held,
/// which makes `counts()` an exact snapshot without scanning the map.
#[derive(Debug, Clone, Default)]
pub struct JobStore {
	records: Arc<DashMap<JobId, JobRecord>>,
	counts: Arc<Mutex<StatusCounts>>,
}

impl JobStore {
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}

	/// Inserts a `Pending` record under a fresh id. The record is visible to lookups on return.
	pub fn create(&self, input: JobInput) -> JobId {
		loop {
			let id = JobId::new();
			if let Entry::Vacant(slot) = self.records.entry(id) {
				let _guard = slot.insert(JobRecord::new(id, input));
				self.tally(|counts| *counts.slot(JobStatus::Pending) += 1);
				return id;
			}
		}
	}

	///
	/// # Errors
	/// Returns `NotFound` if no record exists for `id`
	pub fn get(&self, id: &JobId) -> Result<JobRecord, QueueError> {
		self.records.get(id).map(|record| record.value().clone()).ok_or(QueueError::NotFound(*id))
	}

	/// Applies `mutate` to the record while holding its entry lock.
	///
	/// # Errors
	/// Returns `NotFound` for an unknown id, or whatever `mutate` returns
	pub fn update<T, F>(&self, id: &JobId, mutate: F) -> Result<T, QueueError>
	where
		F: FnOnce(&mut JobRecord) -> Result<T, QueueError>,
	{
		let mut record = self.records.get_mut(id).ok_or(QueueError::NotFound(*id))?;
		let before = record.status();
		let out = mutate(record.value_mut())?;
		let after = record.status();
		if before != after {
			self.tally(|counts| {
				*counts.slot(before) -= 1;
				*counts.slot(after) += 1;
			});
		}
		drop(record);
		Ok(out)
	}

	/// Drops a record. Only used to discard a job whose admission was refused.
	pub fn remove(&self, id: &JobId) -> Option<JobRecord> {
		let (_, record) = self.records.remove_if(id, |_, record| {
			self.tally(|counts| *counts.slot(record.status()) -= 1);
			true
		})?;
		Some(record)
	}

	#[must_use]
	pub fn counts(&self) -> StatusCounts {
		*self.counts.lock().unwrap_or_else(PoisonError::into_inner)
	}

	#[must_use]
	pub fn len(&self) -> usize {
		self.records.len()
	}

	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.records.is_empty()
	}

	fn tally(&self, adjust: impl FnOnce(&mut StatusCounts)) {
		let mut counts = self.counts.lock().unwrap_or_else(PoisonError::into_inner);
		adjust(&mut counts);
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::collections::HashSet;

	fn input(name: &str) -> JobInput {
		JobInput::new(&b"ID3\x04\x00\x00\x00\x00\x00\x00\x00\x00"[..], name)
	}

	#[test]
	fn test_create_and_get() {
		let store = JobStore::new();
		let id = store.create(input("a.mp3"));

		let record = store.get(&id).unwrap();
		assert_eq!(record.id(), id);
		assert_eq!(record.status(), JobStatus::Pending);
		assert_eq!(record.input().filename, "a.mp3");
		assert_eq!(store.counts().pending, 1);
	}

	#[test]
	fn test_unknown_id_is_not_found() {
		let store = JobStore::new();
		let missing = JobId::new();
		assert!(matches!(store.get(&missing), Err(QueueError::NotFound(id)) if id == missing));
		assert!(matches!(store.update(&missing, JobRecord::begin), Err(QueueError::NotFound(_))));
	}

	#[test]
	fn test_update_moves_counts() {
		let store = JobStore::new();
		let a = store.create(input("a.mp3"));
		let b = store.create(input("b.mp3"));

		store.update(&a, JobRecord::begin).unwrap();
		assert_eq!(
			store.counts(),
			StatusCounts {
				pending: 1,
				processing: 1,
				completed: 0,
				failed: 0
			}
		);

		store.update(&a, |r| r.complete("WEBVTT".to_owned())).unwrap();
		store.update(&b, JobRecord::begin).unwrap();
		store.update(&b, |r| r.fail("boom")).unwrap();

		let counts = store.counts();
		assert_eq!(counts.completed, 1);
		assert_eq!(counts.failed, 1);
		assert_eq!(counts.total(), 2);
	}

	#[test]
	fn test_rejected_update_leaves_record_and_counts_untouched() {
		let store = JobStore::new();
		let id = store.create(input("a.mp3"));

		assert!(store.update(&id, |r| r.complete("x".to_owned())).is_err());
		assert_eq!(store.get(&id).unwrap().status(), JobStatus::Pending);
		assert_eq!(store.counts().pending, 1);
	}

	#[test]
	fn test_remove_discards_record() {
		let store = JobStore::new();
		let id = store.create(input("a.mp3"));
		assert!(store.remove(&id).is_some());
		assert!(store.get(&id).is_err());
		assert!(store.remove(&id).is_none());
		assert_eq!(store.counts().total(), 0);
		assert!(store.is_empty());
	}

	#[test]
	fn test_concurrent_creates_and_updates() {
		let store = JobStore::new();
		let handles: Vec<_> = (0..8)
			.map(|t| {
				let store = store.clone();
				std::thread::spawn(move || {
					(0..250)
						.map(|i| {
							let id = store.create(input(&format!("{t}-{i}.mp3")));
							store.update(&id, JobRecord::begin).unwrap();
							if i % 2 == 0 {
								store.update(&id, |r| r.complete("ok".to_owned())).unwrap();
							} else {
								store.update(&id, |r| r.fail("bad")).unwrap();
							}
							id
						})
						.collect::<Vec<_>>()
				})
			})
			.collect();

		let ids: HashSet<JobId> = handles.into_iter().flat_map(|h| h.join().unwrap()).collect();
		assert_eq!(ids.len(), 2000);
		assert_eq!(store.len(), 2000);

		let counts = store.counts();
		assert_eq!(counts.completed, 1000);
		assert_eq!(counts.failed, 1000);
		assert_eq!(counts.pending + counts.processing, 0);
	}
}
