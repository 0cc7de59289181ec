//! Practice record repository
//!
//! Append-only, ordered oldest first. Every mutation is handed to the
//! persistence collaborator before it is reported as done; if persisting
//! fails the in-memory change is rolled back.

use std::fmt;

use crate::errors::{InvariantViolation, PracticeError};
use crate::models::PracticeRecord;
use crate::records::persistence::{MemoryPersistence, RecordPersistence};
use crate::records::summary::RecordSummary;

/// Ordered collection of finalized practice sessions
pub struct RecordRepository {
    records: Vec<PracticeRecord>,
    persistence: Box<dyn RecordPersistence>,
}

impl RecordRepository {
    /// Empty repository that keeps records in memory
    pub fn new() -> Self {
        Self::with_persistence(Box::new(MemoryPersistence))
    }

    /// Empty repository backed by the given persistence
    pub fn with_persistence(persistence: Box<dyn RecordPersistence>) -> Self {
        Self {
            records: Vec::new(),
            persistence,
        }
    }

    /// Repository preloaded from a JSON history.
    ///
    /// Every record is re-validated; duplicate ids are rejected.
    pub fn from_json(
        json: &str,
        persistence: Box<dyn RecordPersistence>,
    ) -> Result<Self, PracticeError> {
        let records: Vec<PracticeRecord> = serde_json::from_str(json)?;
        let mut repo = Self::with_persistence(persistence);
        for record in records {
            repo.ensure_unique(record.id())?;
            repo.records.push(record);
        }
        log::debug!("Loaded {} practice record(s)", repo.records.len());
        Ok(repo)
    }

    /// Swap the persistence collaborator, keeping the records
    pub fn set_persistence(&mut self, persistence: Box<dyn RecordPersistence>) {
        self.persistence = persistence;
    }

    fn ensure_unique(&self, id: &str) -> Result<(), PracticeError> {
        if self.records.iter().any(|r| r.id() == id) {
            log::warn!("Rejected practice record with duplicate id {}", id);
            return Err(InvariantViolation::DuplicateRecordId { id: id.to_string() }.into());
        }
        Ok(())
    }

    /// Add a record at the end and persist
    pub fn append(&mut self, record: PracticeRecord) -> Result<(), PracticeError> {
        self.ensure_unique(record.id())?;
        self.records.push(record);

        if let Err(e) = self.persistence.persist(&self.records) {
            self.records.pop();
            log::warn!("Practice record not saved: {}", e);
            return Err(e);
        }
        Ok(())
    }

    /// Delete a record by id; returns `None` when there is no such record
    pub fn remove(&mut self, id: &str) -> Result<Option<PracticeRecord>, PracticeError> {
        let Some(index) = self.records.iter().position(|r| r.id() == id) else {
            log::debug!("Delete ignored, no practice record {}", id);
            return Ok(None);
        };
        let removed = self.records.remove(index);

        if let Err(e) = self.persistence.persist(&self.records) {
            self.records.insert(index, removed);
            log::warn!("Practice record {} not deleted: {}", id, e);
            return Err(e);
        }
        Ok(Some(removed))
    }

    /// Look up a record by id
    pub fn get(&self, id: &str) -> Result<&PracticeRecord, PracticeError> {
        self.records
            .iter()
            .find(|r| r.id() == id)
            .ok_or_else(|| PracticeError::RecordNotFound { id: id.to_string() })
    }

    /// Records oldest first
    pub fn list(&self) -> &[PracticeRecord] {
        &self.records
    }

    /// Records newest first, for history display
    pub fn newest_first(&self) -> impl Iterator<Item = &PracticeRecord> {
        self.records.iter().rev()
    }

    pub fn count(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Display rows, newest first
    pub fn summaries(&self) -> Vec<RecordSummary> {
        self.newest_first().map(RecordSummary::from_record).collect()
    }

    /// Serialize the history, oldest first
    pub fn to_json(&self) -> Result<String, PracticeError> {
        Ok(serde_json::to_string(&self.records)?)
    }
}

impl Default for RecordRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for RecordRepository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordRepository")
            .field("records", &self.records)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Marker, MarkerKind, PracticeMode, SessionSnapshot};
    use crate::records::persistence::{FnPersistence, JsonSnapshotPersistence};
    use chrono::{TimeZone, Utc};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn record(id: &str, markers: Vec<Marker>) -> PracticeRecord {
        PracticeRecord::with_id(
            id,
            SessionSnapshot {
                score_name: "Etude".to_string(),
                practice_mode: PracticeMode::Practice,
                current_page: 1,
                total_pages: 2,
                markers,
            },
            Utc.with_ymd_and_hms(2024, 5, 1, 8, 30, 0).unwrap(),
        )
        .unwrap()
    }

    fn failing() -> Box<dyn RecordPersistence> {
        Box::new(FnPersistence(|_: &[PracticeRecord]| -> Result<(), PracticeError> {
            Err(PracticeError::Persistence("storage full".to_string()))
        }))
    }

    #[test]
    fn test_append_keeps_insertion_order() {
        let mut repo = RecordRepository::new();
        repo.append(record("r1", vec![])).unwrap();
        repo.append(record("r2", vec![])).unwrap();
        repo.append(record("r3", vec![])).unwrap();

        let ids: Vec<_> = repo.list().iter().map(|r| r.id()).collect();
        assert_eq!(ids, vec!["r1", "r2", "r3"]);

        let newest: Vec<_> = repo.newest_first().map(|r| r.id()).collect();
        assert_eq!(newest, vec!["r3", "r2", "r1"]);
        assert_eq!(repo.count(), 3);
    }

    #[test]
    fn test_duplicate_record_id_is_rejected() {
        let mut repo = RecordRepository::new();
        repo.append(record("r1", vec![])).unwrap();

        let result = repo.append(record("r1", vec![]));

        assert_eq!(
            result,
            Err(PracticeError::Invariant(InvariantViolation::DuplicateRecordId {
                id: "r1".to_string()
            }))
        );
        assert_eq!(repo.count(), 1);
    }

    #[test]
    fn test_remove_missing_record_is_noop() {
        let mut repo = RecordRepository::new();
        repo.append(record("r1", vec![])).unwrap();

        assert_eq!(repo.remove("nope").unwrap(), None);
        assert_eq!(repo.count(), 1);
    }

    #[test]
    fn test_remove_existing_record() {
        let mut repo = RecordRepository::new();
        repo.append(record("r1", vec![])).unwrap();
        repo.append(record("r2", vec![])).unwrap();

        let removed = repo.remove("r1").unwrap().unwrap();

        assert_eq!(removed.id(), "r1");
        assert_eq!(repo.list()[0].id(), "r2");
        assert!(matches!(
            repo.get("r1"),
            Err(PracticeError::RecordNotFound { .. })
        ));
    }

    #[test]
    fn test_failed_persist_rolls_back_append() {
        let mut repo = RecordRepository::with_persistence(failing());

        let result = repo.append(record("r1", vec![]));

        assert!(matches!(result, Err(PracticeError::Persistence(_))));
        assert!(repo.is_empty());
    }

    #[test]
    fn test_failed_persist_rolls_back_remove() {
        let mut repo = RecordRepository::new();
        repo.append(record("r1", vec![])).unwrap();
        repo.append(record("r2", vec![])).unwrap();
        repo.set_persistence(failing());

        assert!(repo.remove("r1").is_err());
        let ids: Vec<_> = repo.list().iter().map(|r| r.id()).collect();
        assert_eq!(ids, vec!["r1", "r2"]);
    }

    #[test]
    fn test_every_mutation_is_persisted() {
        let writes = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&writes);
        let mut repo = RecordRepository::with_persistence(Box::new(FnPersistence(
            move |_: &[PracticeRecord]| -> Result<(), PracticeError> {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(())
            },
        )));

        repo.append(record("r1", vec![])).unwrap();
        repo.remove("r1").unwrap();
        repo.remove("r1").unwrap();

        // The no-op delete does not write
        assert_eq!(writes.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_json_history_reload() {
        let mut repo = RecordRepository::new();
        repo.append(record("r1", vec![Marker::new("auto-1", MarkerKind::Error, 1)]))
            .unwrap();
        repo.append(record("r2", vec![Marker::new("m1", MarkerKind::Correct, 2)]))
            .unwrap();

        let json = repo.to_json().unwrap();
        let reloaded =
            RecordRepository::from_json(&json, Box::new(JsonSnapshotPersistence::new())).unwrap();

        assert_eq!(reloaded.list(), repo.list());
    }

    #[test]
    fn test_json_history_with_duplicate_ids_is_rejected() {
        let one = serde_json::to_value(record("r1", vec![])).unwrap();
        let json = serde_json::to_string(&vec![one.clone(), one]).unwrap();

        let result = RecordRepository::from_json(&json, Box::new(MemoryPersistence));

        assert!(matches!(result, Err(PracticeError::Invariant(_))));
    }

    #[test]
    fn test_malformed_history_is_a_serialization_error() {
        let result = RecordRepository::from_json("{not json", Box::new(MemoryPersistence));
        assert!(matches!(result, Err(PracticeError::Serialization(_))));
    }
}
