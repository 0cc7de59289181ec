//! Persistence collaborator for the record history
//!
//! The repository hands the full record list to a `RecordPersistence` after
//! every mutation. A call that returns `Ok` means the write is durable.

use crate::errors::PracticeError;
use crate::models::PracticeRecord;

/// Durable storage for practice records
pub trait RecordPersistence: Send {
    /// Store the complete record history
    fn persist(&mut self, records: &[PracticeRecord]) -> Result<(), PracticeError>;
}

/// Keeps records in memory only
#[derive(Debug, Clone, Copy, Default)]
pub struct MemoryPersistence;

impl RecordPersistence for MemoryPersistence {
    fn persist(&mut self, _records: &[PracticeRecord]) -> Result<(), PracticeError> {
        Ok(())
    }
}

/// Serializes the history to JSON after every write, keeping the latest copy
#[derive(Debug, Clone, Default)]
pub struct JsonSnapshotPersistence {
    latest: Option<String>,
    writes: usize,
}

impl JsonSnapshotPersistence {
    pub fn new() -> Self {
        Self::default()
    }

    /// The last persisted history, if anything was written yet
    pub fn latest(&self) -> Option<&str> {
        self.latest.as_deref()
    }

    pub fn writes(&self) -> usize {
        self.writes
    }
}

impl RecordPersistence for JsonSnapshotPersistence {
    fn persist(&mut self, records: &[PracticeRecord]) -> Result<(), PracticeError> {
        self.latest = Some(serde_json::to_string(records)?);
        self.writes += 1;
        Ok(())
    }
}

/// Adapter turning a closure into a persistence collaborator
pub struct FnPersistence<F>(pub F);

impl<F> RecordPersistence for FnPersistence<F>
where
    F: FnMut(&[PracticeRecord]) -> Result<(), PracticeError> + Send,
{
    fn persist(&mut self, records: &[PracticeRecord]) -> Result<(), PracticeError> {
        (self.0)(records)
    }
}
