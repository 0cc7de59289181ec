//! Error types for practice session operations
//!
//! Marker- and record-level failures are recoverable and reported to the
//! immediate caller. `InvariantViolation` indicates a bug and aborts the
//! operation that detected it.

use thiserror::Error;

/// Top-level error type for the practice engine
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PracticeError {
    /// A marker with the same id is already in the session
    #[error("Marker '{id}' already exists in this session")]
    DuplicateMarker { id: String },

    /// No practice record with the requested id
    #[error("Practice record '{id}' not found")]
    RecordNotFound { id: String },

    /// Internal consistency check failed (should not occur)
    #[error("Invariant violation: {0}")]
    Invariant(#[from] InvariantViolation),

    /// Marker event could not be turned into a marker
    #[error("Invalid marker: {0}")]
    InvalidMarker(String),

    /// Page outside 1..=total_pages
    #[error("Invalid page {page} (score has {total_pages} page(s))")]
    InvalidPage { page: u32, total_pages: u32 },

    /// Loop end before loop start
    #[error("Invalid loop bounds: end {end} is before start {start}")]
    InvalidLoop { start: u32, end: u32 },

    /// Persistence collaborator failed to store the record history
    #[error("Failed to persist practice records: {0}")]
    Persistence(String),

    /// Record history JSON could not be read or written
    #[error("Record history serialization failed: {0}")]
    Serialization(String),

    /// API called before a session was initialized
    #[error("No practice session loaded")]
    NoSession,
}

/// Broken internal invariants
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvariantViolation {
    /// Marker counts of a record don't add up
    #[error("marker counts disagree: total {total}, auto {auto}, manual {manual}")]
    MarkerCountMismatch { total: usize, auto: usize, manual: usize },

    /// Two records share an id
    #[error("duplicate practice record id '{id}'")]
    DuplicateRecordId { id: String },
}

impl From<serde_json::Error> for PracticeError {
    fn from(err: serde_json::Error) -> Self {
        PracticeError::Serialization(err.to_string())
    }
}
