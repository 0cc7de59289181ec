//! Practice record history
//!
//! - `repository`: ordered, id-unique record collection
//! - `persistence`: storage collaborator trait and in-process implementations
//! - `summary`: display rows for the history list

pub mod persistence;
pub mod repository;
pub mod summary;

pub use persistence::{FnPersistence, JsonSnapshotPersistence, MemoryPersistence, RecordPersistence};
pub use repository::RecordRepository;
pub use summary::RecordSummary;
