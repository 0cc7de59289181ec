//! Practice records
//!
//! A `PracticeRecord` is the immutable snapshot of a finished session. Fields
//! are private so the marker counts can never drift from the markers; the
//! counts are checked again whenever a record is read back from JSON.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{InvariantViolation, PracticeError};
use crate::models::marker::{Marker, MarkerOrigin};
use crate::models::settings::PracticeMode;

/// Tallies over a marker set
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct MarkerCounts {
    pub total: usize,
    pub auto_detected: usize,
    pub manual: usize,
    pub errors: usize,
    pub correct: usize,
}

impl MarkerCounts {
    /// Count markers by kind, and as auto or manual by id prefix
    pub fn tally(markers: &[Marker]) -> Self {
        let auto_detected = markers
            .iter()
            .filter(|m| MarkerOrigin::from_id(&m.id) == MarkerOrigin::Auto)
            .count();
        let errors = markers.iter().filter(|m| m.is_error()).count();
        Self {
            total: markers.len(),
            auto_detected,
            manual: markers.len() - auto_detected,
            errors,
            correct: markers.len() - errors,
        }
    }
}

/// Navigation and settings captured when a session is finalized
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub score_name: String,
    pub practice_mode: PracticeMode,
    pub current_page: u32,
    pub total_pages: u32,
    pub markers: Vec<Marker>,
}

/// A finalized practice session
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase", try_from = "PracticeRecordData")]
pub struct PracticeRecord {
    id: String,
    score_name: String,
    timestamp: DateTime<Utc>,
    practice_mode: PracticeMode,
    current_page: u32,
    total_pages: u32,
    markers: Vec<Marker>,
    total_markers: usize,
    auto_detected_markers: usize,
    manual_markers: usize,
}

/// Unchecked wire shape of a record
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PracticeRecordData {
    id: String,
    score_name: String,
    timestamp: DateTime<Utc>,
    practice_mode: PracticeMode,
    current_page: u32,
    total_pages: u32,
    markers: Vec<Marker>,
    total_markers: usize,
    auto_detected_markers: usize,
    manual_markers: usize,
}

impl TryFrom<PracticeRecordData> for PracticeRecord {
    type Error = PracticeError;

    fn try_from(data: PracticeRecordData) -> Result<Self, Self::Error> {
        let record = PracticeRecord {
            id: data.id,
            score_name: data.score_name,
            timestamp: data.timestamp,
            practice_mode: data.practice_mode,
            current_page: data.current_page,
            total_pages: data.total_pages,
            markers: data.markers,
            total_markers: data.total_markers,
            auto_detected_markers: data.auto_detected_markers,
            manual_markers: data.manual_markers,
        };
        record.verify_counts()?;
        Ok(record)
    }
}

impl PracticeRecord {
    /// Build a record from a session snapshot with a fresh id
    pub fn finalize(
        snapshot: SessionSnapshot,
        timestamp: DateTime<Utc>,
    ) -> Result<Self, PracticeError> {
        Self::with_id(Uuid::new_v4().to_string(), snapshot, timestamp)
    }

    /// Build a record with a caller-chosen id
    pub fn with_id(
        id: impl Into<String>,
        snapshot: SessionSnapshot,
        timestamp: DateTime<Utc>,
    ) -> Result<Self, PracticeError> {
        let counts = MarkerCounts::tally(&snapshot.markers);
        let record = PracticeRecord {
            id: id.into(),
            score_name: snapshot.score_name,
            timestamp,
            practice_mode: snapshot.practice_mode,
            current_page: snapshot.current_page,
            total_pages: snapshot.total_pages,
            markers: snapshot.markers,
            total_markers: counts.total,
            auto_detected_markers: counts.auto_detected,
            manual_markers: counts.manual,
        };
        record.verify_counts()?;
        Ok(record)
    }

    /// The three stored counts must agree with each other and with the
    /// markers' id prefixes; every marker's origin must match its prefix
    fn verify_counts(&self) -> Result<(), InvariantViolation> {
        let counts = MarkerCounts::tally(&self.markers);
        let consistent = self.total_markers == self.auto_detected_markers + self.manual_markers
            && self.total_markers == counts.total
            && self.auto_detected_markers == counts.auto_detected
            && self.markers.iter().all(|m| m.check_origin().is_ok());

        if consistent {
            Ok(())
        } else {
            Err(InvariantViolation::MarkerCountMismatch {
                total: self.total_markers,
                auto: self.auto_detected_markers,
                manual: self.manual_markers,
            })
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn score_name(&self) -> &str {
        &self.score_name
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn practice_mode(&self) -> PracticeMode {
        self.practice_mode
    }

    pub fn current_page(&self) -> u32 {
        self.current_page
    }

    pub fn total_pages(&self) -> u32 {
        self.total_pages
    }

    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    pub fn total_markers(&self) -> usize {
        self.total_markers
    }

    pub fn auto_detected_markers(&self) -> usize {
        self.auto_detected_markers
    }

    pub fn manual_markers(&self) -> usize {
        self.manual_markers
    }
}
