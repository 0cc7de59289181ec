//! Display rows for the practice history list

use serde::{Deserialize, Serialize};

use crate::models::PracticeRecord;

/// Timestamp layout used in the history list
pub const TIMESTAMP_FORMAT: &str = "%Y/%m/%d %H:%M";

/// One row of the practice history
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RecordSummary {
    pub id: String,
    pub score_name: String,
    pub recorded_at: String,
    pub mode_label: String,
    /// "current/total"
    pub pages: String,
    pub total_markers: usize,
    pub auto_detected_markers: usize,
    pub manual_markers: usize,
}

impl RecordSummary {
    pub fn from_record(record: &PracticeRecord) -> Self {
        Self {
            id: record.id().to_string(),
            score_name: record.score_name().to_string(),
            recorded_at: record.timestamp().format(TIMESTAMP_FORMAT).to_string(),
            mode_label: record.practice_mode().label().to_string(),
            pages: format!("{}/{}", record.current_page(), record.total_pages()),
            total_markers: record.total_markers(),
            auto_detected_markers: record.auto_detected_markers(),
            manual_markers: record.manual_markers(),
        }
    }
}
