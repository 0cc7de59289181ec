//! Practice engine
//!
//! Owns the live session and the record history. Every external event
//! (marker producers, toolbar, settings panel, section end) is a method here.

use chrono::Utc;

use crate::errors::PracticeError;
use crate::models::{Marker, MarkerEvent, Navigation, PracticeSettings, SettingsPatch};
use crate::records::{RecordRepository, RecordSummary};
use crate::scoring::{compute_feedback, Feedback};
use crate::session::context::{SessionConfig, SessionContext};
use crate::session::lifecycle::{self, PageEndOutcome, RestartOutcome, RestartPlan, SectionSignal};

/// Session state plus practice history
#[derive(Debug)]
pub struct PracticeEngine {
    context: SessionContext,
    records: RecordRepository,
}

impl PracticeEngine {
    /// New engine with an in-memory record history
    pub fn new(config: SessionConfig) -> Result<Self, PracticeError> {
        Self::with_records(config, RecordRepository::new())
    }

    /// New engine over an existing record history
    pub fn with_records(
        config: SessionConfig,
        records: RecordRepository,
    ) -> Result<Self, PracticeError> {
        let context = SessionContext::new(config)?;
        log::info!(
            "Practice session started: '{}' ({} page(s), {} record(s))",
            context.score_name,
            context.navigation.total_pages(),
            records.count()
        );
        Ok(Self { context, records })
    }

    /// Begin a session on another score, keeping the history.
    ///
    /// Unsaved markers of the current session are discarded.
    pub fn start_session(&mut self, config: SessionConfig) -> Result<(), PracticeError> {
        let context = SessionContext::new(config)?;
        if !self.context.markers.is_empty() {
            log::warn!(
                "Discarding {} unsaved marker(s) from '{}'",
                self.context.markers.len(),
                self.context.score_name
            );
        }
        self.context = context;
        Ok(())
    }

    pub fn context(&self) -> &SessionContext {
        &self.context
    }

    pub fn records(&self) -> &RecordRepository {
        &self.records
    }

    // ---- markers ----

    /// Accept a marker event from a producer
    pub fn add_marker(&mut self, event: MarkerEvent) -> Result<Marker, PracticeError> {
        let marker = event.into_marker()?;
        self.insert_marker(marker.clone())?;
        Ok(marker)
    }

    /// Insert an already-built marker
    pub fn insert_marker(&mut self, marker: Marker) -> Result<(), PracticeError> {
        let total_pages = self.context.navigation.total_pages();
        if marker.page == 0 || marker.page > total_pages {
            return Err(PracticeError::InvalidPage {
                page: marker.page,
                total_pages,
            });
        }
        self.context.markers.add_marker(marker)
    }

    pub fn remove_marker(&mut self, id: &str) -> Option<Marker> {
        self.context.markers.remove_marker(id)
    }

    /// Reset the markers without saving
    pub fn clear_markers(&mut self) {
        self.context.markers.clear();
    }

    pub fn markers(&self) -> &[Marker] {
        self.context.markers.list()
    }

    // ---- feedback ----

    pub fn compute_feedback(&self) -> Feedback {
        compute_feedback(self.context.markers.list())
    }

    pub fn signal_section_complete(&mut self) -> SectionSignal {
        lifecycle::signal_section_complete(&mut self.context)
    }

    pub fn acknowledge_feedback(&mut self) -> bool {
        lifecycle::acknowledge_feedback(&mut self.context)
    }

    pub fn pending_feedback(&self) -> Option<Feedback> {
        lifecycle::pending_feedback(&self.context)
    }

    // ---- restart ----

    pub fn restart_plan(&self) -> RestartPlan {
        lifecycle::restart_plan(&self.context)
    }

    /// Restart now, saving a record when markers exist
    pub fn restart(&mut self) -> Result<RestartOutcome, PracticeError> {
        lifecycle::restart(&mut self.context, &mut self.records, Utc::now())
    }

    // ---- records ----

    pub fn record_summaries(&self) -> Vec<RecordSummary> {
        self.records.summaries()
    }

    /// Delete a record; true if it existed
    pub fn delete_record(&mut self, id: &str) -> Result<bool, PracticeError> {
        Ok(self.records.remove(id)?.is_some())
    }

    // ---- settings & navigation ----

    pub fn settings(&self) -> &PracticeSettings {
        &self.context.settings
    }

    /// Merge a partial settings update
    pub fn update_settings(&mut self, patch: SettingsPatch) -> Result<&PracticeSettings, PracticeError> {
        let mut settings = self.context.settings.clone();
        settings.apply(patch)?;
        self.context.set_settings(settings)?;
        Ok(&self.context.settings)
    }

    pub fn navigation(&self) -> Navigation {
        self.context.navigation
    }

    pub fn next_page(&mut self) -> bool {
        self.context.navigation.next_page()
    }

    pub fn previous_page(&mut self) -> bool {
        self.context.navigation.previous_page()
    }

    pub fn set_page(&mut self, page: u32) -> Result<(), PracticeError> {
        self.context.navigation.set_page(page)
    }

    pub fn page_end_reached(&mut self) -> PageEndOutcome {
        lifecycle::page_end_reached(&mut self.context)
    }

    pub fn toggle_playing(&mut self) -> bool {
        self.context.toggle_playing()
    }
}
