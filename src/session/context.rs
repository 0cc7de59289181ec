//! Session context
//!
//! This module contains the SessionContext struct which represents the live
//! practice attempt: the marker store plus the navigation and settings it is
//! played under. It is passed explicitly to the lifecycle functions and the
//! scoring engine.

use serde::{Deserialize, Serialize};

use crate::errors::PracticeError;
use crate::models::{Navigation, PracticeSettings, SessionSnapshot};
use crate::session::marker_store::MarkerStore;

/// Configuration for a new session, as supplied by the front end
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct SessionConfig {
    pub score_name: String,
    pub total_pages: u32,
    pub current_page: u32,
    pub settings: PracticeSettings,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            score_name: "Untitled Score".to_string(),
            total_pages: 1,
            current_page: 1,
            settings: PracticeSettings::default(),
        }
    }
}

/// The practice attempt in progress
#[derive(Serialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct SessionContext {
    pub score_name: String,

    /// Markers placed since the last reset; written only through the engine
    pub(crate) markers: MarkerStore,

    pub navigation: Navigation,

    pub settings: PracticeSettings,

    /// Playback running (practice mode only)
    pub is_playing: bool,

    /// Section-complete flag, set until the feedback is acknowledged
    pub(crate) section_complete: bool,
}

impl SessionContext {
    /// Create a fresh session with an empty marker store
    pub fn new(config: SessionConfig) -> Result<Self, PracticeError> {
        config.settings.validate()?;
        check_loop_fits(&config.settings, config.total_pages)?;

        Ok(Self {
            score_name: config.score_name,
            markers: MarkerStore::new(),
            navigation: Navigation::at_page(config.current_page, config.total_pages)?,
            settings: config.settings,
            is_playing: false,
            section_complete: false,
        })
    }

    /// Read access to the markers placed so far.
    ///
    /// Markers are added through `PracticeEngine`, which checks their page:
    ///
    /// ```compile_fail
    /// use practice_engine_wasm::{Marker, MarkerKind, SessionConfig, SessionContext};
    ///
    /// let mut ctx = SessionContext::new(SessionConfig::default()).unwrap();
    /// ctx.markers.add_marker(Marker::new("m1", MarkerKind::Error, 99)).unwrap();
    /// ```
    pub fn markers(&self) -> &MarkerStore {
        &self.markers
    }

    pub fn is_section_complete(&self) -> bool {
        self.section_complete
    }

    /// Copy of everything a practice record captures
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            score_name: self.score_name.clone(),
            practice_mode: self.settings.mode,
            current_page: self.navigation.current_page(),
            total_pages: self.navigation.total_pages(),
            markers: self.markers.snapshot(),
        }
    }

    /// Toggle play/pause; no-op outside practice mode
    pub fn toggle_playing(&mut self) -> bool {
        if self.settings.playback_controls_enabled() {
            self.is_playing = !self.is_playing;
        }
        self.is_playing
    }

    /// Replace the settings wholesale
    pub fn set_settings(&mut self, settings: PracticeSettings) -> Result<(), PracticeError> {
        settings.validate()?;
        check_loop_fits(&settings, self.navigation.total_pages())?;
        if !settings.playback_controls_enabled() {
            self.is_playing = false;
        }
        self.settings = settings;
        Ok(())
    }

    /// Page a fresh attempt starts on: the loop start, or page 1
    pub fn start_page(&self) -> u32 {
        self.settings
            .active_loop()
            .map(|l| l.start)
            .unwrap_or(1)
    }

    /// Last page of the section being played: the loop end, or the last page
    pub fn section_end_page(&self) -> u32 {
        self.settings
            .active_loop()
            .and_then(|l| l.end)
            .unwrap_or_else(|| self.navigation.total_pages())
    }

    /// Go back to the start page and stop playback
    pub fn rewind(&mut self) {
        self.is_playing = false;
        self.navigation.go_to_clamped(self.start_page());
    }
}

fn check_loop_fits(settings: &PracticeSettings, total_pages: u32) -> Result<(), PracticeError> {
    for page in [settings.loop_start, settings.loop_end].into_iter().flatten() {
        if page == 0 || page > total_pages {
            return Err(PracticeError::InvalidPage { page, total_pages });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Marker, MarkerKind, PracticeMode};

    fn config() -> SessionConfig {
        SessionConfig {
            score_name: "Nocturne".to_string(),
            total_pages: 5,
            ..Default::default()
        }
    }

    #[test]
    fn test_new_session_is_empty() {
        let ctx = SessionContext::new(config()).unwrap();

        assert!(ctx.markers.is_empty());
        assert_eq!(ctx.navigation.current_page(), 1);
        assert!(!ctx.is_playing);
        assert!(!ctx.is_section_complete());
    }

    #[test]
    fn test_loop_outside_score_is_rejected() {
        let mut cfg = config();
        cfg.settings.loop_start = Some(6);

        assert_eq!(
            SessionContext::new(cfg).unwrap_err(),
            PracticeError::InvalidPage { page: 6, total_pages: 5 }
        );
    }

    #[test]
    fn test_snapshot_captures_navigation_and_mode() {
        let mut ctx = SessionContext::new(config()).unwrap();
        ctx.navigation.set_page(4).unwrap();
        ctx.settings.mode = PracticeMode::Performance;
        ctx.markers
            .add_marker(Marker::new("m1", MarkerKind::Error, 4))
            .unwrap();

        let snapshot = ctx.snapshot();

        assert_eq!(snapshot.score_name, "Nocturne");
        assert_eq!(snapshot.practice_mode, PracticeMode::Performance);
        assert_eq!(snapshot.current_page, 4);
        assert_eq!(snapshot.total_pages, 5);
        assert_eq!(snapshot.markers.len(), 1);
    }

    #[test]
    fn test_playback_only_toggles_in_practice_mode() {
        let mut ctx = SessionContext::new(config()).unwrap();
        assert!(ctx.toggle_playing());
        assert!(!ctx.toggle_playing());

        ctx.settings.mode = PracticeMode::Performance;
        assert!(!ctx.toggle_playing());
    }

    #[test]
    fn test_switching_to_performance_stops_playback() {
        let mut ctx = SessionContext::new(config()).unwrap();
        ctx.toggle_playing();

        let settings = PracticeSettings {
            mode: PracticeMode::Performance,
            ..Default::default()
        };
        ctx.set_settings(settings).unwrap();

        assert!(!ctx.is_playing);
    }

    #[test]
    fn test_section_ends_at_loop_end_in_practice_mode() {
        let mut cfg = config();
        cfg.settings.loop_start = Some(2);
        cfg.settings.loop_end = Some(4);
        let mut ctx = SessionContext::new(cfg).unwrap();
        assert_eq!(ctx.section_end_page(), 4);

        ctx.settings.loop_end = None;
        assert_eq!(ctx.section_end_page(), 5);

        ctx.settings.loop_end = Some(4);
        ctx.settings.mode = PracticeMode::Performance;
        assert_eq!(ctx.section_end_page(), 5);
    }

    #[test]
    fn test_rewind_goes_to_loop_start() {
        let mut cfg = config();
        cfg.settings.loop_start = Some(3);
        let mut ctx = SessionContext::new(cfg).unwrap();
        ctx.navigation.set_page(5).unwrap();

        ctx.rewind();
        assert_eq!(ctx.navigation.current_page(), 3);

        ctx.settings.mode = PracticeMode::Performance;
        ctx.rewind();
        assert_eq!(ctx.navigation.current_page(), 1);
    }
}
