//! Shared types for the WASM API
//!
//! This module contains result types returned to JavaScript by several API
//! functions.

use crate::models::{MarkerCounts, Navigation, PracticeSettings};
use crate::session::{PracticeEngine, RestartPlan};

/// Restart plan together with the prompt to show before running it
#[derive(serde::Serialize, serde::Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct RestartPrompt {
    pub plan: RestartPlan,
    pub confirmation: String,
}

impl RestartPrompt {
    pub fn new(plan: RestartPlan) -> Self {
        Self {
            confirmation: plan.confirmation(),
            plan,
        }
    }
}

/// Result of a page navigation call
#[derive(serde::Serialize, serde::Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct PageChange {
    pub changed: bool,
    pub navigation: Navigation,
}

/// Everything the toolbar needs to render
#[derive(serde::Serialize, serde::Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub score_name: String,
    pub navigation: Navigation,
    pub settings: PracticeSettings,
    pub is_playing: bool,
    pub section_complete: bool,
    pub playback_controls_enabled: bool,
    pub loop_controls_enabled: bool,
    pub marker_counts: MarkerCounts,
    pub record_count: usize,
}

impl SessionView {
    pub fn from_engine(engine: &PracticeEngine) -> Self {
        let ctx = engine.context();
        Self {
            score_name: ctx.score_name.clone(),
            navigation: ctx.navigation,
            settings: ctx.settings.clone(),
            is_playing: ctx.is_playing,
            section_complete: ctx.is_section_complete(),
            playback_controls_enabled: ctx.settings.playback_controls_enabled(),
            loop_controls_enabled: ctx.settings.loop_controls_enabled(),
            marker_counts: ctx.markers().counts(),
            record_count: engine.records().count(),
        }
    }
}
