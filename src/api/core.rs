//! WASM API for the practice engine
//!
//! One `PracticeEngine` lives behind a process-wide mutex. Every exported
//! function holds the lock for its whole operation, so a restart's
//! snapshot, save and clear can never interleave with a marker event.

use std::cell::RefCell;
use std::sync::Mutex;

use lazy_static::lazy_static;
use wasm_bindgen::prelude::*;

use crate::api::helpers::{deserialize, practice_error, serialize, validation_error};
use crate::api::types::{PageChange, RestartPrompt, SessionView};
use crate::errors::PracticeError;
use crate::models::{MarkerEvent, PracticeRecord, SettingsPatch};
use crate::records::{RecordPersistence, RecordRepository};
use crate::session::{PracticeEngine, SessionConfig};
use crate::{wasm_error, wasm_info, wasm_log, wasm_warn};

// WASM-owned session storage (canonical source of truth)
lazy_static! {
    static ref ENGINE: Mutex<Option<PracticeEngine>> = Mutex::new(None);
}

thread_local! {
    // JavaScript callbacks can't leave the main thread, so the persistence
    // callback is kept outside the engine
    static PERSIST_CALLBACK: RefCell<Option<js_sys::Function>> = RefCell::new(None);
}

/// Hands the record history, as JSON, to the registered JavaScript callback
#[derive(Debug, Clone, Copy, Default)]
struct JsCallbackPersistence;

impl RecordPersistence for JsCallbackPersistence {
    fn persist(&mut self, records: &[PracticeRecord]) -> Result<(), PracticeError> {
        let json = serde_json::to_string(records)?;
        PERSIST_CALLBACK.with(|slot| match slot.borrow().as_ref() {
            Some(callback) => callback
                .call1(&JsValue::NULL, &JsValue::from_str(&json))
                .map(|_| ())
                .map_err(|e| {
                    wasm_error!("Record persistence callback failed: {:?}", e);
                    PracticeError::Persistence(format!("{:?}", e))
                }),
            None => Ok(()),
        })
    }
}

/// Run an operation against the loaded engine
fn with_engine<T>(
    operation: &str,
    f: impl FnOnce(&mut PracticeEngine) -> Result<T, PracticeError>,
) -> Result<T, JsValue> {
    let mut guard = ENGINE
        .lock()
        .map_err(|e| validation_error(format!("Failed to lock practice session: {}", e)))?;
    let engine = guard
        .as_mut()
        .ok_or_else(|| practice_error(operation, PracticeError::NoSession))?;
    f(engine).map_err(|e| practice_error(operation, e))
}

// ============================================================================
// Session
// ============================================================================

/// Start a practice session.
///
/// On first call the record history is loaded from `history_json` (if any);
/// later calls switch score and keep the history in memory.
#[wasm_bindgen(js_name = initSession)]
pub fn init_session(config_js: JsValue, history_json: Option<String>) -> Result<JsValue, JsValue> {
    let config: SessionConfig = deserialize(config_js, "Invalid session config")?;
    wasm_info!("initSession called: score='{}', pages={}", config.score_name, config.total_pages);

    let mut guard = ENGINE
        .lock()
        .map_err(|e| validation_error(format!("Failed to lock practice session: {}", e)))?;

    match guard.as_mut() {
        Some(engine) => {
            if history_json.is_some() {
                wasm_warn!("Session already loaded, ignoring record history argument");
            }
            engine
                .start_session(config)
                .map_err(|e| practice_error("initSession", e))?;
        }
        None => {
            let records = match history_json {
                Some(json) => RecordRepository::from_json(&json, Box::new(JsCallbackPersistence))
                    .map_err(|e| practice_error("Failed to load practice records", e))?,
                None => RecordRepository::with_persistence(Box::new(JsCallbackPersistence)),
            };
            let engine = PracticeEngine::with_records(config, records)
                .map_err(|e| practice_error("initSession", e))?;
            *guard = Some(engine);
        }
    }

    match guard.as_ref() {
        Some(engine) => serialize(&SessionView::from_engine(engine), "Serialization error"),
        None => Err(practice_error("initSession", PracticeError::NoSession)),
    }
}

/// Snapshot of the toolbar-relevant session state
#[wasm_bindgen(js_name = sessionState)]
pub fn session_state() -> Result<JsValue, JsValue> {
    let view = with_engine("sessionState", |engine| Ok(SessionView::from_engine(engine)))?;
    serialize(&view, "Serialization error")
}

/// Register the callback receiving the record history JSON after each change.
///
/// The callback runs while the session is locked and must not call back
/// into this module.
#[wasm_bindgen(js_name = setRecordPersistence)]
pub fn set_record_persistence(callback: js_sys::Function) {
    wasm_info!("setRecordPersistence called");
    PERSIST_CALLBACK.with(|slot| *slot.borrow_mut() = Some(callback));
}

// ============================================================================
// Markers
// ============================================================================

/// Add a marker from the tap UI or from pitch detection
#[wasm_bindgen(js_name = addMarker)]
pub fn add_marker(event_js: JsValue) -> Result<JsValue, JsValue> {
    let event: MarkerEvent = deserialize(event_js, "Invalid marker event")?;
    wasm_log!("addMarker called: {:?} on page {}", event.kind, event.page);

    let marker = with_engine("addMarker", |engine| engine.add_marker(event))?;
    serialize(&marker, "Serialization error")
}

/// Remove a marker; returns false if it was not there
#[wasm_bindgen(js_name = removeMarker)]
pub fn remove_marker(id: &str) -> Result<bool, JsValue> {
    with_engine("removeMarker", |engine| Ok(engine.remove_marker(id).is_some()))
}

/// Clear all markers without saving
#[wasm_bindgen(js_name = clearMarkers)]
pub fn clear_markers() -> Result<(), JsValue> {
    with_engine("clearMarkers", |engine| {
        engine.clear_markers();
        Ok(())
    })
}

/// Current markers in insertion order
#[wasm_bindgen(js_name = listMarkers)]
pub fn list_markers() -> Result<js_sys::Array, JsValue> {
    let markers = with_engine("listMarkers", |engine| Ok(engine.markers().to_vec()))?;

    let result = js_sys::Array::new();
    for marker in &markers {
        result.push(&serialize(marker, "Serialization error")?);
    }
    Ok(result)
}

// ============================================================================
// Feedback
// ============================================================================

/// Feedback for the current markers
#[wasm_bindgen(js_name = computeFeedback)]
pub fn compute_feedback() -> Result<JsValue, JsValue> {
    let feedback = with_engine("computeFeedback", |engine| Ok(engine.compute_feedback()))?;
    serialize(&feedback, "Serialization error")
}

/// The performer reached the end of the section
#[wasm_bindgen(js_name = signalSectionComplete)]
pub fn signal_section_complete() -> Result<JsValue, JsValue> {
    let signal = with_engine("signalSectionComplete", |engine| {
        Ok(engine.signal_section_complete())
    })?;
    serialize(&signal, "Serialization error")
}

/// Feedback of the open panel, or undefined
#[wasm_bindgen(js_name = pendingFeedback)]
pub fn pending_feedback() -> Result<JsValue, JsValue> {
    let feedback = with_engine("pendingFeedback", |engine| Ok(engine.pending_feedback()))?;
    serialize(&feedback, "Serialization error")
}

/// "Continue Practice" pressed on the feedback panel
#[wasm_bindgen(js_name = acknowledgeFeedback)]
pub fn acknowledge_feedback() -> Result<bool, JsValue> {
    with_engine("acknowledgeFeedback", |engine| Ok(engine.acknowledge_feedback()))
}

// ============================================================================
// Restart
// ============================================================================

/// What restarting would do, with the confirmation text to show
#[wasm_bindgen(js_name = restartPlan)]
pub fn restart_plan() -> Result<JsValue, JsValue> {
    let prompt = with_engine("restartPlan", |engine| {
        Ok(RestartPrompt::new(engine.restart_plan()))
    })?;
    serialize(&prompt, "Serialization error")
}

/// Restart the session (after the user confirmed)
#[wasm_bindgen(js_name = restartSession)]
pub fn restart_session() -> Result<JsValue, JsValue> {
    let outcome = with_engine("restartSession", |engine| engine.restart())?;
    wasm_info!("restartSession completed: {:?}", outcome);
    serialize(&outcome, "Serialization error")
}

// ============================================================================
// Records
// ============================================================================

/// Practice records, oldest first
#[wasm_bindgen(js_name = listRecords)]
pub fn list_records() -> Result<JsValue, JsValue> {
    let records = with_engine("listRecords", |engine| Ok(engine.records().list().to_vec()))?;
    serialize(&records, "Serialization error")
}

/// History rows, newest first
#[wasm_bindgen(js_name = recordSummaries)]
pub fn record_summaries() -> Result<JsValue, JsValue> {
    let summaries = with_engine("recordSummaries", |engine| Ok(engine.record_summaries()))?;
    serialize(&summaries, "Serialization error")
}

#[wasm_bindgen(js_name = recordCount)]
pub fn record_count() -> Result<usize, JsValue> {
    with_engine("recordCount", |engine| Ok(engine.records().count()))
}

/// Delete a record (after the user confirmed); false if it did not exist
#[wasm_bindgen(js_name = deleteRecord)]
pub fn delete_record(id: &str) -> Result<bool, JsValue> {
    wasm_info!("deleteRecord called: {}", id);
    with_engine("deleteRecord", |engine| engine.delete_record(id))
}

/// Record history as JSON, oldest first
#[wasm_bindgen(js_name = exportRecords)]
pub fn export_records() -> Result<String, JsValue> {
    with_engine("exportRecords", |engine| engine.records().to_json())
}

// ============================================================================
// Settings & navigation
// ============================================================================

#[wasm_bindgen(js_name = getPracticeSettings)]
pub fn get_practice_settings() -> Result<JsValue, JsValue> {
    let settings = with_engine("getPracticeSettings", |engine| Ok(engine.settings().clone()))?;
    serialize(&settings, "Serialization error")
}

/// Merge a partial settings update; returns the new settings
#[wasm_bindgen(js_name = setPracticeSettings)]
pub fn set_practice_settings(patch_js: JsValue) -> Result<JsValue, JsValue> {
    let patch: SettingsPatch = deserialize(patch_js, "Invalid settings")?;
    let settings = with_engine("setPracticeSettings", |engine| {
        engine.update_settings(patch).map(|s| s.clone())
    })?;
    serialize(&settings, "Serialization error")
}

#[wasm_bindgen(js_name = nextPage)]
pub fn next_page() -> Result<JsValue, JsValue> {
    let change = with_engine("nextPage", |engine| {
        let changed = engine.next_page();
        Ok(PageChange {
            changed,
            navigation: engine.navigation(),
        })
    })?;
    serialize(&change, "Serialization error")
}

#[wasm_bindgen(js_name = previousPage)]
pub fn previous_page() -> Result<JsValue, JsValue> {
    let change = with_engine("previousPage", |engine| {
        let changed = engine.previous_page();
        Ok(PageChange {
            changed,
            navigation: engine.navigation(),
        })
    })?;
    serialize(&change, "Serialization error")
}

#[wasm_bindgen(js_name = setPage)]
pub fn set_page(page: u32) -> Result<JsValue, JsValue> {
    let change = with_engine("setPage", |engine| {
        let changed = engine.navigation().current_page() != page;
        engine.set_page(page)?;
        Ok(PageChange {
            changed,
            navigation: engine.navigation(),
        })
    })?;
    serialize(&change, "Serialization error")
}

/// Playback reached the end of the current page
#[wasm_bindgen(js_name = pageEndReached)]
pub fn page_end_reached() -> Result<JsValue, JsValue> {
    let outcome = with_engine("pageEndReached", |engine| Ok(engine.page_end_reached()))?;
    serialize(&outcome, "Serialization error")
}

/// Play/pause; returns whether playback is now running
#[wasm_bindgen(js_name = togglePlaying)]
pub fn toggle_playing() -> Result<bool, JsValue> {
    with_engine("togglePlaying", |engine| Ok(engine.toggle_playing()))
}
