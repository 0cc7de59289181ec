//! Session lifecycle: restart-and-save and section completion
//!
//! A restart with markers builds a practice record from the context, appends
//! it to the repository and only then clears the marker store. If the append
//! fails the markers stay where they are. A restart without markers only
//! resets; empty records are never saved.
//!
//! The section-complete signal never creates a record. It raises a single
//! feedback panel that stays up until acknowledged.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::PracticeError;
use crate::models::PracticeRecord;
use crate::records::RecordRepository;
use crate::scoring::{compute_feedback, Feedback};
use crate::session::context::SessionContext;

/// What a restart would do, decided before asking the user
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum RestartPlan {
    /// Markers exist: save a record, then reset
    #[serde(rename_all = "camelCase")]
    SaveAndReset { marker_count: usize },
    /// Nothing to save: reset only
    ResetOnly,
}

impl RestartPlan {
    /// Text for the confirmation prompt
    pub fn confirmation(&self) -> String {
        match self {
            RestartPlan::SaveAndReset { marker_count } => format!(
                "Restart practice? The {} marker(s) from this session will be saved to your \
                 practice records and cleared.",
                marker_count
            ),
            RestartPlan::ResetOnly => {
                "Restart practice? No markers were placed, so no practice record will be saved."
                    .to_string()
            }
        }
    }
}

/// What a restart did
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum RestartOutcome {
    #[serde(rename_all = "camelCase")]
    Saved { record_id: String, marker_count: usize },
    ResetOnly,
}

/// Result of a section-complete signal
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(tag = "kind", content = "feedback", rename_all = "camelCase")]
pub enum SectionSignal {
    /// Feedback panel raised
    Opened(Feedback),
    /// Panel already up; feedback recomputed, nothing new raised
    AlreadyOpen(Feedback),
}

impl SectionSignal {
    pub fn feedback(&self) -> &Feedback {
        match self {
            SectionSignal::Opened(f) | SectionSignal::AlreadyOpen(f) => f,
        }
    }
}

/// What happened when playback reached the end of a page
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum PageEndOutcome {
    /// Auto page turn moved to the next page
    #[serde(rename_all = "camelCase")]
    Turned { page: u32 },
    /// Last page of the section (loop end or score end) finished
    SectionComplete { signal: SectionSignal },
    /// Auto page turn is off
    Stayed,
}

/// Decide what a restart would do
pub fn restart_plan(ctx: &SessionContext) -> RestartPlan {
    if ctx.markers.is_empty() {
        RestartPlan::ResetOnly
    } else {
        RestartPlan::SaveAndReset {
            marker_count: ctx.markers.len(),
        }
    }
}

/// Restart the session, saving a record when there are markers
pub fn restart(
    ctx: &mut SessionContext,
    records: &mut RecordRepository,
    timestamp: DateTime<Utc>,
) -> Result<RestartOutcome, PracticeError> {
    let outcome = match restart_plan(ctx) {
        RestartPlan::ResetOnly => RestartOutcome::ResetOnly,
        RestartPlan::SaveAndReset { marker_count } => {
            let record = PracticeRecord::finalize(ctx.snapshot(), timestamp)?;
            let record_id = record.id().to_string();
            records.append(record)?;
            log::info!(
                "Saved practice record {} with {} marker(s)",
                record_id,
                marker_count
            );
            RestartOutcome::Saved {
                record_id,
                marker_count,
            }
        }
    };

    ctx.markers.clear();
    ctx.section_complete = false;
    ctx.rewind();
    Ok(outcome)
}

/// Raise the section-complete feedback
pub fn signal_section_complete(ctx: &mut SessionContext) -> SectionSignal {
    let feedback = compute_feedback(ctx.markers.list());
    ctx.is_playing = false;

    if ctx.section_complete {
        SectionSignal::AlreadyOpen(feedback)
    } else {
        ctx.section_complete = true;
        log::debug!("Section complete: {:?} tier", feedback.tier);
        SectionSignal::Opened(feedback)
    }
}

/// Dismiss the feedback panel; returns whether one was open
pub fn acknowledge_feedback(ctx: &mut SessionContext) -> bool {
    std::mem::replace(&mut ctx.section_complete, false)
}

/// Feedback for the open panel, computed from the current markers
pub fn pending_feedback(ctx: &SessionContext) -> Option<Feedback> {
    if ctx.section_complete {
        Some(compute_feedback(ctx.markers.list()))
    } else {
        None
    }
}

/// Playback reached the end of the current page
pub fn page_end_reached(ctx: &mut SessionContext) -> PageEndOutcome {
    let page = ctx.navigation.current_page();
    if ctx.navigation.is_last_page() || page == ctx.section_end_page() {
        return PageEndOutcome::SectionComplete {
            signal: signal_section_complete(ctx),
        };
    }
    if ctx.settings.auto_turn_page && ctx.navigation.next_page() {
        return PageEndOutcome::Turned {
            page: ctx.navigation.current_page(),
        };
    }
    PageEndOutcome::Stayed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Marker, MarkerKind};
    use crate::records::{FnPersistence, RecordPersistence};
    use crate::scoring::FeedbackTier;
    use crate::session::context::SessionConfig;

    fn context(total_pages: u32) -> SessionContext {
        SessionContext::new(SessionConfig {
            score_name: "Prelude".to_string(),
            total_pages,
            ..Default::default()
        })
        .unwrap()
    }

    fn add(ctx: &mut SessionContext, id: &str, kind: MarkerKind) {
        ctx.markers.add_marker(Marker::new(id, kind, 1)).unwrap();
    }

    #[test]
    fn test_plan_depends_on_markers() {
        let mut ctx = context(1);
        let empty = restart_plan(&ctx);
        assert_eq!(empty, RestartPlan::ResetOnly);

        add(&mut ctx, "m1", MarkerKind::Error);
        let save = restart_plan(&ctx);
        assert_eq!(save, RestartPlan::SaveAndReset { marker_count: 1 });

        assert_ne!(empty.confirmation(), save.confirmation());
        assert!(save.confirmation().contains("1 marker(s)"));
    }

    #[test]
    fn test_restart_with_markers_saves_one_record() {
        let mut ctx = context(2);
        let mut records = RecordRepository::new();
        add(&mut ctx, "m1", MarkerKind::Error);
        add(&mut ctx, "auto-1", MarkerKind::Correct);
        let before = ctx.markers.snapshot();

        let outcome = restart(&mut ctx, &mut records, Utc::now()).unwrap();

        let RestartOutcome::Saved { record_id, marker_count } = outcome else {
            panic!("expected a saved record");
        };
        assert_eq!(marker_count, 2);
        assert_eq!(records.count(), 1);
        assert_eq!(records.get(&record_id).unwrap().markers(), &before[..]);
        assert!(ctx.markers.is_empty());
    }

    #[test]
    fn test_restart_without_markers_saves_nothing() {
        let mut ctx = context(2);
        let mut records = RecordRepository::new();

        let outcome = restart(&mut ctx, &mut records, Utc::now()).unwrap();

        assert_eq!(outcome, RestartOutcome::ResetOnly);
        assert_eq!(records.count(), 0);
        assert!(ctx.markers.is_empty());
    }

    #[test]
    fn test_failed_save_keeps_markers() {
        let mut ctx = context(2);
        let failing: Box<dyn RecordPersistence> =
            Box::new(FnPersistence(|_: &[PracticeRecord]| -> Result<(), PracticeError> {
                Err(PracticeError::Persistence("offline".to_string()))
            }));
        let mut records = RecordRepository::with_persistence(failing);
        add(&mut ctx, "m1", MarkerKind::Error);

        let result = restart(&mut ctx, &mut records, Utc::now());

        assert!(matches!(result, Err(PracticeError::Persistence(_))));
        assert_eq!(ctx.markers.len(), 1);
        assert_eq!(records.count(), 0);
    }

    #[test]
    fn test_restart_dismisses_feedback_and_rewinds() {
        let mut ctx = context(3);
        let mut records = RecordRepository::new();
        ctx.navigation.set_page(3).unwrap();
        signal_section_complete(&mut ctx);

        restart(&mut ctx, &mut records, Utc::now()).unwrap();

        assert!(!ctx.is_section_complete());
        assert_eq!(ctx.navigation.current_page(), 1);
    }

    #[test]
    fn test_section_complete_raises_one_panel() {
        let mut ctx = context(1);
        add(&mut ctx, "m1", MarkerKind::Correct);

        let first = signal_section_complete(&mut ctx);
        assert!(matches!(first, SectionSignal::Opened(_)));
        assert_eq!(first.feedback().tier, FeedbackTier::Perfect);

        let second = signal_section_complete(&mut ctx);
        assert!(matches!(second, SectionSignal::AlreadyOpen(_)));

        // Markers untouched, nothing finalized
        assert_eq!(ctx.markers.len(), 1);
    }

    #[test]
    fn test_pending_feedback_follows_markers() {
        let mut ctx = context(1);
        assert!(pending_feedback(&ctx).is_none());

        add(&mut ctx, "m1", MarkerKind::Correct);
        signal_section_complete(&mut ctx);
        add(&mut ctx, "m2", MarkerKind::Error);

        let feedback = pending_feedback(&ctx).unwrap();
        assert_eq!(feedback.tier, FeedbackTier::Great);
        assert_eq!(feedback.error_count, 1);
    }

    #[test]
    fn test_acknowledge_is_idempotent() {
        let mut ctx = context(1);
        signal_section_complete(&mut ctx);

        assert!(acknowledge_feedback(&mut ctx));
        assert!(!acknowledge_feedback(&mut ctx));
        assert!(pending_feedback(&ctx).is_none());
    }

    #[test]
    fn test_page_end_stops_at_loop_end() {
        let mut ctx = context(5);
        ctx.settings.auto_turn_page = true;
        ctx.settings.loop_start = Some(2);
        ctx.settings.loop_end = Some(3);
        ctx.navigation.set_page(2).unwrap();

        assert_eq!(page_end_reached(&mut ctx), PageEndOutcome::Turned { page: 3 });
        assert!(matches!(
            page_end_reached(&mut ctx),
            PageEndOutcome::SectionComplete { .. }
        ));
        assert_eq!(ctx.navigation.current_page(), 3);

        // Restart goes back to the loop start
        let mut records = RecordRepository::new();
        restart(&mut ctx, &mut records, Utc::now()).unwrap();
        assert_eq!(ctx.navigation.current_page(), 2);
    }

    #[test]
    fn test_loop_end_ignored_in_performance_mode() {
        let mut ctx = context(3);
        ctx.settings.auto_turn_page = true;
        ctx.settings.mode = crate::models::PracticeMode::Performance;
        ctx.settings.loop_start = Some(1);
        ctx.settings.loop_end = Some(1);

        assert_eq!(page_end_reached(&mut ctx), PageEndOutcome::Turned { page: 2 });
        assert!(!ctx.is_section_complete());
    }

    #[test]
    fn test_page_end_turns_or_completes() {
        let mut ctx = context(2);

        assert_eq!(page_end_reached(&mut ctx), PageEndOutcome::Stayed);

        ctx.settings.auto_turn_page = true;
        assert_eq!(page_end_reached(&mut ctx), PageEndOutcome::Turned { page: 2 });

        let outcome = page_end_reached(&mut ctx);
        assert!(matches!(
            outcome,
            PageEndOutcome::SectionComplete {
                signal: SectionSignal::Opened(_)
            }
        ));
        assert!(ctx.is_section_complete());
    }
}
