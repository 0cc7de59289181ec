//! Section feedback scoring
//!
//! Maps the markers of a session to an encouraging message. Only the number
//! of error markers selects the tier; correct markers matter only when there
//! are no errors at all.
//!
//! An untouched section (no markers of either kind) falls through to the
//! encouragement tier with a count of 0.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::models::{Marker, MarkerKind};

/// Feedback tier, best first
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FeedbackTier {
    /// No errors and at least one correct marker
    Perfect,
    /// 1-2 errors
    Great,
    /// 3-5 errors
    Good,
    /// 6 or more errors, or nothing marked at all
    Encouragement,
}

impl FeedbackTier {
    /// Select the tier for the given counts; first matching rule wins
    pub fn select(errors: usize, correct: usize) -> Self {
        match errors {
            0 if correct > 0 => FeedbackTier::Perfect,
            1..=2 => FeedbackTier::Great,
            3..=5 => FeedbackTier::Good,
            _ => FeedbackTier::Encouragement,
        }
    }
}

/// Feedback shown when a section is complete
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Feedback {
    pub tier: FeedbackTier,
    pub error_count: usize,
    pub correct_count: usize,
    pub message: String,
}

impl fmt::Display for Feedback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Compute feedback for a marker set
pub fn compute_feedback(markers: &[Marker]) -> Feedback {
    let error_count = markers.iter().filter(|m| m.kind == MarkerKind::Error).count();
    let correct_count = markers
        .iter()
        .filter(|m| m.kind == MarkerKind::Correct)
        .count();

    let tier = FeedbackTier::select(error_count, correct_count);

    Feedback {
        tier,
        error_count,
        correct_count,
        message: feedback_message(tier, error_count),
    }
}

fn feedback_message(tier: FeedbackTier, errors: usize) -> String {
    match tier {
        FeedbackTier::Perfect => {
            "Excellent! You perfectly completed the entire piece with no errors! Keep it up!"
                .to_string()
        }
        FeedbackTier::Great => format!(
            "Great! You completed the entire piece. With only {} error(s), you're doing very well! \
             Keep practicing these parts and you'll get even better!",
            errors
        ),
        FeedbackTier::Good => format!(
            "Good! You completed the entire piece with {} error(s). These are areas that need \
             focused practice. Take your time, there's no rush.",
            errors
        ),
        FeedbackTier::Encouragement => format!(
            "You completed the entire piece! While there are {} errors, this is normal in the \
             learning process. Try practicing in smaller segments, focusing on one part at a time. \
             Remember, progress is more important than perfection!",
            errors
        ),
    }
}
