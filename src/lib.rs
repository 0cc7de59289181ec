//! Practice Session Engine WASM Module
//!
//! WASM-owned state for a score practice application: markers placed while
//! playing, end-of-section feedback scoring, and the practice record history.

pub mod errors;
pub mod models;
pub mod records;
pub mod scoring;
pub mod session;
pub mod api;

// Re-export commonly used types
pub use errors::{InvariantViolation, PracticeError};
pub use models::*;
pub use records::{RecordPersistence, RecordRepository, RecordSummary};
pub use scoring::{compute_feedback, Feedback, FeedbackTier};
pub use session::{PracticeEngine, SessionConfig, SessionContext};

use wasm_bindgen::prelude::*;

// This is like the `main` function, but for WASM modules.
#[wasm_bindgen(start)]
pub fn main() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();

    #[cfg(feature = "console_log")]
    if console_log::init_with_level(log::Level::Debug).is_err() {
        return;
    }

    log::info!("Practice engine WASM module initialized");
}
