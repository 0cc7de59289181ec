//! Practice session management
//!
//! # Components
//! - `marker_store.rs`: markers placed during the current attempt
//! - `context.rs`: SessionContext bundling markers, navigation and settings
//! - `lifecycle.rs`: restart-and-save and section completion
//! - `engine.rs`: PracticeEngine, the event entry point owning session and history

pub mod context;
pub mod engine;
pub mod lifecycle;
pub mod marker_store;

pub use context::{SessionConfig, SessionContext};
pub use engine::PracticeEngine;
pub use lifecycle::{PageEndOutcome, RestartOutcome, RestartPlan, SectionSignal};
pub use marker_store::MarkerStore;
