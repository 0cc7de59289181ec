//! Data models for the practice engine
//!
//! This module contains the data structures that cross the WASM boundary:
//! markers, practice settings, navigation state and practice records.

pub mod marker;
pub mod navigation;
pub mod record;
pub mod settings;

// Re-export commonly used types
pub use marker::*;
pub use navigation::*;
pub use record::*;
pub use settings::*;
