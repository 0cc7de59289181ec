//! Practice Engine WASM API
//!
//! This module provides the JavaScript-facing API for the practice engine.
//! It includes shared utilities for serialization and error handling, as well
//! as the exported functions for markers, feedback, restart, records,
//! settings and navigation.
//!
//! # Module Structure
//!
//! - `helpers`: Shared utilities for serialization, error handling, and console logging
//! - `types`: Result types returned to JavaScript
//! - `core`: Exported functions over the WASM-owned session

pub mod helpers;
pub mod types;
pub mod core;

// Re-export all public functions to keep the JavaScript API in one place
pub use self::core::*;
