//! Common types and utilities for the tgen constraint engine.
//!
//! This crate provides foundational pieces used across all tgen crates:
//! - Centralized search, recursion and cache limits
//! - Host-supplied engine configuration (`EngineConfig`, `LevelSet`)
//! - Target language tags (`Language`)
//! - Plain diagnostic records

// Centralized limits and thresholds
pub mod limits;

// Engine configuration passed in by the host
pub mod config;
pub use config::{EngineConfig, LevelSet};

// Target language tags
pub mod language;
pub use language::{Language, UnknownLanguageTag};

// Diagnostics exposed to learning/repair collaborators
pub mod diagnostics;
pub use diagnostics::{Diagnostic, DiagnosticCategory};

#[cfg(test)]
#[path = "../tests/common_tests.rs"]
mod common_tests;
