// src/analysis/mod.rs
pub mod record;

// Re-export record types for convenience
pub use record::{AnalysisOutput, AnalysisRecord, ValidationStatus};
