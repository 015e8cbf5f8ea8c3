// src/extractors/mod.rs
pub mod engine;
pub mod findings;
pub mod metrics;

// Re-export key extraction types for convenience
pub use engine::{ExtractedDataPoints, ExtractionConfig, FinancialDataExtractor};
