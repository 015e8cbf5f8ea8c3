// src/analysis/record.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::extractors::engine::ExtractedDataPoints;

/// Validation outcome attached to a persisted analysis record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationStatus {
    Passed,
    Failed,
}

/// Analysis output as rendered to consumers: the display summary next to the
/// structured extraction. Serializes with the data-point fields inline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisOutput {
    pub summary: String,
    #[serde(flatten)]
    pub data: ExtractedDataPoints,
}

/// A completed analysis of one document/query pair. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRecord {
    pub analysis_type: String,
    pub query: String,
    pub output: AnalysisOutput,
    pub confidence_score: f64,
    pub data_quality_score: f64,
    pub validation_status: ValidationStatus,
    pub error_logs: Vec<String>,
    pub processing_time_sec: u64,
    pub created_at: DateTime<Utc>,
}

impl AnalysisRecord {
    /// Assembles a record from the extraction result, blending extraction
    /// quality into the externally supplied base confidence.
    pub fn new(
        analysis_type: String,
        query: String,
        summary: String,
        data: ExtractedDataPoints,
        base_confidence: f64,
        data_quality_score: f64,
        processing_time_sec: u64,
    ) -> Self {
        let confidence_score = blend_confidence(base_confidence, data.extraction_quality_score);
        Self {
            analysis_type,
            query,
            output: AnalysisOutput { summary, data },
            confidence_score,
            data_quality_score,
            validation_status: ValidationStatus::Passed,
            error_logs: Vec::new(),
            processing_time_sec,
            created_at: Utc::now(),
        }
    }
}

/// Blends extraction quality into a base confidence score: the quality score
/// contributes a tenth of its value, and the result is clamped to [0, 1].
pub fn blend_confidence(base: f64, extraction_quality: f64) -> f64 {
    (base + extraction_quality * 0.1).clamp(0.0, 1.0)
}
