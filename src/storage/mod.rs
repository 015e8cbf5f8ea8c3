// src/storage/mod.rs
use std::fs;
use std::path::{Path, PathBuf};

use crate::analysis::record::AnalysisRecord;
use crate::utils::error::StorageError;

pub struct StorageManager {
    base_dir: PathBuf,
}

impl StorageManager {
    /// Creates a new StorageManager with the specified base directory
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self, StorageError> {
        let base_path = base_dir.as_ref().to_path_buf();

        if !base_path.exists() {
            fs::create_dir_all(&base_path).map_err(StorageError::IoError)?;
        }

        Ok(Self { base_dir: base_path })
    }

    fn record_dir(&self, label: &str) -> Result<PathBuf, StorageError> {
        let target_dir = self.base_dir.join(label.to_uppercase());
        if !target_dir.exists() {
            fs::create_dir_all(&target_dir).map_err(StorageError::IoError)?;
        }
        Ok(target_dir)
    }

    /// Saves the full analysis record as pretty-printed JSON
    pub fn save_record(&self, label: &str, record: &AnalysisRecord) -> Result<PathBuf, StorageError> {
        let target_dir = self.record_dir(label)?;
        let file_path = target_dir.join(format!("{}_analysis.json", label));

        let json = serde_json::to_string_pretty(record)
            .map_err(|e| StorageError::SerializationError(e.to_string()))?;
        fs::write(&file_path, json).map_err(StorageError::IoError)?;

        tracing::info!("Saved analysis record to {}", file_path.display());

        Ok(file_path)
    }

    /// Saves a compact metadata side-car describing the extraction outcome
    pub fn save_record_metadata(
        &self,
        label: &str,
        record: &AnalysisRecord,
    ) -> Result<PathBuf, StorageError> {
        let target_dir = self.record_dir(label)?;
        let file_path = target_dir.join(format!("{}_analysis_meta.json", label));

        let output = &record.output;
        let metadata = serde_json::json!({
            "analysis_type": record.analysis_type,
            "query": record.query,
            "metric_count": output.data.metrics.len(),
            "finding_counts": {
                "insights": output.data.insights.len(),
                "key_findings": output.data.key_findings.len(),
                "financial_highlights": output.data.financial_highlights.len(),
                "risks": output.data.risks.len(),
                "opportunities": output.data.opportunities.len(),
            },
            "extraction_quality_score": output.data.extraction_quality_score,
            "confidence_score": record.confidence_score,
            "validation_status": record.validation_status,
            "processing_time_sec": record.processing_time_sec,
            "created_at": record.created_at.to_rfc3339(),
            "saved_at": chrono::Utc::now().to_rfc3339(),
        });

        let metadata_str = serde_json::to_string_pretty(&metadata)
            .map_err(|e| StorageError::SerializationError(e.to_string()))?;
        fs::write(&file_path, metadata_str).map_err(StorageError::IoError)?;

        tracing::info!("Saved metadata to {}", file_path.display());

        Ok(file_path)
    }
}
