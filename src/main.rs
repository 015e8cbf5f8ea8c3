// src/main.rs
mod analysis;
mod extractors;
mod storage;
mod utils;

use clap::Parser;
use std::time::Instant;
use tokio::io::AsyncReadExt;

use analysis::record::AnalysisRecord;
use extractors::engine::{truncate_summary, FinancialDataExtractor};
use storage::StorageManager;
use utils::AppError;

/// Command Line Interface for the financial report data-point extractor
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the analysis report text file ("-" reads stdin)
    #[arg(short, long)]
    input: String,

    /// The query the upstream analysis answered
    #[arg(short, long, default_value = "Financial overview")]
    query: String,

    /// Analysis type label stored on the record
    #[arg(long, default_value = "Financial Document Analysis")]
    analysis_type: String,

    /// Output directory for extracted records
    #[arg(short, long, default_value = "./output")]
    output_dir: String,

    /// Base confidence supplied by the upstream analysis pipeline
    #[arg(long, default_value = "0.85")]
    base_confidence: f64,

    /// Data quality score supplied by the upstream pipeline
    #[arg(long, default_value = "0.90")]
    data_quality: f64,

    /// Debug mode - save an annotated copy of the report
    #[arg(short, long)]
    debug: bool,
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // 1. Setup Logging (reads RUST_LOG env var)
    utils::logging::setup_logging();

    // 2. Parse CLI Arguments
    let args = Args::parse();
    tracing::info!("Starting extraction for args: {:?}", args);

    // 3. Load the report text
    let text = read_report(&args.input).await?;
    tracing::info!("Loaded report ({} bytes)", text.len());

    // 4. Initialize storage and the extraction engine
    let label = record_label(&args.input);
    let storage = StorageManager::new(&args.output_dir)?;
    let extractor = FinancialDataExtractor::new();

    // 5. Optionally save debug artifacts showing what the extractor sees
    if args.debug {
        let debug_dir = format!("{}/{}/debug", args.output_dir, label.to_uppercase());
        std::fs::create_dir_all(&debug_dir)?;

        let raw_report_path = format!("{}/raw_report.txt", debug_dir);
        std::fs::write(&raw_report_path, &text)?;
        tracing::info!("Saved raw report to: {}", raw_report_path);

        let debug_patterns = [
            (
                r"(?i)total insights:|key findings:|financial highlights:|risk factors:|opportunities:",
                "section",
            ),
            (
                r"(?m)^(?:INVESTMENT RECOMMENDATION|KEY FINANCIAL METRICS|GROWTH & CHANGES)",
                "terminator",
            ),
            (r"(?m)^\s*[-•].{15,}", "bullet"),
            (r"\$[\d,]+\.?\d*[BMK]?", "currency"),
            (r"\d+(?:\.\d+)?%", "percent"),
        ];
        let annotated_path = format!("{}/report_annotated.txt", debug_dir);
        if let Err(e) =
            utils::report_debug::create_debug_report(&text, &annotated_path, &debug_patterns)
        {
            tracing::warn!("Failed to create annotated report: {}", e);
        } else {
            tracing::info!("Created annotated debug report: {}", annotated_path);
        }
    }

    // 6. Run extraction over the full text
    let start = Instant::now();
    let data_points = extractor.extract(&text);
    let processing_time = start.elapsed().as_secs();

    tracing::info!(
        "Extracted {} metrics, {} insights, {} key findings, {} highlights, {} risks, {} opportunities (quality {:.2})",
        data_points.metrics.len(),
        data_points.insights.len(),
        data_points.key_findings.len(),
        data_points.financial_highlights.len(),
        data_points.risks.len(),
        data_points.opportunities.len(),
        data_points.extraction_quality_score,
    );

    // 7. Assemble the record: capped summary, blended confidence
    let summary = truncate_summary(&text, extractor.config().summary_word_cap);
    let record = AnalysisRecord::new(
        args.analysis_type,
        args.query,
        summary,
        data_points,
        args.base_confidence,
        args.data_quality,
        processing_time,
    );

    // 8. Persist the record and its metadata side-car
    let record_path = storage.save_record(&label, &record)?;
    tracing::info!("Saved analysis record to: {}", record_path.display());

    match storage.save_record_metadata(&label, &record) {
        Ok(path) => tracing::info!("Saved record metadata to: {}", path.display()),
        Err(e) => tracing::error!("Failed to save record metadata: {}", e),
    }

    tracing::info!(
        "Extraction finished for '{}' with confidence {:.2}",
        label,
        record.confidence_score
    );

    Ok(())
}

/// Reads the report text from a file path, or from stdin when given "-".
async fn read_report(input: &str) -> Result<String, AppError> {
    if input == "-" {
        let mut buffer = String::new();
        tokio::io::stdin().read_to_string(&mut buffer).await?;
        Ok(buffer)
    } else {
        Ok(tokio::fs::read_to_string(input).await?)
    }
}

/// Derives the storage label for a run from its input source.
fn record_label(input: &str) -> String {
    if input == "-" {
        return "stdin".to_string();
    }
    std::path::Path::new(input)
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or("report")
        .to_string()
}

// --- Tests ---
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_label_from_path() {
        assert_eq!(record_label("reports/q3_summary.txt"), "q3_summary");
        assert_eq!(record_label("-"), "stdin");
    }

    #[test]
    fn test_read_report_from_file() {
        let path = std::env::temp_dir().join("findoc_read_report.txt");
        std::fs::write(&path, "Revenue: $5M\n").unwrap();

        let text = tokio_test::block_on(read_report(path.to_str().unwrap())).unwrap();
        assert_eq!(text, "Revenue: $5M\n");
    }
}
