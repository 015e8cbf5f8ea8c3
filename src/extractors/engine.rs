// src/extractors/engine.rs

// --- Imports ---
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::panic::{self, AssertUnwindSafe};

use super::findings::{self, CategorizedFindings, FindingCategory};
use super::metrics;

// --- Configuration ---
/// Caps, truncation lengths, and score weights for the extraction engine.
/// A single canonical policy shared by every call site.
#[derive(Debug, Clone)]
pub struct ExtractionConfig {
    /// Maximum entries per finding category.
    pub max_per_category: usize,
    /// Entry character limit for insights and key findings.
    pub long_entry_chars: usize,
    /// Entry character limit for highlights, risks, and opportunities.
    pub short_entry_chars: usize,
    /// Hard word cap on the display summary.
    pub summary_word_cap: usize,
    /// Score weight when any metric was captured.
    pub metrics_weight: f64,
    /// Score weight per non-empty finding category.
    pub category_weight: f64,
    /// Bonus when all five categories are populated.
    pub completeness_bonus: f64,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            max_per_category: 5,
            long_entry_chars: 150,
            short_entry_chars: 120,
            summary_word_cap: 200,
            metrics_weight: 0.2,
            category_weight: 0.15,
            completeness_bonus: 0.05,
        }
    }
}

impl ExtractionConfig {
    pub(crate) fn entry_limit(&self, category: FindingCategory) -> usize {
        match category {
            FindingCategory::Insights | FindingCategory::KeyFindings => self.long_entry_chars,
            FindingCategory::FinancialHighlights
            | FindingCategory::Risks
            | FindingCategory::Opportunities => self.short_entry_chars,
        }
    }
}

// --- Data Structures ---
/// Structured result of one extraction run. Immutable once produced; values
/// in `metrics` are literal captures (currency symbols and suffixes intact).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedDataPoints {
    pub metrics: BTreeMap<String, String>,
    pub insights: Vec<String>,
    pub key_findings: Vec<String>,
    pub financial_highlights: Vec<String>,
    pub risks: Vec<String>,
    pub opportunities: Vec<String>,
    pub extraction_quality_score: f64,
}

impl ExtractedDataPoints {
    /// The all-empty result with score 0.0, used for unusable input and for
    /// the extraction failure path.
    pub fn empty() -> Self {
        Self {
            metrics: BTreeMap::new(),
            insights: Vec::new(),
            key_findings: Vec::new(),
            financial_highlights: Vec::new(),
            risks: Vec::new(),
            opportunities: Vec::new(),
            extraction_quality_score: 0.0,
        }
    }
}

// --- Main Extractor Structure ---
pub struct FinancialDataExtractor {
    config: ExtractionConfig,
}

impl FinancialDataExtractor {
    pub fn new() -> Self {
        Self::with_config(ExtractionConfig::default())
    }

    pub fn with_config(config: ExtractionConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ExtractionConfig {
        &self.config
    }

    /// Extracts structured financial data points from a free-text report.
    ///
    /// Pure and deterministic on its input. Never fails: any panic raised
    /// inside the pipeline is caught here and converted into the all-empty
    /// result with score 0.0, so a malformed report can never abort the
    /// caller's analysis flow.
    pub fn extract(&self, text: &str) -> ExtractedDataPoints {
        match panic::catch_unwind(AssertUnwindSafe(|| self.extract_inner(text))) {
            Ok(points) => points,
            Err(_) => {
                tracing::error!("Extraction failed unexpectedly; returning empty data points");
                ExtractedDataPoints::empty()
            }
        }
    }

    fn extract_inner(&self, text: &str) -> ExtractedDataPoints {
        let metrics = metrics::extract_metrics(text);
        tracing::debug!("Captured {} metrics", metrics.len());

        // Findings passes are strictly layered: each fallback runs only when
        // the previous pass produced nothing across all five categories.
        let mut found = findings::extract_sectioned(text, &self.config);
        if found.is_empty() {
            tracing::debug!("Section-aware pass found nothing, trying header spans");
            found = findings::extract_from_header_spans(text, &self.config);
        }
        if found.is_empty() {
            tracing::debug!("Header-span pass found nothing, trying keyword classification");
            found = findings::extract_by_keywords(text, &self.config);
        }
        found.dedup_and_cap(self.config.max_per_category);

        let extraction_quality_score = self.quality_score(&metrics, &found);

        ExtractedDataPoints {
            metrics,
            insights: found.insights,
            key_findings: found.key_findings,
            financial_highlights: found.financial_highlights,
            risks: found.risks,
            opportunities: found.opportunities,
            extraction_quality_score,
        }
    }

    /// Completeness heuristic: weighted sum of populated-output indicators,
    /// clamped to [0, 1].
    fn quality_score(
        &self,
        metrics: &BTreeMap<String, String>,
        found: &CategorizedFindings,
    ) -> f64 {
        let mut score = 0.0;
        if !metrics.is_empty() {
            score += self.config.metrics_weight;
        }
        for list in found.lists() {
            if !list.is_empty() {
                score += self.config.category_weight;
            }
        }
        if found.all_populated() {
            score += self.config.completeness_bonus;
        }
        score.clamp(0.0, 1.0)
    }
}

impl Default for FinancialDataExtractor {
    fn default() -> Self {
        Self::new()
    }
}

// --- Summary Normalization ---
/// Truncates free text to a hard word cap for display. Text within the cap is
/// returned unchanged; over-cap text is cut at the cap and tagged with an
/// exact truncation marker.
pub fn truncate_summary(text: &str, word_cap: usize) -> String {
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.len() <= word_cap {
        return text.to_string();
    }
    tracing::warn!(
        "Summary exceeded {} words ({}), truncating",
        word_cap,
        words.len()
    );
    format!(
        "{}... [truncated to {} words]",
        words[..word_cap].join(" "),
        word_cap
    )
}

// --- Tests ---
#[cfg(test)]
mod tests {
    use super::*;

    const STRUCTURED_REPORT: &str = "Revenue: $1.2B\n\
        Total Insights:\n\
        - Strong insight with 15% growth\n\
        Key Findings:\n\
        - Net income rose to $300M this quarter\n";

    // 31 neutral words, free of digits, finance terms, and risk/opportunity
    // keywords, so no pass can claim anything from it.
    const NEUTRAL_SENTENCE: &str = "The committee met to talk about the agenda for the coming \
        season and noted that further deliberation would be needed before any conclusions could \
        be shared with members of the board.";

    #[test]
    fn test_empty_input_yields_empty_result() {
        let extractor = FinancialDataExtractor::new();
        let points = extractor.extract("");
        assert_eq!(points, ExtractedDataPoints::empty());
        assert_eq!(points.extraction_quality_score, 0.0);
    }

    #[test]
    fn test_structured_report_extraction() {
        let extractor = FinancialDataExtractor::new();
        let points = extractor.extract(STRUCTURED_REPORT);

        assert_eq!(points.metrics.get("revenue").map(String::as_str), Some("$1.2B"));
        assert_eq!(points.metrics.get("net_income").map(String::as_str), Some("$300M"));
        assert_eq!(points.insights, vec!["Strong insight with 15% growth"]);
        assert_eq!(points.key_findings, vec!["Net income rose to $300M this quarter"]);
        assert!(points.extraction_quality_score > 0.0);
    }

    #[test]
    fn test_extraction_is_idempotent() {
        let extractor = FinancialDataExtractor::new();
        let first = extractor.extract(STRUCTURED_REPORT);
        let second = extractor.extract(STRUCTURED_REPORT);
        assert_eq!(first, second);
    }

    #[test]
    fn test_quality_score_weights() {
        let extractor = FinancialDataExtractor::new();
        let points = extractor.extract(STRUCTURED_REPORT);
        // Metrics (0.2) + insights (0.15) + key findings (0.15)
        assert!((points.extraction_quality_score - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_full_report_hits_score_ceiling_at_one() {
        let text = "Revenue: $900M with operating margin at 21%\n\
            Total Insights:\n- Recurring revenue passed the $500M mark this period\n\
            Key Findings:\n- Net income climbed to $120M on cost control\n\
            Financial Highlights:\n- Free cash flow reached $80M for the half\n\
            Risk Factors:\n- Input cost volatility pressured gross pricing\n\
            Opportunities:\n- Subscription expansion across Latin America continues\n";
        let extractor = FinancialDataExtractor::new();
        let points = extractor.extract(text);
        // 0.2 + 5 * 0.15 + 0.05 = 1.0
        assert!((points.extraction_quality_score - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_score_bounds_for_assorted_inputs() {
        let extractor = FinancialDataExtractor::new();
        for text in ["", "???", STRUCTURED_REPORT, NEUTRAL_SENTENCE] {
            let score = extractor.extract(text).extraction_quality_score;
            assert!((0.0..=1.0).contains(&score), "score {} out of bounds", score);
        }
    }

    #[test]
    fn test_structureless_prose_yields_empty_structure() {
        // ~280 words of plain prose on a single line: no metrics, no markers.
        let prose = [NEUTRAL_SENTENCE; 9].join(" ");
        assert!(prose.split_whitespace().count() > 200);

        let extractor = FinancialDataExtractor::new();
        let points = extractor.extract(&prose);
        assert_eq!(points, ExtractedDataPoints::empty());

        let summary = truncate_summary(&prose, extractor.config().summary_word_cap);
        assert!(summary.ends_with("... [truncated to 200 words]"));
    }

    #[test]
    fn test_summary_word_cap() {
        let long_text = vec!["word"; 250].join(" ");
        let summary = truncate_summary(&long_text, 200);
        assert!(summary.ends_with("... [truncated to 200 words]"));
        let body = summary.trim_end_matches("... [truncated to 200 words]");
        assert_eq!(body.split_whitespace().count(), 200);

        let short_text = "only a few words";
        assert_eq!(truncate_summary(short_text, 200), short_text);
    }

    #[test]
    fn test_list_and_entry_invariants() {
        let long_bullet = format!("- {}", "y".repeat(400));
        let mut report = String::from("Total Insights:\n");
        for _ in 0..9 {
            report.push_str(&long_bullet);
            report.push('\n');
        }
        let extractor = FinancialDataExtractor::new();
        let points = extractor.extract(&report);

        let config = extractor.config();
        for list in [
            &points.insights,
            &points.key_findings,
            &points.financial_highlights,
            &points.risks,
            &points.opportunities,
        ] {
            assert!(list.len() <= config.max_per_category);
            for entry in list {
                assert!(entry.chars().count() <= config.long_entry_chars);
            }
        }
        // Identical over-cap bullets collapse to a single deduped entry
        assert_eq!(points.insights.len(), 1);
    }

    #[test]
    fn test_custom_config_changes_caps() {
        let config = ExtractionConfig {
            max_per_category: 2,
            short_entry_chars: 40,
            ..ExtractionConfig::default()
        };
        let extractor = FinancialDataExtractor::with_config(config);
        let text = "Risk Factors:\n\
            - First prolonged statement about margin pressure in retail\n\
            - Second prolonged statement about churn in subscriptions\n\
            - Third prolonged statement about supplier dependency\n";
        let points = extractor.extract(text);
        assert_eq!(points.risks.len(), 2);
        for entry in &points.risks {
            assert!(entry.chars().count() <= 40);
        }
    }
}
