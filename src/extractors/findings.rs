// src/extractors/findings.rs

// --- Imports ---
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

use super::engine::ExtractionConfig;

// --- Constants ---
// Line-anchored section headers recognized by the primary pass. Matched as
// case-insensitive substrings; the first entry found in a line wins.
const SECTION_HEADERS: [(&str, FindingCategory); 5] = [
    ("total insights:", FindingCategory::Insights),
    ("key findings:", FindingCategory::KeyFindings),
    ("financial highlights:", FindingCategory::FinancialHighlights),
    ("risk factors:", FindingCategory::Risks),
    ("opportunities:", FindingCategory::Opportunities),
];

// Lines starting with these markers end finding extraction until the next header.
const SECTION_TERMINATORS: [&str; 3] = [
    "INVESTMENT RECOMMENDATION",
    "KEY FINANCIAL METRICS",
    "GROWTH & CHANGES",
];

const FINANCE_KEYWORDS: [&str; 6] = ["revenue", "profit", "growth", "margin", "cash", "debt"];

const KEY_FINDING_CUES: [&str; 4] = ["key finding", "highlight", "important", "critical"];

const DIRECTION_WORDS: [&str; 4] = ["growth", "decline", "increase", "decrease"];

const HIGHLIGHT_KEYWORDS: [&str; 10] = [
    "revenue", "profit", "income", "cash", "debt", "growth", "decline", "increase", "decrease",
    "margin",
];

// Risk is checked before opportunity; the first matching set claims the line.
const RISK_KEYWORDS: [&str; 10] = [
    "risk", "uncertainty", "challenge", "concern", "volatility", "decline", "decrease", "down",
    "fell", "dropped",
];

const OPPORTUNITY_KEYWORDS: [&str; 10] = [
    "opportunity", "growth", "expansion", "increase", "up", "positive", "strong", "robust", "rose",
    "gained",
];

// --- Regex Patterns for Fallback Header Matching (Lazy Static) ---
// Header variants located anywhere in the text, not line-anchored.
static FALLBACK_SECTION_RES: Lazy<Vec<(FindingCategory, Vec<Regex>)>> = Lazy::new(|| {
    [
        (FindingCategory::Insights, &["Total Insights:", "Insights:"][..]),
        (FindingCategory::KeyFindings, &["Key Findings:", "Findings:"][..]),
        (
            FindingCategory::FinancialHighlights,
            &["Financial Highlights:", "Highlights:"][..],
        ),
        (FindingCategory::Risks, &["Risk Factors:", "Risks:"][..]),
        (FindingCategory::Opportunities, &["Opportunities:"][..]),
    ]
    .into_iter()
    .map(|(category, headers)| {
        (
            category,
            headers
                .iter()
                .filter_map(|h| Regex::new(&format!("(?i){}", regex::escape(h))).ok())
                .collect(),
        )
    })
    .collect()
});

// A fallback section span ends at the earliest of these headers (or end of text).
static NEXT_HEADER_RES: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        "Total Insights:",
        "Key Findings:",
        "Financial Highlights:",
        "Risk Factors:",
        "Opportunities:",
        "Investment Recommendation:",
    ]
    .iter()
    .filter_map(|h| Regex::new(&format!("(?i){}", regex::escape(h))).ok())
    .collect()
});

// --- Data Structures ---
/// One of the five finding categories an extracted snippet can land in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FindingCategory {
    Insights,
    KeyFindings,
    FinancialHighlights,
    Risks,
    Opportunities,
}

/// The five ordered finding lists produced by one extraction pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategorizedFindings {
    pub insights: Vec<String>,
    pub key_findings: Vec<String>,
    pub financial_highlights: Vec<String>,
    pub risks: Vec<String>,
    pub opportunities: Vec<String>,
}

impl CategorizedFindings {
    pub fn is_empty(&self) -> bool {
        self.lists().iter().all(|list| list.is_empty())
    }

    pub fn all_populated(&self) -> bool {
        self.lists().iter().all(|list| !list.is_empty())
    }

    pub fn lists(&self) -> [&Vec<String>; 5] {
        [
            &self.insights,
            &self.key_findings,
            &self.financial_highlights,
            &self.risks,
            &self.opportunities,
        ]
    }

    fn list_mut(&mut self, category: FindingCategory) -> &mut Vec<String> {
        match category {
            FindingCategory::Insights => &mut self.insights,
            FindingCategory::KeyFindings => &mut self.key_findings,
            FindingCategory::FinancialHighlights => &mut self.financial_highlights,
            FindingCategory::Risks => &mut self.risks,
            FindingCategory::Opportunities => &mut self.opportunities,
        }
    }

    /// Appends a snippet to a category, truncated to the category's entry
    /// limit. Once a list reaches the per-category cap, later candidates are
    /// dropped; first-found wins, no eviction.
    fn push_capped(&mut self, category: FindingCategory, content: &str, config: &ExtractionConfig) {
        let cap = config.max_per_category;
        let limit = config.entry_limit(category);
        let list = self.list_mut(category);
        if list.len() < cap {
            list.push(truncate_chars(content, limit));
        }
    }

    /// Removes duplicates within each list while preserving first-seen order,
    /// then enforces the per-category cap.
    pub fn dedup_and_cap(&mut self, cap: usize) {
        for list in [
            &mut self.insights,
            &mut self.key_findings,
            &mut self.financial_highlights,
            &mut self.risks,
            &mut self.opportunities,
        ] {
            let mut seen = HashSet::new();
            list.retain(|item| seen.insert(item.clone()));
            list.truncate(cap);
        }
    }
}

// --- Extraction Passes ---
/// Primary pass: scan line by line, tracking the current section set by
/// recognized headers, and collect bullet lines into that section's list.
/// Header lines themselves are discarded, never emitted as content.
pub fn extract_sectioned(text: &str, config: &ExtractionConfig) -> CategorizedFindings {
    let mut findings = CategorizedFindings::default();
    let mut current_section: Option<FindingCategory> = None;

    for raw_line in text.lines() {
        let line = raw_line.trim();
        if line.is_empty() || char_len(line) < 5 {
            continue;
        }

        let line_lower = line.to_lowercase();
        if let Some((_, category)) = SECTION_HEADERS
            .iter()
            .find(|(header, _)| line_lower.contains(header))
        {
            tracing::trace!("Entering section {:?}", category);
            current_section = Some(*category);
            continue;
        }
        if SECTION_TERMINATORS.iter().any(|t| line.starts_with(t)) {
            tracing::trace!("Leaving section mode at '{}'", line);
            current_section = None;
            continue;
        }

        if char_len(line) > 15 {
            if let (Some(category), Some(content)) = (current_section, bullet_content(line)) {
                if char_len(content) > 10 {
                    findings.push_capped(category, content, config);
                }
            }
        }
    }

    findings
}

/// Fallback pass: locate header variants anywhere in the text and extract
/// bullets from the span up to the next recognized header. Also picks up
/// numbered items shaped like "Risk 1: ..." / "Opportunity 2: ...".
/// Only invoked when the primary pass produced nothing at all.
pub fn extract_from_header_spans(text: &str, config: &ExtractionConfig) -> CategorizedFindings {
    let mut findings = CategorizedFindings::default();

    for (category, header_patterns) in FALLBACK_SECTION_RES.iter() {
        for header_re in header_patterns {
            let Some(mat) = header_re.find(text) else {
                continue;
            };
            let tail = &text[mat.end()..];
            let span_end = NEXT_HEADER_RES
                .iter()
                .filter_map(|re| re.find(tail))
                .map(|m| m.start())
                .min()
                .unwrap_or(tail.len());

            collect_span_findings(&tail[..span_end], *category, &mut findings, config);
        }
    }

    findings
}

fn collect_span_findings(
    span: &str,
    category: FindingCategory,
    findings: &mut CategorizedFindings,
    config: &ExtractionConfig,
) {
    for raw_line in span.lines() {
        let line = raw_line.trim();

        if char_len(line) > 15 {
            if let Some(content) = bullet_content(line) {
                if char_len(content) > 10 {
                    findings.push_capped(category, content, config);
                }
                continue;
            }
        }

        // Numbered items keep the text after the first colon
        if line.starts_with("Risk ") || line.starts_with("Opportunity ") {
            if let Some((_, rest)) = line.split_once(':') {
                let content = rest.trim();
                if char_len(content) > 10 {
                    findings.push_capped(category, content, config);
                }
            }
        }
    }
}

/// Last-resort pass: classify unmarked lines by keyword density. Bullet lines
/// with numeric or financial content become insights; lines with currency or
/// percent evidence become key findings or highlights; the risk keyword set
/// claims a line before the opportunity set is consulted.
pub fn extract_by_keywords(text: &str, config: &ExtractionConfig) -> CategorizedFindings {
    let mut findings = CategorizedFindings::default();

    for raw_line in text.lines() {
        let line = raw_line.trim();
        if line.is_empty() || char_len(line) <= 20 {
            continue;
        }
        let line_lower = line.to_lowercase();
        let line_chars = char_len(line);

        if line_chars > 30 {
            if let Some(content) = bullet_content(line) {
                let content_lower = content.to_lowercase();
                if content.chars().any(|c| c.is_ascii_digit())
                    || FINANCE_KEYWORDS.iter().any(|kw| content_lower.contains(kw))
                {
                    findings.push_capped(FindingCategory::Insights, content, config);
                }
            }
        }

        if line_chars < 200 {
            if KEY_FINDING_CUES.iter().any(|kw| line_lower.contains(kw))
                && (line.contains('$')
                    || line.contains('%')
                    || DIRECTION_WORDS.iter().any(|kw| line_lower.contains(kw)))
            {
                findings.push_capped(FindingCategory::KeyFindings, line, config);
            }

            if HIGHLIGHT_KEYWORDS.iter().any(|kw| line_lower.contains(kw))
                && (line.contains('$') || line.contains('%'))
                && line.chars().any(|c| c.is_ascii_digit())
            {
                findings.push_capped(FindingCategory::FinancialHighlights, line, config);
            }

            if RISK_KEYWORDS.iter().any(|kw| line_lower.contains(kw)) {
                findings.push_capped(FindingCategory::Risks, line, config);
            } else if OPPORTUNITY_KEYWORDS.iter().any(|kw| line_lower.contains(kw)) {
                findings.push_capped(FindingCategory::Opportunities, line, config);
            }
        }
    }

    findings
}

// --- Helpers ---
fn bullet_content(line: &str) -> Option<&str> {
    line.strip_prefix('-')
        .or_else(|| line.strip_prefix('•'))
        .map(str::trim)
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

fn truncate_chars(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}
