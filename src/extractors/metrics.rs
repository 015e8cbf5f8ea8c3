// src/extractors/metrics.rs

// --- Imports ---
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;

// --- Regex Patterns for Metric Matching (Lazy Static) ---
// Each metric carries an ordered list of pattern variants. The first variant
// that matches anywhere in the text wins, and only the first occurrence's
// captured value is kept. Pattern shape one: currency-prefixed number with
// optional B/M/K suffix ("$1.2B"). Pattern shape two: plain number followed
// by a scale word ("1.2 billion").
static FINANCIAL_PATTERNS: Lazy<Vec<(&'static str, Vec<Regex>)>> = Lazy::new(|| {
    [
        (
            "revenue",
            vec![
                r"(?i)(?:revenue|sales|total revenue).*?(\$[\d,]+\.?\d*[BMK]?)",
                r"(?i)(?:revenue|sales).*?(\d+(?:,\d{3})*(?:\.\d{2})?)\s*(?:million|billion|thousand|M|B|K)",
            ],
        ),
        (
            "operating_income",
            vec![
                r"(?i)(?:operating income|operating profit|ebit).*?(\$[\d,]+\.?\d*[BMK]?)",
                r"(?i)(?:operating income|operating profit).*?(\d+(?:,\d{3})*(?:\.\d{2})?)\s*(?:million|billion|thousand|M|B|K)",
            ],
        ),
        (
            "net_income",
            vec![
                r"(?i)(?:net income|net profit|net earnings).*?(\$[\d,]+\.?\d*[BMK]?)",
                r"(?i)(?:net income|net profit).*?(\d+(?:,\d{3})*(?:\.\d{2})?)\s*(?:million|billion|thousand|M|B|K)",
            ],
        ),
        (
            "cash",
            vec![
                r"(?i)(?:cash|cash equivalents).*?(\$[\d,]+\.?\d*[BMK]?)",
                r"(?i)(?:cash|cash equivalents).*?(\d+(?:,\d{3})*(?:\.\d{2})?)\s*(?:million|billion|thousand|M|B|K)",
            ],
        ),
        (
            "free_cash_flow",
            vec![
                r"(?i)(?:free cash flow|fcf).*?(\$[\d,]+\.?\d*[BMK]?)",
                r"(?i)(?:free cash flow|fcf).*?(\d+(?:,\d{3})*(?:\.\d{2})?)\s*(?:million|billion|thousand|M|B|K)",
            ],
        ),
        (
            "operating_margin",
            vec![
                r"(?i)(?:operating margin).*?(\d+(?:\.\d+)?%)",
                r"(?i)(?:operating margin).*?(\d+(?:\.\d{2})?)\s*%",
            ],
        ),
        (
            "net_margin",
            vec![
                r"(?i)(?:net margin).*?(\d+(?:\.\d+)?%)",
                r"(?i)(?:net margin).*?(\d+(?:\.\d{2})?)\s*%",
            ],
        ),
    ]
    .into_iter()
    .map(|(name, patterns)| {
        (
            name,
            patterns
                .iter()
                .filter_map(|pat| Regex::new(pat).ok()) // Use filter_map for cleaner error handling on regex creation
                .collect(),
        )
    })
    .collect()
});

// Percentage-change metrics: a growth/decline word co-located with a percent
// figure. Same first-variant, first-occurrence policy as above.
static PERCENTAGE_PATTERNS: Lazy<Vec<(&'static str, Vec<Regex>)>> = Lazy::new(|| {
    [
        (
            "revenue_change",
            vec![
                r"(?i)(?:revenue|sales).*?(?:growth|increase|decrease|decline).*?(\d+(?:\.\d+)?%)",
                r"(?i)(?:revenue|sales).*?(\d+(?:\.\d+)?%)\s*(?:growth|increase|decrease|decline)",
            ],
        ),
        (
            "income_change",
            vec![
                r"(?i)(?:operating income|net income|profit).*?(?:growth|increase|decrease|decline).*?(\d+(?:\.\d+)?%)",
                r"(?i)(?:operating income|net income|profit).*?(\d+(?:\.\d+)?%)\s*(?:growth|increase|decrease|decline)",
            ],
        ),
        (
            "growth_rate",
            vec![
                r"(?i)(?:growth|yoy|year-over-year).*?(\d+(?:\.\d+)?%)",
                r"(?i)(\d+(?:\.\d+)?%)\s*(?:growth|yoy)",
            ],
        ),
    ]
    .into_iter()
    .map(|(name, patterns)| {
        (
            name,
            patterns
                .iter()
                .filter_map(|pat| Regex::new(pat).ok())
                .collect(),
        )
    })
    .collect()
});

/// Extracts named financial metrics from free text.
///
/// Values are kept exactly as captured (currency symbols, scale suffixes, and
/// percent signs preserved). For each metric the first pattern variant with a
/// match wins; later variants and later occurrences are not consulted.
pub fn extract_metrics(text: &str) -> BTreeMap<String, String> {
    let mut metrics = BTreeMap::new();

    for table in [&FINANCIAL_PATTERNS, &PERCENTAGE_PATTERNS] {
        for (metric_name, patterns) in table.iter() {
            for re in patterns {
                if let Some(value) = re.captures(text).and_then(|caps| caps.get(1)) {
                    tracing::trace!("Metric '{}' matched value '{}'", metric_name, value.as_str());
                    metrics.insert((*metric_name).to_string(), value.as_str().to_string());
                    break; // First matching pattern variant wins
                }
            }
        }
    }

    metrics
}

// --- Tests ---
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_currency_metric_extraction() {
        let text = "Revenue: $1.2B\nNet income came in at $300M for the quarter.";
        let metrics = extract_metrics(text);
        assert_eq!(metrics.get("revenue").map(String::as_str), Some("$1.2B"));
        assert_eq!(metrics.get("net_income").map(String::as_str), Some("$300M"));
    }

    #[test]
    fn test_first_occurrence_wins() {
        // Both "Revenue" and "Sales" match the revenue synonyms; the earliest
        // occurrence in the text must be the one recorded.
        let text = "Revenue: $500M this year. Sales grew to $600M in the segment.";
        let metrics = extract_metrics(text);
        assert_eq!(metrics.get("revenue").map(String::as_str), Some("$500M"));
    }

    #[test]
    fn test_scale_word_variant_used_when_no_currency_match() {
        let text = "Total revenue reached 1,250.00 million in fiscal 2024.";
        let metrics = extract_metrics(text);
        assert_eq!(metrics.get("revenue").map(String::as_str), Some("1,250.00"));
    }

    #[test]
    fn test_margin_and_change_metrics() {
        let text = "Operating margin improved to 23.5% while revenue growth hit 12% year over year.";
        let metrics = extract_metrics(text);
        assert_eq!(metrics.get("operating_margin").map(String::as_str), Some("23.5%"));
        assert_eq!(metrics.get("revenue_change").map(String::as_str), Some("12%"));
        assert_eq!(metrics.get("growth_rate").map(String::as_str), Some("12%"));
    }

    #[test]
    fn test_no_numbers_yields_empty_map() {
        let text = "The company discussed strategy and leadership changes at length.";
        assert!(extract_metrics(text).is_empty());
    }

    #[test]
    fn test_empty_input() {
        assert!(extract_metrics("").is_empty());
    }
}
