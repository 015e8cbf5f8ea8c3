// src/utils/report_debug.rs
use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::utils::error::AppError;

/// Writes an annotated copy of a report where each line is prefixed with the
/// evidence tags whose byte spans overlap that line.
pub fn save_debug_report(
    text: &str,
    filename: &str,
    annotations: &[(usize, usize, &str)],
) -> Result<(), AppError> {
    let path = Path::new(filename);
    let mut file = File::create(path)?;

    let mut sorted = annotations.to_vec();
    sorted.sort_by_key(|a| a.0);

    let mut offset = 0usize;
    let mut out = String::new();
    for line in text.split_inclusive('\n') {
        let line_start = offset;
        let line_end = offset + line.len();
        offset = line_end;

        let mut tags: Vec<&str> = sorted
            .iter()
            .filter(|(start, end, _)| *start < line_end && *end > line_start)
            .map(|(_, _, tag)| *tag)
            .collect();
        tags.dedup();

        if tags.is_empty() {
            out.push_str("              | ");
        } else {
            out.push_str(&format!("{:<14}| ", tags.join(",")));
        }
        out.push_str(line);
    }
    if !out.ends_with('\n') {
        out.push('\n');
    }

    file.write_all(out.as_bytes())?;

    tracing::info!("Saved annotated debug report to {}", path.display());
    Ok(())
}

/// Creates a debug copy of a report with the locations of the given regex
/// patterns tagged in the margin. Used by `--debug` runs to show which lines
/// the extractor treated as headers, bullets, or numeric evidence.
pub fn create_debug_report(
    text: &str,
    filename: &str,
    patterns: &[(&str, &str)],
) -> Result<(), AppError> {
    use regex::Regex;

    let mut annotations = Vec::new();

    for (pattern, tag) in patterns {
        let re = Regex::new(pattern).map_err(|e| {
            AppError::Config(format!("Invalid regex pattern '{}': {}", pattern, e))
        })?;

        for mat in re.find_iter(text) {
            annotations.push((mat.start(), mat.end(), *tag));
        }
    }

    save_debug_report(text, filename, &annotations)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_annotated_report_tags_matching_lines() {
        let text = "Key Findings:\n- Revenue was $5M\nplain prose line\n";
        let dir = std::env::temp_dir().join("findoc_debug_test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("annotated.txt");

        let patterns = [
            (r"(?i)key findings:", "header"),
            (r"\$[\d,]+\.?\d*[BMK]?", "currency"),
        ];
        create_debug_report(text, path.to_str().unwrap(), &patterns).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = written.lines().collect();
        assert!(lines[0].starts_with("header"));
        assert!(lines[1].starts_with("currency"));
        assert!(lines[2].trim_start().starts_with('|'));
    }

    #[test]
    fn test_invalid_pattern_is_config_error() {
        let result = create_debug_report("text", "/tmp/unused.txt", &[("(unclosed", "bad")]);
        assert!(matches!(result, Err(AppError::Config(_))));
    }
}
