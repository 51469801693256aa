//! Bulk import of labeled examples
//!
//! Rows are tolerated individually: unusable rows are skipped and the rest
//! imported. An import that yields no rows at all is an error.

use modguard_core::{Decision, Error, ExampleSource, Result, TrainingExample};
use std::path::Path;
use tracing::{debug, info, warn};

/// Header words recognised in the first line of a CSV file
const HEADER_MARKERS: [&str; 4] = ["content", "text", "label", "category"];

/// Map a label string onto a decision.
///
/// Case-insensitive and trimmed. Unrecognised labels map to
/// [`Decision::Flagged`] so they surface for human review.
pub fn normalize_label(label: &str) -> Decision {
    match label.trim().to_lowercase().as_str() {
        "approved" | "approve" | "positive" | "safe" | "1" => Decision::Approved,
        "rejected" | "reject" | "negative" | "unsafe" | "-1" => Decision::Rejected,
        "flagged" | "flag" | "review" | "moderate" | "0" => Decision::Flagged,
        other => {
            debug!(label = other, "Unrecognised label, defaulting to flagged");
            Decision::Flagged
        }
    }
}

/// Whether the first line of a CSV document looks like a header row
pub fn has_header(text: &str) -> bool {
    let Some(first) = text.lines().next() else {
        return false;
    };
    let first = first.to_lowercase();
    HEADER_MARKERS.iter().any(|marker| first.contains(marker))
}

/// Parse CSV text of `content,label[,cat1;cat2]` rows.
///
/// Double-quoted fields may contain commas. Rows with fewer than two fields
/// or empty content are skipped.
pub fn parse_csv(text: &str) -> Result<Vec<TrainingExample>> {
    let header = has_header(text);
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(header)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let mut examples = Vec::new();
    let mut skipped = 0usize;

    for (index, record) in reader.records().enumerate() {
        let record = match record {
            Ok(record) => record,
            Err(e) => {
                warn!(row = index + 1, error = %e, "Skipping unreadable CSV row");
                skipped += 1;
                continue;
            }
        };

        if record.len() < 2 {
            skipped += 1;
            continue;
        }

        let content = record.get(0).unwrap_or_default();
        if content.is_empty() {
            skipped += 1;
            continue;
        }

        let mut example = TrainingExample::new(content, normalize_label(record.get(1).unwrap_or_default()))
            .with_source(ExampleSource::Csv);

        if let Some(categories) = record.get(2).map(split_categories) {
            if !categories.is_empty() {
                example = example.with_categories(categories);
            }
        }

        examples.push(example);
    }

    if examples.is_empty() {
        return Err(Error::malformed_import(format!(
            "no usable rows ({skipped} skipped)"
        )));
    }

    info!(imported = examples.len(), skipped, header, "CSV import parsed");
    Ok(examples)
}

/// Read and parse a CSV file
pub fn load_csv_file(path: impl AsRef<Path>) -> Result<Vec<TrainingExample>> {
    let text = std::fs::read_to_string(path.as_ref())?;
    parse_csv(&text)
}

/// Import `(content, label, categories)` tuples.
///
/// Labels go through [`normalize_label`]; rows with blank content are skipped.
pub fn import_records<I, C, L>(records: I, source: ExampleSource) -> Result<Vec<TrainingExample>>
where
    I: IntoIterator<Item = (C, L, Option<Vec<String>>)>,
    C: Into<String>,
    L: AsRef<str>,
{
    let examples: Vec<TrainingExample> = records
        .into_iter()
        .filter_map(|(content, label, categories)| {
            let content = content.into();
            if content.trim().is_empty() {
                return None;
            }
            let mut example =
                TrainingExample::new(content, normalize_label(label.as_ref())).with_source(source);
            example.categories = categories.filter(|c| !c.is_empty());
            Some(example)
        })
        .collect();

    if examples.is_empty() {
        return Err(Error::malformed_import("no usable records"));
    }
    Ok(examples)
}

fn split_categories(field: &str) -> Vec<String> {
    field
        .split(';')
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_label_synonyms() {
        for label in ["approved", "Approve", " POSITIVE ", "safe", "1"] {
            assert_eq!(normalize_label(label), Decision::Approved, "{label}");
        }
        for label in ["flagged", "flag", "Review", "moderate", "0"] {
            assert_eq!(normalize_label(label), Decision::Flagged, "{label}");
        }
        for label in ["rejected", "REJECT", "negative", "unsafe", "-1"] {
            assert_eq!(normalize_label(label), Decision::Rejected, "{label}");
        }
        assert_eq!(normalize_label("bogus_label"), Decision::Flagged);
        assert_eq!(normalize_label(""), Decision::Flagged);
    }

    #[test]
    fn test_headerless_csv() {
        let examples = parse_csv("hello,approved\nworld,bogus_label\n").unwrap();

        assert_eq!(examples.len(), 2);
        assert_eq!(examples[0].content, "hello");
        assert_eq!(examples[0].label, Decision::Approved);
        assert_eq!(examples[1].label, Decision::Flagged);
        assert!(examples.iter().all(|e| e.source == ExampleSource::Csv));
    }

    #[test]
    fn test_header_row_is_skipped() {
        let csv = "Text,Label,Categories\nnice post,safe,\nyou idiot,unsafe,Harassment; Hate Speech\n";
        let examples = parse_csv(csv).unwrap();

        assert_eq!(examples.len(), 2);
        assert_eq!(examples[0].categories, None);
        assert_eq!(
            examples[1].categories.as_deref(),
            Some(&["Harassment".to_string(), "Hate Speech".to_string()][..])
        );
    }

    #[test]
    fn test_quoted_fields_with_commas() {
        let csv = "\"well, that was rude\",flag\n\"plain\",\"approve\"\n";
        let examples = parse_csv(csv).unwrap();

        assert_eq!(examples[0].content, "well, that was rude");
        assert_eq!(examples[0].label, Decision::Flagged);
        assert_eq!(examples[1].content, "plain");
        assert_eq!(examples[1].label, Decision::Approved);
    }

    #[test]
    fn test_bad_rows_are_skipped() {
        let csv = "only one field\n,approved\ngood row,reject\n";
        let examples = parse_csv(csv).unwrap();
        assert_eq!(examples.len(), 1);
        assert_eq!(examples[0].label, Decision::Rejected);
    }

    #[test]
    fn test_no_usable_rows() {
        let err = parse_csv("content,label\n").unwrap_err();
        assert!(matches!(err, Error::MalformedImport(_)));

        assert!(matches!(parse_csv(""), Err(Error::MalformedImport(_))));
    }

    #[test]
    fn test_import_records() {
        let records = vec![
            ("kind words", "positive", None),
            ("  ", "negative", None),
            ("threat", "-1", Some(vec!["Threats".to_string()])),
        ];
        let examples = import_records(records, ExampleSource::Manual).unwrap();

        assert_eq!(examples.len(), 2);
        assert_eq!(examples[1].label, Decision::Rejected);
        assert_eq!(examples[1].categories, Some(vec!["Threats".to_string()]));
    }

    #[test]
    fn test_import_records_empty() {
        let records: Vec<(&str, &str, Option<Vec<String>>)> = Vec::new();
        assert!(import_records(records, ExampleSource::Csv).is_err());
    }
}
