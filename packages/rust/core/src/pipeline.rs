//! End-to-end export pipeline: JSONL → records → Markdown → dataset directory.

use std::collections::BTreeSet;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use tracing::{info, instrument, warn};

use ghdataset_shared::{DatasetError, DiscussionRecord, MappingEntry, Result};

use crate::assembler::{DatasetAssembler, DatasetDocument, sanitize_category};
use crate::reader::{JsonLine, JsonlReader};

/// Fields every record must carry, in the order they are checked.
pub const REQUIRED_FIELDS: [&str; 7] =
    ["category", "id", "title", "content", "url", "author", "date"];

/// Configuration for one export run.
#[derive(Debug, Clone)]
pub struct ExportOptions {
    /// JSONL input file.
    pub input: PathBuf,
    /// Dataset root directory (created if absent).
    pub output_root: PathBuf,
}

/// Result of a completed export.
#[derive(Debug, Clone)]
pub struct ExportSummary {
    /// Documents written (and mapping entries recorded).
    pub records_written: usize,
    /// Malformed lines reported and skipped.
    pub lines_skipped: usize,
    /// Distinct sanitized categories seen. The empty name counts too; its
    /// documents sit at the dataset root.
    pub categories: usize,
    /// Location of `mapping.json`.
    pub mapping_path: PathBuf,
    pub elapsed: Duration,
}

/// Progress callback for reporting export status.
pub trait ProgressReporter {
    /// Called after a record's document has been written.
    fn record_written(&self, relative_path: &str, count: usize);
    /// Called when a line is not valid JSON and is being skipped.
    fn line_skipped(&self, line: usize, error: &str, text: &str);
    /// Called once the mapping has been written.
    fn done(&self, summary: &ExportSummary);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn record_written(&self, _relative_path: &str, _count: usize) {}
    fn line_skipped(&self, _line: usize, _error: &str, _text: &str) {}
    fn done(&self, _summary: &ExportSummary) {}
}

/// Run the export.
///
/// 1. Ensure the output root exists
/// 2. For each parsed line: validate, render, write `<category>/<id>.md`
/// 3. Write `mapping.json`
///
/// Malformed JSON lines are reported and skipped. A record missing a required
/// field aborts the run before `mapping.json` is written; documents already
/// written stay on disk.
#[instrument(skip_all, fields(input = %config.input.display(), output = %config.output_root.display()))]
pub fn export_dataset(
    config: &ExportOptions,
    progress: &dyn ProgressReporter,
) -> Result<ExportSummary> {
    let start = Instant::now();

    info!("starting export");

    let reader = JsonlReader::open(&config.input)?;
    let mut assembler = DatasetAssembler::create(&config.output_root)?;

    let mut records_written = 0usize;
    let mut lines_skipped = 0usize;
    let mut categories = BTreeSet::new();

    for item in reader {
        let (line, value) = match item? {
            JsonLine::Value { line, value } => (line, value),
            JsonLine::Malformed { line, text, error } => {
                warn!(line, %error, "skipping malformed JSON line");
                progress.line_skipped(line, &error, &text);
                lines_skipped += 1;
                continue;
            }
        };

        let record = parse_record(line, value)?;
        let markdown = ghdataset_markdown::render_record(&record);

        let relative = assembler.write_document(DatasetDocument {
            category: &record.category,
            id: &record.id,
            markdown: &markdown,
            provenance: MappingEntry::from(&record),
        })?;

        records_written += 1;
        categories.insert(sanitize_category(&record.category));
        progress.record_written(&relative, records_written);
    }

    let (mapping_path, mapping) = assembler.finish()?;

    let summary = ExportSummary {
        records_written,
        lines_skipped,
        categories: categories.len(),
        mapping_path,
        elapsed: start.elapsed(),
    };

    progress.done(&summary);

    info!(
        records = summary.records_written,
        mapping_entries = mapping.len(),
        skipped = summary.lines_skipped,
        categories = summary.categories,
        elapsed_ms = summary.elapsed.as_millis(),
        "export complete"
    );

    Ok(summary)
}

/// Turn one parsed line into a record, naming the first missing field.
pub fn parse_record(line: usize, value: serde_json::Value) -> Result<DiscussionRecord> {
    let Some(object) = value.as_object() else {
        return Err(DatasetError::InvalidRecord {
            line,
            reason: "expected a JSON object".into(),
        });
    };

    if let Some(field) = REQUIRED_FIELDS
        .iter()
        .copied()
        .find(|field| !object.contains_key(*field))
    {
        return Err(DatasetError::MissingField { line, field });
    }

    serde_json::from_value(value).map_err(|e| DatasetError::InvalidRecord {
        line,
        reason: e.to_string(),
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::path::Path;

    const QA_RECORD: &str = r#"{"id":1,"category":"Q&A!","title":"T","content":[{"role":"user","message":"hi"}],"url":"u","author":"a","date":"d"}"#;

    fn temp_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "ghdataset-pipeline-test-{}",
            uuid::Uuid::now_v7()
        ));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn fixture_path(name: &str) -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("../../../fixtures")
            .join(name)
    }

    fn write_input(dir: &Path, lines: &[&str]) -> PathBuf {
        let path = dir.join("input.jsonl");
        std::fs::write(&path, lines.join("\n")).unwrap();
        path
    }

    fn config(dir: &Path, input: PathBuf) -> ExportOptions {
        ExportOptions {
            input,
            output_root: dir.join("gh_discussions_dataset"),
        }
    }

    fn read_mapping(root: &Path) -> serde_json::Value {
        serde_json::from_str(&std::fs::read_to_string(root.join("mapping.json")).unwrap()).unwrap()
    }

    /// Records every callback for assertions.
    #[derive(Default)]
    struct RecordingProgress {
        written: RefCell<Vec<String>>,
        skipped: RefCell<Vec<(usize, String)>>,
        done: RefCell<usize>,
    }

    impl ProgressReporter for RecordingProgress {
        fn record_written(&self, relative_path: &str, _count: usize) {
            self.written.borrow_mut().push(relative_path.to_string());
        }
        fn line_skipped(&self, line: usize, _error: &str, text: &str) {
            self.skipped.borrow_mut().push((line, text.to_string()));
        }
        fn done(&self, _summary: &ExportSummary) {
            *self.done.borrow_mut() += 1;
        }
    }

    #[test]
    fn example_record_round_trip() {
        let tmp = temp_dir();
        let cfg = config(&tmp, write_input(&tmp, &[QA_RECORD]));

        let summary = export_dataset(&cfg, &SilentProgress).unwrap();
        assert_eq!(summary.records_written, 1);
        assert_eq!(summary.categories, 1);

        let doc = std::fs::read_to_string(cfg.output_root.join("QA/1.md")).unwrap();
        assert_eq!(doc, "# T\n\n## Conversation\n\n### user\nhi\n\n");

        let mapping = read_mapping(&cfg.output_root);
        assert_eq!(
            mapping,
            serde_json::json!({
                "QA/1.md": {"url": "u", "tool": null, "author": "a", "date": "d"}
            })
        );

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn malformed_line_does_not_stop_later_records() {
        let tmp = temp_dir();
        let second = QA_RECORD.replace("\"id\":1", "\"id\":2");
        let cfg = config(
            &tmp,
            write_input(&tmp, &[QA_RECORD, "{\"id\": 5, oops", "", &second]),
        );
        let progress = RecordingProgress::default();

        let summary = export_dataset(&cfg, &progress).unwrap();

        assert_eq!(summary.records_written, 2);
        assert_eq!(summary.lines_skipped, 1);
        assert_eq!(*progress.skipped.borrow(), vec![(2, "{\"id\": 5, oops".to_string())]);
        assert_eq!(*progress.written.borrow(), vec!["QA/1.md", "QA/2.md"]);
        assert_eq!(*progress.done.borrow(), 1);
        assert!(cfg.output_root.join("QA/2.md").is_file());

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn missing_category_aborts_before_mapping() {
        let tmp = temp_dir();
        let broken = r#"{"id":2,"title":"T","content":[],"url":"u","author":"a","date":"d"}"#;
        let cfg = config(&tmp, write_input(&tmp, &[QA_RECORD, broken, QA_RECORD]));

        let err = export_dataset(&cfg, &SilentProgress).unwrap_err();

        match err {
            DatasetError::MissingField { line, field } => {
                assert_eq!(line, 2);
                assert_eq!(field, "category");
            }
            other => panic!("expected MissingField, got {other}"),
        }
        // Earlier documents stay; the index is never written.
        assert!(cfg.output_root.join("QA/1.md").is_file());
        assert!(!cfg.output_root.join("mapping.json").exists());

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn wrongly_typed_field_aborts() {
        let tmp = temp_dir();
        let broken = r#"{"id":3,"category":"c","title":"T","content":"not a list","url":"u","author":"a","date":"d"}"#;
        let cfg = config(&tmp, write_input(&tmp, &[broken]));

        let err = export_dataset(&cfg, &SilentProgress).unwrap_err();
        assert!(matches!(err, DatasetError::InvalidRecord { line: 1, .. }));
        assert!(!cfg.output_root.join("mapping.json").exists());

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn non_object_line_aborts() {
        let err = parse_record(4, serde_json::json!([1, 2, 3])).unwrap_err();
        assert!(matches!(err, DatasetError::InvalidRecord { line: 4, .. }));
    }

    #[test]
    fn missing_fields_reported_in_check_order() {
        let err = parse_record(1, serde_json::json!({"title": "T"})).unwrap_err();
        assert!(matches!(err, DatasetError::MissingField { field: "category", .. }));

        let err = parse_record(1, serde_json::json!({"category": "c", "id": 1, "title": "T", "content": []}))
            .unwrap_err();
        assert!(matches!(err, DatasetError::MissingField { field: "url", .. }));
    }

    #[test]
    fn empty_input_writes_empty_mapping() {
        let tmp = temp_dir();
        let cfg = config(&tmp, write_input(&tmp, &[]));

        let summary = export_dataset(&cfg, &SilentProgress).unwrap();
        assert_eq!(summary.records_written, 0);
        assert_eq!(std::fs::read_to_string(&summary.mapping_path).unwrap(), "{}");

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn root_level_documents_count_as_a_category() {
        let tmp = temp_dir();
        let root_record = r#"{"id":2,"category":"?!","title":"T","content":[],"url":"u2","author":"a","date":"d"}"#;
        let cfg = config(&tmp, write_input(&tmp, &[QA_RECORD, root_record]));

        let summary = export_dataset(&cfg, &SilentProgress).unwrap();
        assert_eq!(summary.records_written, 2);
        assert_eq!(summary.categories, 2);
        assert!(cfg.output_root.join("2.md").is_file());

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn missing_input_is_io_error() {
        let tmp = temp_dir();
        let cfg = config(&tmp, tmp.join("does-not-exist.jsonl"));

        let err = export_dataset(&cfg, &SilentProgress).unwrap_err();
        assert!(matches!(err, DatasetError::Io { .. }));

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn fixture_dataset_export() {
        let tmp = temp_dir();
        let cfg = config(&tmp, fixture_path("jsonl/discussions.fixture.jsonl"));

        let summary = export_dataset(&cfg, &SilentProgress).unwrap();
        assert_eq!(summary.records_written, 4);
        assert_eq!(summary.lines_skipped, 1);
        assert_eq!(summary.categories, 3);

        // Every mapping entry has a file and every file has an entry.
        let mapping = read_mapping(&cfg.output_root);
        let entries = mapping.as_object().unwrap();
        assert_eq!(entries.len(), 4);
        for key in entries.keys() {
            assert!(cfg.output_root.join(key).is_file(), "missing file for {key}");
        }

        let md_files: usize = std::fs::read_dir(&cfg.output_root)
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.path().is_dir())
            .map(|dir| std::fs::read_dir(dir.path()).unwrap().count())
            .sum();
        assert_eq!(md_files, entries.len());

        let with_tool = &entries["Q-A/101.md"];
        assert_eq!(with_tool["tool"], "openroad");
        let doc = std::fs::read_to_string(cfg.output_root.join("Q-A/101.md")).unwrap();
        assert!(doc.starts_with("# How do I set the die area?\n\nTool: openroad\n\nSubcategory: Floorplan\n\n"));

        let _ = std::fs::remove_dir_all(&tmp);
    }
}
