//! Lazy JSON-Lines reader.
//!
//! Yields one parsed value per non-blank line, in file order. Lines that are
//! not valid JSON are surfaced as [`JsonLine::Malformed`] so the caller can
//! report and skip them; I/O failures end the iteration with an error.

use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::path::{Path, PathBuf};

use tracing::debug;

use ghdataset_shared::{DatasetError, Result};

/// One non-blank line of input.
#[derive(Debug, Clone, PartialEq)]
pub enum JsonLine {
    /// The line parsed as JSON.
    Value {
        /// 1-based line number.
        line: usize,
        value: serde_json::Value,
    },
    /// The line did not parse; it should be reported and skipped.
    Malformed {
        line: usize,
        /// The trimmed line text.
        text: String,
        /// Parser error message.
        error: String,
    },
}

/// Single-pass iterator over a JSONL source.
pub struct JsonlReader<R> {
    lines: Lines<R>,
    line_number: usize,
    source: PathBuf,
    failed: bool,
}

impl JsonlReader<BufReader<File>> {
    /// Open a JSONL file for reading.
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|e| DatasetError::io(path, e))?;
        debug!(path = %path.display(), "opened JSONL input");
        Ok(Self::new(BufReader::new(file), path))
    }
}

impl<R: BufRead> JsonlReader<R> {
    /// Wrap any buffered reader; `source` is used in error messages only.
    pub fn new(reader: R, source: impl Into<PathBuf>) -> Self {
        Self {
            lines: reader.lines(),
            line_number: 0,
            source: source.into(),
            failed: false,
        }
    }
}

impl<R: BufRead> Iterator for JsonlReader<R> {
    type Item = Result<JsonLine>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }

        loop {
            let raw = match self.lines.next()? {
                Ok(raw) => raw,
                Err(e) => {
                    self.failed = true;
                    return Some(Err(DatasetError::io(&self.source, e)));
                }
            };
            self.line_number += 1;

            let text = raw.trim();
            if text.is_empty() {
                continue;
            }

            let line = self.line_number;
            return Some(Ok(match serde_json::from_str(text) {
                Ok(value) => JsonLine::Value { line, value },
                Err(e) => JsonLine::Malformed {
                    line,
                    text: text.to_string(),
                    error: e.to_string(),
                },
            }));
        }
    }
}
