//! Dataset directory assembler.
//!
//! Takes rendered discussion documents and their provenance, writes one
//! Markdown file per record into a category directory, and finally writes the
//! `mapping.json` index at the dataset root.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::ser::{Serialize, SerializeMap, Serializer};
use tracing::{debug, info, instrument};
use unicode_properties::{GeneralCategoryGroup, UnicodeGeneralCategory};

use ghdataset_shared::{DatasetError, MappingEntry, Result};

/// File name of the side-car index written at the dataset root.
pub const MAPPING_FILE_NAME: &str = "mapping.json";

/// Keep letters, numerics, spaces, underscores and hyphens, then drop trailing
/// whitespace. Distinct inputs may collapse to the same name; callers get no
/// collision detection.
pub fn sanitize_category(name: &str) -> String {
    let kept: String = name
        .chars()
        .filter(|&c| is_letter_or_number(c) || matches!(c, ' ' | '_' | '-'))
        .collect();
    kept.trim_end().to_string()
}

/// Letters are the `L*` general categories only. Combining marks and symbols
/// such as circled letters are dropped even though `char::is_alphabetic`
/// accepts them.
fn is_letter_or_number(c: char) -> bool {
    c.general_category_group() == GeneralCategoryGroup::Letter || c.is_numeric()
}

/// Path of a document relative to the dataset root, always `/`-separated.
///
/// An empty category places the document directly under the root.
pub fn relative_document_path(category: &str, id: &str) -> String {
    if category.is_empty() {
        format!("{id}.md")
    } else {
        format!("{category}/{id}.md")
    }
}

// ---------------------------------------------------------------------------
// Mapping
// ---------------------------------------------------------------------------

/// Ordered index of written documents keyed by relative path.
///
/// Serializes as a JSON object in first-insertion order. Re-inserting a key
/// replaces its value in place.
#[derive(Debug, Clone, Default)]
pub struct DatasetMapping {
    entries: Vec<(String, MappingEntry)>,
    positions: HashMap<String, usize>,
}

impl DatasetMapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the entry for `path`.
    pub fn insert(&mut self, path: String, entry: MappingEntry) {
        match self.positions.get(&path) {
            Some(&idx) => self.entries[idx].1 = entry,
            None => {
                self.positions.insert(path.clone(), self.entries.len());
                self.entries.push((path, entry));
            }
        }
    }

    pub fn get(&self, path: &str) -> Option<&MappingEntry> {
        self.positions.get(path).map(|&idx| &self.entries[idx].1)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Relative paths in insertion order.
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(path, _)| path.as_str())
    }
}

impl Serialize for DatasetMapping {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (path, entry) in &self.entries {
            map.serialize_entry(path, entry)?;
        }
        map.end()
    }
}

// ---------------------------------------------------------------------------
// Assembler
// ---------------------------------------------------------------------------

/// A rendered document ready to be placed in the dataset.
#[derive(Debug, Clone)]
pub struct DatasetDocument<'a> {
    /// Raw category; sanitized by the assembler.
    pub category: &'a str,
    /// Filename stem.
    pub id: &'a str,
    /// Markdown body.
    pub markdown: &'a str,
    pub provenance: MappingEntry,
}

/// Writes documents under a dataset root and accumulates the mapping.
#[derive(Debug)]
pub struct DatasetAssembler {
    root: PathBuf,
    mapping: DatasetMapping,
}

impl DatasetAssembler {
    /// Create the assembler, ensuring the output root exists.
    pub fn create(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root).map_err(|e| DatasetError::io(&root, e))?;
        debug!(path = %root.display(), "dataset root ready");
        Ok(Self {
            root,
            mapping: DatasetMapping::new(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn mapping(&self) -> &DatasetMapping {
        &self.mapping
    }

    /// Write one document, overwriting any file with the same id in its
    /// category, and record its mapping entry. Returns the relative path.
    pub fn write_document(&mut self, doc: DatasetDocument<'_>) -> Result<String> {
        let category = sanitize_category(doc.category);
        let category_dir = self.root.join(&category);
        std::fs::create_dir_all(&category_dir).map_err(|e| DatasetError::io(&category_dir, e))?;

        let file_path = category_dir.join(format!("{}.md", doc.id));
        std::fs::write(&file_path, doc.markdown).map_err(|e| DatasetError::io(&file_path, e))?;

        let relative = relative_document_path(&category, doc.id);
        debug!(path = %relative, "wrote document");

        self.mapping.insert(relative.clone(), doc.provenance);
        Ok(relative)
    }

    /// Persist the mapping as pretty JSON at `<root>/mapping.json`.
    ///
    /// Writes to a temp sibling then renames, so a prior mapping is replaced whole.
    #[instrument(skip_all, fields(root = %self.root.display(), entries = self.mapping.len()))]
    pub fn finish(self) -> Result<(PathBuf, DatasetMapping)> {
        let target = self.root.join(MAPPING_FILE_NAME);
        let temp = self.root.join(format!(".{MAPPING_FILE_NAME}.tmp"));

        let json = serde_json::to_string_pretty(&self.mapping).map_err(|e| {
            DatasetError::validation(format!("JSON serialization failed: {e}"))
        })?;

        std::fs::write(&temp, json).map_err(|e| DatasetError::io(&temp, e))?;
        std::fs::rename(&temp, &target).map_err(|e| DatasetError::io(&target, e))?;

        info!(path = %target.display(), "mapping written");
        Ok((target, self.mapping))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
