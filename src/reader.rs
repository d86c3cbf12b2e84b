//! High-level API for loading cycle log documents.

use arrow::array::RecordBatch;
use indexmap::IndexMap;
use log::warn;
use memmap2::Mmap;
use serde_json::value::RawValue;
use std::collections::BTreeMap;
use std::fs::File;
use std::path::Path;

use crate::error::{Error, Result};
use crate::flatten;
use crate::models::{Document, OperationKind};

const CYCLE_KEY: &str = "cycle";

/// A loaded cycle log, ready for extraction.
///
/// # Examples
///
/// ```no_run
/// use cycle_extract::{CycleReader, OperationKind};
///
/// let reader = CycleReader::from_file("B0005.json")?;
/// let discharge = reader.extract(OperationKind::Discharge)?;
/// println!("{} discharge rows", discharge.num_rows());
/// # Ok::<(), cycle_extract::Error>(())
/// ```
pub struct CycleReader {
    document: Document,
}

impl CycleReader {
    /// Load a document from a JSON file.
    ///
    /// The document may sit under a key named after the file stem
    /// (`{"B0005": {"cycle": [...]}}`) or be the root object itself. When the
    /// stem key is absent but the root has exactly one key, the document under
    /// that key is read instead and a warning is logged.
    ///
    /// Only the structure common to every operation is decoded here. The
    /// `time` and `data` of an operation are checked when it is extracted.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is not JSON, or has no
    /// `cycle` list.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let mmap = unsafe { Mmap::map(&file)? };

        let stem = path.file_stem().and_then(|s| s.to_str());
        Ok(Self {
            document: decode_document(&mmap, stem)?,
        })
    }

    /// Load a document from raw JSON bytes.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        Ok(Self {
            document: decode_document(data, None)?,
        })
    }

    /// Wrap a document produced by some other loader.
    pub fn from_document(document: Document) -> Self {
        Self { document }
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn cycle_count(&self) -> usize {
        self.document.cycles.len()
    }

    /// Number of operations per declared type across all cycles.
    pub fn operation_counts(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for op in self.document.cycles.iter().flat_map(|c| &c.operations) {
            *counts.entry(op.type_name.clone()).or_insert(0) += 1;
        }
        counts
    }

    /// Flatten every operation of `kind` into one table.
    pub fn extract(&self, kind: OperationKind) -> Result<RecordBatch> {
        flatten::extract(&self.document, kind)
    }
}

/// Locates the object holding the `cycle` list and decodes it.
///
/// Entries are decoded straight from the input bytes, so syntax and type
/// errors keep their line and column.
fn decode_document(data: &[u8], stem: Option<&str>) -> Result<Document> {
    let root: IndexMap<String, &RawValue> = match serde_json::from_slice(data) {
        Ok(root) => root,
        Err(e) if e.is_data() => {
            return Err(Error::InvalidFormat(
                "document root is not an object".to_string(),
            ))
        }
        Err(e) => return Err(e.into()),
    };

    if root.contains_key(CYCLE_KEY) {
        return Ok(serde_json::from_slice(data)?);
    }

    let wrapped = match stem.and_then(|s| root.get(s)) {
        Some(inner) => Some(*inner),
        None if root.len() == 1 => root.iter().next().map(|(key, inner)| {
            if let Some(stem) = stem {
                warn!(
                    "no '{}' key in document, reading the only key '{}' instead",
                    stem, key
                );
            }
            *inner
        }),
        None => None,
    };

    match wrapped {
        Some(inner) if has_cycle_list(inner) => Ok(serde_json::from_str(inner.get())?),
        _ => Err(Error::InvalidFormat(format!(
            "no '{}' list found{}",
            CYCLE_KEY,
            stem.map(|s| format!(" at the root or under '{}'", s))
                .unwrap_or_default()
        ))),
    }
}

fn has_cycle_list(inner: &RawValue) -> bool {
    serde_json::from_str::<IndexMap<String, &RawValue>>(inner.get())
        .map(|map| map.contains_key(CYCLE_KEY))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    const BARE: &str = r#"{"cycle": [[
        {"type": "charge", "ambient_temperature": 24, "time": [2008, 1, 1, 0, 0, 0],
         "data": {"Time": [0, 1]}},
        {"type": "impedance", "ambient_temperature": 24, "time": [2008, 1, 1, 1, 0, 0],
         "data": [{"Rct": [0.1]}]}
    ]]}"#;

    #[test]
    fn test_from_bytes_bare_root() {
        let reader = CycleReader::from_bytes(BARE.as_bytes()).unwrap();
        assert_eq!(reader.cycle_count(), 1);

        let counts = reader.operation_counts();
        assert_eq!(counts.get("charge"), Some(&1));
        assert_eq!(counts.get("impedance"), Some(&1));
    }

    #[test]
    fn test_from_bytes_single_key_wrapper() {
        let wrapped = format!(r#"{{"B0005": {}}}"#, BARE);
        let reader = CycleReader::from_bytes(wrapped.as_bytes()).unwrap();
        assert_eq!(reader.cycle_count(), 1);
    }

    #[test]
    fn test_stem_key_preferred() {
        let two = format!(r#"{{"B0006": {{"cycle": []}}, "B0005": {}}}"#, BARE);
        let document = decode_document(two.as_bytes(), Some("B0005")).unwrap();
        assert_eq!(document.cycles.len(), 1);
    }

    #[test]
    fn test_single_key_read_when_stem_differs() {
        let wrapped = format!(r#"{{"B0006": {}}}"#, BARE);
        let document = decode_document(wrapped.as_bytes(), Some("B0005")).unwrap();
        assert_eq!(document.cycles.len(), 1);
    }

    #[test]
    fn test_wrapper_without_cycle_list() {
        assert!(matches!(
            decode_document(br#"{"B0005": {"cycles": []}}"#, Some("B0005")),
            Err(Error::InvalidFormat(_))
        ));
        assert!(matches!(
            decode_document(br#"{"B0005": [1, 2]}"#, Some("B0005")),
            Err(Error::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_syntax_error_keeps_position() {
        let broken = b"{\"cycle\": [[\n  {\"type\": \"charge\",,}\n]]}";
        match CycleReader::from_bytes(broken) {
            Err(Error::Json(e)) => {
                assert!(e.is_syntax());
                assert_eq!(e.line(), 2);
            }
            Err(other) => panic!("unexpected error: {}", other),
            Ok(_) => panic!("broken document loaded"),
        }
    }

    #[test]
    fn test_missing_cycle_list() {
        assert!(matches!(
            CycleReader::from_bytes(br#"{"a": 1, "b": 2}"#),
            Err(Error::InvalidFormat(_))
        ));
        assert!(matches!(
            CycleReader::from_bytes(b"[1, 2, 3]"),
            Err(Error::InvalidFormat(_))
        ));
        assert!(matches!(
            CycleReader::from_bytes(b"not json"),
            Err(Error::Json(_))
        ));
    }
}
