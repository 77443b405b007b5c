//! Write-only dump of the index for inspection.
//!
//! The engine never reads a snapshot back; it only exists so the weights can be
//! examined outside the process.

use crate::error::SnapshotError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TermWeight {
    pub tf: f64,
    pub idf: f64,
    pub tf_idf: f64,
}

/// document id -> term -> weights
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IndexSnapshot {
    documents: BTreeMap<String, BTreeMap<String, TermWeight>>,
}

impl IndexSnapshot {
    pub fn insert(&mut self, doc_id: &str, term: &str, weight: TermWeight) {
        self.documents
            .entry(doc_id.to_string())
            .or_default()
            .insert(term.to_string(), weight);
    }

    pub fn get(&self, doc_id: &str, term: &str) -> Option<&TermWeight> {
        self.documents.get(doc_id)?.get(term)
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SnapshotFormat {
    /// Pretty-printed, non-ASCII kept as-is
    #[default]
    Json,
    Bincode,
}

/// Where and how to write the snapshot after each build.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotTarget {
    pub path: PathBuf,
    #[serde(default)]
    pub format: SnapshotFormat,
}

impl SnapshotTarget {
    pub fn json(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            format: SnapshotFormat::Json,
        }
    }
}

pub fn write_snapshot(
    snapshot: &IndexSnapshot,
    path: &Path,
    format: SnapshotFormat,
) -> Result<(), SnapshotError> {
    let io_err = |source: std::io::Error| SnapshotError::Io {
        path: path.to_path_buf(),
        source,
    };

    let file = File::create(path).map_err(io_err)?;
    let mut writer = BufWriter::new(file);
    match format {
        SnapshotFormat::Json => serde_json::to_writer_pretty(&mut writer, snapshot)?,
        SnapshotFormat::Bincode => bincode::serialize_into(&mut writer, snapshot)?,
    }
    writer.flush().map_err(io_err)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> IndexSnapshot {
        let mut snapshot = IndexSnapshot::default();
        snapshot.insert(
            "doc1.json",
            "thủ_tướng",
            TermWeight {
                tf: 1.0,
                idf: 1.5,
                tf_idf: 1.5,
            },
        );
        snapshot
    }

    #[test]
    fn test_json_layout() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("index.json");
        write_snapshot(&sample(), &path, SnapshotFormat::Json)?;

        let text = std::fs::read_to_string(&path)?;
        assert!(text.contains("thủ_tướng"));
        let value: serde_json::Value = serde_json::from_str(&text)?;
        assert_eq!(value["doc1.json"]["thủ_tướng"]["tf_idf"], 1.5);
        Ok(())
    }

    #[test]
    fn test_bincode_written() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("index.bin");
        write_snapshot(&sample(), &path, SnapshotFormat::Bincode)?;
        assert!(std::fs::metadata(&path)?.len() > 0);
        Ok(())
    }

    #[test]
    fn test_unwritable_path_is_error() {
        let result = write_snapshot(
            &sample(),
            Path::new("/nonexistent/dir/index.json"),
            SnapshotFormat::Json,
        );
        assert!(matches!(result, Err(SnapshotError::Io { .. })));
    }
}
