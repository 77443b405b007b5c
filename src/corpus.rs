use crate::document::Document;
use crate::error::EngineError;
use flate2::read::GzDecoder;
use std::collections::HashSet;
use std::fs::{self, File};
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

/// Documents in enumeration order. The position of a document in `documents`
/// is its tie-break rank.
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    documents: Vec<Document>,
}

impl Corpus {
    /// Later documents reusing an earlier id are dropped.
    pub fn new(documents: Vec<Document>) -> Self {
        let mut seen = HashSet::with_capacity(documents.len());
        let documents = documents
            .into_iter()
            .filter(|doc| {
                let fresh = seen.insert(doc.id.clone());
                if !fresh {
                    tracing::warn!(id = %doc.id, "dropping document with duplicate id");
                }
                fresh
            })
            .collect();
        Self { documents }
    }

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    pub fn get(&self, position: usize) -> Option<&Document> {
        self.documents.get(position)
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

fn record_kind(path: &Path) -> Option<RecordKind> {
    let name = path.file_name()?.to_str()?;
    if name.ends_with(".json.gz") {
        Some(RecordKind::Gzip)
    } else if name.ends_with(".json") {
        Some(RecordKind::Plain)
    } else {
        None
    }
}

#[derive(Debug, Clone, Copy)]
enum RecordKind {
    Plain,
    Gzip,
}

fn read_record(path: &Path, kind: RecordKind) -> anyhow::Result<Document> {
    let file = File::open(path)?;
    let doc = match kind {
        RecordKind::Plain => serde_json::from_reader(BufReader::new(file))?,
        RecordKind::Gzip => {
            let mut json = String::new();
            GzDecoder::new(file).read_to_string(&mut json)?;
            serde_json::from_str(&json)?
        }
    };
    Ok(doc)
}

/// Load every record in `dir`, sorted by file name.
///
/// Records that fail to parse are logged and skipped. Only an unreadable
/// directory is an error.
pub fn load_corpus<P: AsRef<Path>>(dir: P) -> Result<Corpus, EngineError> {
    let dir = dir.as_ref();
    let unavailable = |source: std::io::Error| EngineError::CorpusUnavailable {
        path: dir.to_path_buf(),
        source,
    };

    let mut paths: Vec<(PathBuf, RecordKind)> = fs::read_dir(dir)
        .map_err(unavailable)?
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry.path()),
            Err(err) => {
                tracing::warn!(error = %err, "skipping unreadable directory entry");
                None
            }
        })
        .filter(|path| path.is_file())
        .filter_map(|path| record_kind(&path).map(|kind| (path, kind)))
        .collect();
    paths.sort_by(|a, b| a.0.file_name().cmp(&b.0.file_name()));

    let mut documents = Vec::with_capacity(paths.len());
    let mut skipped = 0usize;
    for (path, kind) in paths {
        let id = match path.file_name().and_then(|n| n.to_str()) {
            Some(name) => name.to_string(),
            None => continue,
        };
        match read_record(&path, kind) {
            Ok(mut doc) => {
                doc.id = id;
                documents.push(doc);
            }
            Err(err) => {
                skipped += 1;
                tracing::warn!(record = %id, error = %err, "skipping malformed document record");
            }
        }
    }

    tracing::info!(
        dir = %dir.display(),
        loaded = documents.len(),
        skipped,
        "loaded corpus"
    );
    Ok(Corpus::new(documents))
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;

    #[test]
    fn test_load_sorted_and_skips_malformed() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        fs::write(dir.path().join("b.json"), r#"{"title": "B", "content": "second"}"#)?;
        fs::write(dir.path().join("a.json"), r#"{"content": "first"}"#)?;
        fs::write(dir.path().join("broken.json"), "{ not json")?;
        fs::write(dir.path().join("notes.txt"), "ignored")?;

        let corpus = load_corpus(dir.path())?;
        let ids: Vec<&str> = corpus.documents().iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["a.json", "b.json"]);
        assert_eq!(corpus.documents()[0].title, "");
        Ok(())
    }

    #[test]
    fn test_load_gzip_record() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(br#"{"title": "Packed", "content": "gzip body"}"#)?;
        fs::write(dir.path().join("packed.json.gz"), encoder.finish()?)?;

        let corpus = load_corpus(dir.path())?;
        assert_eq!(corpus.len(), 1);
        assert_eq!(corpus.documents()[0].id, "packed.json.gz");
        assert_eq!(corpus.documents()[0].content, "gzip body");
        Ok(())
    }

    #[test]
    fn test_missing_directory_is_error() {
        let result = load_corpus("/nonexistent/corpus");
        assert!(matches!(result, Err(EngineError::CorpusUnavailable { .. })));
    }

    #[test]
    fn test_duplicate_ids_keep_first() {
        let corpus = Corpus::new(vec![
            Document::new("x", "first", ""),
            Document::new("x", "second", ""),
        ]);
        assert_eq!(corpus.len(), 1);
        assert_eq!(corpus.documents()[0].title, "first");
    }
}
