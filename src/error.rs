use std::path::PathBuf;
use thiserror::Error;

/// Failures surfaced to callers of the engine.
///
/// Per-record and per-write problems (a malformed record, an unreadable
/// stopword file, a failed snapshot) are logged where they happen and never
/// show up here.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("corpus directory {} is unavailable", path.display())]
    CorpusUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Failures while writing the index snapshot.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("failed to write snapshot to {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode snapshot as JSON")]
    Json(#[from] serde_json::Error),

    #[error("failed to encode snapshot as bincode")]
    Bincode(#[from] bincode::Error),
}
