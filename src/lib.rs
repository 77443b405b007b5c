// Re-export main components
pub mod api;
pub mod config;
pub mod corpus;
pub mod document;
pub mod engine;
pub mod error;
pub mod index;
pub mod query;
pub mod ranking;
pub mod snapshot;
pub mod stopwords;
pub mod tokenizer;
pub mod vector;

// Re-export commonly used types
pub use config::{EngineConfig, StopwordSource};
pub use corpus::{load_corpus, Corpus};
pub use document::Document;
pub use engine::{BuildReport, EngineStats, SearchEngine, SearchHit, SearchOptions};
pub use error::{EngineError, SnapshotError};
pub use index::{DocumentVector, InvertedIndex};
pub use query::QueryVector;
pub use snapshot::{IndexSnapshot, SnapshotFormat, SnapshotTarget};
pub use stopwords::StopwordSet;
pub use tokenizer::{Preprocessor, Tokenizer, TokenizerKind};

// Re-export error types
pub use anyhow::{Error, Result};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
