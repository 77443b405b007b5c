use crate::config::EngineConfig;
use crate::corpus::{load_corpus, Corpus};
use crate::document::Document;
use crate::error::EngineError;
use crate::index::{DocumentVector, InvertedIndex};
use crate::query::vectorize;
use crate::ranking::{date_scores, rank, DateParser, RankOptions};
use crate::snapshot::{write_snapshot, IndexSnapshot};
use crate::tokenizer::Preprocessor;
use parking_lot::{Mutex, RwLock};
use serde::{Serialize, Serializer};

/// Search options
#[derive(Debug, Clone, PartialEq)]
pub struct SearchOptions {
    /// Values below 1 return one result
    pub top_k: i64,
    /// 0 ranks on content only, 1 on recency only
    pub date_weight: f64,
    /// Truncate returned content to this many characters
    pub preview_chars: Option<usize>,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            top_k: 5,
            date_weight: 0.0,
            preview_chars: None,
        }
    }
}

impl SearchOptions {
    fn rank_options(&self) -> RankOptions {
        RankOptions {
            top_k: self.top_k,
            date_weight: self.date_weight,
        }
    }
}

/// One ranked document as returned to front ends.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchHit {
    pub doc_id: String,
    pub title: String,
    pub content: String,
    pub date: Option<String>,
    pub category: Option<String>,
    #[serde(serialize_with = "four_decimals")]
    pub final_score: f64,
    pub content_score: f64,
    pub date_score: f64,
}

impl SearchHit {
    /// Final score with four decimals, the display form used by every front end.
    pub fn formatted_score(&self) -> String {
        format_score(self.final_score)
    }
}

pub fn format_score(score: f64) -> String {
    format!("{:.4}", score)
}

fn four_decimals<S: Serializer>(score: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&format_score(*score))
}

fn preview(content: &str, max_chars: Option<usize>) -> String {
    match max_chars {
        Some(max) if content.chars().count() > max => {
            let mut cut: String = content.chars().take(max).collect();
            cut.push('…');
            cut
        }
        _ => content.to_string(),
    }
}

/// Summary of one build.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BuildReport {
    pub documents: usize,
    pub terms: usize,
    pub dated_documents: usize,
    pub snapshot_written: bool,
}

/// Engine statistics
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EngineStats {
    pub total_documents: usize,
    pub total_terms: usize,
    pub avg_docs_per_term: f64,
    pub dated_documents: usize,
}

/// Everything a search reads. Replaced wholesale on rebuild.
#[derive(Default)]
struct IndexState {
    corpus: Corpus,
    index: InvertedIndex,
    vectors: Vec<DocumentVector>,
    date_scores: Vec<f64>,
    dated_documents: usize,
    /// Incremented on every build
    generation: u64,
}

/// Main search engine
///
/// Searches share a read lock; a rebuild holds the write lock for the whole
/// build, so no search ever sees a partially built index.
pub struct SearchEngine {
    config: EngineConfig,
    preprocessor: Preprocessor,
    date_parser: DateParser,
    state: RwLock<IndexState>,
    /// Generation of the last snapshot written; serializes snapshot writes.
    snapshot_generation: Mutex<u64>,
}

impl SearchEngine {
    /// Create an engine with an empty index. Call [`SearchEngine::rebuild`]
    /// to load the configured corpus.
    pub fn new(config: EngineConfig) -> Self {
        let preprocessor = config.preprocessor();
        let date_parser = config.date_parser();
        Self {
            config,
            preprocessor,
            date_parser,
            state: RwLock::new(IndexState::default()),
            snapshot_generation: Mutex::new(0),
        }
    }

    /// Create an engine and build it from the configured corpus directory.
    pub fn open(config: EngineConfig) -> Result<Self, EngineError> {
        let engine = Self::new(config);
        engine.rebuild()?;
        Ok(engine)
    }

    /// Build an engine over documents already in memory (for testing)
    pub fn from_documents(documents: Vec<Document>, config: EngineConfig) -> Self {
        let engine = Self::new(config);
        engine.index_documents(documents);
        engine
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Reload the corpus directory and rebuild the index from scratch.
    ///
    /// On a missing corpus directory the previous index stays in place.
    pub fn rebuild(&self) -> Result<BuildReport, EngineError> {
        let (report, snapshot, generation) = {
            let mut state = self.state.write();
            let corpus = load_corpus(&self.config.data_dir)?;
            self.build_into(&mut state, corpus)
        };
        Ok(self.finish(report, &snapshot, generation))
    }

    /// Replace the index with one built from `documents`.
    pub fn index_documents(&self, documents: Vec<Document>) -> BuildReport {
        let (report, snapshot, generation) = {
            let mut state = self.state.write();
            self.build_into(&mut state, Corpus::new(documents))
        };
        self.finish(report, &snapshot, generation)
    }

    fn build_into(
        &self,
        state: &mut IndexState,
        corpus: Corpus,
    ) -> (BuildReport, IndexSnapshot, u64) {
        let output = InvertedIndex::build(&corpus, &self.preprocessor);
        let scores = date_scores(corpus.documents(), &self.date_parser);
        let dated_documents = corpus
            .documents()
            .iter()
            .filter(|doc| {
                doc.date
                    .as_deref()
                    .and_then(|d| self.date_parser.parse(d))
                    .is_some()
            })
            .count();

        let report = BuildReport {
            documents: corpus.len(),
            terms: output.index.total_terms(),
            dated_documents,
            snapshot_written: false,
        };

        let generation = state.generation + 1;
        *state = IndexState {
            corpus,
            index: output.index,
            vectors: output.vectors,
            date_scores: scores,
            dated_documents,
            generation,
        };
        (report, output.snapshot, generation)
    }

    /// Runs after the write lock is released so snapshot I/O never blocks searches.
    ///
    /// A snapshot from a build older than the last one written is dropped, so
    /// overlapping rebuilds cannot leave a stale snapshot on disk.
    fn finish(
        &self,
        mut report: BuildReport,
        snapshot: &IndexSnapshot,
        generation: u64,
    ) -> BuildReport {
        if let Some(target) = &self.config.snapshot {
            let mut written = self.snapshot_generation.lock();
            if generation < *written {
                tracing::debug!(generation, latest = *written, "skipping stale index snapshot");
            } else {
                match write_snapshot(snapshot, &target.path, target.format) {
                    Ok(()) => {
                        *written = generation;
                        report.snapshot_written = true;
                        tracing::debug!(path = %target.path.display(), "wrote index snapshot");
                    }
                    Err(err) => {
                        tracing::warn!(
                            path = %target.path.display(),
                            error = %err,
                            "failed to write index snapshot, index remains usable"
                        );
                    }
                }
            }
        }

        tracing::info!(
            documents = report.documents,
            terms = report.terms,
            dated = report.dated_documents,
            "index built"
        );
        report
    }

    /// Search for documents
    ///
    /// Never fails: unknown terms are ignored and an empty corpus yields no hits.
    pub fn search(&self, query: &str, options: &SearchOptions) -> Vec<SearchHit> {
        let state = self.state.read();
        if state.corpus.is_empty() {
            return Vec::new();
        }

        let query_vector = vectorize(query, &self.preprocessor, &state.index);
        tracing::debug!(query, terms = query_vector.len(), "vectorized query");

        rank(
            &query_vector,
            &state.vectors,
            &state.date_scores,
            &options.rank_options(),
        )
        .into_iter()
        .filter_map(|ranked| {
            let doc = state.corpus.get(ranked.position)?;
            Some(SearchHit {
                doc_id: doc.id.clone(),
                title: doc.title.clone(),
                content: preview(&doc.content, options.preview_chars),
                date: doc.date.clone(),
                category: doc.category.clone(),
                final_score: ranked.final_score,
                content_score: ranked.content_score,
                date_score: ranked.date_score,
            })
        })
        .collect()
    }

    /// Get a document by ID
    pub fn get_document(&self, doc_id: &str) -> Option<Document> {
        let state = self.state.read();
        state
            .corpus
            .documents()
            .iter()
            .find(|doc| doc.id == doc_id)
            .cloned()
    }

    /// Get total document count
    pub fn document_count(&self) -> usize {
        self.state.read().corpus.len()
    }

    /// Get index statistics
    pub fn stats(&self) -> EngineStats {
        let state = self.state.read();
        let stats = state.index.stats();
        EngineStats {
            total_documents: stats.total_documents,
            total_terms: stats.total_terms,
            avg_docs_per_term: stats.avg_docs_per_term,
            dated_documents: state.dated_documents,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::SnapshotTarget;

    fn engine(docs: Vec<Document>) -> SearchEngine {
        SearchEngine::from_documents(docs, EngineConfig::bare("unused"))
    }

    #[test]
    fn test_engine_worked_example() {
        let engine = engine(vec![
            Document::new("doc1", "", "a a b"),
            Document::new("doc2", "", "b b c"),
            Document::new("doc3", "", "a c c c"),
        ]);

        let hits = engine.search("a", &SearchOptions::default());
        assert_eq!(hits.len(), 3);
        assert_eq!(hits[2].doc_id, "doc2");
        assert_eq!(hits[2].final_score, 0.0);
        assert!(hits[0].final_score > 0.0 && hits[1].final_score > 0.0);

        // cosine: doc1 ~0.793, doc3 ~0.561
        assert_eq!(hits[0].doc_id, "doc1");
        assert_eq!(hits[1].doc_id, "doc3");
    }

    #[test]
    fn test_empty_corpus_returns_nothing() {
        let engine = engine(Vec::new());
        assert!(engine.search("anything", &SearchOptions::default()).is_empty());
        assert_eq!(engine.stats().total_documents, 0);
    }

    #[test]
    fn test_preview_truncates_on_chars() {
        assert_eq!(preview("chạy đua marathon", Some(4)), "chạy…");
        assert_eq!(preview("ngắn", Some(10)), "ngắn");
        assert_eq!(preview("full", None), "full");
    }

    #[test]
    fn test_hit_serializes_four_decimal_score() {
        let hit = SearchHit {
            doc_id: "d".into(),
            title: "t".into(),
            content: "c".into(),
            date: None,
            category: None,
            final_score: 0.123456,
            content_score: 0.123456,
            date_score: 0.0,
        };
        assert_eq!(hit.formatted_score(), "0.1235");
        let json = serde_json::to_value(&hit).unwrap();
        assert_eq!(json["final_score"], "0.1235");
    }

    #[test]
    fn test_get_document() {
        let engine = engine(vec![Document::new("x", "Title", "body")
            .with_category("Thời sự")
            .with_url("https://example.com/x")]);
        let doc = engine.get_document("x").expect("indexed document");
        assert_eq!(doc.title, "Title");
        assert_eq!(doc.category.as_deref(), Some("Thời sự"));
        assert_eq!(doc.url.as_deref(), Some("https://example.com/x"));
        assert!(engine.get_document("y").is_none());
        assert_eq!(engine.document_count(), 1);

        let hits = engine.search("body", &SearchOptions::default());
        assert_eq!(hits[0].category.as_deref(), Some("Thời sự"));
    }

    #[test]
    fn test_stale_snapshot_is_not_written() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("index.json");
        let engine = SearchEngine::new(EngineConfig {
            snapshot: Some(SnapshotTarget::json(&path)),
            ..EngineConfig::bare("unused")
        });

        let first = {
            let mut state = engine.state.write();
            engine.build_into(&mut state, Corpus::new(vec![Document::new("old", "", "alpha")]))
        };
        let second = {
            let mut state = engine.state.write();
            engine.build_into(&mut state, Corpus::new(vec![Document::new("new", "", "beta")]))
        };
        assert_eq!((first.2, second.2), (1, 2));

        // The newer build finishes first; the older one must not overwrite it.
        assert!(engine.finish(second.0, &second.1, second.2).snapshot_written);
        assert!(!engine.finish(first.0, &first.1, first.2).snapshot_written);

        let written: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&path)?)?;
        assert!(written.get("new").is_some());
        assert!(written.get("old").is_none());
        Ok(())
    }
}
