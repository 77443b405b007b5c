use crate::corpus::Corpus;
use crate::snapshot::{IndexSnapshot, TermWeight};
use crate::tokenizer::Preprocessor;
use crate::vector::TermVector;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Per-document projection of the index.
pub type DocumentVector = TermVector;

/// `1 + log10(raw)` for `raw > 0`, else 0.
pub fn log_tf(raw: usize) -> f64 {
    if raw == 0 {
        0.0
    } else {
        1.0 + (raw as f64).log10()
    }
}

/// `1 + log10(n / df)`. Callers guarantee `df > 0`.
pub fn idf(n: usize, df: usize) -> f64 {
    1.0 + (n as f64 / df as f64).log10()
}

/// Inverted index: term -> document id -> TF-IDF weight
#[derive(Debug, Clone, Default)]
pub struct InvertedIndex {
    postings: HashMap<String, HashMap<String, f64>>,
    doc_frequencies: HashMap<String, usize>,
    doc_count: usize,
}

/// Everything one build produces.
#[derive(Debug, Clone, Default)]
pub struct BuildOutput {
    pub index: InvertedIndex,
    /// Aligned with the corpus enumeration order.
    pub vectors: Vec<DocumentVector>,
    pub snapshot: IndexSnapshot,
}

impl InvertedIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Two-pass build over the whole corpus.
    ///
    /// Pass 1 counts raw term frequencies per document and document
    /// frequencies per term. Pass 2 replaces every raw count with its TF-IDF
    /// weight, then projects the index onto each document.
    pub fn build(corpus: &Corpus, preprocessor: &Preprocessor) -> BuildOutput {
        let mut postings: HashMap<String, HashMap<String, f64>> = HashMap::new();
        let mut raw_counts: HashMap<String, HashMap<String, usize>> = HashMap::new();
        let mut doc_frequencies: HashMap<String, usize> = HashMap::new();

        // Pass 1: frequency collection
        for doc in corpus.documents() {
            let tokens = preprocessor.process(&doc.searchable_text());

            let mut term_freq: HashMap<String, usize> = HashMap::new();
            for token in tokens {
                *term_freq.entry(token).or_insert(0) += 1;
            }

            for (term, freq) in term_freq {
                *doc_frequencies.entry(term.clone()).or_insert(0) += 1;
                raw_counts
                    .entry(term)
                    .or_default()
                    .insert(doc.id.clone(), freq);
            }
        }

        // Pass 2: weighting
        let n = corpus.len();
        let mut snapshot = IndexSnapshot::default();
        for (term, docs) in raw_counts {
            let df = doc_frequencies.get(&term).copied().unwrap_or(docs.len());
            let term_idf = idf(n, df);

            let mut weighted = HashMap::with_capacity(docs.len());
            for (doc_id, raw_tf) in docs {
                let tf = log_tf(raw_tf);
                let tf_idf = tf * term_idf;
                snapshot.insert(
                    &doc_id,
                    &term,
                    TermWeight {
                        tf,
                        idf: term_idf,
                        tf_idf,
                    },
                );
                weighted.insert(doc_id, tf_idf);
            }
            postings.insert(term, weighted);
        }

        let index = InvertedIndex {
            postings,
            doc_frequencies,
            doc_count: n,
        };
        let vectors = index.project(corpus);

        tracing::debug!(
            documents = n,
            terms = index.total_terms(),
            "built inverted index"
        );

        BuildOutput {
            index,
            vectors,
            snapshot,
        }
    }

    /// One vector per document, in corpus order, holding only the terms that
    /// occur in that document.
    fn project(&self, corpus: &Corpus) -> Vec<DocumentVector> {
        let positions: HashMap<&str, usize> = corpus
            .documents()
            .iter()
            .enumerate()
            .map(|(pos, doc)| (doc.id.as_str(), pos))
            .collect();

        let mut weights: Vec<BTreeMap<String, f64>> = vec![BTreeMap::new(); corpus.len()];
        for (term, docs) in &self.postings {
            for (doc_id, weight) in docs {
                if let Some(&pos) = positions.get(doc_id.as_str()) {
                    weights[pos].insert(term.clone(), *weight);
                }
            }
        }

        weights.into_iter().map(TermVector::from_weights).collect()
    }

    /// Weight of `term` in `doc_id`, 0 when either is unknown.
    pub fn weight(&self, term: &str, doc_id: &str) -> f64 {
        self.postings
            .get(term)
            .and_then(|docs| docs.get(doc_id))
            .copied()
            .unwrap_or(0.0)
    }

    /// Get document weights for a term
    pub fn postings(&self, term: &str) -> Option<&HashMap<String, f64>> {
        self.postings.get(term)
    }

    /// Number of documents containing a term, 0 for unknown terms.
    pub fn doc_frequency(&self, term: &str) -> usize {
        self.doc_frequencies.get(term).copied().unwrap_or(0)
    }

    /// IDF of an indexed term; `None` when the term is not in the vocabulary.
    pub fn idf(&self, term: &str) -> Option<f64> {
        match self.doc_frequency(term) {
            0 => None,
            df => Some(idf(self.doc_count, df)),
        }
    }

    pub fn contains_term(&self, term: &str) -> bool {
        self.postings.contains_key(term)
    }

    /// Get total number of indexed documents
    pub fn total_documents(&self) -> usize {
        self.doc_count
    }

    pub fn total_terms(&self) -> usize {
        self.postings.len()
    }

    pub fn terms(&self) -> impl Iterator<Item = &str> {
        self.postings.keys().map(String::as_str)
    }

    /// Get index statistics
    pub fn stats(&self) -> IndexStats {
        IndexStats {
            total_documents: self.doc_count,
            total_terms: self.postings.len(),
            avg_docs_per_term: if self.postings.is_empty() {
                0.0
            } else {
                self.postings.values().map(|v| v.len()).sum::<usize>() as f64
                    / self.postings.len() as f64
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexStats {
    pub total_documents: usize,
    pub total_terms: usize,
    pub avg_docs_per_term: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Document;

    fn corpus(texts: &[(&str, &str)]) -> Corpus {
        Corpus::new(
            texts
                .iter()
                .map(|(id, content)| Document::new(*id, "", *content))
                .collect(),
        )
    }

    fn worked_example() -> Corpus {
        corpus(&[("doc1", "a a b"), ("doc2", "b b c"), ("doc3", "a c c c")])
    }

    #[test]
    fn test_worked_example_weights() {
        let out = InvertedIndex::build(&worked_example(), &Preprocessor::default());
        let index = &out.index;

        assert_eq!(index.doc_frequency("a"), 2);
        assert_eq!(index.doc_frequency("b"), 2);
        assert_eq!(index.doc_frequency("c"), 2);

        let expected_idf = 1.0 + (3.0f64 / 2.0).log10();
        assert!((index.idf("a").unwrap() - expected_idf).abs() < 1e-12);
        assert!((expected_idf - 1.17609).abs() < 1e-5);

        let w = index.weight("a", "doc1");
        assert!((w - (1.0 + 2f64.log10()) * expected_idf).abs() < 1e-12);
        assert!((w - 1.5301).abs() < 1e-4);
        assert!((index.weight("b", "doc1") - expected_idf).abs() < 1e-12);
        assert_eq!(index.weight("c", "doc1"), 0.0);
    }

    #[test]
    fn test_postings_and_snapshot_agree() {
        let out = InvertedIndex::build(&worked_example(), &Preprocessor::default());
        let index = &out.index;

        assert!(index.contains_term("c"));
        assert!(!index.contains_term("d"));
        assert!(index.postings("d").is_none());

        let postings = index.postings("c").expect("c is indexed");
        let mut docs: Vec<&str> = postings.keys().map(String::as_str).collect();
        docs.sort_unstable();
        assert_eq!(docs, vec!["doc2", "doc3"]);

        let entry = out.snapshot.get("doc3", "c").expect("snapshot entry");
        assert!((entry.tf - (1.0 + 3f64.log10())).abs() < 1e-12);
        assert!((entry.idf - index.idf("c").unwrap()).abs() < 1e-12);
        assert!((entry.tf_idf - postings["doc3"]).abs() < 1e-12);
        assert!(out.snapshot.get("doc1", "c").is_none());
    }

    #[test]
    fn test_document_frequency_consistency() {
        let c = corpus(&[
            ("d1", "apple apple apple apple apple"),
            ("d2", "apple pear"),
            ("d3", "pear plum"),
        ]);
        let out = InvertedIndex::build(&c, &Preprocessor::default());
        for term in out.index.terms() {
            let containing = out.vectors.iter().filter(|v| v.weight(term) > 0.0).count();
            assert_eq!(out.index.doc_frequency(term), containing, "term {term}");
        }
        assert_eq!(out.index.doc_frequency("apple"), 2);
    }

    #[test]
    fn test_vectors_hold_exactly_occurring_terms() {
        let c = worked_example();
        let out = InvertedIndex::build(&c, &Preprocessor::default());
        assert_eq!(out.vectors.len(), 3);

        let doc1 = &out.vectors[0];
        assert!(doc1.weight("a") > 0.0);
        assert!(doc1.weight("b") > 0.0);
        assert!(!doc1.contains("c"));
        assert_eq!(doc1.len(), 2);
    }

    #[test]
    fn test_rebuild_is_idempotent() {
        let c = worked_example();
        let pre = Preprocessor::default();
        let first = InvertedIndex::build(&c, &pre);
        let second = InvertedIndex::build(&c, &pre);
        for term in first.index.terms() {
            for doc in c.documents() {
                let a = first.index.weight(term, &doc.id);
                let b = second.index.weight(term, &doc.id);
                assert!((a - b).abs() < 1e-9);
            }
        }
        assert_eq!(first.vectors, second.vectors);
    }

    #[test]
    fn test_empty_corpus() {
        let out = InvertedIndex::build(&Corpus::default(), &Preprocessor::default());
        assert_eq!(out.index.total_documents(), 0);
        assert_eq!(out.index.total_terms(), 0);
        assert!(out.vectors.is_empty());
        assert!(out.snapshot.is_empty());
    }

    #[test]
    fn test_document_without_terms_gets_empty_vector() {
        let c = corpus(&[("d1", "word"), ("d2", "  ... ")]);
        let out = InvertedIndex::build(&c, &Preprocessor::default());
        assert_eq!(out.vectors.len(), 2);
        assert!(out.vectors[1].is_empty());
        assert_eq!(out.vectors[1].norm(), 0.0);
    }

    #[test]
    fn test_log_tf() {
        assert_eq!(log_tf(0), 0.0);
        assert_eq!(log_tf(1), 1.0);
        assert!((log_tf(10) - 2.0).abs() < 1e-12);
    }
}
