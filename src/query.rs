use crate::index::{log_tf, InvertedIndex};
use crate::tokenizer::Preprocessor;
use crate::vector::TermVector;
use std::collections::{BTreeMap, HashMap};

/// Weighted query terms; lives for one search call.
pub type QueryVector = TermVector;

/// Vectorize a query against an already built index.
///
/// Terms missing from the vocabulary are dropped: they cannot match any
/// document and contribute nothing to similarity.
pub fn vectorize(query: &str, preprocessor: &Preprocessor, index: &InvertedIndex) -> QueryVector {
    let mut query_tf: HashMap<String, usize> = HashMap::new();
    for token in preprocessor.process(query) {
        *query_tf.entry(token).or_insert(0) += 1;
    }

    let weights: BTreeMap<String, f64> = query_tf
        .into_iter()
        .filter_map(|(term, freq)| {
            let idf = index.idf(&term)?;
            Some((term, log_tf(freq) * idf))
        })
        .collect();

    TermVector::from_weights(weights)
}
