use std::collections::BTreeMap;

/// Sparse term → weight vector.
///
/// Keys are ordered so that norms and dot products are summed in the same
/// order on every build. Missing terms read as `0.0`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TermVector {
    weights: BTreeMap<String, f64>,
    norm: f64,
}

impl TermVector {
    pub fn from_weights(weights: BTreeMap<String, f64>) -> Self {
        let norm = weights.values().map(|w| w * w).sum::<f64>().sqrt();
        Self { weights, norm }
    }

    pub fn weight(&self, term: &str) -> f64 {
        self.weights.get(term).copied().unwrap_or(0.0)
    }

    pub fn contains(&self, term: &str) -> bool {
        self.weights.contains_key(term)
    }

    /// Euclidean norm
    pub fn norm(&self) -> f64 {
        self.norm
    }

    /// Dot product over shared terms.
    pub fn dot(&self, other: &TermVector) -> f64 {
        let (small, large) = if self.len() <= other.len() {
            (self, other)
        } else {
            (other, self)
        };
        small
            .weights
            .iter()
            .map(|(term, w)| w * large.weight(term))
            .sum()
    }

    /// Cosine similarity, defined as 0 when either vector has zero norm.
    pub fn cosine(&self, other: &TermVector) -> f64 {
        let denom = self.norm * other.norm;
        if denom == 0.0 {
            return 0.0;
        }
        self.dot(other) / denom
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.weights.iter().map(|(t, w)| (t.as_str(), *w))
    }

    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }
}
