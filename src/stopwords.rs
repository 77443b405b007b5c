use std::collections::HashSet;
use std::fs;
use std::path::Path;

lazy_static::lazy_static! {
    static ref ENGLISH: HashSet<&'static str> = {
        [
            "a", "about", "above", "after", "again", "against", "all", "am", "an", "and",
            "any", "are", "as", "at", "be", "because", "been", "before", "being", "below",
            "between", "both", "but", "by", "cannot", "could", "did", "do", "does", "doing",
            "down", "during", "each", "few", "for", "from", "further", "had", "has", "have",
            "having", "he", "her", "here", "hers", "herself", "him", "himself", "his", "how",
            "i", "if", "in", "into", "is", "it", "its", "itself", "me", "more", "most", "my",
            "myself", "no", "nor", "not", "of", "off", "on", "once", "only", "or", "other",
            "ought", "our", "ours", "ourselves", "out", "over", "own", "same", "she", "should",
            "so", "some", "such", "than", "that", "the", "their", "theirs", "them",
            "themselves", "then", "there", "these", "they", "this", "those", "through", "to",
            "too", "under", "until", "up", "very", "was", "we", "were", "what", "when",
            "where", "which", "while", "who", "whom", "why", "with", "would", "you", "your",
            "yours", "yourself", "yourselves",
        ]
        .iter()
        .copied()
        .collect()
    };
}

/// Terms dropped by the preprocessor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StopwordSet {
    words: HashSet<String>,
}

impl StopwordSet {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Built-in English list, for corpora without a stopword file.
    pub fn english() -> Self {
        Self {
            words: ENGLISH.iter().map(|w| w.to_string()).collect(),
        }
    }

    /// Parse newline-delimited terms. Blank lines are skipped, duplicates collapse.
    pub fn parse(text: &str) -> Self {
        let words = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_lowercase)
            .collect();
        Self { words }
    }

    /// Load from a file, degrading to an empty set if it cannot be read.
    pub fn load<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        match fs::read_to_string(path) {
            Ok(text) => {
                let set = Self::parse(&text);
                tracing::debug!(path = %path.display(), count = set.len(), "loaded stopwords");
                set
            }
            Err(err) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %err,
                    "stopwords source missing, continuing without stopwords"
                );
                Self::empty()
            }
        }
    }

    pub fn contains(&self, term: &str) -> bool {
        self.words.contains(term)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_trims_and_dedups() {
        let set = StopwordSet::parse("và\n  của  \n\nvà\nthủ_tướng\n");
        assert_eq!(set.len(), 3);
        assert!(set.contains("của"));
        assert!(set.contains("thủ_tướng"));
        assert!(!set.contains(""));
    }

    #[test]
    fn test_missing_file_is_empty() {
        let set = StopwordSet::load("/nonexistent/stopwords.txt");
        assert!(set.is_empty());
    }

    #[test]
    fn test_english_builtin() {
        let set = StopwordSet::english();
        assert!(set.contains("the"));
        assert!(!set.contains("rust"));
    }
}
