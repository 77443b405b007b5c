use crate::stopwords::StopwordSet;
use rust_stemmers::{Algorithm, Stemmer};
use serde::{Deserialize, Serialize};
use unicode_segmentation::UnicodeSegmentation;

/// Splits lower-cased text into raw tokens.
///
/// Implementations must be deterministic: indexing and querying both go
/// through the same tokenizer and rely on identical output for identical input.
pub trait Tokenizer: Send + Sync {
    fn tokenize(&self, text: &str) -> Vec<String>;

    /// Applied to each token after stopword filtering, so stopword lists stay
    /// in surface form.
    fn normalize(&self, token: String) -> String {
        token
    }
}

/// Which tokenizer the preprocessor is built with.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenizerKind {
    /// Whitespace/punctuation splitting, `_` kept inside words
    #[default]
    Simple,
    /// Unicode word boundaries (UAX #29)
    Segmenting,
    /// Simple splitting plus English stemming
    Stemming,
}

impl TokenizerKind {
    pub fn build(self) -> Box<dyn Tokenizer> {
        match self {
            TokenizerKind::Simple => Box::new(SimpleTokenizer),
            TokenizerKind::Segmenting => Box::new(SegmentingTokenizer),
            TokenizerKind::Stemming => Box::new(StemmingTokenizer::new()),
        }
    }
}

/// Treats anything that is not alphanumeric or `_` as a separator.
///
/// Underscores stay so pre-joined compounds (`thủ_tướng`) remain one term.
#[derive(Debug, Default, Clone, Copy)]
pub struct SimpleTokenizer;

impl Tokenizer for SimpleTokenizer {
    fn tokenize(&self, text: &str) -> Vec<String> {
        text.chars()
            .fold(vec![String::new()], |mut tokens, c| {
                if c.is_alphanumeric() || c == '_' {
                    if let Some(last) = tokens.last_mut() {
                        last.push(c);
                    }
                } else if tokens.last().map_or(false, |s| !s.is_empty()) {
                    tokens.push(String::new());
                }
                tokens
            })
            .into_iter()
            .filter(|s| !s.is_empty())
            .collect()
    }
}

/// Unicode word segmentation; splits scripts written without spaces.
#[derive(Debug, Default, Clone, Copy)]
pub struct SegmentingTokenizer;

impl Tokenizer for SegmentingTokenizer {
    fn tokenize(&self, text: &str) -> Vec<String> {
        text.unicode_words().map(str::to_string).collect()
    }
}

pub struct StemmingTokenizer {
    stemmer: Stemmer,
}

impl StemmingTokenizer {
    pub fn new() -> Self {
        Self {
            stemmer: Stemmer::create(Algorithm::English),
        }
    }
}

impl Default for StemmingTokenizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Tokenizer for StemmingTokenizer {
    fn tokenize(&self, text: &str) -> Vec<String> {
        SimpleTokenizer.tokenize(text)
    }

    fn normalize(&self, token: String) -> String {
        self.stemmer.stem(&token).into_owned()
    }
}

/// Normalizes text into the term sequence used by both index and query.
pub struct Preprocessor {
    tokenizer: Box<dyn Tokenizer>,
    stopwords: StopwordSet,
}

impl Preprocessor {
    pub fn new(tokenizer: Box<dyn Tokenizer>, stopwords: StopwordSet) -> Self {
        Self { tokenizer, stopwords }
    }

    pub fn with_kind(kind: TokenizerKind, stopwords: StopwordSet) -> Self {
        Self::new(kind.build(), stopwords)
    }

    /// Full analysis pipeline
    pub fn process(&self, text: &str) -> Vec<String> {
        let lowered = text.to_lowercase();
        self.tokenizer
            .tokenize(&lowered)
            .into_iter()
            .filter_map(|t| {
                let t = t.trim();
                if t.is_empty() || self.stopwords.contains(t) {
                    None
                } else {
                    Some(self.tokenizer.normalize(t.to_string()))
                }
            })
            .collect()
    }
}

impl Default for Preprocessor {
    fn default() -> Self {
        Self::with_kind(TokenizerKind::Simple, StopwordSet::empty())
    }
}
