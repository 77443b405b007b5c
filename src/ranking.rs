use crate::document::Document;
use crate::index::DocumentVector;
use crate::query::QueryVector;
use chrono::{NaiveDate, NaiveDateTime};
use std::cmp::Ordering;

/// Per-day decay applied to a document's age.
pub const DATE_DECAY_RATE: f64 = 0.01;

/// Date layout used by the crawler, e.g. `02/12/2024 10:30 GMT+7`.
pub const DEFAULT_DATE_FORMAT: &str = "%d/%m/%Y %H:%M";

/// Parses document dates with one fixed pattern.
///
/// A trailing timezone marker (`GMT+7`, `(GMT+7)`, `UTC`) is stripped first.
/// The pattern may omit the time of day, in which case midnight is assumed.
#[derive(Debug, Clone)]
pub struct DateParser {
    format: String,
}

impl DateParser {
    pub fn new(format: impl Into<String>) -> Self {
        Self {
            format: format.into(),
        }
    }

    pub fn parse(&self, raw: &str) -> Option<NaiveDateTime> {
        let text = strip_marker(raw.trim());
        if text.is_empty() {
            return None;
        }
        NaiveDateTime::parse_from_str(text, &self.format)
            .ok()
            .or_else(|| {
                NaiveDate::parse_from_str(text, &self.format)
                    .ok()
                    .and_then(|d| d.and_hms_opt(0, 0, 0))
            })
    }
}

impl Default for DateParser {
    fn default() -> Self {
        Self::new(DEFAULT_DATE_FORMAT)
    }
}

fn strip_marker(text: &str) -> &str {
    match text.rsplit_once(char::is_whitespace) {
        Some((head, last)) => {
            let marker = last.trim_start_matches('(').to_ascii_uppercase();
            if marker.starts_with("GMT") || marker.starts_with("UTC") {
                head.trim_end()
            } else {
                text
            }
        }
        None => text,
    }
}

/// Recency score for every document, in corpus order.
///
/// Undated documents score 0, except when nothing in the corpus has a usable
/// date: then every document scores a neutral 1.
pub fn date_scores(documents: &[Document], parser: &DateParser) -> Vec<f64> {
    let parsed: Vec<Option<NaiveDateTime>> = documents
        .iter()
        .map(|doc| {
            let raw = doc.date.as_deref()?;
            let date = parser.parse(raw);
            if date.is_none() {
                tracing::debug!(id = %doc.id, date = raw, "unparseable document date");
            }
            date
        })
        .collect();

    let latest = match parsed.iter().flatten().max() {
        Some(latest) => *latest,
        None => return vec![1.0; documents.len()],
    };

    parsed
        .into_iter()
        .map(|date| match date {
            Some(date) => {
                let days = (latest - date).num_days() as f64;
                (-DATE_DECAY_RATE * days).exp()
            }
            None => 0.0,
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RankOptions {
    /// Values below 1 are treated as 1
    pub top_k: i64,
    /// Share of the final score taken by recency, clamped to [0, 1]
    pub date_weight: f64,
}

impl Default for RankOptions {
    fn default() -> Self {
        Self {
            top_k: 5,
            date_weight: 0.0,
        }
    }
}

impl RankOptions {
    pub fn effective_top_k(&self) -> usize {
        usize::try_from(self.top_k.max(1)).unwrap_or(usize::MAX)
    }

    pub fn effective_date_weight(&self) -> f64 {
        if self.date_weight.is_nan() {
            0.0
        } else {
            self.date_weight.clamp(0.0, 1.0)
        }
    }
}

/// Ranked search result
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RankedDocument {
    /// Index into the corpus
    pub position: usize,
    pub final_score: f64,
    pub content_score: f64,
    pub date_score: f64,
}

/// Higher score first; equal scores keep corpus order.
pub fn compare_ranked(a: &RankedDocument, b: &RankedDocument) -> Ordering {
    b.final_score
        .total_cmp(&a.final_score)
        .then_with(|| a.position.cmp(&b.position))
}

/// Score every document against the query and keep the best `top_k`.
///
/// `vectors` and `date_scores` are both in corpus order.
pub fn rank(
    query: &QueryVector,
    vectors: &[DocumentVector],
    date_scores: &[f64],
    options: &RankOptions,
) -> Vec<RankedDocument> {
    let date_weight = options.effective_date_weight();

    let mut scored: Vec<RankedDocument> = vectors
        .iter()
        .enumerate()
        .map(|(position, vector)| {
            let content_score = query.cosine(vector);
            let date_score = date_scores.get(position).copied().unwrap_or(0.0);
            RankedDocument {
                position,
                final_score: (1.0 - date_weight) * content_score + date_weight * date_score,
                content_score,
                date_score,
            }
        })
        .collect();

    scored.sort_by(compare_ranked);
    scored.truncate(options.effective_top_k());
    scored
}
