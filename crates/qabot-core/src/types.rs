//! Domain types shared by the corpus builder, the scorers and the serving glue.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A raw question/answer pair as authored in a knowledge file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QaPair {
    pub question: String,
    pub answer: String,
}

impl QaPair {
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self { question: question.into(), answer: answer.into() }
    }
}

/// An alias expansion: wherever `pattern` (a regular expression) matches a
/// normalized question, each alias phrase yields one extra variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SynonymRule {
    pub pattern: String,
    pub aliases: Vec<String>,
}

impl SynonymRule {
    pub fn new<I, S>(pattern: impl Into<String>, aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self { pattern: pattern.into(), aliases: aliases.into_iter().map(Into::into).collect() }
    }
}

/// One searchable unit of the corpus.
///
/// - `variant_text`: the phrasing that is matched against queries
/// - `canonical_text`: the original, un-augmented phrasing of the group
/// - `answer_text`: verbatim answer returned on a match
/// - `normalized_text`: `variant_text` after normalization, used for fuzzy scoring
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub variant_text: String,
    pub canonical_text: String,
    pub answer_text: String,
    pub normalized_text: String,
}

impl Entry {
    /// True for the original pair of an equivalence group.
    pub fn is_canonical(&self) -> bool {
        self.variant_text == self.canonical_text
    }
}

/// Ordered, immutable sequence of entries. Position is the entry id for the
/// lifetime of the index that owns it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Corpus {
    entries: Vec<Entry>,
}

impl Corpus {
    /// Wrap already-built entries. Used by the builder and by index loading;
    /// callers are responsible for the uniqueness invariant.
    pub fn from_entries(entries: Vec<Entry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn get(&self, index: usize) -> Option<&Entry> {
        self.entries.get(index)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Entry> {
        self.entries.iter()
    }

    /// Variant texts in corpus order, the input of the vector space model.
    pub fn variant_texts(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.variant_text.as_str()).collect()
    }
}

impl<'a> IntoIterator for &'a Corpus {
    type Item = &'a Entry;
    type IntoIter = std::slice::Iter<'a, Entry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

fn default_top_k() -> i64 {
    1
}

fn default_threshold() -> f64 {
    0.15
}

/// A transient retrieval request as it arrives from the serving layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Query {
    pub question: String,
    #[serde(default = "default_top_k")]
    pub top_k: i64,
    #[serde(default = "default_threshold")]
    pub threshold: f64,
    #[serde(default)]
    pub user_id: Option<String>,
}

impl Query {
    pub fn new(question: impl Into<String>) -> Self {
        Self { question: question.into(), top_k: default_top_k(), threshold: default_threshold(), user_id: None }
    }

    /// `top_k` clamped to a usable limit; zero and negatives mean "no results".
    pub fn limit(&self) -> usize {
        usize::try_from(self.top_k).unwrap_or(0)
    }
}

/// One ranked match. All scores lie in `[0, 1]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub variant_text: String,
    pub canonical_text: String,
    pub answer_text: String,
    pub hybrid_score: f64,
    pub vector_score: f64,
    pub fuzzy_score: f64,
}

/// Convex weights used to blend vector and fuzzy similarity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreWeights {
    vector: f64,
    fuzzy: f64,
}

impl ScoreWeights {
    const SUM_TOLERANCE: f64 = 1e-6;

    pub fn new(vector: f64, fuzzy: f64) -> Result<Self> {
        if !vector.is_finite() || !fuzzy.is_finite() || vector < 0.0 || fuzzy < 0.0 {
            return Err(Error::InvalidConfig(format!(
                "score weights must be finite and non-negative (vector={vector}, fuzzy={fuzzy})"
            )));
        }
        if (vector + fuzzy - 1.0).abs() > Self::SUM_TOLERANCE {
            return Err(Error::InvalidConfig(format!(
                "score weights must sum to 1 (vector={vector}, fuzzy={fuzzy})"
            )));
        }
        Ok(Self { vector, fuzzy })
    }

    pub fn vector(&self) -> f64 {
        self.vector
    }

    pub fn fuzzy(&self) -> f64 {
        self.fuzzy
    }

    /// Blend two `[0, 1]` scores; the result is clamped against rounding drift.
    pub fn combine(&self, vector_score: f64, fuzzy_score: f64) -> f64 {
        (self.vector * vector_score + self.fuzzy * fuzzy_score).clamp(0.0, 1.0)
    }
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self { vector: 0.65, fuzzy: 0.35 }
    }
}

/// A past exchange recorded by the serving layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub question: String,
    pub answer: String,
    pub score: f64,
    pub timestamp: DateTime<Utc>,
}

impl HistoryRecord {
    pub fn now(question: impl Into<String>, answer: impl Into<String>, score: f64) -> Self {
        Self { question: question.into(), answer: answer.into(), score, timestamp: Utc::now() }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub user_id: String,
    pub name: String,
    pub email: String,
    pub history: Vec<HistoryRecord>,
}
