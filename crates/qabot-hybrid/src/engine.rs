use qabot_core::traits::Retriever;
use qabot_core::{normalize, Error, Result, ScoreWeights, SearchHit};
use qabot_text::token_set_similarity;

use crate::index::Index;

/// Ranks corpus entries against a question.
///
/// Per entry: cosine similarity from the vector space model, token-set
/// similarity against the entry's normalized text, and their weighted blend.
/// Entries are ordered by blended score, ties keeping corpus order; the walk
/// stops at the first entry below `threshold` or after `top_k` hits.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct QueryEngine {
    weights: ScoreWeights,
}

impl QueryEngine {
    pub fn new(weights: ScoreWeights) -> Self {
        Self { weights }
    }

    pub fn weights(&self) -> ScoreWeights {
        self.weights
    }

    pub fn retrieve(&self, index: &Index, query_text: &str, top_k: usize, threshold: f64) -> Result<Vec<SearchHit>> {
        if index.is_empty() {
            return Ok(Vec::new());
        }
        let query = normalize(query_text);
        if query.is_empty() {
            return Err(Error::InvalidQuery("question is empty after normalization".to_string()));
        }
        if threshold.is_nan() {
            return Err(Error::InvalidQuery("threshold is not a number".to_string()));
        }
        if top_k == 0 {
            return Ok(Vec::new());
        }

        let vector_scores = index.model().scores(&query);
        let mut scored: Vec<(usize, f64, f64, f64)> = index
            .corpus()
            .iter()
            .zip(vector_scores)
            .enumerate()
            .map(|(i, (entry, vector))| {
                let fuzzy = token_set_similarity(&query, &entry.normalized_text);
                (i, self.weights.combine(vector, fuzzy), vector, fuzzy)
            })
            .collect();
        // stable: equal scores keep corpus order
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

        let mut hits = Vec::with_capacity(top_k.min(scored.len()));
        for (i, hybrid, vector, fuzzy) in scored {
            if hybrid < threshold {
                break;
            }
            let entry = &index.corpus().entries()[i];
            hits.push(SearchHit {
                variant_text: entry.variant_text.clone(),
                canonical_text: entry.canonical_text.clone(),
                answer_text: entry.answer_text.clone(),
                hybrid_score: hybrid,
                vector_score: vector,
                fuzzy_score: fuzzy,
            });
            if hits.len() >= top_k {
                break;
            }
        }
        Ok(hits)
    }
}

/// Retrieve with the default 0.65 / 0.35 vector/fuzzy blend.
pub fn retrieve(query_text: &str, top_k: usize, threshold: f64, index: &Index) -> Result<Vec<SearchHit>> {
    QueryEngine::default().retrieve(index, query_text, top_k, threshold)
}

impl Retriever for Index {
    fn retrieve(&self, question: &str, top_k: usize, threshold: f64) -> Result<Vec<SearchHit>> {
        QueryEngine::default().retrieve(self, question, top_k, threshold)
    }
}
