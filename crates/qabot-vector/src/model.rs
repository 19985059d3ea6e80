use std::collections::{BTreeMap, BTreeSet, HashMap};
use tracing::info;

use qabot_core::{Error, Result};
use qabot_text::Analyzer;

use crate::sparse::{dot_dense, l2_normalize, SparseRow};

/// Bumped whenever term weighting changes. Persisted alongside the model.
pub const WEIGHTING_VERSION: u32 = 1;

/// Smoothed idf: `ln((1 + n) / (1 + df)) + 1`. Strictly decreasing in `df`;
/// a term present in every document gets the floor weight of 1.
fn smooth_idf(n_docs: usize, df: usize) -> f64 {
    #[allow(clippy::cast_precision_loss)]
    let ratio = (1.0 + n_docs as f64) / (1.0 + df as f64);
    ratio.ln() + 1.0
}

fn build_lookup(vocabulary: &[String]) -> HashMap<String, usize> {
    vocabulary.iter().enumerate().map(|(i, t)| (t.clone(), i)).collect()
}

fn malformed(msg: impl Into<String>) -> Error {
    Error::MalformedPersistedIndex(msg.into())
}

#[derive(Debug, Clone, PartialEq)]
pub struct VectorSpaceModel {
    analyzer: Analyzer,
    vocabulary: Vec<String>,
    lookup: HashMap<String, usize>,
    idf: Vec<f64>,
    rows: Vec<SparseRow>,
}

impl VectorSpaceModel {
    /// Fit vocabulary and idf over `texts` and weigh every text into a row.
    /// Row `i` corresponds to `texts[i]`.
    pub fn fit(analyzer: Analyzer, texts: &[&str]) -> Self {
        let doc_terms: Vec<Vec<String>> = texts.iter().map(|t| analyzer.terms(t)).collect();

        let mut df: BTreeMap<&str, usize> = BTreeMap::new();
        for terms in &doc_terms {
            let unique: BTreeSet<&str> = terms.iter().map(String::as_str).collect();
            for term in unique {
                *df.entry(term).or_insert(0) += 1;
            }
        }

        let vocabulary: Vec<String> = df.keys().map(|t| (*t).to_string()).collect();
        let idf: Vec<f64> = df.values().map(|&d| smooth_idf(texts.len(), d)).collect();
        let lookup = build_lookup(&vocabulary);

        let mut model = Self {
            analyzer,
            vocabulary,
            lookup,
            idf,
            rows: Vec::with_capacity(texts.len()),
        };
        model.rows = doc_terms.iter().map(|terms| model.weigh(terms)).collect();
        info!(
            documents = model.rows.len(),
            vocabulary = model.vocabulary.len(),
            "vector space model fit"
        );
        model
    }

    /// Rebuild a model from persisted parts, checking every structural
    /// invariant a fit model satisfies.
    pub fn from_parts(
        analyzer: Analyzer,
        vocabulary: Vec<String>,
        idf: Vec<f64>,
        rows: Vec<SparseRow>,
    ) -> Result<Self> {
        analyzer.validate().map_err(|e| malformed(format!("analyzer: {e}")))?;
        if vocabulary.windows(2).any(|w| w[0] >= w[1]) {
            return Err(malformed("vocabulary is not strictly sorted"));
        }
        if idf.len() != vocabulary.len() {
            return Err(malformed(format!(
                "idf has {} values for {} terms",
                idf.len(),
                vocabulary.len()
            )));
        }
        if idf.iter().any(|v| !v.is_finite() || *v <= 0.0) {
            return Err(malformed("idf values must be finite and positive"));
        }
        for (i, row) in rows.iter().enumerate() {
            if row.windows(2).any(|w| w[0].0 >= w[1].0) {
                return Err(malformed(format!("row {i} columns are not strictly increasing")));
            }
            if let Some(&(col, _)) = row.iter().find(|(col, _)| *col >= vocabulary.len()) {
                return Err(malformed(format!(
                    "row {i} references column {col} outside vocabulary"
                )));
            }
            if row.iter().any(|(_, w)| !w.is_finite() || *w < 0.0) {
                return Err(malformed(format!("row {i} has a non-finite or negative weight")));
            }
        }
        let lookup = build_lookup(&vocabulary);
        Ok(Self { analyzer, vocabulary, lookup, idf, rows })
    }

    fn weigh(&self, terms: &[String]) -> SparseRow {
        let mut counts: BTreeMap<usize, f64> = BTreeMap::new();
        for term in terms {
            if let Some(&col) = self.lookup.get(term.as_str()) {
                *counts.entry(col).or_insert(0.0) += 1.0;
            }
        }
        let mut row: SparseRow = counts
            .into_iter()
            .map(|(col, tf)| (col, tf * self.idf[col]))
            .collect();
        l2_normalize(&mut row);
        row
    }

    /// Weigh a normalized text with the fit-time analyzer and idf.
    /// Out-of-vocabulary terms are ignored.
    pub fn project(&self, text: &str) -> SparseRow {
        self.weigh(&self.analyzer.terms(text))
    }

    /// Cosine similarity of `text` against every row, clipped to `[0, 1]`.
    /// A text with no in-vocabulary terms scores zero everywhere.
    pub fn scores(&self, text: &str) -> Vec<f64> {
        let query = self.project(text);
        if query.is_empty() {
            return vec![0.0; self.rows.len()];
        }
        let mut dense = vec![0.0; self.vocabulary.len()];
        for (col, w) in query {
            dense[col] = w;
        }
        self.rows.iter().map(|row| dot_dense(row, &dense).clamp(0.0, 1.0)).collect()
    }

    pub fn analyzer(&self) -> &Analyzer {
        &self.analyzer
    }

    pub fn vocabulary(&self) -> &[String] {
        &self.vocabulary
    }

    pub fn column(&self, term: &str) -> Option<usize> {
        self.lookup.get(term).copied()
    }

    pub fn idf(&self) -> &[f64] {
        &self.idf
    }

    pub fn rows(&self) -> &[SparseRow] {
        &self.rows
    }

    pub fn row(&self, index: usize) -> Option<&SparseRow> {
        self.rows.get(index)
    }

    /// Number of rows (documents).
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
