use tracing::info;

use qabot_core::{Corpus, CorpusBuilder, KnowledgeBase, QaPair, Result, SynonymRule};
use qabot_text::Analyzer;
use qabot_vector::VectorSpaceModel;

/// A corpus and the vector space model fit over it. Built and replaced as a
/// unit; never mutated after construction.
#[derive(Debug, Clone, PartialEq)]
pub struct Index {
    corpus: Corpus,
    model: VectorSpaceModel,
}

impl Index {
    /// Pair a corpus with a model. Row count must equal corpus length.
    pub(crate) fn from_parts(corpus: Corpus, model: VectorSpaceModel) -> Result<Self> {
        if corpus.len() != model.len() {
            return Err(qabot_core::Error::MalformedPersistedIndex(format!(
                "model has {} rows for {} corpus entries",
                model.len(),
                corpus.len()
            )));
        }
        Ok(Self { corpus, model })
    }

    pub fn build(pairs: &[QaPair], synonyms: &[SynonymRule], analyzer: Analyzer) -> Result<Self> {
        let corpus = CorpusBuilder::new(synonyms)?.build(pairs);
        let model = VectorSpaceModel::fit(analyzer, &corpus.variant_texts());
        info!(entries = corpus.len(), vocabulary = model.vocabulary().len(), "index built");
        Ok(Self { corpus, model })
    }

    pub fn from_knowledge(kb: &KnowledgeBase, analyzer: Analyzer) -> Result<Self> {
        Self::build(&kb.pairs, &kb.synonyms, analyzer)
    }

    pub fn corpus(&self) -> &Corpus {
        &self.corpus
    }

    pub fn model(&self) -> &VectorSpaceModel {
        &self.model
    }

    pub fn len(&self) -> usize {
        self.corpus.len()
    }

    pub fn is_empty(&self) -> bool {
        self.corpus.is_empty()
    }
}

/// Build an index with the default English analyzer.
pub fn build_index(raw_pairs: &[QaPair], synonym_rules: &[SynonymRule]) -> Result<Index> {
    Index::build(raw_pairs, synonym_rules, Analyzer::english())
}
