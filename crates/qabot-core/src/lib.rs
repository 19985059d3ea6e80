pub mod config;
pub mod corpus;
pub mod error;
pub mod knowledge;
pub mod normalize;
pub mod report;
pub mod session;
pub mod traits;
pub mod types;

pub use corpus::CorpusBuilder;
pub use error::{Error, Result};
pub use knowledge::KnowledgeBase;
pub use normalize::normalize;
pub use report::ReportImporter;
pub use types::{Corpus, Entry, QaPair, Query, ScoreWeights, SearchHit, SynonymRule};
