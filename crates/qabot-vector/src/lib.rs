//! qabot-vector
//!
//! TF-IDF vector space model over corpus questions: a sorted unigram/bigram
//! vocabulary, smoothed inverse document frequencies, and one L2-normalized
//! sparse row per corpus entry so cosine similarity reduces to a dot product.
pub mod model;
pub mod sparse;

pub use model::{VectorSpaceModel, WEIGHTING_VERSION};
pub use sparse::SparseRow;
