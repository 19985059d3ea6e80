//! qabot-text
//!
//! Text analysis shared by both scorers: stop-word aware n-gram extraction for
//! the vector space model and the token-set fuzzy similarity.
pub mod analyzer;
pub mod fuzzy;

pub use analyzer::{Analyzer, ENGLISH_STOP_WORDS};
pub use fuzzy::{ratio, token_set_ratio, token_set_similarity};
