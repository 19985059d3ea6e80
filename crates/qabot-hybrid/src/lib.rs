//! qabot-hybrid
//!
//! The retrieval core: an immutable [`Index`] bundling the corpus with its
//! vector space model, the [`QueryEngine`] that ranks entries by a blend of
//! cosine and token-set similarity, and [`SharedIndex`] for publishing
//! rebuilt indexes to concurrent readers with a single pointer swap.
pub mod engine;
pub mod index;
pub mod persist;
pub mod shared;

pub use engine::{retrieve, QueryEngine};
pub use index::{build_index, Index};
pub use shared::SharedIndex;
