use crate::error::Result;
use crate::types::{HistoryRecord, SearchHit, Session};

/// Anything that can answer a free-text question against a knowledge base.
pub trait Retriever: Send + Sync {
    fn retrieve(&self, question: &str, top_k: usize, threshold: f64) -> Result<Vec<SearchHit>>;
}

/// Per-user conversation log owned by the serving layer.
pub trait SessionStore: Send + Sync {
    /// Create the session for `email` or return the existing one.
    fn init(&self, name: &str, email: &str) -> Result<Session>;
    fn get(&self, user_id: &str) -> Option<Session>;
    /// Returns false when `user_id` has no session.
    fn append(&self, user_id: &str, record: HistoryRecord) -> bool;
    /// Overwrite the answer of the most recent record, used once a streamed
    /// answer has been fully delivered.
    fn update_last_answer(&self, user_id: &str, answer: &str) -> bool;
}
