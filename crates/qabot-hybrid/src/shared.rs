use parking_lot::RwLock;
use std::sync::Arc;
use tracing::info;

use qabot_core::traits::Retriever;
use qabot_core::{Error, Result, SearchHit};

use crate::engine::QueryEngine;
use crate::index::Index;

/// Holds the currently published [`Index`].
///
/// Readers take an `Arc` snapshot and query it without holding the lock, so
/// a publish never blocks an in-flight query and a query never observes a
/// half-replaced index. Until the first publish every query fails with
/// [`Error::IndexUnavailable`].
#[derive(Debug, Default)]
pub struct SharedIndex {
    slot: RwLock<Option<Arc<Index>>>,
    engine: QueryEngine,
}

impl SharedIndex {
    pub fn new(engine: QueryEngine) -> Self {
        Self { slot: RwLock::new(None), engine }
    }

    pub fn with_index(engine: QueryEngine, index: Index) -> Self {
        Self { slot: RwLock::new(Some(Arc::new(index))), engine }
    }

    /// Swap in a new index, returning the one it replaced.
    pub fn publish(&self, index: Index) -> Option<Arc<Index>> {
        let entries = index.len();
        let previous = self.slot.write().replace(Arc::new(index));
        info!(entries, replaced = previous.is_some(), "index published");
        previous
    }

    pub fn snapshot(&self) -> Result<Arc<Index>> {
        self.slot.read().clone().ok_or(Error::IndexUnavailable)
    }

    pub fn is_ready(&self) -> bool {
        self.slot.read().is_some()
    }

    pub fn engine(&self) -> QueryEngine {
        self.engine
    }
}

impl Retriever for SharedIndex {
    fn retrieve(&self, question: &str, top_k: usize, threshold: f64) -> Result<Vec<SearchHit>> {
        let index = self.snapshot()?;
        self.engine.retrieve(&index, question, top_k, threshold)
    }
}
