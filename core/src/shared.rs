use crate::index::VectorIndex;
use parking_lot::RwLock;
use std::sync::Arc;

/// Process-wide holder of the current index.
///
/// Readers take an `Arc` snapshot and query it without holding the lock.
/// `replace` swaps in a fully built index; snapshots taken earlier stay valid.
#[derive(Debug)]
pub struct SharedIndex {
    current: RwLock<Arc<VectorIndex>>,
}

impl SharedIndex {
    pub fn new(index: VectorIndex) -> Self {
        Self { current: RwLock::new(Arc::new(index)) }
    }

    pub fn current(&self) -> Arc<VectorIndex> {
        Arc::clone(&self.current.read())
    }

    /// Install `index` and return the one it replaced.
    pub fn replace(&self, index: VectorIndex) -> Arc<VectorIndex> {
        let next = Arc::new(index);
        let previous = std::mem::replace(&mut *self.current.write(), next);
        tracing::info!(num_books = self.current().row_count(), "swapped vector index");
        previous
    }
}
