//! In-memory backing for testing.

use crate::backing::Backing;
use crate::document::DocumentTree;
use crate::error::BackingResult;
use parking_lot::RwLock;
use std::sync::Arc;

/// An in-memory snapshot backing.
///
/// Each `write` stores an independent deep copy of the tree and each `read`
/// returns another copy, so the engine never aliases the stored snapshot.
///
/// Cloning an `InMemoryBacking` yields a second handle to the **same**
/// snapshot. Two engines built over clones of one backing behave like two
/// processes sharing a file.
///
/// # Example
///
/// ```rust
/// use pathdb_storage::{Backing, DocumentTree, InMemoryBacking};
///
/// let mut first = InMemoryBacking::new();
/// let second = first.clone();
///
/// first.write(&DocumentTree::new()).unwrap();
/// assert_eq!(second.read().unwrap(), Some(DocumentTree::new()));
/// ```
#[derive(Debug, Clone, Default)]
pub struct InMemoryBacking {
    snapshot: Arc<RwLock<Option<DocumentTree>>>,
}

impl InMemoryBacking {
    /// Creates a new empty in-memory backing.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an in-memory backing holding a pre-existing tree.
    ///
    /// Useful for testing recovery scenarios.
    #[must_use]
    pub fn with_tree(tree: DocumentTree) -> Self {
        Self {
            snapshot: Arc::new(RwLock::new(Some(tree))),
        }
    }

    /// Returns a copy of the stored tree, if any.
    #[must_use]
    pub fn snapshot(&self) -> Option<DocumentTree> {
        self.snapshot.read().clone()
    }

    /// Discards the stored tree for every handle.
    pub fn clear(&mut self) {
        *self.snapshot.write() = None;
    }
}

impl Backing for InMemoryBacking {
    fn read(&self) -> BackingResult<Option<DocumentTree>> {
        Ok(self.snapshot.read().clone())
    }

    fn write(&mut self, tree: &DocumentTree) -> BackingResult<()> {
        *self.snapshot.write() = Some(tree.clone());
        Ok(())
    }
}
