//! Backing trait definition.

use crate::document::DocumentTree;
use crate::error::BackingResult;

/// Persistence adapter for a pathdb document tree.
///
/// Backings are **whole-tree stores**. The engine mirrors its entire
/// in-memory tree through them; there are no partial or table-scoped writes.
///
/// # Invariants
///
/// - `read` returns the tree passed to the most recent successful `write`
///   (possibly by another process or another handle to the same store)
/// - `read` returns `Ok(None)` when the store holds an explicit empty value
/// - A missing or corrupted store is reported as an error; callers treat
///   any error as "no prior state"
///
/// # Implementors
///
/// - [`super::InMemoryBacking`] - For testing
/// - [`super::FileBacking`] - For persistent storage
/// - [`super::KeyValueBacking`] - For browser-style key-value storage
pub trait Backing: Send + Sync {
    /// Reads the persisted document tree.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The store does not exist yet
    /// - The stored content is not valid JSON
    /// - The stored JSON root is not an object
    fn read(&self) -> BackingResult<Option<DocumentTree>>;

    /// Replaces the persisted document tree.
    ///
    /// # Errors
    ///
    /// Returns an error if the tree cannot be serialized or stored.
    fn write(&mut self, tree: &DocumentTree) -> BackingResult<()>;
}

impl<B: Backing + ?Sized> Backing for Box<B> {
    fn read(&self) -> BackingResult<Option<DocumentTree>> {
        (**self).read()
    }

    fn write(&mut self, tree: &DocumentTree) -> BackingResult<()> {
        (**self).write(tree)
    }
}
