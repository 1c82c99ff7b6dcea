//! File-based backing for persistent storage.

use crate::backing::Backing;
use crate::document::{decode_tree, encode_tree, DocumentTree};
use crate::error::{BackingError, BackingResult};
use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// A backing that keeps the document tree in a single JSON file.
///
/// # Durability
///
/// `write` uses the write-then-rename pattern:
/// 1. Write the serialized tree to `<file>.tmp`
/// 2. Sync the temporary file to disk
/// 3. Rename it over the target file
///
/// A reader in another process therefore observes either the previous tree or
/// the new one in full, never a torn file.
///
/// # Example
///
/// ```no_run
/// use pathdb_storage::{Backing, DocumentTree, FileBacking};
///
/// let mut backing = FileBacking::new("data.json");
/// backing.write(&DocumentTree::new()).unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct FileBacking {
    path: PathBuf,
}

impl FileBacking {
    /// Creates a backing for the given file path.
    ///
    /// The file is not touched until the first `read` or `write`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Creates a backing, creating parent directories if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the directories cannot be created.
    pub fn open_with_create_dirs(path: impl Into<PathBuf>) -> BackingResult<Self> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        Ok(Self::new(path))
    }

    /// Returns the path to the underlying file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(OsString::from)
            .unwrap_or_else(|| OsString::from("pathdb"));
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl Backing for FileBacking {
    fn read(&self) -> BackingResult<Option<DocumentTree>> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(BackingError::not_found(self.path.display().to_string()));
            }
            Err(e) => return Err(e.into()),
        };
        debug!(path = %self.path.display(), bytes = text.len(), "read document file");
        decode_tree(&text)
    }

    fn write(&mut self, tree: &DocumentTree) -> BackingResult<()> {
        let text = encode_tree(tree)?;
        let temp_path = self.temp_path();

        let mut file = File::create(&temp_path)?;
        file.write_all(text.as_bytes())?;
        file.sync_all()?;
        drop(file);

        fs::rename(&temp_path, &self.path)?;
        debug!(path = %self.path.display(), bytes = text.len(), "wrote document file");
        Ok(())
    }
}
