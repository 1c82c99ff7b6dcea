//! # pathdb Storage
//!
//! Backing trait and implementations for pathdb.
//!
//! A backing persists the whole document tree as a single unit. It has no
//! notion of tables, records or queries: `read` hands back the last tree that
//! was written (or nothing), `write` replaces it.
//!
//! ## Available Backings
//!
//! - [`InMemoryBacking`] - Snapshot store for tests and ephemeral databases
//! - [`FileBacking`] - A single JSON file on disk
//! - [`KeyValueBacking`] - One key in a browser-style key-value store
//!
//! ## Example
//!
//! ```rust
//! use pathdb_storage::{Backing, DocumentTree, InMemoryBacking};
//! use serde_json::json;
//!
//! let mut backing = InMemoryBacking::new();
//! assert!(backing.read().unwrap().is_none());
//!
//! let mut tree = DocumentTree::new();
//! tree.insert("people".into(), json!([{ "id": 1 }]));
//! backing.write(&tree).unwrap();
//! assert_eq!(backing.read().unwrap(), Some(tree));
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod backing;
mod document;
mod error;
mod file;
mod key_value;
mod memory;

pub use backing::Backing;
pub use document::{decode_tree, encode_tree, DocumentTree};
pub use error::{BackingError, BackingResult};
pub use file::FileBacking;
pub use key_value::{InMemoryKeyValueStore, KeyValueBacking, KeyValueStore};
pub use memory::InMemoryBacking;
