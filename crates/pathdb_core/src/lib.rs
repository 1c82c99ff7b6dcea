//! # pathdb Core
//!
//! Table engine and query/CRUD facade for pathdb.
//!
//! This crate provides:
//! - [`TableEngine`]: the in-memory document tree, its Cached/Live cache
//!   states, write suspension and error capture
//! - [`Database`]: table-scoped queries, id generation, replace/remove,
//!   aggregates and structured logging
//! - [`LogSink`] implementations observing every log entry
//!
//! Persistence is delegated to a [`pathdb_storage::Backing`] and query
//! evaluation to a [`pathdb_query::QueryEngine`].

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod database;
mod error;
mod filter;
mod log;
mod table;

pub use config::{Config, DEFAULT_ERROR_TABLE, DEFAULT_LOG_TABLE};
pub use database::Database;
pub use error::{CoreError, CoreResult};
pub use filter::Filter;
pub use log::{EmittedEntry, LogEntry, LogLevel, LogSink, MemorySink, NullSink, TracingSink};
pub use table::TableEngine;

pub use pathdb_query::{PathQuery, QueryEngine, QueryError};
pub use pathdb_storage::{
    Backing, BackingError, DocumentTree, FileBacking, InMemoryBacking, InMemoryKeyValueStore,
    KeyValueBacking, KeyValueStore,
};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
