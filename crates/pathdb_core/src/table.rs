//! The table engine: owns the document tree and mirrors it to the backing.
//!
//! # Cache states
//!
//! - **Cached** (default): the tree is read from the backing once, at
//!   construction, and is the source of truth afterwards.
//! - **Live** (`no_cache`): every read path re-reads the backing first, so
//!   writes made by another engine over the same store become visible on the
//!   next call.
//!
//! While writes are suspended the tree holds unflushed changes, so Live mode
//! does not re-read until the suspension is released.
//!
//! # Flushing
//!
//! Every mutation ends in exactly one [`TableEngine::flush`], which hands the
//! whole tree to the backing. Concurrent writers are last-write-wins at the
//! granularity of the full tree.

use crate::config::Config;
use crate::error::CoreResult;
use crate::log::{LogEntry, LogLevel, LogSink};
use pathdb_query::{QueryEngine, QueryError};
use pathdb_storage::{Backing, DocumentTree};
use serde_json::{json, Value};
use tracing::{debug, warn};

/// Owns the in-memory document tree, its backing and its query delegate.
pub struct TableEngine {
    backing: Box<dyn Backing>,
    query: Box<dyn QueryEngine>,
    sink: Box<dyn LogSink>,
    config: Config,
    tree: DocumentTree,
    write_suspended: bool,
    last_error: Option<QueryError>,
}

impl TableEngine {
    /// Creates an engine and loads the tree from the backing.
    ///
    /// Never fails: an unreadable backing leaves an empty tree and an entry
    /// in the error table.
    pub fn new(
        backing: Box<dyn Backing>,
        query: Box<dyn QueryEngine>,
        sink: Box<dyn LogSink>,
        config: Config,
    ) -> Self {
        let mut engine = Self {
            backing,
            query,
            sink,
            config,
            tree: DocumentTree::new(),
            write_suspended: false,
            last_error: None,
        };
        engine.fetch();
        engine
    }

    /// Replaces the in-memory tree with the backing's content.
    ///
    /// On a read failure the current tree is kept and the failure is
    /// appended to the error table. Live mode is switched off while that
    /// entry is written so the write cannot trigger another read.
    pub fn fetch(&mut self) {
        match self.backing.read() {
            Ok(tree) => {
                self.tree = tree.unwrap_or_default();
                debug!(tables = self.tree.len(), "fetched document tree");
            }
            Err(err) => {
                warn!(error = %err, "backing read failed, keeping in-memory tree");
                let no_cache = std::mem::replace(&mut self.config.no_cache, false);
                let table = self.config.error_table.clone();
                if let Err(log_err) = self.append_log(&table, err.to_string(), None) {
                    warn!(error = %log_err, "could not record backing read failure");
                }
                self.config.no_cache = no_cache;
            }
        }
    }

    /// Returns the tree, re-reading the backing first in Live mode.
    pub fn current_tree(&mut self) -> &DocumentTree {
        self.refresh();
        &self.tree
    }

    /// Returns the records of `name`, creating an empty table if absent.
    ///
    /// Creation happens in memory only; nothing is written.
    pub fn table(&mut self, name: &str) -> &[Value] {
        self.refresh();
        self.records_mut(name)
    }

    /// Replaces the records of `name` and flushes.
    ///
    /// In Live mode the backing is re-read first, so other tables written
    /// elsewhere survive the flush.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing write fails.
    pub fn set_table(&mut self, name: &str, records: Vec<Value>) -> CoreResult<()> {
        self.refresh();
        self.tree.insert(name.to_string(), Value::Array(records));
        self.flush()
    }

    /// Appends one record to `name` and flushes.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing write fails.
    pub fn push(&mut self, name: &str, record: Value) -> CoreResult<()> {
        self.refresh();
        self.records_mut(name).push(record);
        self.flush()
    }

    /// Deletes every record of `name` for which `delete` returns true.
    ///
    /// Flushes once if anything was deleted. Returns the number deleted.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing write fails.
    pub fn remove_where(
        &mut self,
        name: &str,
        mut delete: impl FnMut(&Value) -> bool,
    ) -> CoreResult<usize> {
        let kept: Vec<Value> = self
            .table(name)
            .iter()
            .filter(|record| !delete(*record))
            .cloned()
            .collect();
        let removed = self.records(name).len() - kept.len();
        if removed > 0 {
            self.set_table(name, kept)?;
        }
        Ok(removed)
    }

    /// Writes the whole tree to the backing unless writes are suspended.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing write fails.
    pub fn flush(&mut self) -> CoreResult<()> {
        if self.write_suspended {
            debug!("write suspended, flush deferred");
            return Ok(());
        }
        self.backing.write(&self.tree)?;
        debug!(tables = self.tree.len(), "flushed document tree");
        Ok(())
    }

    /// Runs a query expression against the current tree.
    ///
    /// A failing expression yields no matches; the failure is kept as the
    /// last error and appended to the error table.
    pub fn evaluate(&mut self, expression: &str) -> Vec<Value> {
        self.last_error = None;
        self.refresh();
        match self.query.evaluate(expression, &self.tree) {
            Ok(matches) => matches,
            Err(err) => {
                warn!(expression, error = %err, "query failed");
                let table = self.config.error_table.clone();
                let obj = json!({ "expression": expression });
                if let Err(log_err) = self.append_log(&table, err.to_string(), Some(obj)) {
                    warn!(error = %log_err, "could not record query failure");
                }
                self.last_error = Some(err);
                Vec::new()
            }
        }
    }

    /// Returns one more than the largest numeric `id` in `name`, or 1.
    pub fn next_id(&mut self, name: &str) -> u64 {
        self.refresh();
        next_id_in(self.records(name))
    }

    /// Appends a structured entry to `table`, emits it to the sink and flushes.
    ///
    /// Entries in the configured error table are emitted at error level.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing write fails.
    pub fn append_log(
        &mut self,
        table: &str,
        msg: impl Into<String>,
        obj: Option<Value>,
    ) -> CoreResult<LogEntry> {
        let entry = LogEntry::new(self.next_id(table), msg, obj);
        self.records_mut(table).push(serde_json::to_value(&entry)?);

        let level = if table == self.config.error_table {
            LogLevel::Error
        } else {
            LogLevel::Info
        };
        self.sink.emit(level, table, &entry);

        self.flush()?;
        Ok(entry)
    }

    /// Defers flushes until [`Self::resume_writes`].
    pub fn suspend_writes(&mut self) {
        self.write_suspended = true;
    }

    /// Re-enables flushing. Does not flush by itself.
    pub fn resume_writes(&mut self) {
        self.write_suspended = false;
    }

    /// Returns true while flushes are deferred.
    #[must_use]
    pub fn is_write_suspended(&self) -> bool {
        self.write_suspended
    }

    /// Switches between Cached (`false`) and Live (`true`) mode.
    pub fn set_no_cache(&mut self, no_cache: bool) {
        self.config.no_cache = no_cache;
    }

    /// Returns true in Live mode.
    #[must_use]
    pub fn is_no_cache(&self) -> bool {
        self.config.no_cache
    }

    /// Returns the engine configuration.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns the failure of the most recent query, if it failed.
    #[must_use]
    pub fn last_error(&self) -> Option<&QueryError> {
        self.last_error.as_ref()
    }

    fn refresh(&mut self) {
        if self.config.no_cache && !self.write_suspended {
            self.fetch();
        }
    }

    fn records(&self, name: &str) -> &[Value] {
        match self.tree.get(name) {
            Some(Value::Array(records)) => records,
            _ => &[],
        }
    }

    fn records_mut(&mut self, name: &str) -> &mut Vec<Value> {
        let slot = self
            .tree
            .entry(name.to_string())
            .or_insert_with(|| Value::Array(Vec::new()));
        if !slot.is_array() {
            *slot = Value::Array(match slot.take() {
                Value::Null => Vec::new(),
                single => vec![single],
            });
        }
        match slot {
            Value::Array(records) => records,
            _ => unreachable!("table slot holds an array"),
        }
    }
}

/// One more than the largest numeric `id` field, floored, never below 1.
pub(crate) fn next_id_in(records: &[Value]) -> u64 {
    records
        .iter()
        .filter_map(|record| record.get("id").and_then(Value::as_f64))
        .filter(|id| id.is_finite())
        .reduce(f64::max)
        .map_or(1, |max| (max.floor().max(0.0) as u64).saturating_add(1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::log::MemorySink;
    use pathdb_query::PathQuery;
    use pathdb_storage::{BackingError, BackingResult, InMemoryBacking};

    fn engine_over(backing: InMemoryBacking) -> TableEngine {
        TableEngine::new(
            Box::new(backing),
            Box::new(PathQuery::new()),
            Box::new(MemorySink::new()),
            Config::default(),
        )
    }

    /// Counts writes and can be told to fail reads.
    #[derive(Clone, Default)]
    struct CountingBacking {
        inner: InMemoryBacking,
        writes: std::sync::Arc<std::sync::atomic::AtomicUsize>,
        fail_reads: bool,
    }

    impl Backing for CountingBacking {
        fn read(&self) -> BackingResult<Option<DocumentTree>> {
            if self.fail_reads {
                return Err(BackingError::not_found("nowhere"));
            }
            self.inner.read()
        }

        fn write(&mut self, tree: &DocumentTree) -> BackingResult<()> {
            self.writes
                .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            self.inner.write(tree)
        }
    }

    impl CountingBacking {
        fn writes(&self) -> usize {
            self.writes.load(std::sync::atomic::Ordering::SeqCst)
        }
    }

    #[test]
    fn next_id_rules() {
        assert_eq!(next_id_in(&[]), 1);
        assert_eq!(next_id_in(&[json!({ "name": "no id" })]), 1);
        assert_eq!(next_id_in(&[json!({ "id": "x" })]), 1);
        assert_eq!(next_id_in(&[json!({ "id": 3 }), json!({ "id": 1 })]), 4);
        assert_eq!(next_id_in(&[json!({ "id": 2.5 })]), 3);
        assert_eq!(next_id_in(&[json!({ "id": -7 })]), 1);
        assert_eq!(next_id_in(&[json!(5), json!({ "id": 9 })]), 10);
    }

    #[test]
    fn table_is_created_without_writing() {
        let backing = CountingBacking::default();
        let mut engine = TableEngine::new(
            Box::new(backing.clone()),
            Box::new(PathQuery::new()),
            Box::new(MemorySink::new()),
            Config::default(),
        );

        assert!(engine.table("people").is_empty());
        assert!(engine.current_tree().contains_key("people"));
        assert_eq!(backing.writes(), 0);
    }

    #[test]
    fn push_flushes_once() {
        let backing = CountingBacking::default();
        let mut engine = TableEngine::new(
            Box::new(backing.clone()),
            Box::new(PathQuery::new()),
            Box::new(MemorySink::new()),
            Config::default(),
        );

        engine.push("people", json!({ "id": 1 })).unwrap();
        assert_eq!(backing.writes(), 1);
        assert_eq!(
            backing.inner.snapshot().unwrap()["people"],
            json!([{ "id": 1 }])
        );
    }

    #[test]
    fn suspended_writes_do_not_flush() {
        let backing = CountingBacking::default();
        let mut engine = TableEngine::new(
            Box::new(backing.clone()),
            Box::new(PathQuery::new()),
            Box::new(MemorySink::new()),
            Config::default(),
        );

        engine.suspend_writes();
        engine.push("a", json!({ "id": 1 })).unwrap();
        engine.push("b", json!({ "id": 1 })).unwrap();
        assert_eq!(backing.writes(), 0);

        engine.resume_writes();
        engine.flush().unwrap();
        assert_eq!(backing.writes(), 1);
        assert_eq!(backing.inner.snapshot().unwrap().len(), 2);
    }

    #[test]
    fn failed_read_logs_to_error_table() {
        let backing = CountingBacking {
            fail_reads: true,
            ..CountingBacking::default()
        };
        let sink = MemorySink::new();
        let mut engine = TableEngine::new(
            Box::new(backing.clone()),
            Box::new(PathQuery::new()),
            Box::new(sink.clone()),
            Config::default().no_cache(true),
        );

        let errors = engine.table("_internal").to_vec();
        assert!(!errors.is_empty());
        assert_eq!(errors[0]["id"], json!(1));
        assert!(errors[0]["msg"].as_str().unwrap().contains("nowhere"));
        assert!(engine.is_no_cache());
        assert_eq!(sink.entries()[0].level, LogLevel::Error);
    }

    #[test]
    fn failed_query_is_recorded() {
        let mut engine = engine_over(InMemoryBacking::new());

        assert!(engine.evaluate(r#"."people".{.id >"#).is_empty());
        assert!(engine.last_error().is_some());
        assert_eq!(engine.table("_internal").len(), 1);
        assert_eq!(
            engine.table("_internal")[0]["obj"]["expression"],
            json!(r#"."people".{.id >"#)
        );

        engine.evaluate(r#"."people"."#);
        assert!(engine.last_error().is_none());
    }

    #[test]
    fn live_mode_sees_external_writes() {
        let mut shared = InMemoryBacking::new();
        let mut engine = engine_over(shared.clone());

        let mut tree = DocumentTree::new();
        tree.insert("people".into(), json!([{ "id": 1 }]));
        shared.write(&tree).unwrap();

        assert!(engine.table("people").is_empty());
        engine.set_no_cache(true);
        assert_eq!(engine.table("people").len(), 1);
    }

    #[test]
    fn remove_where_without_matches_does_not_flush() {
        let backing = CountingBacking::default();
        let mut engine = TableEngine::new(
            Box::new(backing.clone()),
            Box::new(PathQuery::new()),
            Box::new(MemorySink::new()),
            Config::default(),
        );
        engine.push("t", json!({ "id": 1 })).unwrap();

        assert_eq!(engine.remove_where("t", |r| r["id"] == 2).unwrap(), 0);
        assert_eq!(backing.writes(), 1);

        assert_eq!(engine.remove_where("t", |r| r["id"] == 1).unwrap(), 1);
        assert_eq!(backing.writes(), 2);
    }

    #[test]
    fn non_array_table_is_normalized() {
        let mut tree = DocumentTree::new();
        tree.insert("odd".into(), json!({ "id": 4 }));
        tree.insert("empty".into(), Value::Null);
        let mut engine = engine_over(InMemoryBacking::with_tree(tree));

        assert_eq!(engine.table("odd"), &[json!({ "id": 4 })]);
        assert!(engine.table("empty").is_empty());
    }
}
