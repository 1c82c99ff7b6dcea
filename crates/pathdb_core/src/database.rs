//! Database facade.
//!
//! [`Database`] turns table-scoped operations into path-query expressions and
//! record mutations on a [`TableEngine`].

use crate::config::Config;
use crate::error::{CoreError, CoreResult};
use crate::filter::Filter;
use crate::log::{LogEntry, LogSink, TracingSink};
use crate::table::TableEngine;
use pathdb_query::{PathQuery, QueryEngine, QueryError};
use pathdb_storage::{Backing, FileBacking, InMemoryBacking};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::path::PathBuf;
use tracing::debug;

/// Expression selecting every record of a table.
const ALL_RECORDS: &str = ".";

/// The main database handle.
///
/// Every operation runs to completion before returning. Reads take `&mut self`
/// because in Live mode they re-read the backing and replace the tree.
///
/// # Example
///
/// ```rust
/// use pathdb_core::Database;
/// use serde_json::json;
///
/// let mut db = Database::open_in_memory();
/// db.add("people", json!({ "id": 1, "name": "a" }))?;
/// db.add("people", json!({ "id": 2, "name": "b" }))?;
///
/// assert_eq!(db.query("people", ".{.id > 1}")?, vec![json!({ "id": 2, "name": "b" })]);
/// assert_eq!(db.next_id("people")?, 3);
/// # Ok::<(), pathdb_core::CoreError>(())
/// ```
pub struct Database {
    engine: TableEngine,
}

impl Database {
    /// Opens a database over `backing` with the default configuration.
    pub fn open(backing: impl Backing + 'static) -> Self {
        Self::open_with_config(backing, Config::default())
    }

    /// Opens a database over `backing` with a custom configuration.
    ///
    /// Never fails: an unreadable backing yields an empty tree and an entry in
    /// the error table.
    pub fn open_with_config(backing: impl Backing + 'static, config: Config) -> Self {
        Self::open_with_components(
            Box::new(backing),
            Box::new(PathQuery::new()),
            Box::new(TracingSink),
            config,
        )
    }

    /// Opens a database with every collaborator supplied by the caller.
    pub fn open_with_components(
        backing: Box<dyn Backing>,
        query: Box<dyn QueryEngine>,
        sink: Box<dyn LogSink>,
        config: Config,
    ) -> Self {
        Self {
            engine: TableEngine::new(backing, query, sink, config),
        }
    }

    /// Opens an empty database held only in memory.
    #[must_use]
    pub fn open_in_memory() -> Self {
        Self::open(InMemoryBacking::new())
    }

    /// Opens a database persisted as a JSON file at `path`.
    ///
    /// Parent directories are created. A missing file starts an empty tree.
    ///
    /// # Errors
    ///
    /// Returns an error if the parent directories cannot be created.
    pub fn open_file(path: impl Into<PathBuf>) -> CoreResult<Self> {
        Ok(Self::open(FileBacking::open_with_create_dirs(path)?))
    }

    // ---- queries ----

    /// Evaluates `expression` against the records of `table`.
    ///
    /// An empty expression selects every record. A malformed expression
    /// yields an empty result; see [`Self::last_error`].
    ///
    /// `table` is always quoted, even when it already starts with `"`: the
    /// name `"people"` (quotes included) is a different table from `people`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidInput`] if `table` is empty.
    pub fn query(&mut self, table: &str, expression: &str) -> CoreResult<Vec<Value>> {
        check_table("query", table)?;
        let expression = if expression.trim().is_empty() {
            ALL_RECORDS
        } else {
            expression
        };
        let full = format!(".{}{}", quote(table), expression);
        Ok(self.engine.evaluate(&full))
    }

    /// Evaluates `expression` and deserializes every match into `T`.
    ///
    /// # Errors
    ///
    /// Returns an error if `table` is empty or a match does not fit `T`.
    pub fn query_as<T: DeserializeOwned>(
        &mut self,
        table: &str,
        expression: &str,
    ) -> CoreResult<Vec<T>> {
        self.query(table, expression)?
            .into_iter()
            .map(|value| serde_json::from_value(value).map_err(CoreError::from))
            .collect()
    }

    /// Returns the first match, or `None`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidInput`] if `table` is empty.
    pub fn query_item(&mut self, table: &str, expression: &str) -> CoreResult<Option<Value>> {
        self.query_item_with(table, expression, |matches| matches)
    }

    /// Returns the first element of `transform(matches)`, or `None`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidInput`] if `table` is empty.
    pub fn query_item_with(
        &mut self,
        table: &str,
        expression: &str,
        transform: impl FnOnce(Vec<Value>) -> Vec<Value>,
    ) -> CoreResult<Option<Value>> {
        let matches = transform(self.query(table, expression)?);
        Ok(matches.into_iter().next())
    }

    /// Returns the first match, or an empty object.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidInput`] if `table` is empty.
    pub fn query_one(&mut self, table: &str, expression: &str) -> CoreResult<Value> {
        self.query_one_with(table, expression, |matches| matches)
    }

    /// Returns the first element of `transform(matches)`, or an empty object.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidInput`] if `table` is empty.
    pub fn query_one_with(
        &mut self,
        table: &str,
        expression: &str,
        transform: impl FnOnce(Vec<Value>) -> Vec<Value>,
    ) -> CoreResult<Value> {
        Ok(self
            .query_item_with(table, expression, transform)?
            .unwrap_or_else(|| Value::Object(Map::new())))
    }

    /// Returns the record whose `id` equals `id`, or an empty object.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidInput`] if `table` is empty.
    pub fn query_id(&mut self, table: &str, id: u64) -> CoreResult<Value> {
        self.query_one(table, &id_expression(id))
    }

    /// Returns true if `table` holds a record whose `id` equals `id`.
    pub fn has_id(&mut self, table: &str, id: u64) -> bool {
        matches!(self.query_item(table, &id_expression(id)), Ok(Some(_)))
    }

    /// Returns one more than the largest numeric `id` in `table`, or 1.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidInput`] if `table` is empty.
    pub fn next_id(&mut self, table: &str) -> CoreResult<u64> {
        check_table("next_id", table)?;
        Ok(self.engine.next_id(table))
    }

    // ---- mutations ----

    /// Appends `record` to `table` and flushes.
    ///
    /// An array is appended element by element with a single flush.
    ///
    /// # Errors
    ///
    /// Returns an error if `table` is empty, `record` is `null`, or the backing
    /// write fails.
    pub fn add(&mut self, table: &str, record: Value) -> CoreResult<()> {
        check_table("add", table)?;
        match record {
            Value::Null => Err(CoreError::invalid_input("add", "missing record")),
            Value::Array(records) => {
                let mut all = self.engine.table(table).to_vec();
                all.extend(records);
                self.engine.set_table(table, all)
            }
            record => self.engine.push(table, record),
        }
    }

    /// Serializes `record` and appends it to `table`.
    ///
    /// # Errors
    ///
    /// Returns an error if `record` cannot be serialized or [`Self::add`] fails.
    pub fn add_typed<T: Serialize>(&mut self, table: &str, record: &T) -> CoreResult<()> {
        let value = serde_json::to_value(record)?;
        self.add(table, value)
    }

    /// Removes every record selected by `filter`, then adds `record`.
    ///
    /// Without a filter, records with the same `id` as `record` are replaced.
    /// The whole operation flushes once.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidInput`] if `table` is empty, `record` is
    /// `null`, or no filter is given and `record` has no `id`. Returns a
    /// storage error if the backing write fails.
    pub fn replace(
        &mut self,
        table: &str,
        record: Value,
        filter: Option<Filter<'_>>,
    ) -> CoreResult<()> {
        check_table("replace", table)?;
        if record.is_null() {
            return Err(CoreError::invalid_input("replace", "missing record"));
        }
        let filter = match filter {
            Some(filter) => filter,
            None => {
                let id = record.get("id").cloned().ok_or_else(|| {
                    CoreError::invalid_input("replace", "record has no id and no filter was given")
                })?;
                Filter::by_id(id)
            }
        };

        self.batch(|db| {
            db.remove(table, filter)?;
            db.add(table, record)
        })
    }

    /// Deletes every record of `table` selected by `filter`.
    ///
    /// A predicate returns true for records to delete. An expression is
    /// evaluated with [`Self::query`] and every stored record structurally
    /// equal to one of its matches is deleted, so identical records go
    /// together. Flushes once if anything was deleted; returns the count.
    ///
    /// # Errors
    ///
    /// Returns an error if `table` is empty or the backing write fails.
    pub fn remove<'f>(&mut self, table: &str, filter: impl Into<Filter<'f>>) -> CoreResult<usize> {
        check_table("remove", table)?;
        let removed = match filter.into() {
            Filter::Predicate(delete) => self.engine.remove_where(table, |record| delete(record))?,
            Filter::Expression(expression) => {
                let matched: HashSet<String> = self
                    .query(table, &expression)?
                    .iter()
                    .map(canonical)
                    .collect();
                if matched.is_empty() {
                    0
                } else {
                    self.engine
                        .remove_where(table, |record| matched.contains(&canonical(record)))?
                }
            }
        };
        debug!(table, removed, "removed records");
        Ok(removed)
    }

    /// Replaces every record of `table` with `records` and flushes.
    ///
    /// # Errors
    ///
    /// Returns an error if `table` is empty or the backing write fails.
    pub fn replace_all(&mut self, table: &str, records: Vec<Value>) -> CoreResult<()> {
        check_table("replace_all", table)?;
        self.engine.set_table(table, records)
    }

    // ---- aggregates ----

    /// Adds up the numeric values of `column` (a path such as `price` or
    /// `stats.total`) across `table`. Returns 0 for an empty table.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidInput`] if `table` or `column` is empty.
    pub fn sum(&mut self, table: &str, column: &str) -> CoreResult<f64> {
        Ok(self.column_values("sum", table, column)?.iter().sum())
    }

    /// Averages the numeric values of `column` across `table`.
    ///
    /// An empty table has no average and yields NaN.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidInput`] if `table` or `column` is empty.
    pub fn average(&mut self, table: &str, column: &str) -> CoreResult<f64> {
        let values = self.column_values("average", table, column)?;
        Ok(values.iter().sum::<f64>() / values.len() as f64)
    }

    /// Returns the number of records in `table`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidInput`] if `table` is empty.
    pub fn num_rows(&mut self, table: &str) -> CoreResult<usize> {
        check_table("num_rows", table)?;
        Ok(self.engine.table(table).len())
    }

    /// Returns the names of every table in the tree, sorted.
    pub fn table_names(&mut self) -> Vec<String> {
        self.engine.current_tree().keys().cloned().collect()
    }

    // ---- logging ----

    /// Appends `msg` to the log table.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing write fails.
    pub fn log(&mut self, msg: impl Into<String>) -> CoreResult<LogEntry> {
        let table = self.engine.config().log_table.clone();
        self.engine.append_log(&table, msg, None)
    }

    /// Appends `msg` with an optional payload to `table`.
    ///
    /// # Errors
    ///
    /// Returns an error if `table` is empty or the backing write fails.
    pub fn log_to(
        &mut self,
        table: &str,
        msg: impl Into<String>,
        obj: Option<Value>,
    ) -> CoreResult<LogEntry> {
        check_table("log", table)?;
        self.engine.append_log(table, msg, obj)
    }

    /// Appends the message of `error` to the error table.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing write fails.
    pub fn log_error(&mut self, error: &dyn std::error::Error) -> CoreResult<LogEntry> {
        let table = self.engine.config().error_table.clone();
        self.engine.append_log(&table, error.to_string(), None)
    }

    /// Empties the error table, drops every log entry except id 1, and logs
    /// `"cleaned logs"`, flushing once.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing write fails.
    pub fn clean_logs(&mut self) -> CoreResult<()> {
        let log_table = self.engine.config().log_table.clone();
        let error_table = self.engine.config().error_table.clone();

        self.batch(|db| {
            db.engine.set_table(&error_table, Vec::new())?;
            let bootstrap: Vec<Value> = db
                .engine
                .table(&log_table)
                .iter()
                .filter(|entry| entry.get("id").and_then(Value::as_f64) == Some(1.0))
                .cloned()
                .collect();
            db.engine.set_table(&log_table, bootstrap)?;
            db.log("cleaned logs")?;
            Ok(())
        })
    }

    // ---- state ----

    /// Runs `f` with writes suspended, then flushes once if it succeeded.
    ///
    /// The suspension is released whether or not `f` fails. A batch started
    /// inside another batch joins it.
    ///
    /// # Errors
    ///
    /// Returns the error of `f`, or an error if the final write fails.
    pub fn batch<T>(&mut self, f: impl FnOnce(&mut Self) -> CoreResult<T>) -> CoreResult<T> {
        if self.engine.is_write_suspended() {
            return f(self);
        }

        self.engine.current_tree();
        self.engine.suspend_writes();
        let result = f(self);
        self.engine.resume_writes();

        let value = result?;
        self.engine.flush()?;
        Ok(value)
    }

    /// Re-reads the backing, replacing the in-memory tree.
    pub fn fetch(&mut self) {
        self.engine.fetch();
    }

    /// Switches between Cached (`false`) and Live (`true`) mode.
    pub fn set_no_cache(&mut self, no_cache: bool) {
        self.engine.set_no_cache(no_cache);
    }

    /// Returns true in Live mode.
    #[must_use]
    pub fn is_no_cache(&self) -> bool {
        self.engine.is_no_cache()
    }

    /// Returns the failure of the most recent query, if it failed.
    #[must_use]
    pub fn last_error(&self) -> Option<&QueryError> {
        self.engine.last_error()
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &Config {
        self.engine.config()
    }

    fn column_values(
        &mut self,
        operation: &'static str,
        table: &str,
        column: &str,
    ) -> CoreResult<Vec<f64>> {
        check_table(operation, table)?;
        let column = column.trim_start_matches('.');
        if column.is_empty() {
            return Err(CoreError::invalid_input(operation, "column must be a non-empty path"));
        }
        Ok(self
            .query(table, &format!(".{column}"))?
            .iter()
            .filter_map(Value::as_f64)
            .collect())
    }
}

fn check_table(operation: &'static str, table: &str) -> CoreResult<()> {
    if table.is_empty() {
        return Err(CoreError::invalid_input(
            operation,
            "table name must be a non-empty string",
        ));
    }
    Ok(())
}

/// Quotes a table name as a path-query string literal.
fn quote(name: &str) -> String {
    let mut quoted = String::with_capacity(name.len() + 2);
    quoted.push('"');
    for c in name.chars() {
        if c == '"' || c == '\\' {
            quoted.push('\\');
        }
        quoted.push(c);
    }
    quoted.push('"');
    quoted
}

fn id_expression(id: u64) -> String {
    format!(".{{.id == \"{id}\"}}")
}

/// Compact JSON with sorted keys.
fn canonical(value: &Value) -> String {
    value.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::log::MemorySink;
    use pathdb_storage::{BackingError, BackingResult, DocumentTree};
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn people() -> Database {
        let mut db = Database::open_in_memory();
        db.add("people", json!({ "id": 1, "name": "a" })).unwrap();
        db.add("people", json!({ "id": 2, "name": "b" })).unwrap();
        db
    }

    #[derive(Clone, Default)]
    struct CountingBacking {
        inner: InMemoryBacking,
        writes: Arc<AtomicUsize>,
    }

    impl Backing for CountingBacking {
        fn read(&self) -> BackingResult<Option<DocumentTree>> {
            self.inner.read()
        }

        fn write(&mut self, tree: &DocumentTree) -> BackingResult<()> {
            self.writes.fetch_add(1, Ordering::SeqCst);
            self.inner.write(tree)
        }
    }

    #[test]
    fn quote_escapes() {
        assert_eq!(quote("people"), r#""people""#);
        assert_eq!(quote(r#"a"b\c"#), r#""a\"b\\c""#);
    }

    #[test]
    fn query_defaults_to_all_records() {
        let mut db = people();
        assert_eq!(db.query("people", "").unwrap().len(), 2);
        assert_eq!(db.query("people", ".").unwrap().len(), 2);
    }

    #[test]
    fn query_table_with_awkward_name() {
        let mut db = Database::open_in_memory();
        db.add(r#"odd "name""#, json!({ "id": 1 })).unwrap();
        assert_eq!(db.query(r#"odd "name""#, ".").unwrap(), vec![json!({ "id": 1 })]);
    }

    #[test]
    fn prequoted_name_is_its_own_table() {
        let mut db = Database::open_in_memory();
        db.add("people", json!({ "id": 1 })).unwrap();

        assert!(db.query(r#""people""#, ".").unwrap().is_empty());
        assert!(db.last_error().is_none());
        assert_eq!(db.query("people", ".").unwrap().len(), 1);
    }

    #[test]
    fn empty_table_name_is_rejected() {
        let mut db = Database::open_in_memory();
        assert!(db.query("", ".").unwrap_err().is_invalid_input());
        assert!(db.add("", json!({})).unwrap_err().is_invalid_input());
        assert!(db.next_id("").unwrap_err().is_invalid_input());
        assert!(!db.has_id("", 1));
    }

    #[test]
    fn add_null_is_rejected() {
        let mut db = Database::open_in_memory();
        assert!(db.add("t", Value::Null).unwrap_err().is_invalid_input());
    }

    #[test]
    fn query_one_and_item() {
        let mut db = people();
        assert_eq!(db.query_one("people", ".{.id == 9}").unwrap(), json!({}));
        assert_eq!(db.query_item("people", ".{.id == 9}").unwrap(), None);
        assert_eq!(db.query_id("people", 2).unwrap()["name"], json!("b"));
        assert!(db.has_id("people", 1));
        assert!(!db.has_id("people", 3));
    }

    #[test]
    fn transform_runs_before_first_is_taken() {
        let mut db = people();
        let highest = db
            .query_one_with("people", ".id", |mut ids| {
                ids.sort_by(|a, b| b.as_f64().partial_cmp(&a.as_f64()).unwrap());
                ids
            })
            .unwrap();
        assert_eq!(highest, json!(2));
    }

    #[test]
    fn bulk_add_flushes_once() {
        let backing = CountingBacking::default();
        let mut db = Database::open(backing.clone());

        db.add("t", json!([{ "id": 1 }, { "id": 2 }, { "id": 3 }])).unwrap();
        assert_eq!(backing.writes.load(Ordering::SeqCst), 1);
        assert_eq!(db.num_rows("t").unwrap(), 3);
    }

    #[test]
    fn replace_flushes_once() {
        let backing = CountingBacking::default();
        let mut db = Database::open(backing.clone());
        db.add("t", json!({ "id": 1, "v": "old" })).unwrap();

        db.replace("t", json!({ "id": 1, "v": "new" }), None).unwrap();
        assert_eq!(backing.writes.load(Ordering::SeqCst), 2);
        assert_eq!(db.query("t", ".").unwrap(), vec![json!({ "id": 1, "v": "new" })]);
    }

    #[test]
    fn replace_matches_float_id() {
        let mut db = Database::open_in_memory();
        db.add("t", json!({ "id": 1.0, "v": "old" })).unwrap();
        assert!(db.has_id("t", 1));

        db.replace("t", json!({ "id": 1, "v": "new" }), None).unwrap();
        assert_eq!(db.query("t", ".").unwrap(), vec![json!({ "id": 1, "v": "new" })]);
    }

    #[test]
    fn replace_with_filter() {
        let mut db = people();
        db.replace(
            "people",
            json!({ "id": 3, "name": "c" }),
            Some(".{.name == \"a\"}".into()),
        )
        .unwrap();
        assert_eq!(db.query("people", ".id").unwrap(), vec![json!(2), json!(3)]);
    }

    #[test]
    fn replace_without_id_is_rejected() {
        let mut db = people();
        let err = db.replace("people", json!({ "name": "x" }), None).unwrap_err();
        assert!(err.is_invalid_input());
        assert_eq!(db.num_rows("people").unwrap(), 2);
    }

    #[test]
    fn remove_by_expression() {
        let mut db = people();
        assert_eq!(db.remove("people", ".{.id == 1}").unwrap(), 1);
        assert_eq!(db.query("people", ".name").unwrap(), vec![json!("b")]);
    }

    #[test]
    fn remove_by_expression_takes_identical_records() {
        let mut db = Database::open_in_memory();
        db.add("t", json!([{ "v": 1 }, { "v": 1 }, { "v": 2 }])).unwrap();
        assert_eq!(db.remove("t", ".[0]").unwrap(), 2);
        assert_eq!(db.query("t", ".").unwrap(), vec![json!({ "v": 2 })]);
    }

    #[test]
    fn remove_nothing_does_not_flush() {
        let backing = CountingBacking::default();
        let mut db = Database::open(backing.clone());
        db.add("t", json!({ "id": 1 })).unwrap();

        assert_eq!(db.remove("t", ".{.id == 5}").unwrap(), 0);
        assert_eq!(db.remove("t", Filter::predicate(|_| false)).unwrap(), 0);
        assert_eq!(backing.writes.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn aggregates() {
        let mut db = Database::open_in_memory();
        assert_eq!(db.sum("t", "price").unwrap(), 0.0);
        assert!(db.average("t", "price").unwrap().is_nan());

        db.add(
            "t",
            json!([{ "price": 2 }, { "price": 4.5 }, { "price": "n/a" }, { "other": 1 }]),
        )
        .unwrap();
        assert_eq!(db.sum("t", "price").unwrap(), 6.5);
        assert_eq!(db.average("t", "price").unwrap(), 3.25);
        assert!(db.sum("t", "").unwrap_err().is_invalid_input());
    }

    #[test]
    fn nested_column() {
        let mut db = Database::open_in_memory();
        db.add("t", json!([{ "stats": { "total": 3 } }, { "stats": { "total": 4 } }]))
            .unwrap();
        assert_eq!(db.sum("t", "stats.total").unwrap(), 7.0);
    }

    #[test]
    fn malformed_query_is_recovered() {
        let mut db = people();
        assert!(db.query("people", ".{.id >").unwrap().is_empty());
        assert!(db.last_error().is_some());
        assert_eq!(db.num_rows("_internal").unwrap(), 1);

        db.query("people", ".").unwrap();
        assert!(db.last_error().is_none());
    }

    #[test]
    fn log_entries() {
        let sink = MemorySink::new();
        let mut db = Database::open_with_components(
            Box::new(InMemoryBacking::new()),
            Box::new(PathQuery::new()),
            Box::new(sink.clone()),
            Config::default(),
        );

        assert_eq!(db.log("first").unwrap().id, 1);
        assert_eq!(db.log("second").unwrap().id, 2);
        let err = BackingError::not_found("x.json");
        assert_eq!(db.log_error(&err).unwrap().id, 1);
        db.log_to("audit", "seen", Some(json!({ "who": "me" }))).unwrap();

        assert_eq!(db.query("log", ".msg").unwrap(), vec![json!("first"), json!("second")]);
        assert_eq!(db.query("audit", ".obj.who").unwrap(), vec![json!("me")]);
        assert_eq!(sink.entries().len(), 4);
    }

    #[test]
    fn clean_logs_keeps_bootstrap_entry() {
        let backing = CountingBacking::default();
        let mut db = Database::open(backing.clone());
        db.log("started").unwrap();
        db.log("noise").unwrap();
        db.log_error(&BackingError::not_found("x")).unwrap();
        let before = backing.writes.load(Ordering::SeqCst);

        db.clean_logs().unwrap();

        assert_eq!(backing.writes.load(Ordering::SeqCst), before + 1);
        assert_eq!(db.num_rows("_internal").unwrap(), 0);
        assert_eq!(
            db.query("log", ".msg").unwrap(),
            vec![json!("started"), json!("cleaned logs")]
        );
        assert_eq!(db.query("log", ".id").unwrap(), vec![json!(1), json!(2)]);
    }

    #[test]
    fn batch_flushes_once_and_only_on_success() {
        let backing = CountingBacking::default();
        let mut db = Database::open(backing.clone());

        db.batch(|db| {
            db.add("a", json!({ "id": 1 }))?;
            db.add("b", json!({ "id": 1 }))?;
            db.batch(|db| db.add("c", json!({ "id": 1 })))
        })
        .unwrap();
        assert_eq!(backing.writes.load(Ordering::SeqCst), 1);

        let result = db.batch(|db| {
            db.add("d", json!({ "id": 1 }))?;
            db.add("d", Value::Null)
        });
        assert!(result.is_err());
        assert_eq!(backing.writes.load(Ordering::SeqCst), 1);

        db.add("e", json!({ "id": 1 })).unwrap();
        assert_eq!(backing.writes.load(Ordering::SeqCst), 2);
    }

    #[derive(Debug, PartialEq, serde::Serialize, serde::Deserialize)]
    struct Person {
        id: u64,
        name: String,
    }

    #[test]
    fn typed_round_trip() {
        let mut db = Database::open_in_memory();
        db.add_typed("people", &Person { id: 1, name: "a".into() })
            .unwrap();
        let people: Vec<Person> = db.query_as("people", ".").unwrap();
        assert_eq!(people, vec![Person { id: 1, name: "a".into() }]);

        let wrong: CoreResult<Vec<Person>> = db.query_as("people", ".name");
        assert!(wrong.is_err());
    }

    #[test]
    fn table_names_are_sorted() {
        let mut db = Database::open_in_memory();
        db.add("zeta", json!({})).unwrap();
        db.add("alpha", json!({})).unwrap();
        assert_eq!(db.table_names(), vec!["alpha".to_string(), "zeta".to_string()]);
    }
}
