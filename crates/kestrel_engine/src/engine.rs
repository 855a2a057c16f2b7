//! CRUD engine: table lifecycle (create/drop/list/info) and record
//! operations (insert/select/update/delete) enforcing schema and
//! condition semantics.
//!
//! Per-operation flow: validate against the catalog, load the
//! collection from storage, mutate, persist (whole-document
//! overwrite), then invalidate the query cache for the table.

use tracing::{debug, info};

use kestrel_common::datum::Value;
use kestrel_common::error::{KestrelResult, QueryError};
use kestrel_common::schema::{Catalog, ColumnDef, TableSchema, ID_COLUMN};

use crate::cache::{QueryCache, ALL_RECORDS_KEY};
use crate::record::{Record, RecordCollection};
use crate::storage::Storage;

/// A single-column equality condition, as used by select/update/
/// delete. Comparison goes through value normalization on both sides,
/// so `active = 1` matches a boolean column.
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    pub column: String,
    pub value: Value,
}

impl Condition {
    pub fn new(column: impl Into<String>, value: Value) -> Self {
        Self {
            column: column.into(),
            value,
        }
    }

    /// Whether a record satisfies this condition. A column the record
    /// does not carry matches nothing.
    pub fn matches(&self, record: &Record) -> bool {
        record
            .get(&self.column)
            .map(|stored| stored.normalized_eq(&self.value))
            .unwrap_or(false)
    }

    /// String form used as the query-cache key.
    pub fn cache_key(&self) -> String {
        format!("{} = {}", self.column, self.value.normalize())
    }
}

/// Column list and record count reported by `info`.
#[derive(Debug, Clone, PartialEq)]
pub struct TableInfo {
    pub name: String,
    pub columns: Vec<ColumnDef>,
    pub record_count: usize,
}

/// The database facade: schema catalog plus per-table record
/// collections behind a storage adapter, with a memoizing query
/// cache.
///
/// Mutations take `&mut self`; the type is not safe for concurrent
/// mutation without external serialization.
pub struct Database<S: Storage> {
    storage: S,
    catalog: Catalog,
    cache: QueryCache,
}

impl<S: Storage> Database<S> {
    /// Open a database over the given storage. A missing metadata
    /// document is an empty database, not an error.
    pub fn open(storage: S) -> KestrelResult<Self> {
        let catalog = storage.load_catalog()?;
        debug!(tables = catalog.table_count(), "opened database");
        Ok(Self {
            storage,
            catalog,
            cache: QueryCache::new(),
        })
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    // ── Table lifecycle ──────────────────────────────────────────────

    /// Create a table from `name:type` column specs. The implicit ID
    /// column is prepended; the metadata document is rewritten.
    pub fn create_table<Sp: AsRef<str>>(
        &mut self,
        name: &str,
        specs: &[Sp],
    ) -> KestrelResult<&TableSchema> {
        self.catalog.create(name, specs)?;
        self.storage.save_catalog(&self.catalog)?;
        info!(table = name, "created table");
        Ok(self.catalog.get(name)?)
    }

    /// Drop a table: schema, records and the persisted data document.
    /// Irreversible; the name may be redefined fresh afterwards.
    ///
    /// The interactive confirmation gate lives with the caller;
    /// invoking this directly is the explicit unattended bypass.
    pub fn drop_table(&mut self, name: &str) -> KestrelResult<()> {
        self.catalog.drop(name)?;
        self.storage.save_catalog(&self.catalog)?;
        self.storage.remove_table(name)?;
        self.cache.invalidate(name);
        info!(table = name, "dropped table");
        Ok(())
    }

    /// Table names in creation order.
    pub fn list_tables(&self) -> Vec<&str> {
        self.catalog.list()
    }

    pub fn info(&self, name: &str) -> KestrelResult<TableInfo> {
        let schema = self.catalog.get(name)?;
        let records = self.storage.load_table(name)?;
        Ok(TableInfo {
            name: schema.name.clone(),
            columns: schema.columns.clone(),
            record_count: records.len(),
        })
    }

    // ── Record operations ────────────────────────────────────────────

    /// Insert a record from positional values (ID excluded). Returns
    /// the assigned ID.
    pub fn insert(&mut self, table: &str, values: &[Value]) -> KestrelResult<i64> {
        let schema = self.catalog.get(table)?;
        let columns = schema.value_columns();
        if values.len() != columns.len() {
            return Err(QueryError::ColumnCountMismatch {
                expected: columns.len(),
                got: values.len(),
            }
            .into());
        }

        // Coerce everything before touching the collection: a failure
        // here leaves the table untouched, so insert is all-or-nothing.
        let mut coerced = Vec::with_capacity(values.len());
        for (column, raw) in columns.iter().zip(values) {
            coerced.push((column.name.clone(), raw.coerce(column.column_type)?));
        }

        let mut records = self.storage.load_table(table)?;
        let id = records.next_id();
        let mut record = Record::new();
        record.set(ID_COLUMN, Value::Integer(id));
        for (name, value) in coerced {
            record.set(&name, value);
        }
        records.push(record);
        self.storage.save_table(table, &records)?;
        self.cache.invalidate(table);
        debug!(table, id, "inserted record");
        Ok(id)
    }

    /// Select records, optionally filtered by a condition. Repeated
    /// selects are served from the query cache until the next
    /// mutation of the table.
    pub fn select(&self, table: &str, condition: Option<&Condition>) -> KestrelResult<Vec<Record>> {
        self.catalog.get(table)?;
        let key = condition.map_or_else(|| ALL_RECORDS_KEY.to_string(), Condition::cache_key);
        if let Some(rows) = self.cache.get(table, &key) {
            debug!(table, key = %key, "select served from cache");
            return Ok(rows);
        }
        let records = self.storage.load_table(table)?;
        let rows: Vec<Record> = match condition {
            None => records.records().to_vec(),
            Some(cond) => records.iter().filter(|r| cond.matches(r)).cloned().collect(),
        };
        self.cache.insert(table, &key, rows.clone());
        Ok(rows)
    }

    /// Update every record matching the condition, applying each
    /// assignment of the set clause. Returns the number of records
    /// updated; zero matches is not an error.
    ///
    /// A condition is mandatory: unconditional update is disallowed to
    /// prevent silent full-table rewrites.
    pub fn update(
        &mut self,
        table: &str,
        set_clause: &[(String, Value)],
        condition: Option<&Condition>,
    ) -> KestrelResult<usize> {
        self.catalog.get(table)?;
        let cond = condition.ok_or(QueryError::MissingCondition {
            operation: "update",
        })?;
        let mut records = self.storage.load_table(table)?;
        let mut updated = 0;
        for record in records.iter_mut() {
            if cond.matches(record) {
                for (column, value) in set_clause {
                    // Set values are substituted through normalization,
                    // not re-validated against the schema.
                    record.set(column, value.normalize());
                }
                updated += 1;
            }
        }
        self.storage.save_table(table, &records)?;
        self.cache.invalidate(table);
        debug!(table, updated, "updated records");
        Ok(updated)
    }

    /// Delete every record matching the condition, preserving the
    /// order of the rest. Returns the number removed; zero matches is
    /// not an error. A condition is mandatory, as for `update`.
    pub fn delete(&mut self, table: &str, condition: Option<&Condition>) -> KestrelResult<usize> {
        self.catalog.get(table)?;
        let cond = condition.ok_or(QueryError::MissingCondition {
            operation: "delete",
        })?;
        let mut records = self.storage.load_table(table)?;
        let before = records.len();
        records.retain(|r| !cond.matches(r));
        let removed = before - records.len();
        self.storage.save_table(table, &records)?;
        self.cache.invalidate(table);
        debug!(table, removed, "deleted records");
        Ok(removed)
    }
}
