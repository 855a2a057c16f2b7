//! Persistence adapter: whole-document JSON load/save.
//!
//! Two document kinds: the metadata document (`db_meta.json`, table
//! name to ordered column pairs) and one per-table data document
//! (`data/<table>.json`, ordered array of record objects). A missing
//! document is an empty database or table, not an error. Writes are
//! whole-file overwrites.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde::Serialize;

use kestrel_common::error::{KestrelResult, StorageError};
use kestrel_common::schema::Catalog;

use crate::record::RecordCollection;

/// The opaque persistence boundary the engine talks to.
pub trait Storage {
    fn load_catalog(&self) -> KestrelResult<Catalog>;
    fn save_catalog(&self, catalog: &Catalog) -> KestrelResult<()>;
    fn load_table(&self, table: &str) -> KestrelResult<RecordCollection>;
    fn save_table(&self, table: &str, records: &RecordCollection) -> KestrelResult<()>;
    fn remove_table(&self, table: &str) -> KestrelResult<()>;
}

/// File-backed JSON storage rooted at a data directory.
#[derive(Debug, Clone)]
pub struct JsonStorage {
    root: PathBuf,
}

impl JsonStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn meta_path(&self) -> PathBuf {
        self.root.join("db_meta.json")
    }

    fn table_path(&self, table: &str) -> PathBuf {
        self.root.join("data").join(format!("{table}.json"))
    }

    fn read_document<T: DeserializeOwned + Default>(path: &Path) -> KestrelResult<T> {
        match fs::read_to_string(path) {
            Ok(text) => Ok(serde_json::from_str(&text).map_err(StorageError::Serialization)?),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(T::default()),
            Err(e) => Err(StorageError::Io(e).into()),
        }
    }

    fn write_document<T: Serialize>(path: &Path, value: &T) -> KestrelResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(StorageError::Io)?;
        }
        let text = serde_json::to_string_pretty(value).map_err(StorageError::Serialization)?;
        fs::write(path, text).map_err(StorageError::Io)?;
        Ok(())
    }
}

impl Storage for JsonStorage {
    fn load_catalog(&self) -> KestrelResult<Catalog> {
        Self::read_document(&self.meta_path())
    }

    fn save_catalog(&self, catalog: &Catalog) -> KestrelResult<()> {
        Self::write_document(&self.meta_path(), catalog)
    }

    fn load_table(&self, table: &str) -> KestrelResult<RecordCollection> {
        Self::read_document(&self.table_path(table))
    }

    fn save_table(&self, table: &str, records: &RecordCollection) -> KestrelResult<()> {
        Self::write_document(&self.table_path(table), records)
    }

    fn remove_table(&self, table: &str) -> KestrelResult<()> {
        match fs::remove_file(self.table_path(table)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::Io(e).into()),
        }
    }
}

/// In-memory storage, mainly for tests and embedding without a data
/// directory. Same contract as `JsonStorage`, nothing on disk.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    catalog: Mutex<Catalog>,
    tables: Mutex<std::collections::HashMap<String, RecordCollection>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    fn load_catalog(&self) -> KestrelResult<Catalog> {
        Ok(self.catalog.lock().clone())
    }

    fn save_catalog(&self, catalog: &Catalog) -> KestrelResult<()> {
        *self.catalog.lock() = catalog.clone();
        Ok(())
    }

    fn load_table(&self, table: &str) -> KestrelResult<RecordCollection> {
        Ok(self.tables.lock().get(table).cloned().unwrap_or_default())
    }

    fn save_table(&self, table: &str, records: &RecordCollection) -> KestrelResult<()> {
        self.tables
            .lock()
            .insert(table.to_string(), records.clone());
        Ok(())
    }

    fn remove_table(&self, table: &str) -> KestrelResult<()> {
        self.tables.lock().remove(table);
        Ok(())
    }
}
