//! Query result cache: memoizes SELECT results per table, invalidated
//! on every successful mutation of that table.
//!
//! Owned by the `Database` rather than living in a process-wide
//! singleton; never persisted, never consulted across restarts.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;

use crate::record::Record;

/// Cache key for condition-less selects.
pub const ALL_RECORDS_KEY: &str = "all";

/// Table-scoped select memoization with hit/miss statistics.
///
/// The mutex exists only so `select` can take `&self`; there is no
/// concurrent access in the single-threaded command loop.
#[derive(Debug, Default)]
pub struct QueryCache {
    entries: Mutex<HashMap<String, HashMap<String, Vec<Record>>>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl QueryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a memoized result. Returns None on miss.
    pub fn get(&self, table: &str, key: &str) -> Option<Vec<Record>> {
        let entries = self.entries.lock();
        match entries.get(table).and_then(|results| results.get(key)) {
            Some(rows) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                Some(rows.clone())
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    /// Memoize a select result.
    pub fn insert(&self, table: &str, key: &str, rows: Vec<Record>) {
        let mut entries = self.entries.lock();
        entries
            .entry(table.to_string())
            .or_default()
            .insert(key.to_string(), rows);
    }

    /// Drop every entry for one table. Called after each successful
    /// insert/update/delete/drop so staleness never leaks past a
    /// write.
    pub fn invalidate(&self, table: &str) {
        self.entries.lock().remove(table);
    }

    /// Drop every entry for every table.
    pub fn invalidate_all(&self) {
        self.entries.lock().clear();
    }

    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }
}
