//! KestrelDB record engine: schema-aware tables persisted as
//! per-table JSON documents, equality-filtered queries, and a
//! memoizing query cache invalidated on every mutation.
//!
//! Single logical thread of control: neither the catalog nor the
//! record collections are safe for concurrent mutation without
//! external serialization.

pub mod cache;
pub mod engine;
pub mod record;
pub mod storage;

#[cfg(test)]
mod tests;

pub use engine::{Condition, Database, TableInfo};
pub use record::{Record, RecordCollection};
pub use storage::{JsonStorage, MemoryStorage, Storage};
