//! Shared leaf crate for KestrelDB: column types, scalar values with
//! coercion and comparison normalization, table schemas, and the error
//! taxonomy all other crates converge on.

pub mod datum;
pub mod error;
pub mod schema;
pub mod types;
