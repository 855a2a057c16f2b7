use thiserror::Error;

use crate::types::ColumnType;

/// Convenience alias for `Result<T, KestrelError>`.
pub type KestrelResult<T> = Result<T, KestrelError>;

/// Top-level error type that all layer-specific errors convert into.
///
/// Every variant is recoverable at the command-loop boundary: the core
/// signals, the caller decides how to present it.
#[derive(Error, Debug)]
pub enum KestrelError {
    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),

    #[error("Query error: {0}")]
    Query(#[from] QueryError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Catalog / schema layer errors.
#[derive(Error, Debug)]
pub enum SchemaError {
    #[error("Table already exists: {0}")]
    DuplicateTable(String),

    #[error("Table not found: {0}")]
    UnknownTable(String),

    #[error("Invalid column spec '{0}': expected <name>:<type>")]
    InvalidColumnSpec(String),

    #[error("Unsupported column type '{0}' (supported: int, str, bool)")]
    UnsupportedType(String),
}

/// Record operation errors.
#[derive(Error, Debug)]
pub enum QueryError {
    #[error("Expected {expected} values, got {got}")]
    ColumnCountMismatch { expected: usize, got: usize },

    #[error("Value '{value}' does not match column type {expected}")]
    TypeMismatch { value: String, expected: ColumnType },

    #[error("{operation} requires a WHERE condition")]
    MissingCondition { operation: &'static str },
}

/// Persistence layer errors.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
