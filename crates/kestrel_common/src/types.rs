use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SchemaError;

/// Column data types supported by KestrelDB.
///
/// Closed set: adding a type means extending coercion and
/// normalization in `datum` as well.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColumnType {
    #[serde(rename = "int")]
    Integer,
    #[serde(rename = "str")]
    Text,
    #[serde(rename = "bool")]
    Boolean,
}

impl ColumnType {
    pub const ALL: [ColumnType; 3] = [ColumnType::Integer, ColumnType::Text, ColumnType::Boolean];

    /// Token used in column specs and the metadata document.
    pub fn token(&self) -> &'static str {
        match self {
            ColumnType::Integer => "int",
            ColumnType::Text => "str",
            ColumnType::Boolean => "bool",
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

impl FromStr for ColumnType {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "int" => Ok(ColumnType::Integer),
            "str" => Ok(ColumnType::Text),
            "bool" => Ok(ColumnType::Boolean),
            other => Err(SchemaError::UnsupportedType(other.to_string())),
        }
    }
}
