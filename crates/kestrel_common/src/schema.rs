use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::SchemaError;
use crate::types::ColumnType;

/// Name of the implicit primary-key column every table carries.
/// Injected by `create`, never supplied by the caller.
pub const ID_COLUMN: &str = "ID";

/// Column definition in a table schema.
///
/// Serialized as the two-element `["name", "type"]` pair the metadata
/// document uses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDef {
    pub name: String,
    pub column_type: ColumnType,
}

impl fmt::Display for ColumnDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.name, self.column_type)
    }
}

impl Serialize for ColumnDef {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        (&self.name, self.column_type).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ColumnDef {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let (name, column_type) = <(String, ColumnType)>::deserialize(deserializer)?;
        Ok(ColumnDef { name, column_type })
    }
}

/// Table schema: ordered column definitions, ID column always first.
/// Column order is significant for display and positional insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSchema {
    pub name: String,
    pub columns: Vec<ColumnDef>,
}

impl TableSchema {
    /// Build a schema from `name:type` column specs, prepending the
    /// implicit ID column.
    pub fn from_specs<S: AsRef<str>>(name: &str, specs: &[S]) -> Result<Self, SchemaError> {
        let mut columns = vec![ColumnDef {
            name: ID_COLUMN.to_string(),
            column_type: ColumnType::Integer,
        }];
        for spec in specs {
            let spec = spec.as_ref();
            let (col_name, type_token) = spec
                .split_once(':')
                .ok_or_else(|| SchemaError::InvalidColumnSpec(spec.to_string()))?;
            if col_name.is_empty() || type_token.is_empty() || col_name == ID_COLUMN {
                return Err(SchemaError::InvalidColumnSpec(spec.to_string()));
            }
            if columns.iter().any(|c| c.name == col_name) {
                return Err(SchemaError::InvalidColumnSpec(spec.to_string()));
            }
            columns.push(ColumnDef {
                name: col_name.to_string(),
                column_type: type_token.parse()?,
            });
        }
        Ok(TableSchema {
            name: name.to_string(),
            columns,
        })
    }

    /// Find column index by name. Lookup is case-sensitive, matching
    /// the stored record field names exactly.
    pub fn find_column(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    /// Number of columns, implicit ID included.
    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    /// The caller-declared columns (everything after ID).
    pub fn value_columns(&self) -> &[ColumnDef] {
        &self.columns[1..]
    }

    /// Human-readable column list: `ID:int, name:str, ...`.
    pub fn describe(&self) -> String {
        self.columns
            .iter()
            .map(ColumnDef::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// In-memory schema store: all known tables, insertion-ordered so
/// `list` reports tables in creation order.
///
/// Not safe for concurrent mutation without external serialization.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    tables: Vec<TableSchema>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new table built from `name:type` column specs.
    pub fn create<S: AsRef<str>>(
        &mut self,
        name: &str,
        specs: &[S],
    ) -> Result<&TableSchema, SchemaError> {
        if self.find(name).is_some() {
            return Err(SchemaError::DuplicateTable(name.to_string()));
        }
        let schema = TableSchema::from_specs(name, specs)?;
        let idx = self.tables.len();
        self.tables.push(schema);
        Ok(&self.tables[idx])
    }

    /// Remove and return the schema. The caller is responsible for
    /// discarding the table's record collection as well.
    pub fn drop(&mut self, name: &str) -> Result<TableSchema, SchemaError> {
        match self.tables.iter().position(|t| t.name == name) {
            Some(idx) => Ok(self.tables.remove(idx)),
            None => Err(SchemaError::UnknownTable(name.to_string())),
        }
    }

    pub fn get(&self, name: &str) -> Result<&TableSchema, SchemaError> {
        self.find(name)
            .ok_or_else(|| SchemaError::UnknownTable(name.to_string()))
    }

    pub fn find(&self, name: &str) -> Option<&TableSchema> {
        self.tables.iter().find(|t| t.name == name)
    }

    /// Table names in insertion order.
    pub fn list(&self) -> Vec<&str> {
        self.tables.iter().map(|t| t.name.as_str()).collect()
    }

    pub fn table_count(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

// The metadata document is a JSON object mapping table name to its
// ordered [name, type] pairs; serde derive on a Vec would not produce
// that shape, so both directions are spelled out.

impl Serialize for Catalog {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.tables.len()))?;
        for table in &self.tables {
            map.serialize_entry(&table.name, &table.columns)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Catalog {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct CatalogVisitor;

        impl<'de> Visitor<'de> for CatalogVisitor {
            type Value = Catalog;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of table name to column pairs")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Catalog, A::Error> {
                let mut tables = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((name, columns)) = access.next_entry::<String, Vec<ColumnDef>>()? {
                    tables.push(TableSchema { name, columns });
                }
                Ok(Catalog { tables })
            }
        }

        deserializer.deserialize_map(CatalogVisitor)
    }
}
