use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::QueryError;
use crate::types::ColumnType;

/// A single scalar value. This is the fundamental unit of data in
/// KestrelDB; it round-trips through JSON as a native scalar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Boolean(bool),
    Integer(i64),
    Text(String),
}

impl Value {
    pub fn column_type(&self) -> ColumnType {
        match self {
            Value::Boolean(_) => ColumnType::Boolean,
            Value::Integer(_) => ColumnType::Integer,
            Value::Text(_) => ColumnType::Text,
        }
    }

    /// Coerce this value to the declared column type.
    ///
    /// Text input is parsed: numeric-looking strings become integers,
    /// the tokens `true`/`1` and `false`/`0` (case-insensitive) become
    /// booleans. Anything coerces to text via its display form.
    pub fn coerce(&self, target: ColumnType) -> Result<Value, QueryError> {
        match target {
            ColumnType::Integer => match self {
                Value::Integer(_) => Ok(self.clone()),
                Value::Text(s) => s
                    .trim()
                    .parse::<i64>()
                    .map(Value::Integer)
                    .map_err(|_| self.type_mismatch(target)),
                Value::Boolean(_) => Err(self.type_mismatch(target)),
            },
            ColumnType::Text => Ok(Value::Text(self.to_string())),
            ColumnType::Boolean => match self {
                Value::Boolean(_) => Ok(self.clone()),
                Value::Text(s) => parse_bool_token(s)
                    .map(Value::Boolean)
                    .ok_or_else(|| self.type_mismatch(target)),
                Value::Integer(_) => Err(self.type_mismatch(target)),
            },
        }
    }

    /// Normalize for condition equality: a text value that reads as a
    /// boolean token becomes a boolean, a digit-only text value becomes
    /// an integer, everything else passes through.
    ///
    /// Deliberately looser than strict type equality so that
    /// `where active = 1` matches a boolean column.
    pub fn normalize(&self) -> Value {
        match self {
            Value::Text(s) => {
                if let Some(b) = parse_bool_token(s) {
                    return Value::Boolean(b);
                }
                if !s.is_empty() && s.chars().all(|c| c.is_ascii_digit()) {
                    // Out-of-range digit strings stay text.
                    if let Ok(n) = s.parse::<i64>() {
                        return Value::Integer(n);
                    }
                }
                self.clone()
            }
            Value::Boolean(_) | Value::Integer(_) => self.clone(),
        }
    }

    /// Equality under normalization. Booleans additionally compare
    /// equal to 1/0, so `where a = 1` matches an integer column and a
    /// boolean column alike.
    pub fn normalized_eq(&self, other: &Value) -> bool {
        fn canonical(v: Value) -> Value {
            match v {
                Value::Boolean(b) => Value::Integer(b as i64),
                v => v,
            }
        }
        canonical(self.normalize()) == canonical(other.normalize())
    }

    fn type_mismatch(&self, expected: ColumnType) -> QueryError {
        QueryError::TypeMismatch {
            value: self.to_string(),
            expected,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Integer(n) => write!(f, "{}", n),
            Value::Text(s) => f.write_str(s),
        }
    }
}

/// `true`/`1` and `false`/`0`, case-insensitive. Note "1" is a boolean
/// token before it is a digit string; normalization relies on that.
fn parse_bool_token(s: &str) -> Option<bool> {
    match s.to_lowercase().as_str() {
        "true" | "1" => Some(true),
        "false" | "0" => Some(false),
        _ => None,
    }
}
