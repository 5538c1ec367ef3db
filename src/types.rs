use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use clap::ValueEnum;
use serde::Deserialize;

/// Decoded column values, typed by the rule that produced them.
///
/// `String` and `Text` are kept apart so callers can tell a short character column from a long
/// text column, the same way `Int` and `BigInt` keep the column width visible:
/// ```rust
/// use odbc_middleware::prelude::*;
///
/// let values = vec![
///     RowValues::Int(1),
///     RowValues::String("alice".into()),
///     RowValues::Bool(true),
/// ];
/// assert_eq!(values[1].as_text(), Some("alice"));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum RowValues {
    /// NULL value
    Null,
    /// Boolean value
    Bool(bool),
    /// Short character data
    String(String),
    /// Long character data
    Text(String),
    /// Fixed-width integer
    Int(i64),
    /// Big integer, wide enough for unsigned 64-bit columns
    BigInt(i128),
    /// Floating point value
    Float(f64),
    /// Binary data
    Blob(Vec<u8>),
    /// Calendar date
    Date(NaiveDate),
    /// Time of day
    Time(NaiveTime),
    /// Date and time without zone
    Timestamp(NaiveDateTime),
}

impl RowValues {
    /// Check if this value is NULL
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// The semantic kind of this value, `None` for NULL.
    #[must_use]
    pub fn kind(&self) -> Option<ValueKind> {
        match self {
            RowValues::Null => None,
            RowValues::Bool(_) => Some(ValueKind::Boolean),
            RowValues::String(_) => Some(ValueKind::String),
            RowValues::Text(_) => Some(ValueKind::Text),
            RowValues::Int(_) => Some(ValueKind::Integer),
            RowValues::BigInt(_) => Some(ValueKind::BigInteger),
            RowValues::Float(_) => Some(ValueKind::Float),
            RowValues::Blob(_) => Some(ValueKind::Binary),
            RowValues::Date(_) => Some(ValueKind::Date),
            RowValues::Time(_) => Some(ValueKind::Time),
            RowValues::Timestamp(_) => Some(ValueKind::DateTime),
        }
    }

    #[must_use]
    pub fn as_int(&self) -> Option<i64> {
        match self {
            RowValues::Int(value) => Some(*value),
            RowValues::BigInt(value) => i64::try_from(*value).ok(),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            RowValues::String(value) | RowValues::Text(value) => Some(value),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        if let RowValues::Bool(value) = self {
            return Some(*value);
        } else if let Some(i) = self.as_int() {
            if i == 1 {
                return Some(true);
            } else if i == 0 {
                return Some(false);
            }
        }
        None
    }

    #[must_use]
    pub fn as_float(&self) -> Option<f64> {
        if let RowValues::Float(value) = self {
            Some(*value)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_blob(&self) -> Option<&[u8]> {
        if let RowValues::Blob(bytes) = self {
            Some(bytes)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            RowValues::Date(value) => Some(*value),
            RowValues::Timestamp(value) => Some(value.date()),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_time(&self) -> Option<NaiveTime> {
        match self {
            RowValues::Time(value) => Some(*value),
            RowValues::Timestamp(value) => Some(value.time()),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_timestamp(&self) -> Option<NaiveDateTime> {
        if let RowValues::Timestamp(value) = self {
            Some(*value)
        } else {
            None
        }
    }
}

/// Semantic kind a decoding rule produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Boolean,
    String,
    Text,
    Integer,
    BigInteger,
    Float,
    Binary,
    Date,
    Time,
    DateTime,
}

impl ValueKind {
    /// Framework-facing type name for this kind.
    #[must_use]
    pub fn type_name(self) -> &'static str {
        match self {
            ValueKind::Boolean => "boolean",
            ValueKind::String => "string",
            ValueKind::Text => "text",
            ValueKind::Integer => "integer",
            ValueKind::BigInteger => "bigint",
            ValueKind::Float => "float",
            ValueKind::Binary => "binary",
            ValueKind::Date => "date",
            ValueKind::Time => "time",
            ValueKind::DateTime => "datetime",
        }
    }
}

/// The database dialects this adapter ships rulesets for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DialectKind {
    /// Plain ODBC, no product-specific overrides
    Generic,
    /// `MySQL` and `MariaDB`
    Mysql,
    /// `PostgreSQL`
    #[serde(alias = "postgresql")]
    #[value(alias = "postgresql")]
    Postgres,
    /// Snowflake
    Snowflake,
}

impl DialectKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            DialectKind::Generic => "ODBC",
            DialectKind::Mysql => "MySQL",
            DialectKind::Postgres => "PostgreSQL",
            DialectKind::Snowflake => "Snowflake",
        }
    }
}
