//! Driver collaborator interface.
//!
//! The adapter never talks to the wire itself. A driver hands out blocking connection handles;
//! each handle executes SQL to completion and reports per-column type tags with raw values.

use std::time::Duration;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use crate::config::ConnectTarget;
use crate::error::DriverError;
use crate::metadata::DatabaseMetadata;
use crate::registry::TypeTag;

/// A raw column value as the driver delivered it.
#[derive(Debug, Clone, PartialEq)]
pub enum DriverValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Bytes(Vec<u8>),
    Date(NaiveDate),
    Time(NaiveTime),
    Timestamp(NaiveDateTime),
}

impl DriverValue {
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Short name of the raw variant, for error messages.
    #[must_use]
    pub fn describe(&self) -> &'static str {
        match self {
            DriverValue::Null => "NULL",
            DriverValue::Bool(_) => "boolean",
            DriverValue::Int(_) => "integer",
            DriverValue::Float(_) => "float",
            DriverValue::Text(_) => "text",
            DriverValue::Bytes(_) => "bytes",
            DriverValue::Date(_) => "date",
            DriverValue::Time(_) => "time",
            DriverValue::Timestamp(_) => "timestamp",
        }
    }
}

impl From<&str> for DriverValue {
    fn from(value: &str) -> Self {
        DriverValue::Text(value.to_string())
    }
}

impl From<i64> for DriverValue {
    fn from(value: i64) -> Self {
        DriverValue::Int(value)
    }
}

/// Result column description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriverColumn {
    pub name: String,
    pub type_tag: TypeTag,
}

impl DriverColumn {
    #[must_use]
    pub fn new(name: impl Into<String>, type_tag: TypeTag) -> Self {
        Self {
            name: name.into(),
            type_tag,
        }
    }
}

/// Everything one `execute` call produced.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DriverRows {
    pub columns: Vec<DriverColumn>,
    pub rows: Vec<Vec<DriverValue>>,
    /// Rows touched by a DML statement; zero for queries.
    pub rows_affected: usize,
}

impl DriverRows {
    #[must_use]
    pub fn new(columns: Vec<DriverColumn>, rows: Vec<Vec<DriverValue>>) -> Self {
        Self {
            columns,
            rows,
            rows_affected: 0,
        }
    }

    #[must_use]
    pub fn affected(rows_affected: usize) -> Self {
        Self {
            rows_affected,
            ..Self::default()
        }
    }
}

/// Factory for driver connections.
pub trait OdbcDriver: Send + Sync {
    type Connection: DriverConnection;

    /// Establish a connection to a named data source or from driver attributes.
    ///
    /// # Errors
    /// Returns the driver's error when the connection cannot be established.
    fn connect(&self, target: &ConnectTarget) -> Result<Self::Connection, DriverError>;
}

/// One live driver connection, owned by exactly one session.
pub trait DriverConnection: Send {
    /// Liveness probe; must not execute a query.
    fn connected(&self) -> bool;

    /// Release the handle.
    ///
    /// # Errors
    /// Returns the driver's error if the disconnect fails.
    fn disconnect(&mut self) -> Result<(), DriverError>;

    /// Run `sql` to completion.
    ///
    /// # Errors
    /// Returns the driver's error; its message is classified by the session's dialect.
    fn execute(&mut self, sql: &str) -> Result<DriverRows, DriverError>;

    /// Product metadata, read once right after connecting.
    ///
    /// # Errors
    /// Returns the driver's error if the metadata cannot be read.
    fn metadata(&mut self) -> Result<DatabaseMetadata, DriverError>;

    /// # Errors
    /// Returns the driver's error if the attribute cannot be set.
    fn set_autocommit(&mut self, _enabled: bool) -> Result<(), DriverError> {
        Ok(())
    }

    /// # Errors
    /// Returns the driver's error if the attribute cannot be set.
    fn set_query_timeout(&mut self, _timeout: Option<Duration>) -> Result<(), DriverError> {
        Ok(())
    }
}
