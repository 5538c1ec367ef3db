//! Convenient imports for common functionality.
//!
//! This module re-exports the types most callers need to open a session and work with its
//! results.

pub use crate::column::Column;
pub use crate::config::{ConnectTarget, OdbcOptions, OdbcOptionsBuilder};
pub use crate::dialect::{DialectRegistry, DialectRuleset, ErrorKind};
pub use crate::driver::{DriverColumn, DriverConnection, DriverRows, DriverValue, OdbcDriver};
pub use crate::error::{DriverError, OdbcMiddlewareError};
pub use crate::metadata::{DatabaseMetadata, IdentifierCase};
pub use crate::registry::{DecodingRule, TypeRegistry, TypeTag};
pub use crate::results::{CustomDbRow, ResultSet};
pub use crate::session::{AsyncOdbcSession, OdbcSession};
pub use crate::types::{DialectKind, RowValues, ValueKind};

#[cfg(feature = "odbc")]
pub use crate::odbc::OdbcApiDriver;
