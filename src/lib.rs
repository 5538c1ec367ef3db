//! ODBC adapter for an ORM: driver type mapping, dialect dispatch and session lifecycle.
//!
//! A session connects through an [`OdbcDriver`], reads the product metadata, picks a
//! [`DialectRuleset`] from a shared [`DialectRegistry`] and uses it to decode every column
//! value and to classify driver errors.
//!
//! ```rust
//! use odbc_middleware::prelude::*;
//!
//! let dialects = DialectRegistry::with_builtins()?;
//! let postgres = dialects.detect_product("PostgreSQL 16.2");
//! assert_eq!(postgres.quote_boolean(true), "'t'");
//! # Ok::<(), OdbcMiddlewareError>(())
//! ```

pub mod column;
pub mod config;
pub mod dialect;
pub mod driver;
pub mod error;
pub mod metadata;
#[cfg(feature = "odbc")]
pub mod odbc;
pub mod prelude;
pub mod registry;
pub mod results;
pub mod session;
pub mod types;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use column::Column;
pub use config::{ConnectTarget, OdbcOptions, OdbcOptionsBuilder, parse_connection_string};
pub use dialect::{DialectRegistry, DialectRuleset, ErrorKind};
pub use driver::{DriverColumn, DriverConnection, DriverRows, DriverValue, OdbcDriver};
pub use error::{DriverError, OdbcMiddlewareError};
pub use metadata::{DatabaseMetadata, IdentifierCase};
pub use registry::{DecodingRule, TypeRegistry, TypeTag, initialize_type_map};
pub use results::{CustomDbRow, ResultSet};
pub use session::{AsyncOdbcSession, OdbcSession};
pub use types::{DialectKind, RowValues, ValueKind};
