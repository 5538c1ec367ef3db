// Connection session - lifecycle, decoding and error translation over one driver connection
//
// - query: row decoding and result-set building
// - worker: async facade running a session on its own thread

mod query;
mod worker;

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

pub use query::{build_result_set, decode_row};
pub use worker::AsyncOdbcSession;

use crate::column::Column;
use crate::config::{ConnectTarget, OdbcOptions};
use crate::dialect::{DialectRegistry, DialectRuleset};
use crate::driver::{
    DriverColumn, DriverConnection, DriverRows, DriverValue, OdbcDriver,
};
use crate::error::{DriverError, OdbcMiddlewareError};
use crate::metadata::DatabaseMetadata;
use crate::registry::TypeTag;
use crate::results::ResultSet;
use crate::types::RowValues;

/// One live driver connection plus the dialect resolved for it.
///
/// The session owns its driver handle exclusively. Metadata is read right after each connect
/// and the dialect is resolved from it before the session is handed out.
pub struct OdbcSession<D: OdbcDriver> {
    driver: Arc<D>,
    dialects: Arc<DialectRegistry>,
    options: OdbcOptions,
    target: ConnectTarget,
    connection: Option<D::Connection>,
    metadata: DatabaseMetadata,
    dialect: Arc<DialectRuleset>,
}

struct Established<C> {
    connection: C,
    metadata: DatabaseMetadata,
    dialect: Arc<DialectRuleset>,
}

impl<D: OdbcDriver> OdbcSession<D> {
    /// Validate `options`, connect, read metadata and resolve the dialect.
    ///
    /// # Errors
    /// Returns `OdbcMiddlewareError::ConfigError` for invalid options or an unregistered forced
    /// dialect, and `OdbcMiddlewareError::ConnectionError` if connecting or reading metadata
    /// fails.
    pub fn open(
        options: OdbcOptions,
        driver: Arc<D>,
        dialects: Arc<DialectRegistry>,
    ) -> Result<Self, OdbcMiddlewareError> {
        let target = options.connect_target()?;
        info!(target = %target.redacted(), "opening ODBC session");
        let established = establish(driver.as_ref(), &dialects, &options, &target)?;
        let mut session = Self {
            driver,
            dialects,
            options,
            target,
            connection: Some(established.connection),
            metadata: established.metadata,
            dialect: established.dialect,
        };
        session.configure_connection()?;
        Ok(session)
    }

    /// Apply autocommit and query timeout to the live handle.
    ///
    /// # Errors
    /// Returns `OdbcMiddlewareError::ConnectionError` when disconnected, or the translated driver
    /// error if an attribute is rejected.
    pub fn configure_connection(&mut self) -> Result<(), OdbcMiddlewareError> {
        let autocommit = self.options.autocommit;
        let timeout = self.options.query_timeout();
        debug!(autocommit, ?timeout, "configuring connection");
        let dialect = Arc::clone(&self.dialect);
        let conn = self.live_connection()?;
        conn.set_autocommit(autocommit)
            .map_err(|e| translate(&dialect, e))?;
        conn.set_query_timeout(timeout)
            .map_err(|e| translate(&dialect, e))
    }

    /// True while the driver reports the handle as connected.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.connection
            .as_ref()
            .is_some_and(DriverConnection::connected)
    }

    /// Disconnect, then connect again with the stored options.
    ///
    /// Metadata and dialect are refreshed from the new connection.
    ///
    /// # Errors
    /// Returns `OdbcMiddlewareError::ConnectionError` if disconnecting or reconnecting fails; the
    /// session stays disconnected in that case.
    pub fn reconnect(&mut self) -> Result<(), OdbcMiddlewareError> {
        info!(target = %self.target.redacted(), "reconnecting ODBC session");
        self.disconnect()?;
        let established = establish(
            self.driver.as_ref(),
            &self.dialects,
            &self.options,
            &self.target,
        )?;
        self.connection = Some(established.connection);
        self.metadata = established.metadata;
        self.dialect = established.dialect;
        self.configure_connection()
    }

    /// Release the driver handle. Calling this when already disconnected does nothing.
    ///
    /// # Errors
    /// Returns `OdbcMiddlewareError::ConnectionError` if the driver fails to disconnect; the
    /// handle is released either way.
    pub fn disconnect(&mut self) -> Result<(), OdbcMiddlewareError> {
        let Some(mut conn) = self.connection.take() else {
            return Ok(());
        };
        if !conn.connected() {
            debug!("connection already closed by the driver");
            return Ok(());
        }
        info!(target = %self.target.redacted(), "disconnecting ODBC session");
        conn.disconnect()
            .map_err(|e| OdbcMiddlewareError::ConnectionError(format!("disconnect failed: {e}")))
    }

    /// Run a query and decode every row with the session's dialect.
    ///
    /// # Errors
    /// Returns `OdbcMiddlewareError::ConnectionError` when disconnected, the translated driver
    /// error if execution fails, or `OdbcMiddlewareError::DecodeError` for undecodable values.
    pub fn execute_select(&mut self, sql: &str) -> Result<ResultSet, OdbcMiddlewareError> {
        let rows = self.run(sql)?;
        let case = self.dialect.identifier_case(&self.metadata);
        build_result_set(&self.dialect, case, rows)
    }

    /// Run a DML statement and return the affected row count.
    ///
    /// # Errors
    /// Returns `OdbcMiddlewareError::ConnectionError` when disconnected or the translated driver
    /// error if execution fails.
    pub fn execute_dml(&mut self, sql: &str) -> Result<usize, OdbcMiddlewareError> {
        Ok(self.run(sql)?.rows_affected)
    }

    /// Run SQL for its side effects only.
    ///
    /// # Errors
    /// Returns `OdbcMiddlewareError::ConnectionError` when disconnected or the translated driver
    /// error if execution fails.
    pub fn execute_batch(&mut self, sql: &str) -> Result<(), OdbcMiddlewareError> {
        self.run(sql).map(|_| ())
    }

    fn run(&mut self, sql: &str) -> Result<DriverRows, OdbcMiddlewareError> {
        let dialect = Arc::clone(&self.dialect);
        let conn = self.live_connection()?;
        conn.execute(sql).map_err(|e| translate(&dialect, e))
    }

    fn live_connection(&mut self) -> Result<&mut D::Connection, OdbcMiddlewareError> {
        match self.connection.as_mut() {
            Some(conn) if conn.connected() => Ok(conn),
            _ => Err(OdbcMiddlewareError::ConnectionError(
                "session is not connected".to_string(),
            )),
        }
    }

    /// Decode one raw row positionally.
    ///
    /// # Errors
    /// Returns `OdbcMiddlewareError::DecodeError` for unregistered tags or unconvertible values.
    pub fn decode_row(
        &self,
        columns: &[DriverColumn],
        values: &[DriverValue],
    ) -> Result<Vec<RowValues>, OdbcMiddlewareError> {
        decode_row(&self.dialect, columns, values)
    }

    /// Classify a driver error with the session's dialect. The message is kept in full.
    #[must_use]
    pub fn translate_error(&self, error: DriverError) -> OdbcMiddlewareError {
        translate(&self.dialect, error)
    }

    /// Describe a column for the framework's schema layer.
    ///
    /// # Errors
    /// Returns `OdbcMiddlewareError::DecodeError` if `type_tag` has no decoding rule.
    pub fn new_column(
        &self,
        name: &str,
        default: Option<String>,
        type_tag: TypeTag,
        native_type: impl Into<String>,
        nullable: bool,
    ) -> Result<Column, OdbcMiddlewareError> {
        let rule = self.dialect.rule(&type_tag)?;
        let name = self.dialect.identifier_case(&self.metadata).format_case(name);
        Ok(Column::new(
            name,
            default,
            type_tag,
            native_type.into(),
            nullable,
            rule,
        ))
    }

    /// # Errors
    /// Returns the translated driver error if the live handle rejects the setting.
    pub fn set_autocommit(&mut self, enabled: bool) -> Result<(), OdbcMiddlewareError> {
        self.options.autocommit = enabled;
        if self.is_active() {
            let dialect = Arc::clone(&self.dialect);
            let conn = self.live_connection()?;
            conn.set_autocommit(enabled)
                .map_err(|e| translate(&dialect, e))?;
        }
        Ok(())
    }

    /// Timeouts are enforced by the driver; sub-second precision is dropped.
    ///
    /// # Errors
    /// Returns the translated driver error if the live handle rejects the setting.
    pub fn set_query_timeout(&mut self, timeout: Option<Duration>) -> Result<(), OdbcMiddlewareError> {
        self.options.timeout_secs = timeout.map(|t| t.as_secs());
        if self.is_active() {
            let timeout = self.options.query_timeout();
            let dialect = Arc::clone(&self.dialect);
            let conn = self.live_connection()?;
            conn.set_query_timeout(timeout)
                .map_err(|e| translate(&dialect, e))?;
        }
        Ok(())
    }

    #[must_use]
    pub fn adapter_name(&self) -> &str {
        self.dialect.name()
    }

    #[must_use]
    pub fn supports_migrations(&self) -> bool {
        true
    }

    #[must_use]
    pub fn metadata(&self) -> &DatabaseMetadata {
        &self.metadata
    }

    #[must_use]
    pub fn dialect(&self) -> &Arc<DialectRuleset> {
        &self.dialect
    }

    #[must_use]
    pub fn options(&self) -> &OdbcOptions {
        &self.options
    }

    #[must_use]
    pub fn quote_column_name(&self, name: &str) -> String {
        self.dialect.quote_column_name(&self.metadata, name)
    }

    #[must_use]
    pub fn quote_table_name(&self, name: &str) -> String {
        self.dialect.quote_table_name(&self.metadata, name)
    }

    #[must_use]
    pub fn quote_value(&self, value: &RowValues) -> String {
        self.dialect.quote_value(value)
    }

    #[must_use]
    pub fn table_alias_length(&self) -> usize {
        self.dialect.table_alias_length(&self.metadata)
    }

    #[must_use]
    pub fn index_name_length(&self) -> usize {
        self.dialect.index_name_length(&self.metadata)
    }
}

impl<D: OdbcDriver> Drop for OdbcSession<D> {
    fn drop(&mut self) {
        if let Err(err) = self.disconnect() {
            warn!(error = %err, "failed to disconnect ODBC session on drop");
        }
    }
}

impl<D: OdbcDriver> std::fmt::Debug for OdbcSession<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OdbcSession")
            .field("target", &self.target.redacted())
            .field("dialect", &self.dialect.name())
            .field("active", &self.is_active())
            .finish_non_exhaustive()
    }
}

fn translate(dialect: &DialectRuleset, error: DriverError) -> OdbcMiddlewareError {
    dialect.error_rules().into_error(error.message)
}

fn establish<D: OdbcDriver>(
    driver: &D,
    dialects: &DialectRegistry,
    options: &OdbcOptions,
    target: &ConnectTarget,
) -> Result<Established<D::Connection>, OdbcMiddlewareError> {
    let forced = options
        .force_dialect
        .map(|kind| {
            dialects.by_kind(kind).ok_or_else(|| {
                OdbcMiddlewareError::ConfigError(format!(
                    "dialect {} is not registered",
                    kind.as_str()
                ))
            })
        })
        .transpose()?;
    let mut connection = driver.connect(target).map_err(|e| {
        OdbcMiddlewareError::ConnectionError(format!("failed to connect ({}): {e}", target.redacted()))
    })?;
    let metadata = match connection.metadata() {
        Ok(metadata) => metadata,
        Err(err) => {
            if let Err(close_err) = connection.disconnect() {
                warn!(error = %close_err, "failed to close connection after metadata error");
            }
            return Err(OdbcMiddlewareError::ConnectionError(format!(
                "failed to read database metadata: {err}"
            )));
        }
    };
    let dialect = forced.unwrap_or_else(|| dialects.detect(&metadata));
    info!(
        dbms = %metadata.dbms_name,
        dialect = dialect.name(),
        "ODBC session connected"
    );
    Ok(Established {
        connection,
        metadata,
        dialect,
    })
}
