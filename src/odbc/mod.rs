// odbc-api driver - the real driver collaborator
//
// One process-wide environment; each connection fetches results through text buffers and
// reports column tags from the SQL data type code.

use std::sync::OnceLock;
use std::time::Duration;

use odbc_api::buffers::TextRowSet;
use odbc_api::{Connection, ConnectionOptions, Cursor, Environment, ResultSetMetadata};
use tracing::debug;

use crate::config::ConnectTarget;
use crate::driver::{DriverColumn, DriverConnection, DriverRows, DriverValue, OdbcDriver};
use crate::error::DriverError;
use crate::metadata::DatabaseMetadata;
use crate::registry::TypeTag;
use crate::registry::decode::decode_hex;

const BATCH_SIZE: usize = 1000;
const MAX_TEXT_LEN: usize = 4096;

static ENVIRONMENT: OnceLock<Environment> = OnceLock::new();

fn environment() -> Result<&'static Environment, DriverError> {
    if let Some(env) = ENVIRONMENT.get() {
        return Ok(env);
    }
    let env = Environment::new().map_err(|e| {
        DriverError::new(format!("failed to create ODBC environment: {e}"))
    })?;
    Ok(ENVIRONMENT.get_or_init(|| env))
}

fn driver_error(err: &odbc_api::Error) -> DriverError {
    match err {
        odbc_api::Error::Diagnostics { record, .. } => DriverError::new(format!(
            "{} ({}) {err}",
            record.state.as_str(),
            record.native_error
        )),
        other => DriverError::new(other.to_string()),
    }
}

/// Driver backed by the system ODBC driver manager.
#[derive(Debug, Clone, Copy, Default)]
pub struct OdbcApiDriver;

impl OdbcDriver for OdbcApiDriver {
    type Connection = OdbcApiConnection;

    fn connect(&self, target: &ConnectTarget) -> Result<OdbcApiConnection, DriverError> {
        let env = environment()?;
        let conn = match target {
            ConnectTarget::Dsn {
                dsn,
                username,
                password,
            } => env.connect(
                dsn,
                username.as_deref().unwrap_or(""),
                password.as_deref().unwrap_or(""),
                ConnectionOptions::default(),
            ),
            ConnectTarget::DriverAttributes(_) => env.connect_with_connection_string(
                &target.to_connection_string(),
                ConnectionOptions::default(),
            ),
        }
        .map_err(|e| driver_error(&e))?;
        Ok(OdbcApiConnection {
            conn: Some(conn),
            timeout: None,
        })
    }
}

/// Live odbc-api connection.
pub struct OdbcApiConnection {
    conn: Option<Connection<'static>>,
    timeout: Option<Duration>,
}

impl OdbcApiConnection {
    fn conn(&self) -> Result<&Connection<'static>, DriverError> {
        self.conn
            .as_ref()
            .ok_or_else(|| DriverError::new("connection is closed"))
    }
}

impl DriverConnection for OdbcApiConnection {
    fn connected(&self) -> bool {
        self.conn
            .as_ref()
            .is_some_and(|conn| !conn.is_dead().unwrap_or(true))
    }

    fn disconnect(&mut self) -> Result<(), DriverError> {
        if let Some(conn) = self.conn.take() {
            debug!("closing ODBC connection");
            drop(conn);
        }
        Ok(())
    }

    fn execute(&mut self, sql: &str) -> Result<DriverRows, DriverError> {
        let timeout = self.timeout;
        let conn = self.conn()?;
        let mut stmt = conn.preallocate().map_err(|e| driver_error(&e))?;
        if let Some(timeout) = timeout {
            let secs = usize::try_from(timeout.as_secs()).unwrap_or(usize::MAX);
            stmt.set_query_timeout_sec(secs)
                .map_err(|e| driver_error(&e))?;
        }
        let fetched = {
            let cursor = stmt.execute(sql, ()).map_err(|e| driver_error(&e))?;
            match cursor {
                Some(cursor) => Some(read_cursor(cursor)?),
                None => None,
            }
        };
        match fetched {
            Some(rows) => Ok(rows),
            None => {
                let affected = stmt.row_count().map_err(|e| driver_error(&e))?;
                Ok(DriverRows::affected(affected.unwrap_or(0)))
            }
        }
    }

    fn metadata(&mut self) -> Result<DatabaseMetadata, DriverError> {
        let conn = self.conn()?;
        let dbms_name = conn
            .database_management_system_name()
            .map_err(|e| driver_error(&e))?;
        let mut metadata = DatabaseMetadata::new(dbms_name);
        metadata.database_name = conn.current_catalog().ok();
        metadata.max_identifier_len = conn.max_column_name_len().ok().map(usize::from);
        debug!(dbms = %metadata.dbms_name, "read ODBC metadata");
        Ok(metadata)
    }

    fn set_autocommit(&mut self, enabled: bool) -> Result<(), DriverError> {
        self.conn()?
            .set_autocommit(enabled)
            .map_err(|e| driver_error(&e))
    }

    fn set_query_timeout(&mut self, timeout: Option<Duration>) -> Result<(), DriverError> {
        self.timeout = timeout;
        Ok(())
    }
}

fn read_cursor(mut cursor: impl Cursor) -> Result<DriverRows, DriverError> {
    let num_cols = cursor.num_result_cols().map_err(|e| driver_error(&e))?;
    let num_cols = u16::try_from(num_cols).unwrap_or(0);
    let mut columns = Vec::with_capacity(usize::from(num_cols));
    for col in 1..=num_cols {
        let name = cursor.col_name(col).map_err(|e| driver_error(&e))?;
        let sql_type = cursor.col_type(col).map_err(|e| driver_error(&e))?;
        columns.push(DriverColumn::new(name, TypeTag::from_code(sql_type.0)));
    }

    let mut buffers = TextRowSet::for_cursor(BATCH_SIZE, &mut cursor, Some(MAX_TEXT_LEN))
        .map_err(|e| driver_error(&e))?;
    let mut row_cursor = cursor
        .bind_buffer(&mut buffers)
        .map_err(|e| driver_error(&e))?;

    let mut rows = Vec::new();
    while let Some(batch) = row_cursor
        .fetch_with_truncation_check(true)
        .map_err(|e| fetch_error(&e))?
    {
        for row_idx in 0..batch.num_rows() {
            let row = columns
                .iter()
                .enumerate()
                .map(|(col_idx, column)| text_value(column, batch.at(col_idx, row_idx)))
                .collect::<Result<Vec<_>, _>>()?;
            rows.push(row);
        }
    }
    Ok(DriverRows::new(columns, rows))
}

fn fetch_error(err: &odbc_api::Error) -> DriverError {
    match err {
        odbc_api::Error::TooLargeValueForBuffer { .. } => DriverError::new(format!(
            "value does not fit the {MAX_TEXT_LEN} byte fetch buffer: {err}"
        )),
        other => driver_error(other),
    }
}

// Binary columns arrive as hex text. Character data stays raw bytes so decoders reject
// invalid UTF-8.
fn text_value(column: &DriverColumn, cell: Option<&[u8]>) -> Result<DriverValue, DriverError> {
    match cell {
        None => Ok(DriverValue::Null),
        Some(bytes) if column.type_tag.is_binary() => {
            decode_hex(bytes).map(DriverValue::Bytes).map_err(|reason| {
                DriverError::new(format!("column `{}`: {reason}", column.name))
            })
        }
        Some(bytes) => Ok(DriverValue::Bytes(bytes.to_vec())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::DialectRegistry;
    use crate::error::OdbcMiddlewareError;

    #[test]
    fn character_cells_keep_their_bytes() {
        let column = DriverColumn::new("name", TypeTag::VarChar);
        let cell = text_value(&column, Some(b"caf\xe9")).unwrap();
        assert_eq!(cell, DriverValue::Bytes(b"caf\xe9".to_vec()));

        let generic = DialectRegistry::new().unwrap().fallback();
        assert!(matches!(
            generic.decode(&TypeTag::VarChar, &cell),
            Err(OdbcMiddlewareError::DecodeError { .. })
        ));
        assert_eq!(text_value(&column, None).unwrap(), DriverValue::Null);
    }

    #[test]
    fn binary_cells_must_be_valid_hex() {
        let column = DriverColumn::new("blob", TypeTag::VarBinary);
        assert_eq!(
            text_value(&column, Some(b"0aff")).unwrap(),
            DriverValue::Bytes(vec![0x0a, 0xff])
        );
        let err = text_value(&column, Some(b"0g")).unwrap_err();
        assert!(err.message.contains("blob"));
    }
}
