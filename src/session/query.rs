use std::sync::Arc;

use crate::dialect::DialectRuleset;
use crate::driver::{DriverColumn, DriverRows, DriverValue};
use crate::error::OdbcMiddlewareError;
use crate::metadata::IdentifierCase;
use crate::results::ResultSet;
use crate::types::RowValues;

/// Decode one row positionally against its column descriptions.
///
/// # Errors
/// Returns `OdbcMiddlewareError::ExecutionError` when the value count does not match the column
/// count, or `OdbcMiddlewareError::DecodeError` for the first value that fails to decode.
pub fn decode_row(
    dialect: &DialectRuleset,
    columns: &[DriverColumn],
    values: &[DriverValue],
) -> Result<Vec<RowValues>, OdbcMiddlewareError> {
    if columns.len() != values.len() {
        return Err(OdbcMiddlewareError::ExecutionError(format!(
            "row has {} values for {} columns",
            values.len(),
            columns.len()
        )));
    }
    columns
        .iter()
        .zip(values)
        .map(|(column, raw)| dialect.decode(&column.type_tag, raw))
        .collect()
}

/// Build a decoded result set from driver rows.
///
/// Column names are converted to framework case.
///
/// # Errors
/// Returns `OdbcMiddlewareError` if any row fails to decode.
pub fn build_result_set(
    dialect: &DialectRuleset,
    case: IdentifierCase,
    rows: DriverRows,
) -> Result<ResultSet, OdbcMiddlewareError> {
    let column_names: Vec<String> = rows
        .columns
        .iter()
        .map(|column| case.format_case(&column.name))
        .collect();

    let mut result_set = ResultSet::with_capacity(rows.rows.len());
    result_set.set_column_names(Arc::new(column_names));

    for raw_row in &rows.rows {
        let row_values = decode_row(dialect, &rows.columns, raw_row)?;
        result_set.add_row_values(row_values);
    }

    Ok(result_set)
}
