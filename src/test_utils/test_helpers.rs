//! Helper utilities for testing and development.

use std::sync::Arc;

use crate::dialect::DialectRegistry;
use crate::driver::{DriverColumn, DriverRows, DriverValue};
use crate::registry::TypeTag;

/// Driver rows from `(name, tag)` column pairs and raw text cells; `None` is NULL.
#[must_use]
pub fn text_rows(columns: &[(&str, TypeTag)], rows: &[&[Option<&str>]]) -> DriverRows {
    let columns = columns
        .iter()
        .map(|(name, tag)| DriverColumn::new(*name, tag.clone()))
        .collect();
    let rows = rows
        .iter()
        .map(|row| {
            row.iter()
                .map(|cell| cell.map_or(DriverValue::Null, DriverValue::from))
                .collect()
        })
        .collect();
    DriverRows::new(columns, rows)
}

/// Dialect table with the built-in patterns.
///
/// # Panics
/// Panics if the built-in rulesets cannot be built.
#[must_use]
pub fn builtin_dialects() -> Arc<DialectRegistry> {
    Arc::new(DialectRegistry::with_builtins().expect("built-in dialects"))
}
