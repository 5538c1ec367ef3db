use std::collections::HashMap;
use std::sync::Arc;

use crate::types::RowValues;

/// A decoded row from a query result.
///
/// Column names and the name-to-index map are shared by every row of the same result set.
#[derive(Debug, Clone)]
pub struct CustomDbRow {
    /// The column names for this row (shared across all rows in a result set)
    pub column_names: Arc<Vec<String>>,
    /// The decoded values, in column order
    pub rows: Vec<RowValues>,
    #[doc(hidden)]
    pub(crate) column_index_cache: Arc<HashMap<String, usize>>,
}

impl CustomDbRow {
    /// Create a row, building its own column index.
    #[must_use]
    pub fn new(column_names: Arc<Vec<String>>, rows: Vec<RowValues>) -> Self {
        let cache = Arc::new(index_columns(&column_names));
        Self {
            column_names,
            rows,
            column_index_cache: cache,
        }
    }

    pub(crate) fn with_cache(
        column_names: Arc<Vec<String>>,
        column_index_cache: Arc<HashMap<String, usize>>,
        rows: Vec<RowValues>,
    ) -> Self {
        Self {
            column_names,
            rows,
            column_index_cache,
        }
    }

    /// Index of `column_name`. Exact match first, then case-insensitive.
    #[must_use]
    pub fn get_column_index(&self, column_name: &str) -> Option<usize> {
        if let Some(&idx) = self.column_index_cache.get(column_name) {
            return Some(idx);
        }
        self.column_names
            .iter()
            .position(|col| col.eq_ignore_ascii_case(column_name))
    }

    /// Value of `column_name`, or `None` if the row has no such column.
    #[must_use]
    pub fn get(&self, column_name: &str) -> Option<&RowValues> {
        self.get_column_index(column_name)
            .and_then(|idx| self.rows.get(idx))
    }

    #[must_use]
    pub fn get_by_index(&self, index: usize) -> Option<&RowValues> {
        self.rows.get(index)
    }
}

/// First occurrence wins when a name repeats.
pub(crate) fn index_columns(column_names: &[String]) -> HashMap<String, usize> {
    let mut cache = HashMap::with_capacity(column_names.len());
    for (i, name) in column_names.iter().enumerate() {
        cache.entry(name.clone()).or_insert(i);
    }
    cache
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_by_name_falls_back_to_case_insensitive() {
        let names = Arc::new(vec!["ID".to_string(), "name".to_string(), "ID".to_string()]);
        let row = CustomDbRow::new(
            names,
            vec![RowValues::Int(1), RowValues::Null, RowValues::Int(2)],
        );
        assert_eq!(row.get("ID"), Some(&RowValues::Int(1)));
        assert_eq!(row.get("Name"), Some(&RowValues::Null));
        assert_eq!(row.get_column_index("missing"), None);
        assert_eq!(row.get_by_index(2), Some(&RowValues::Int(2)));
    }
}
