// Decoded query results
//
// - row: one decoded row with name lookup
// - result_set: rows of one select plus the affected-row count

mod result_set;
mod row;

pub use result_set::ResultSet;
pub use row::CustomDbRow;
