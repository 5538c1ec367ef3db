// Test utilities
//
// - mock: scripted in-memory driver
// - test_helpers: small constructors for rows and metadata

mod mock;
pub mod test_helpers;

pub use mock::{MockConnection, MockDriver};
