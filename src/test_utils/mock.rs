use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use crate::config::ConnectTarget;
use crate::driver::{DriverConnection, DriverRows, OdbcDriver};
use crate::error::DriverError;
use crate::metadata::DatabaseMetadata;

#[derive(Debug, Default)]
struct MockState {
    metadata: DatabaseMetadata,
    responses: HashMap<String, Result<DriverRows, DriverError>>,
    connect_failures: VecDeque<DriverError>,
    metadata_failures: VecDeque<DriverError>,
    targets: Vec<ConnectTarget>,
    executed: Vec<String>,
    disconnects: usize,
    autocommit: Vec<bool>,
    timeouts: Vec<Option<Duration>>,
    generation: u64,
    killed: bool,
}

/// In-memory driver answering SQL from a script.
///
/// Unscripted SQL succeeds with no rows. Clones share their state, so a test can keep one
/// clone to script and inspect while the session owns another.
#[derive(Debug, Clone, Default)]
pub struct MockDriver {
    state: Arc<Mutex<MockState>>,
}

impl MockDriver {
    /// Driver whose connections report `metadata`.
    #[must_use]
    pub fn new(metadata: DatabaseMetadata) -> Self {
        let driver = Self::default();
        driver.lock().metadata = metadata;
        driver
    }

    /// Driver reporting only a product name.
    #[must_use]
    pub fn product(dbms_name: &str) -> Self {
        Self::new(DatabaseMetadata::new(dbms_name))
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Answer `sql` with `rows`.
    #[must_use]
    pub fn with_rows(self, sql: &str, rows: DriverRows) -> Self {
        self.lock().responses.insert(sql.to_string(), Ok(rows));
        self
    }

    /// Fail `sql` with a driver error carrying `message`.
    #[must_use]
    pub fn with_error(self, sql: &str, message: &str) -> Self {
        self.lock()
            .responses
            .insert(sql.to_string(), Err(DriverError::new(message)));
        self
    }

    /// Make the next connect attempt fail.
    pub fn fail_next_connect(&self, message: &str) {
        self.lock().connect_failures.push_back(DriverError::new(message));
    }

    /// Make the next metadata read fail.
    pub fn fail_next_metadata(&self, message: &str) {
        self.lock().metadata_failures.push_back(DriverError::new(message));
    }

    /// Change what future connections report.
    pub fn set_metadata(&self, metadata: DatabaseMetadata) {
        self.lock().metadata = metadata;
    }

    /// Drop the current connection from the server side.
    pub fn kill_connection(&self) {
        self.lock().killed = true;
    }

    #[must_use]
    pub fn connect_count(&self) -> usize {
        self.lock().targets.len()
    }

    #[must_use]
    pub fn last_target(&self) -> Option<ConnectTarget> {
        self.lock().targets.last().cloned()
    }

    #[must_use]
    pub fn disconnect_count(&self) -> usize {
        self.lock().disconnects
    }

    #[must_use]
    pub fn executed(&self) -> Vec<String> {
        self.lock().executed.clone()
    }

    #[must_use]
    pub fn autocommit_calls(&self) -> Vec<bool> {
        self.lock().autocommit.clone()
    }

    #[must_use]
    pub fn timeout_calls(&self) -> Vec<Option<Duration>> {
        self.lock().timeouts.clone()
    }
}

impl OdbcDriver for MockDriver {
    type Connection = MockConnection;

    fn connect(&self, target: &ConnectTarget) -> Result<MockConnection, DriverError> {
        let mut state = self.lock();
        if let Some(err) = state.connect_failures.pop_front() {
            return Err(err);
        }
        state.targets.push(target.clone());
        state.generation += 1;
        state.killed = false;
        Ok(MockConnection {
            state: Arc::clone(&self.state),
            generation: state.generation,
            open: true,
        })
    }
}

/// Connection handed out by [`MockDriver`].
#[derive(Debug)]
pub struct MockConnection {
    state: Arc<Mutex<MockState>>,
    generation: u64,
    open: bool,
}

impl MockConnection {
    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl DriverConnection for MockConnection {
    fn connected(&self) -> bool {
        if !self.open {
            return false;
        }
        let state = self.lock();
        state.generation == self.generation && !state.killed
    }

    fn disconnect(&mut self) -> Result<(), DriverError> {
        self.open = false;
        self.lock().disconnects += 1;
        Ok(())
    }

    fn execute(&mut self, sql: &str) -> Result<DriverRows, DriverError> {
        let mut state = self.lock();
        state.executed.push(sql.to_string());
        state
            .responses
            .get(sql)
            .cloned()
            .unwrap_or_else(|| Ok(DriverRows::default()))
    }

    fn metadata(&mut self) -> Result<DatabaseMetadata, DriverError> {
        let mut state = self.lock();
        if let Some(err) = state.metadata_failures.pop_front() {
            return Err(err);
        }
        Ok(state.metadata.clone())
    }

    fn set_autocommit(&mut self, enabled: bool) -> Result<(), DriverError> {
        self.lock().autocommit.push(enabled);
        Ok(())
    }

    fn set_query_timeout(&mut self, timeout: Option<Duration>) -> Result<(), DriverError> {
        self.lock().timeouts.push(timeout);
        Ok(())
    }
}
