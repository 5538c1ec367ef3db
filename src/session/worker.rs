use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;

use tokio::sync::oneshot;
use tracing::{debug, warn};

use crate::config::OdbcOptions;
use crate::dialect::{DialectRegistry, DialectRuleset};
use crate::driver::{DriverColumn, DriverValue, OdbcDriver};
use crate::error::{DriverError, OdbcMiddlewareError};
use crate::metadata::DatabaseMetadata;
use crate::results::ResultSet;
use crate::types::RowValues;

use super::OdbcSession;

static WORKER_IDS: AtomicU64 = AtomicU64::new(1);

/// Async handle to a session owned by a dedicated worker thread.
///
/// Commands run on the worker one at a time, in the order they were sent. Cloning the handle
/// shares the same worker; the worker disconnects and exits when the last clone is dropped.
#[derive(Clone)]
pub struct AsyncOdbcSession {
    worker: Arc<SessionWorker>,
}

impl AsyncOdbcSession {
    /// Open a session on a new worker thread.
    ///
    /// # Errors
    /// Returns any error from [`OdbcSession::open`], or `OdbcMiddlewareError::ConnectionError`
    /// if the worker thread cannot be spawned.
    pub async fn open<D>(
        options: OdbcOptions,
        driver: Arc<D>,
        dialects: Arc<DialectRegistry>,
    ) -> Result<Self, OdbcMiddlewareError>
    where
        D: OdbcDriver + 'static,
        D::Connection: 'static,
    {
        let (tx, rx) = oneshot::channel();
        let worker = SessionWorker::spawn_with(move || {
            let outcome = OdbcSession::open(options, driver, dialects);
            match outcome {
                Ok(session) => {
                    let _ = tx.send(Ok(()));
                    Some(session)
                }
                Err(err) => {
                    let _ = tx.send(Err(err));
                    None
                }
            }
        })?;
        rx.await.map_err(|_| {
            OdbcMiddlewareError::ConnectionError("ODBC worker dropped while opening".into())
        })??;
        Ok(Self {
            worker: Arc::new(worker),
        })
    }

    /// Move an already open session onto a worker thread.
    ///
    /// # Errors
    /// Returns `OdbcMiddlewareError::ConnectionError` if the worker thread cannot be spawned.
    pub fn spawn<D>(session: OdbcSession<D>) -> Result<Self, OdbcMiddlewareError>
    where
        D: OdbcDriver + 'static,
        D::Connection: 'static,
    {
        let worker = SessionWorker::spawn_with(move || Some(session))?;
        Ok(Self {
            worker: Arc::new(worker),
        })
    }

    /// # Errors
    /// Propagates any error from [`OdbcSession::execute_select`] or from the worker channel.
    pub async fn execute_select(&self, sql: String) -> Result<ResultSet, OdbcMiddlewareError> {
        self.worker
            .request("executing select", |respond_to| Command::ExecuteSelect {
                sql,
                respond_to,
            })
            .await?
    }

    /// # Errors
    /// Propagates any error from [`OdbcSession::execute_dml`] or from the worker channel.
    pub async fn execute_dml(&self, sql: String) -> Result<usize, OdbcMiddlewareError> {
        self.worker
            .request("executing dml", |respond_to| Command::ExecuteDml { sql, respond_to })
            .await?
    }

    /// # Errors
    /// Propagates any error from [`OdbcSession::execute_batch`] or from the worker channel.
    pub async fn execute_batch(&self, sql: String) -> Result<(), OdbcMiddlewareError> {
        self.worker
            .request("executing batch", |respond_to| Command::ExecuteBatch {
                sql,
                respond_to,
            })
            .await?
    }

    /// # Errors
    /// Returns `OdbcMiddlewareError::ConnectionError` if the worker is gone.
    pub async fn is_active(&self) -> Result<bool, OdbcMiddlewareError> {
        self.worker
            .request("checking liveness", |respond_to| Command::IsActive { respond_to })
            .await
    }

    /// # Errors
    /// Propagates any error from [`OdbcSession::reconnect`] or from the worker channel.
    pub async fn reconnect(&self) -> Result<(), OdbcMiddlewareError> {
        self.worker
            .request("reconnecting", |respond_to| Command::Reconnect { respond_to })
            .await?
    }

    /// # Errors
    /// Propagates any error from [`OdbcSession::disconnect`] or from the worker channel.
    pub async fn disconnect(&self) -> Result<(), OdbcMiddlewareError> {
        self.worker
            .request("disconnecting", |respond_to| Command::Disconnect { respond_to })
            .await?
    }

    /// # Errors
    /// Propagates any error from [`OdbcSession::set_autocommit`] or from the worker channel.
    pub async fn set_autocommit(&self, enabled: bool) -> Result<(), OdbcMiddlewareError> {
        self.worker
            .request("setting autocommit", |respond_to| Command::SetAutocommit {
                enabled,
                respond_to,
            })
            .await?
    }

    /// # Errors
    /// Propagates any error from [`OdbcSession::set_query_timeout`] or from the worker channel.
    pub async fn set_query_timeout(
        &self,
        timeout: Option<Duration>,
    ) -> Result<(), OdbcMiddlewareError> {
        self.worker
            .request("setting query timeout", |respond_to| Command::SetQueryTimeout {
                timeout,
                respond_to,
            })
            .await?
    }

    /// # Errors
    /// Propagates any error from [`OdbcSession::decode_row`] or from the worker channel.
    pub async fn decode_row(
        &self,
        columns: Vec<DriverColumn>,
        values: Vec<DriverValue>,
    ) -> Result<Vec<RowValues>, OdbcMiddlewareError> {
        self.worker
            .request("decoding row", |respond_to| Command::DecodeRow {
                columns,
                values,
                respond_to,
            })
            .await?
    }

    /// # Errors
    /// Returns `OdbcMiddlewareError::ConnectionError` if the worker is gone.
    pub async fn translate_error(
        &self,
        error: DriverError,
    ) -> Result<OdbcMiddlewareError, OdbcMiddlewareError> {
        self.worker
            .request("translating error", |respond_to| Command::TranslateError {
                error,
                respond_to,
            })
            .await
    }

    /// Metadata and dialect of the current connection.
    ///
    /// # Errors
    /// Returns `OdbcMiddlewareError::ConnectionError` if the worker is gone.
    pub async fn describe(
        &self,
    ) -> Result<(DatabaseMetadata, Arc<DialectRuleset>), OdbcMiddlewareError> {
        self.worker
            .request("describing session", |respond_to| Command::Describe { respond_to })
            .await
    }

    /// # Errors
    /// Returns `OdbcMiddlewareError::ConnectionError` if the worker is gone.
    pub async fn adapter_name(&self) -> Result<String, OdbcMiddlewareError> {
        let (_, dialect) = self.describe().await?;
        Ok(dialect.name().to_string())
    }
}

impl fmt::Debug for AsyncOdbcSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AsyncOdbcSession")
            .field("worker_id", &self.worker.id)
            .finish()
    }
}

struct SessionWorker {
    sender: Sender<Command>,
    id: u64,
}

impl SessionWorker {
    fn spawn_with<D, F>(init: F) -> Result<Self, OdbcMiddlewareError>
    where
        D: OdbcDriver + 'static,
        D::Connection: 'static,
        F: FnOnce() -> Option<OdbcSession<D>> + Send + 'static,
    {
        let (sender, receiver) = mpsc::channel::<Command>();
        let id = WORKER_IDS.fetch_add(1, Ordering::Relaxed);
        thread::Builder::new()
            .name(format!("odbc-worker-{id}"))
            .spawn(move || {
                let Some(mut session) = init() else {
                    return;
                };
                debug!(worker = id, "ODBC worker started");
                run_session_worker(&mut session, &receiver);
                if let Err(err) = session.disconnect() {
                    warn!(worker = id, error = %err, "ODBC worker failed to disconnect");
                }
                debug!(worker = id, "ODBC worker stopped");
            })
            .map_err(|err| {
                OdbcMiddlewareError::ConnectionError(format!(
                    "failed to spawn ODBC worker thread: {err}"
                ))
            })?;
        Ok(Self { sender, id })
    }

    async fn request<T>(
        &self,
        action: &str,
        command: impl FnOnce(oneshot::Sender<T>) -> Command,
    ) -> Result<T, OdbcMiddlewareError> {
        let (tx, rx) = oneshot::channel();
        self.sender
            .send(command(tx))
            .map_err(|_| OdbcMiddlewareError::ConnectionError("ODBC worker closed".into()))?;
        rx.await.map_err(|_| {
            OdbcMiddlewareError::ConnectionError(format!("ODBC worker dropped while {action}"))
        })
    }
}

impl Drop for SessionWorker {
    fn drop(&mut self) {
        let _ = self.sender.send(Command::Shutdown);
    }
}

type Reply<T> = oneshot::Sender<Result<T, OdbcMiddlewareError>>;

enum Command {
    ExecuteSelect {
        sql: String,
        respond_to: Reply<ResultSet>,
    },
    ExecuteDml {
        sql: String,
        respond_to: Reply<usize>,
    },
    ExecuteBatch {
        sql: String,
        respond_to: Reply<()>,
    },
    IsActive {
        respond_to: oneshot::Sender<bool>,
    },
    Reconnect {
        respond_to: Reply<()>,
    },
    Disconnect {
        respond_to: Reply<()>,
    },
    SetAutocommit {
        enabled: bool,
        respond_to: Reply<()>,
    },
    SetQueryTimeout {
        timeout: Option<Duration>,
        respond_to: Reply<()>,
    },
    DecodeRow {
        columns: Vec<DriverColumn>,
        values: Vec<DriverValue>,
        respond_to: Reply<Vec<RowValues>>,
    },
    TranslateError {
        error: DriverError,
        respond_to: oneshot::Sender<OdbcMiddlewareError>,
    },
    Describe {
        respond_to: oneshot::Sender<(DatabaseMetadata, Arc<DialectRuleset>)>,
    },
    Shutdown,
}

fn run_session_worker<D: OdbcDriver>(session: &mut OdbcSession<D>, receiver: &Receiver<Command>) {
    while let Ok(command) = receiver.recv() {
        match command {
            Command::ExecuteSelect { sql, respond_to } => {
                let _ = respond_to.send(session.execute_select(&sql));
            }
            Command::ExecuteDml { sql, respond_to } => {
                let _ = respond_to.send(session.execute_dml(&sql));
            }
            Command::ExecuteBatch { sql, respond_to } => {
                let _ = respond_to.send(session.execute_batch(&sql));
            }
            Command::IsActive { respond_to } => {
                let _ = respond_to.send(session.is_active());
            }
            Command::Reconnect { respond_to } => {
                let _ = respond_to.send(session.reconnect());
            }
            Command::Disconnect { respond_to } => {
                let _ = respond_to.send(session.disconnect());
            }
            Command::SetAutocommit {
                enabled,
                respond_to,
            } => {
                let _ = respond_to.send(session.set_autocommit(enabled));
            }
            Command::SetQueryTimeout {
                timeout,
                respond_to,
            } => {
                let _ = respond_to.send(session.set_query_timeout(timeout));
            }
            Command::DecodeRow {
                columns,
                values,
                respond_to,
            } => {
                let _ = respond_to.send(session.decode_row(&columns, &values));
            }
            Command::TranslateError { error, respond_to } => {
                let _ = respond_to.send(session.translate_error(error));
            }
            Command::Describe { respond_to } => {
                let described = (session.metadata().clone(), Arc::clone(session.dialect()));
                let _ = respond_to.send(described);
            }
            Command::Shutdown => break,
        }
    }
}
