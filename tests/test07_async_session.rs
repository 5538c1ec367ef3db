use std::sync::Arc;

use odbc_middleware::prelude::*;
use odbc_middleware::test_utils::MockDriver;
use odbc_middleware::test_utils::test_helpers::{builtin_dialects, text_rows};
use tokio::runtime::Runtime;

#[test]
fn async_session_runs_commands_on_worker() -> Result<(), Box<dyn std::error::Error>> {
    let rows = text_rows(
        &[("id", TypeTag::Integer), ("name", TypeTag::WVarChar)],
        &[&[Some("1"), Some("alice")], &[Some("2"), Some("bob")]],
    );
    let driver = MockDriver::product("MySQL")
        .with_rows("SELECT id, name FROM users", rows)
        .with_rows("DELETE FROM users", DriverRows::affected(2))
        .with_error("INSERT INTO users VALUES (1)", "23000 (1062) Duplicate entry '1'");
    let probe = driver.clone();

    let rt = Runtime::new()?;
    rt.block_on(async {
        let session =
            AsyncOdbcSession::open(OdbcOptions::with_dsn("my"), Arc::new(driver), builtin_dialects())
                .await?;
        assert!(session.is_active().await?);
        assert_eq!(session.adapter_name().await?, "MySQL");

        let result = session
            .execute_select("SELECT id, name FROM users".to_string())
            .await?;
        assert_eq!(result.len(), 2);
        assert_eq!(
            result.results[1].get("name"),
            Some(&RowValues::String("bob".into()))
        );

        assert_eq!(session.execute_dml("DELETE FROM users".to_string()).await?, 2);
        let err = session
            .execute_dml("INSERT INTO users VALUES (1)".to_string())
            .await
            .unwrap_err();
        assert!(matches!(err, OdbcMiddlewareError::DuplicateKey(_)));

        let decoded = session
            .decode_row(
                vec![DriverColumn::new("flag", TypeTag::Bit)],
                vec![DriverValue::Bytes(vec![0])],
            )
            .await?;
        assert_eq!(decoded, vec![RowValues::Bool(false)]);

        let translated = session
            .translate_error(DriverError::new("HY000 (3024) timeout"))
            .await?;
        assert!(matches!(translated, OdbcMiddlewareError::QueryTimeout(_)));

        session.disconnect().await?;
        assert!(!session.is_active().await?);
        assert!(matches!(
            session.execute_batch("SELECT 1".to_string()).await,
            Err(OdbcMiddlewareError::ConnectionError(_))
        ));

        session.reconnect().await?;
        assert!(session.is_active().await?);
        Ok::<(), OdbcMiddlewareError>(())
    })?;

    assert_eq!(probe.connect_count(), 2);
    assert_eq!(
        probe.executed(),
        vec![
            "SELECT id, name FROM users".to_string(),
            "DELETE FROM users".to_string(),
            "INSERT INTO users VALUES (1)".to_string(),
        ]
    );
    Ok(())
}

#[test]
fn failed_open_propagates_error() {
    let driver = MockDriver::product("PostgreSQL");
    driver.fail_next_connect("08001 (0) could not connect to server");

    let rt = Runtime::new().unwrap();
    let err = rt
        .block_on(AsyncOdbcSession::open(
            OdbcOptions::with_dsn("pg"),
            Arc::new(driver.clone()),
            builtin_dialects(),
        ))
        .unwrap_err();
    assert!(matches!(err, OdbcMiddlewareError::ConnectionError(_)));
    assert_eq!(driver.connect_count(), 0);
}

#[test]
fn dropping_last_handle_disconnects() {
    let driver = MockDriver::product("Snowflake");
    let session = OdbcSession::open(
        OdbcOptions::with_dsn("sf"),
        Arc::new(driver.clone()),
        builtin_dialects(),
    )
    .unwrap();
    let handle = AsyncOdbcSession::spawn(session).unwrap();
    let clone = handle.clone();

    let rt = Runtime::new().unwrap();
    rt.block_on(async {
        let (metadata, dialect) = clone.describe().await.unwrap();
        assert_eq!(metadata.dbms_name, "Snowflake");
        assert_eq!(dialect.kind(), DialectKind::Snowflake);
    });
    drop(handle);
    drop(clone);

    // The worker thread disconnects after it sees the shutdown.
    for _ in 0..200 {
        if driver.disconnect_count() == 1 {
            break;
        }
        std::thread::sleep(std::time::Duration::from_millis(5));
    }
    assert_eq!(driver.disconnect_count(), 1);
}
