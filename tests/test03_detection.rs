use std::sync::Arc;

use odbc_middleware::prelude::*;

#[test]
fn builtin_detection_is_deterministic_and_total() {
    let registry = DialectRegistry::with_builtins().unwrap();
    let cases = [
        ("MySQL", DialectKind::Mysql),
        ("mysql 8.0.36", DialectKind::Mysql),
        ("MariaDB", DialectKind::Mysql),
        ("PostgreSQL", DialectKind::Postgres),
        ("EnterpriseDB Postgres Advanced Server", DialectKind::Postgres),
        ("Snowflake", DialectKind::Snowflake),
        ("OpenLink Virtuoso", DialectKind::Generic),
        ("Microsoft SQL Server", DialectKind::Generic),
        ("", DialectKind::Generic),
    ];
    for (product, kind) in cases {
        let first = registry.detect(&DatabaseMetadata::new(product));
        let second = registry.detect(&DatabaseMetadata::new(product));
        assert_eq!(first.kind(), kind, "{product}");
        assert!(Arc::ptr_eq(&first, &second), "{product}");
    }
}

#[test]
fn first_registered_pattern_wins() {
    let mut registry = DialectRegistry::with_builtins().unwrap();
    let base = registry.base();
    let custom = DialectRuleset::builder("Aurora", DialectKind::Generic, base)
        .boolean_literals("yes", "no")
        .finish();
    registry.register("aurora", custom).unwrap();

    // "Aurora MySQL" hits the built-in MySQL pattern first.
    assert_eq!(registry.detect_product("Aurora MySQL").kind(), DialectKind::Mysql);
    assert_eq!(registry.detect_product("AURORA").name(), "Aurora");
}

#[test]
fn empty_registry_always_falls_back() {
    let registry = DialectRegistry::new().unwrap();
    assert_eq!(registry.detect_product("PostgreSQL").kind(), DialectKind::Generic);
    assert!(registry.by_kind(DialectKind::Postgres).is_none());
    assert_eq!(
        registry.by_kind(DialectKind::Generic).map(|d| d.kind()),
        Some(DialectKind::Generic)
    );
}

#[test]
fn regex_patterns_are_supported() {
    let mut registry = DialectRegistry::new().unwrap();
    let base = registry.base();
    let ruleset = DialectRuleset::builtin(DialectKind::Postgres, base).unwrap();
    registry.register(r"^(greenplum|redshift)\b", ruleset).unwrap();
    assert_eq!(registry.detect_product("Redshift 1.0").kind(), DialectKind::Postgres);
    assert_eq!(registry.detect_product("Amazon Redshift").kind(), DialectKind::Generic);
}

#[test]
fn literal_patterns_match_metacharacters_verbatim() {
    let mut registry = DialectRegistry::new().unwrap();
    let base = registry.base();
    let custom = DialectRuleset::builder("Acme", DialectKind::Generic, base)
        .boolean_literals("1", "0")
        .finish();
    registry.register_literal("Acme SQL (C++)", custom).unwrap();

    assert_eq!(registry.detect_product("acme sql (c++) 2.1").name(), "Acme");
    assert_eq!(registry.detect_product("Acme SQL C").name(), "ODBC");
    assert!(matches!(
        DialectRegistry::new()
            .unwrap()
            .register("Acme SQL (C++", registry.fallback().as_ref().clone()),
        Err(OdbcMiddlewareError::ConfigError(_))
    ));
}
