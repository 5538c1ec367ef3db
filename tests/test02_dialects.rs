use std::sync::Arc;

use chrono::NaiveDate;
use odbc_middleware::prelude::*;

fn builtin(kind: DialectKind) -> DialectRuleset {
    let base = Arc::new(TypeRegistry::base().unwrap());
    DialectRuleset::builtin(kind, base).unwrap()
}

#[test]
fn boolean_literals_per_dialect() {
    let cases = [
        (DialectKind::Generic, "TRUE", "FALSE"),
        (DialectKind::Mysql, "1", "0"),
        (DialectKind::Postgres, "'t'", "'f'"),
        (DialectKind::Snowflake, "TRUE", "FALSE"),
    ];
    for (kind, t, f) in cases {
        let dialect = builtin(kind);
        assert_eq!(dialect.quote_boolean(true), t, "{kind:?}");
        assert_eq!(dialect.quote_boolean(false), f, "{kind:?}");
    }
}

#[test]
fn identifier_quoting_per_dialect() {
    let meta = DatabaseMetadata::new("whatever");
    assert_eq!(
        builtin(DialectKind::Generic).quote_identifier(&meta, "my\"col"),
        "\"my\"\"col\""
    );
    assert_eq!(
        builtin(DialectKind::Mysql).quote_identifier(&meta, "select"),
        "`select`"
    );
    assert_eq!(
        builtin(DialectKind::Postgres).quote_table_name(&meta, "public.users"),
        "\"public\".\"users\""
    );
    assert_eq!(
        builtin(DialectKind::Snowflake).quote_table_name(&meta, "PUBLIC.Users"),
        "PUBLIC.\"Users\""
    );
}

#[test]
fn string_escaping() {
    assert_eq!(
        builtin(DialectKind::Generic).quoted_literal("O'Brien \\ co"),
        "'O''Brien \\ co'"
    );
    assert_eq!(
        builtin(DialectKind::Mysql).quoted_literal("O'Brien \\ co"),
        "'O''Brien \\\\ co'"
    );
}

#[test]
fn value_literals() {
    let dialect = builtin(DialectKind::Generic);
    let date = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
    assert_eq!(dialect.quote_value(&RowValues::Date(date)), "'2024-02-29'");
    assert_eq!(
        dialect.quote_value(&RowValues::Timestamp(date.and_hms_opt(8, 30, 0).unwrap())),
        "'2024-02-29 08:30:00'"
    );
    assert_eq!(dialect.quote_value(&RowValues::Int(-3)), "-3");
    assert_eq!(dialect.quote_value(&RowValues::BigInt(1 << 70)), (1_i128 << 70).to_string());
    assert_eq!(dialect.quote_value(&RowValues::Text("a'b".into())), "'a''b'");
    assert_eq!(
        builtin(DialectKind::Postgres).quote_value(&RowValues::Blob(vec![0xde, 0xad])),
        "'\\xdead'"
    );
    assert_eq!(
        builtin(DialectKind::Mysql).quote_value(&RowValues::Blob(vec![0xde, 0xad])),
        "X'dead'"
    );
}

#[test]
fn identifier_limits() {
    let meta = DatabaseMetadata::new("whatever");
    assert_eq!(builtin(DialectKind::Mysql).table_alias_length(&meta), 64);
    assert_eq!(builtin(DialectKind::Postgres).index_name_length(&meta), 63);
    assert_eq!(builtin(DialectKind::Snowflake).index_name_length(&meta), 255);
    let reported = meta.with_max_identifier_len(Some(30));
    assert_eq!(builtin(DialectKind::Postgres).table_alias_length(&reported), 30);
}

#[test]
fn overrides_shadow_the_base_map() {
    let postgres = builtin(DialectKind::Postgres);
    let generic = builtin(DialectKind::Generic);
    let raw = DriverValue::Text("\\x41".into());
    assert_eq!(
        postgres.decode(&TypeTag::LongVarBinary, &raw).unwrap(),
        RowValues::Blob(vec![0x41])
    );
    assert_eq!(
        generic.decode(&TypeTag::LongVarBinary, &raw).unwrap(),
        RowValues::Blob(b"\\x41".to_vec())
    );

    let snowflake = builtin(DialectKind::Snowflake);
    assert_eq!(snowflake.rule(&TypeTag::Numeric).unwrap().kind(), ValueKind::BigInteger);
    assert_eq!(generic.rule(&TypeTag::Numeric).unwrap().kind(), ValueKind::Integer);
}

#[test]
fn custom_ruleset_from_builder() {
    let base = Arc::new(TypeRegistry::base().unwrap());
    let dialect = DialectRuleset::builder("Virtuoso", DialectKind::Generic, base)
        .identifier_quote('"')
        .max_identifier_len(100)
        .boolean_literals("1", "0")
        .register(TypeTag::Decimal, DecodingRule::integer(None))
        .register_alias(TypeTag::native("any"), TypeTag::LongVarChar)
        .unwrap()
        .finish();
    assert_eq!(dialect.name(), "Virtuoso");
    assert_eq!(
        dialect.decode(&TypeTag::Decimal, &"10.9".into()).unwrap(),
        RowValues::Int(10)
    );
    assert_eq!(
        dialect.decode(&TypeTag::native("ANY"), &"x".into()).unwrap(),
        RowValues::Text("x".into())
    );
    assert_eq!(dialect.quote_boolean(true), "1");
}
