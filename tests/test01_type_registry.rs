use chrono::NaiveDate;
use odbc_middleware::prelude::*;
use odbc_middleware::registry::initialize_type_map;

fn base() -> TypeRegistry {
    let mut registry = TypeRegistry::new();
    initialize_type_map(&mut registry).unwrap();
    registry
}

#[test]
fn base_map_kinds_and_limits() {
    let registry = base();
    let expected = [
        (TypeTag::Boolean, ValueKind::Boolean, None),
        (TypeTag::Char, ValueKind::String, None),
        (TypeTag::LongVarChar, ValueKind::Text, None),
        (TypeTag::TinyInt, ValueKind::Integer, Some(4)),
        (TypeTag::SmallInt, ValueKind::Integer, Some(8)),
        (TypeTag::Integer, ValueKind::Integer, Some(16)),
        (TypeTag::BigInt, ValueKind::BigInteger, Some(32)),
        (TypeTag::Real, ValueKind::Float, Some(24)),
        (TypeTag::Float, ValueKind::Float, None),
        (TypeTag::Double, ValueKind::Float, Some(53)),
        (TypeTag::Decimal, ValueKind::Float, None),
        (TypeTag::Numeric, ValueKind::Integer, None),
        (TypeTag::Binary, ValueKind::Binary, None),
        (TypeTag::Date, ValueKind::Date, None),
        (TypeTag::DateTime, ValueKind::DateTime, None),
        (TypeTag::Time, ValueKind::Time, None),
        (TypeTag::Timestamp, ValueKind::DateTime, None),
        (TypeTag::Guid, ValueKind::String, None),
    ];
    for (tag, kind, limit) in expected {
        let rule = registry.rule(&tag).unwrap();
        assert_eq!(rule.kind(), kind, "{tag}");
        assert_eq!(rule.limit(), limit, "{tag}");
    }
    assert_eq!(registry.rule(&TypeTag::Integer).unwrap().sql_type(), "integer(16)");
}

#[test]
fn aliases_decode_like_their_targets() {
    let registry = base();
    let cases = [
        (TypeTag::Bit, TypeTag::Boolean, DriverValue::Text("1".into())),
        (TypeTag::VarChar, TypeTag::Char, DriverValue::Text("abc".into())),
        (TypeTag::WChar, TypeTag::Char, DriverValue::Text("é".into())),
        (TypeTag::WVarChar, TypeTag::Char, DriverValue::Text("x".into())),
        (TypeTag::WLongVarChar, TypeTag::LongVarChar, DriverValue::Text("long".into())),
        (TypeTag::VarBinary, TypeTag::Binary, DriverValue::Bytes(vec![1, 2])),
        (TypeTag::LongVarBinary, TypeTag::Binary, DriverValue::Bytes(vec![3])),
        (TypeTag::TypeDate, TypeTag::Date, DriverValue::Text("2024-01-02".into())),
        (TypeTag::TypeTime, TypeTag::Time, DriverValue::Text("10:11:12".into())),
        (
            TypeTag::TypeTimestamp,
            TypeTag::Timestamp,
            DriverValue::Text("2024-01-02 10:11:12".into()),
        ),
    ];
    for (alias, target, raw) in cases {
        assert_eq!(registry.alias_target(&alias), Some(&target), "{alias}");
        assert_eq!(
            registry.lookup(&alias, &raw).unwrap(),
            registry.lookup(&target, &raw).unwrap(),
            "{alias}"
        );
    }
}

#[test]
fn unregistered_tag_is_a_decode_error() {
    let registry = base();
    let err = registry
        .lookup(&TypeTag::Code(-152), &DriverValue::Text("x".into()))
        .unwrap_err();
    assert!(matches!(
        err,
        OdbcMiddlewareError::DecodeError { tag: TypeTag::Code(-152), .. }
    ));
    assert!(!registry.contains(&TypeTag::native("geometry")));
}

#[test]
fn null_decodes_to_null_for_every_tag() {
    let registry = base();
    for tag in registry.tags() {
        assert_eq!(registry.lookup(&tag, &DriverValue::Null).unwrap(), RowValues::Null);
    }
}

#[test]
fn text_values_decode_to_their_kinds() {
    let registry = base();
    assert_eq!(
        registry.lookup(&TypeTag::Integer, &"42".into()).unwrap(),
        RowValues::Int(42)
    );
    assert_eq!(
        registry.lookup(&TypeTag::Numeric, &"123.99".into()).unwrap(),
        RowValues::Int(123)
    );
    assert_eq!(
        registry
            .lookup(&TypeTag::BigInt, &"18446744073709551615".into())
            .unwrap(),
        RowValues::BigInt(18_446_744_073_709_551_615)
    );
    assert_eq!(
        registry.lookup(&TypeTag::Decimal, &"1.5".into()).unwrap(),
        RowValues::Float(1.5)
    );
    assert_eq!(
        registry.lookup(&TypeTag::TypeDate, &"2023-12-31".into()).unwrap(),
        RowValues::Date(NaiveDate::from_ymd_opt(2023, 12, 31).unwrap())
    );
    assert_eq!(
        registry.lookup(&TypeTag::Bit, &DriverValue::Int(0)).unwrap(),
        RowValues::Bool(false)
    );
    assert_eq!(
        registry.lookup(&TypeTag::LongVarChar, &"body".into()).unwrap(),
        RowValues::Text("body".into())
    );
}

#[test]
fn unconvertible_values_are_never_coerced() {
    let registry = base();
    for (tag, raw) in [
        (TypeTag::Integer, DriverValue::Text("forty-two".into())),
        (TypeTag::Boolean, DriverValue::Text("maybe".into())),
        (TypeTag::Date, DriverValue::Text("31/12/2023".into())),
        (TypeTag::Integer, DriverValue::Text("99999999999999999999".into())),
    ] {
        let err = registry.lookup(&tag, &raw).unwrap_err();
        assert!(matches!(err, OdbcMiddlewareError::DecodeError { .. }), "{tag}");
    }
}

#[test]
fn overlay_registration_is_validated() {
    let base = std::sync::Arc::new(base());
    let mut overlay = TypeRegistry::overlay(base);
    assert!(overlay.register_alias(TypeTag::native("int4"), TypeTag::Integer).is_ok());
    assert!(matches!(
        overlay.register_alias(TypeTag::native("serial"), TypeTag::VarChar),
        Err(OdbcMiddlewareError::RegistryError(_))
    ));
    assert!(matches!(
        overlay.register_alias(TypeTag::Char, TypeTag::LongVarChar),
        Err(OdbcMiddlewareError::RegistryError(_))
    ));
    assert_eq!(
        overlay.lookup(&TypeTag::native("INT4"), &"7".into()).unwrap(),
        RowValues::Int(7)
    );
}
