use std::sync::Arc;

use crate::error::OdbcMiddlewareError;
use crate::metadata::IdentifierCase;
use crate::registry::{DecodingRule, TypeRegistry, TypeTag};
use crate::types::DialectKind;

use super::DialectRuleset;

/// Snowflake: upper-case identifiers, wide NUMBER columns, semi-structured types as text.
pub(super) fn ruleset(base: Arc<TypeRegistry>) -> Result<DialectRuleset, OdbcMiddlewareError> {
    let mut builder =
        DialectRuleset::builder(DialectKind::Snowflake.as_str(), DialectKind::Snowflake, base)
            .identifier_quote('"')
            .identifier_case(IdentifierCase::Upper)
            .max_identifier_len(255)
            .register(TypeTag::Numeric, DecodingRule::big_integer(None));
    for name in ["variant", "object", "array"] {
        builder = builder.register_alias(TypeTag::native(name), TypeTag::LongVarChar)?;
    }
    Ok(builder.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::DriverValue;
    use crate::metadata::DatabaseMetadata;
    use crate::types::{RowValues, ValueKind};

    fn snowflake() -> DialectRuleset {
        ruleset(Arc::new(TypeRegistry::base().unwrap())).unwrap()
    }

    #[test]
    fn numeric_is_big_integer() {
        let dialect = snowflake();
        assert_eq!(
            dialect
                .decode(&TypeTag::Numeric, &DriverValue::Text("18446744073709551615".into()))
                .unwrap(),
            RowValues::BigInt(18_446_744_073_709_551_615)
        );
    }

    #[test]
    fn semi_structured_types_are_text() {
        let dialect = snowflake();
        assert_eq!(
            dialect.rule(&TypeTag::native("VARIANT")).unwrap().kind(),
            ValueKind::Text
        );
    }

    #[test]
    fn upper_case_column_quoting() {
        let dialect = snowflake();
        let meta = DatabaseMetadata::new("Snowflake");
        assert_eq!(dialect.quote_column_name(&meta, "name"), "name");
        assert_eq!(dialect.quote_column_name(&meta, "firstName"), "\"firstName\"");
    }
}
