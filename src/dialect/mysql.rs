use std::sync::Arc;

use crate::error::OdbcMiddlewareError;
use crate::registry::decode::bit_byte;
use crate::registry::{DecodingRule, TypeRegistry, TypeTag};
use crate::types::DialectKind;

use super::{DialectRuleset, ErrorRules};

/// MySQL and MariaDB.
///
/// Backtick quoting, backslash escapes in strings, `1`/`0` booleans and single-byte `BIT`
/// payloads. Native errors 1062 and 3024 classify as duplicate key and timeout.
pub(super) fn ruleset(base: Arc<TypeRegistry>) -> Result<DialectRuleset, OdbcMiddlewareError> {
    Ok(
        DialectRuleset::builder(DialectKind::Mysql.as_str(), DialectKind::Mysql, base)
            .identifier_quote('`')
            .max_identifier_len(64)
            .boolean_literals("1", "0")
            .escape_backslashes(true)
            .register(TypeTag::Bit, DecodingRule::boolean().with_decoder(bit_byte))
            .register_alias(TypeTag::native("tinyint(1)"), TypeTag::Boolean)?
            .error_rules(
                ErrorRules::default()
                    .with_native_duplicate_code(1062)
                    .with_native_timeout_code(3024)
                    .with_duplicate_pattern("Duplicate entry")
                    .with_timeout_pattern("maximum statement execution time exceeded"),
            )
            .finish(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::DriverValue;
    use crate::dialect::ErrorKind;
    use crate::metadata::DatabaseMetadata;
    use crate::types::RowValues;

    fn mysql() -> DialectRuleset {
        ruleset(Arc::new(TypeRegistry::base().unwrap())).unwrap()
    }

    #[test]
    fn quoting_and_escaping() {
        let dialect = mysql();
        let meta = DatabaseMetadata::new("MySQL").with_identifier_quote_char(Some('"'));
        assert_eq!(dialect.quote_identifier(&meta, "order"), "`order`");
        assert_eq!(dialect.quoted_literal("a\\'b"), "'a\\\\''b'");
        assert_eq!(dialect.quote_boolean(true), "1");
    }

    #[test]
    fn bit_bytes_decode_as_booleans() {
        let dialect = mysql();
        assert_eq!(
            dialect.decode(&TypeTag::Bit, &DriverValue::Bytes(vec![1])).unwrap(),
            RowValues::Bool(true)
        );
        assert_eq!(
            dialect.decode(&TypeTag::Bit, &DriverValue::Text("0".into())).unwrap(),
            RowValues::Bool(false)
        );
    }

    #[test]
    fn native_error_codes() {
        let dialect = mysql();
        assert_eq!(
            dialect.classify_error("23000 (1062) Duplicate entry 'a' for key 'name'"),
            ErrorKind::DuplicateKey
        );
        assert_eq!(
            dialect.classify_error("HY000 (3024) Query execution was interrupted"),
            ErrorKind::QueryTimeout
        );
        assert_eq!(dialect.classify_error("23505 dup"), ErrorKind::DuplicateKey);
    }
}
