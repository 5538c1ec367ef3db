use std::sync::Arc;

use crate::error::OdbcMiddlewareError;
use crate::registry::decode::hex_bytea;
use crate::registry::{DecodingRule, TypeRegistry, TypeTag};
use crate::types::DialectKind;

use super::{BinaryLiteral, DialectRuleset};

/// PostgreSQL: `bytea` hex output for binary columns, `'t'`/`'f'` booleans.
pub(super) fn ruleset(base: Arc<TypeRegistry>) -> Result<DialectRuleset, OdbcMiddlewareError> {
    let bytea = DecodingRule::binary().with_decoder(hex_bytea);
    Ok(
        DialectRuleset::builder(DialectKind::Postgres.as_str(), DialectKind::Postgres, base)
            .identifier_quote('"')
            .max_identifier_len(63)
            .boolean_literals("'t'", "'f'")
            .binary_literal(BinaryLiteral::EscapedHex)
            .register(TypeTag::Binary, bytea)
            .register(TypeTag::native("bytea"), bytea)
            .register_alias(TypeTag::native("bool"), TypeTag::Boolean)?
            .finish(),
    )
}
