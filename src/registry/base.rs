use crate::error::OdbcMiddlewareError;

use super::{DecodingRule, TypeRegistry, TypeTag};

/// Populate `map` with the base ODBC type map.
///
/// Integer limits follow the framework's conventions (`4`, `8`, `16`, `32`), not byte widths.
///
/// # Errors
/// Returns `OdbcMiddlewareError::RegistryError` if an alias cannot be installed, which only
/// happens when `map` already holds conflicting aliases.
pub fn initialize_type_map(map: &mut TypeRegistry) -> Result<(), OdbcMiddlewareError> {
    map.register(TypeTag::Boolean, DecodingRule::boolean());
    map.register(TypeTag::Char, DecodingRule::string());
    map.register(TypeTag::LongVarChar, DecodingRule::text());
    map.register(TypeTag::TinyInt, DecodingRule::integer(Some(4)));
    map.register(TypeTag::SmallInt, DecodingRule::integer(Some(8)));
    map.register(TypeTag::Integer, DecodingRule::integer(Some(16)));
    map.register(TypeTag::BigInt, DecodingRule::big_integer(Some(32)));
    map.register(TypeTag::Real, DecodingRule::float(Some(24)));
    map.register(TypeTag::Float, DecodingRule::float(None));
    map.register(TypeTag::Double, DecodingRule::float(Some(53)));
    map.register(TypeTag::Decimal, DecodingRule::float(None));
    map.register(TypeTag::Numeric, DecodingRule::integer(None));
    map.register(TypeTag::Binary, DecodingRule::binary());
    map.register(TypeTag::Date, DecodingRule::date());
    map.register(TypeTag::DateTime, DecodingRule::datetime());
    map.register(TypeTag::Time, DecodingRule::time());
    map.register(TypeTag::Timestamp, DecodingRule::datetime());
    map.register(TypeTag::Guid, DecodingRule::string());

    map.register_alias(TypeTag::Bit, TypeTag::Boolean)?;
    map.register_alias(TypeTag::VarChar, TypeTag::Char)?;
    map.register_alias(TypeTag::WChar, TypeTag::Char)?;
    map.register_alias(TypeTag::WVarChar, TypeTag::Char)?;
    map.register_alias(TypeTag::WLongVarChar, TypeTag::LongVarChar)?;
    map.register_alias(TypeTag::VarBinary, TypeTag::Binary)?;
    map.register_alias(TypeTag::LongVarBinary, TypeTag::Binary)?;
    map.register_alias(TypeTag::TypeDate, TypeTag::Date)?;
    map.register_alias(TypeTag::TypeTime, TypeTag::Time)?;
    map.register_alias(TypeTag::TypeTimestamp, TypeTag::Timestamp)?;
    Ok(())
}
