use std::fmt;

/// Type identifier reported by the driver for a result column.
///
/// The named variants are the ODBC SQL data types. `Native` carries a product-specific type
/// name (always lower-cased), `Code` an ODBC type code with no named variant.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TypeTag {
    /// Framework boolean; has no ODBC code of its own.
    Boolean,
    Char,
    VarChar,
    LongVarChar,
    WChar,
    WVarChar,
    WLongVarChar,
    Bit,
    TinyInt,
    SmallInt,
    Integer,
    BigInt,
    Real,
    Float,
    Double,
    Decimal,
    Numeric,
    Binary,
    VarBinary,
    LongVarBinary,
    Date,
    DateTime,
    Time,
    Timestamp,
    TypeDate,
    TypeTime,
    TypeTimestamp,
    Guid,
    Code(i16),
    Native(String),
}

impl TypeTag {
    /// Tag for a product-specific type name.
    #[must_use]
    pub fn native(name: impl AsRef<str>) -> Self {
        TypeTag::Native(name.as_ref().trim().to_ascii_lowercase())
    }

    /// Map an ODBC SQL type code to its tag.
    ///
    /// Code 9 is shared by `SQL_DATE` and `SQL_DATETIME`; it resolves to `DateTime`.
    #[must_use]
    pub fn from_code(code: i16) -> Self {
        match code {
            1 => TypeTag::Char,
            2 => TypeTag::Numeric,
            3 => TypeTag::Decimal,
            4 => TypeTag::Integer,
            5 => TypeTag::SmallInt,
            6 => TypeTag::Float,
            7 => TypeTag::Real,
            8 => TypeTag::Double,
            9 => TypeTag::DateTime,
            10 => TypeTag::Time,
            11 => TypeTag::Timestamp,
            12 => TypeTag::VarChar,
            91 => TypeTag::TypeDate,
            92 => TypeTag::TypeTime,
            93 => TypeTag::TypeTimestamp,
            -1 => TypeTag::LongVarChar,
            -2 => TypeTag::Binary,
            -3 => TypeTag::VarBinary,
            -4 => TypeTag::LongVarBinary,
            -5 => TypeTag::BigInt,
            -6 => TypeTag::TinyInt,
            -7 => TypeTag::Bit,
            -8 => TypeTag::WChar,
            -9 => TypeTag::WVarChar,
            -10 => TypeTag::WLongVarChar,
            -11 => TypeTag::Guid,
            other => TypeTag::Code(other),
        }
    }

    /// The ODBC type code, if the tag has one.
    #[must_use]
    pub fn code(&self) -> Option<i16> {
        let code = match self {
            TypeTag::Boolean | TypeTag::Native(_) => return None,
            TypeTag::Code(code) => *code,
            TypeTag::Char => 1,
            TypeTag::Numeric => 2,
            TypeTag::Decimal => 3,
            TypeTag::Integer => 4,
            TypeTag::SmallInt => 5,
            TypeTag::Float => 6,
            TypeTag::Real => 7,
            TypeTag::Double => 8,
            TypeTag::Date | TypeTag::DateTime => 9,
            TypeTag::Time => 10,
            TypeTag::Timestamp => 11,
            TypeTag::VarChar => 12,
            TypeTag::TypeDate => 91,
            TypeTag::TypeTime => 92,
            TypeTag::TypeTimestamp => 93,
            TypeTag::LongVarChar => -1,
            TypeTag::Binary => -2,
            TypeTag::VarBinary => -3,
            TypeTag::LongVarBinary => -4,
            TypeTag::BigInt => -5,
            TypeTag::TinyInt => -6,
            TypeTag::Bit => -7,
            TypeTag::WChar => -8,
            TypeTag::WVarChar => -9,
            TypeTag::WLongVarChar => -10,
            TypeTag::Guid => -11,
        };
        Some(code)
    }

    /// Whether the driver delivers this type as raw bytes.
    #[must_use]
    pub fn is_binary(&self) -> bool {
        matches!(
            self,
            TypeTag::Binary | TypeTag::VarBinary | TypeTag::LongVarBinary
        )
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TypeTag::Boolean => "boolean",
            TypeTag::Char => "SQL_CHAR",
            TypeTag::VarChar => "SQL_VARCHAR",
            TypeTag::LongVarChar => "SQL_LONGVARCHAR",
            TypeTag::WChar => "SQL_WCHAR",
            TypeTag::WVarChar => "SQL_WVARCHAR",
            TypeTag::WLongVarChar => "SQL_WLONGVARCHAR",
            TypeTag::Bit => "SQL_BIT",
            TypeTag::TinyInt => "SQL_TINYINT",
            TypeTag::SmallInt => "SQL_SMALLINT",
            TypeTag::Integer => "SQL_INTEGER",
            TypeTag::BigInt => "SQL_BIGINT",
            TypeTag::Real => "SQL_REAL",
            TypeTag::Float => "SQL_FLOAT",
            TypeTag::Double => "SQL_DOUBLE",
            TypeTag::Decimal => "SQL_DECIMAL",
            TypeTag::Numeric => "SQL_NUMERIC",
            TypeTag::Binary => "SQL_BINARY",
            TypeTag::VarBinary => "SQL_VARBINARY",
            TypeTag::LongVarBinary => "SQL_LONGVARBINARY",
            TypeTag::Date => "SQL_DATE",
            TypeTag::DateTime => "SQL_DATETIME",
            TypeTag::Time => "SQL_TIME",
            TypeTag::Timestamp => "SQL_TIMESTAMP",
            TypeTag::TypeDate => "SQL_TYPE_DATE",
            TypeTag::TypeTime => "SQL_TYPE_TIME",
            TypeTag::TypeTimestamp => "SQL_TYPE_TIMESTAMP",
            TypeTag::Guid => "SQL_GUID",
            TypeTag::Code(code) => return write!(f, "SQL type {code}"),
            TypeTag::Native(name) => return f.write_str(name),
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_round_trip_except_shared_date_code() {
        for code in [1, 2, 3, 4, 5, 6, 7, 8, 10, 11, 12, 91, 92, 93, -1, -2, -3, -4, -5, -6, -7, -8, -9, -10, -11] {
            assert_eq!(TypeTag::from_code(code).code(), Some(code));
        }
        assert_eq!(TypeTag::from_code(9), TypeTag::DateTime);
        assert_eq!(TypeTag::Date.code(), Some(9));
    }

    #[test]
    fn unknown_codes_are_kept() {
        assert_eq!(TypeTag::from_code(-152), TypeTag::Code(-152));
        assert_eq!(TypeTag::Code(-152).to_string(), "SQL type -152");
    }

    #[test]
    fn native_names_are_normalized() {
        assert_eq!(TypeTag::native(" BYTEA "), TypeTag::Native("bytea".into()));
    }
}
