use std::fmt;

use crate::driver::DriverValue;
use crate::error::OdbcMiddlewareError;
use crate::types::{RowValues, ValueKind};

use super::TypeTag;
use super::decode;

/// Decoder signature: non-NULL raw value plus the rule's limit.
///
/// Returns a human readable reason on failure; the registry attaches the type tag.
pub type Decoder = fn(&DriverValue, Option<u32>) -> Result<RowValues, String>;

/// How values of one type tag become domain values.
#[derive(Clone, Copy)]
pub struct DecodingRule {
    kind: ValueKind,
    limit: Option<u32>,
    decoder: Decoder,
}

impl DecodingRule {
    const fn new(kind: ValueKind, limit: Option<u32>, decoder: Decoder) -> Self {
        Self {
            kind,
            limit,
            decoder,
        }
    }

    #[must_use]
    pub const fn boolean() -> Self {
        Self::new(ValueKind::Boolean, None, decode::boolean)
    }

    #[must_use]
    pub const fn string() -> Self {
        Self::new(ValueKind::String, None, decode::string)
    }

    #[must_use]
    pub const fn text() -> Self {
        Self::new(ValueKind::Text, None, decode::text)
    }

    #[must_use]
    pub const fn integer(limit: Option<u32>) -> Self {
        Self::new(ValueKind::Integer, limit, decode::integer)
    }

    #[must_use]
    pub const fn big_integer(limit: Option<u32>) -> Self {
        Self::new(ValueKind::BigInteger, limit, decode::big_integer)
    }

    /// Float rule; a limit of 24 or less keeps single precision.
    #[must_use]
    pub const fn float(limit: Option<u32>) -> Self {
        Self::new(ValueKind::Float, limit, decode::float)
    }

    #[must_use]
    pub const fn binary() -> Self {
        Self::new(ValueKind::Binary, None, decode::binary)
    }

    #[must_use]
    pub const fn date() -> Self {
        Self::new(ValueKind::Date, None, decode::date)
    }

    #[must_use]
    pub const fn time() -> Self {
        Self::new(ValueKind::Time, None, decode::time)
    }

    #[must_use]
    pub const fn datetime() -> Self {
        Self::new(ValueKind::DateTime, None, decode::datetime)
    }

    /// Same kind and limit, different decoder.
    #[must_use]
    pub const fn with_decoder(mut self, decoder: Decoder) -> Self {
        self.decoder = decoder;
        self
    }

    #[must_use]
    pub fn kind(&self) -> ValueKind {
        self.kind
    }

    #[must_use]
    pub fn limit(&self) -> Option<u32> {
        self.limit
    }

    /// Framework type name, with the limit when one is set (e.g. `integer(16)`).
    #[must_use]
    pub fn sql_type(&self) -> String {
        match self.limit {
            Some(limit) => format!("{}({limit})", self.kind.type_name()),
            None => self.kind.type_name().to_string(),
        }
    }

    /// Decode one raw value. NULL stays NULL for every kind.
    ///
    /// # Errors
    /// Returns `OdbcMiddlewareError::DecodeError` when the raw value has no conversion to this
    /// rule's kind.
    pub fn decode(&self, tag: &TypeTag, raw: &DriverValue) -> Result<RowValues, OdbcMiddlewareError> {
        if raw.is_null() {
            return Ok(RowValues::Null);
        }
        (self.decoder)(raw, self.limit).map_err(|reason| OdbcMiddlewareError::decode(tag, reason))
    }
}

impl fmt::Debug for DecodingRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecodingRule")
            .field("kind", &self.kind)
            .field("limit", &self.limit)
            .finish_non_exhaustive()
    }
}
