use crate::registry::{DecodingRule, TypeTag};
use crate::types::ValueKind;

/// Column description handed to the framework's schema layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    /// Name in framework case
    pub name: String,
    pub default: Option<String>,
    pub type_tag: TypeTag,
    /// Type name as the database spells it (`VARCHAR(255)`, `bytea`, ...)
    pub native_type: String,
    pub nullable: bool,
    pub kind: ValueKind,
    pub limit: Option<u32>,
}

impl Column {
    pub(crate) fn new(
        name: String,
        default: Option<String>,
        type_tag: TypeTag,
        native_type: String,
        nullable: bool,
        rule: &DecodingRule,
    ) -> Self {
        Self {
            name,
            default,
            type_tag,
            native_type,
            nullable,
            kind: rule.kind(),
            limit: rule.limit(),
        }
    }

    /// Framework type name with limit, e.g. `integer(16)`.
    #[must_use]
    pub fn sql_type(&self) -> String {
        match self.limit {
            Some(limit) => format!("{}({limit})", self.kind.type_name()),
            None => self.kind.type_name().to_string(),
        }
    }
}
