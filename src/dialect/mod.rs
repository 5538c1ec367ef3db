// Dialect rulesets - per-product quoting, limits, type overrides and error rules
//
// - errors: error-message classification
// - generic: plain ODBC ruleset
// - mysql, postgres, snowflake: product rulesets
// - detector: product-name patterns to rulesets

mod detector;
mod errors;
mod generic;
mod mysql;
mod postgres;
mod snowflake;

use std::fmt::Write as _;
use std::sync::Arc;

use lazy_static::lazy_static;
use regex::Regex;

pub use detector::DialectRegistry;
pub use errors::{ErrorKind, ErrorRules};

use crate::driver::DriverValue;
use crate::error::OdbcMiddlewareError;
use crate::metadata::{DatabaseMetadata, IdentifierCase};
use crate::registry::{DecodingRule, TypeRegistry, TypeTag};
use crate::types::{DialectKind, RowValues};

lazy_static! {
    static ref MIXED_CASE: Regex =
        Regex::new(r"([A-Z]+[a-z])|([a-z]+[A-Z])").expect("valid mixed-case regex");
}

const DEFAULT_QUOTE: char = '"';

/// How binary values are written as SQL literals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryLiteral {
    /// `X'0a1b'`
    Hex,
    /// `'\x0a1b'`
    EscapedHex,
}

/// Immutable rule set for one database product.
#[derive(Debug, Clone)]
pub struct DialectRuleset {
    name: String,
    kind: DialectKind,
    types: TypeRegistry,
    identifier_quote: Option<char>,
    identifier_case: Option<IdentifierCase>,
    max_identifier_len: usize,
    true_literal: String,
    false_literal: String,
    escape_backslashes: bool,
    binary_literal: BinaryLiteral,
    error_rules: ErrorRules,
}

impl DialectRuleset {
    /// Start a ruleset whose type overrides layer over `base`.
    #[must_use]
    pub fn builder(
        name: impl Into<String>,
        kind: DialectKind,
        base: Arc<TypeRegistry>,
    ) -> DialectRulesetBuilder {
        DialectRulesetBuilder::new(name, kind, base)
    }

    /// The built-in ruleset for `kind` over `base`.
    ///
    /// # Errors
    /// Returns `OdbcMiddlewareError::RegistryError` if the dialect's aliases conflict with `base`.
    pub fn builtin(
        kind: DialectKind,
        base: Arc<TypeRegistry>,
    ) -> Result<Self, OdbcMiddlewareError> {
        match kind {
            DialectKind::Generic => Ok(generic::ruleset(base)),
            DialectKind::Mysql => mysql::ruleset(base),
            DialectKind::Postgres => postgres::ruleset(base),
            DialectKind::Snowflake => snowflake::ruleset(base),
        }
    }

    /// Product name; also reported as the adapter name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn kind(&self) -> DialectKind {
        self.kind
    }

    /// The layered type registry: this dialect's overrides over the base map.
    #[must_use]
    pub fn types(&self) -> &TypeRegistry {
        &self.types
    }

    /// # Errors
    /// Returns `OdbcMiddlewareError::DecodeError` if `tag` is unregistered.
    pub fn rule(&self, tag: &TypeTag) -> Result<&DecodingRule, OdbcMiddlewareError> {
        self.types.rule(tag)
    }

    /// Decode one raw value, consulting this dialect's overrides before the base map.
    ///
    /// # Errors
    /// Returns `OdbcMiddlewareError::DecodeError` if `tag` is unregistered or `raw` does not
    /// convert.
    pub fn decode(&self, tag: &TypeTag, raw: &DriverValue) -> Result<RowValues, OdbcMiddlewareError> {
        self.types.lookup(tag, raw)
    }

    /// The identifier quote character, `None` when the driver reports quoting unsupported.
    #[must_use]
    pub fn quote_char(&self, meta: &DatabaseMetadata) -> Option<char> {
        match (self.identifier_quote, meta.identifier_quote_char) {
            (Some(quote), _) => Some(quote),
            (None, Some(' ')) => None,
            (None, Some(quote)) => Some(quote),
            (None, None) => Some(DEFAULT_QUOTE),
        }
    }

    #[must_use]
    pub fn identifier_case(&self, meta: &DatabaseMetadata) -> IdentifierCase {
        self.identifier_case.unwrap_or(meta.identifier_case)
    }

    /// Quote `name` unconditionally, doubling embedded quote characters.
    #[must_use]
    pub fn quote_identifier(&self, meta: &DatabaseMetadata, name: &str) -> String {
        if let Some(quote) = self.quote_char(meta) {
            let doubled: String = [quote, quote].iter().collect();
            let body = name.replace(quote, &doubled);
            format!("{quote}{body}{quote}")
        } else {
            name.to_string()
        }
    }

    /// Quote a column name for generated SQL.
    ///
    /// Names that are already quoted are returned as-is. When the database stores unquoted
    /// identifiers in upper case, only mixed-case names are quoted so that `users` keeps
    /// resolving to `USERS`.
    #[must_use]
    pub fn quote_column_name(&self, meta: &DatabaseMetadata, name: &str) -> String {
        let Some(quote) = self.quote_char(meta) else {
            return name.to_string();
        };
        if name.len() >= 2 && name.starts_with(quote) && name.ends_with(quote) {
            return name.to_string();
        }
        if self.identifier_case(meta) == IdentifierCase::Upper && !MIXED_CASE.is_match(name) {
            return name.to_string();
        }
        self.quote_identifier(meta, name)
    }

    /// Quote each dotted part of `schema.table` as a column name.
    #[must_use]
    pub fn quote_table_name(&self, meta: &DatabaseMetadata, name: &str) -> String {
        name.split('.')
            .map(|part| self.quote_column_name(meta, part))
            .collect::<Vec<_>>()
            .join(".")
    }

    /// Escape the body of a string literal (without the surrounding quotes).
    #[must_use]
    pub fn quote_string(&self, value: &str) -> String {
        let mut escaped = String::with_capacity(value.len());
        for c in value.chars() {
            match c {
                '\'' => escaped.push_str("''"),
                '\\' if self.escape_backslashes => escaped.push_str("\\\\"),
                other => escaped.push(other),
            }
        }
        escaped
    }

    /// `value` as a complete single-quoted literal.
    #[must_use]
    pub fn quoted_literal(&self, value: &str) -> String {
        format!("'{}'", self.quote_string(value))
    }

    #[must_use]
    pub fn quote_boolean(&self, value: bool) -> &str {
        if value {
            &self.true_literal
        } else {
            &self.false_literal
        }
    }

    /// Render a value as a SQL literal.
    #[must_use]
    pub fn quote_value(&self, value: &RowValues) -> String {
        match value {
            RowValues::Null => "NULL".to_string(),
            RowValues::Bool(b) => self.quote_boolean(*b).to_string(),
            RowValues::Int(i) => i.to_string(),
            RowValues::BigInt(i) => i.to_string(),
            RowValues::Float(f) if f.is_finite() => f.to_string(),
            RowValues::Float(f) => self.quoted_literal(&f.to_string()),
            RowValues::String(s) | RowValues::Text(s) => self.quoted_literal(s),
            RowValues::Blob(bytes) => self.binary_literal(bytes),
            RowValues::Date(d) => format!("'{}'", d.format("%Y-%m-%d")),
            RowValues::Time(t) => format!("'{}'", t.format("%H:%M:%S%.f")),
            RowValues::Timestamp(ts) => format!("'{}'", ts.format("%Y-%m-%d %H:%M:%S%.f")),
        }
    }

    fn binary_literal(&self, bytes: &[u8]) -> String {
        let mut hex = String::with_capacity(bytes.len() * 2);
        for byte in bytes {
            let _ = write!(hex, "{byte:02x}");
        }
        match self.binary_literal {
            BinaryLiteral::Hex => format!("X'{hex}'"),
            BinaryLiteral::EscapedHex => format!("'\\x{hex}'"),
        }
    }

    /// The driver-reported identifier limit when it reports one, the dialect's otherwise.
    #[must_use]
    pub fn max_identifier_len(&self, meta: &DatabaseMetadata) -> usize {
        meta.max_identifier_len
            .filter(|len| *len > 0)
            .unwrap_or(self.max_identifier_len)
    }

    #[must_use]
    pub fn table_alias_length(&self, meta: &DatabaseMetadata) -> usize {
        self.max_identifier_len(meta)
    }

    #[must_use]
    pub fn index_name_length(&self, meta: &DatabaseMetadata) -> usize {
        self.max_identifier_len(meta)
    }

    #[must_use]
    pub fn error_rules(&self) -> &ErrorRules {
        &self.error_rules
    }

    #[must_use]
    pub fn classify_error(&self, message: &str) -> ErrorKind {
        self.error_rules.classify(message)
    }
}

/// Builder for [`DialectRuleset`].
#[derive(Debug, Clone)]
pub struct DialectRulesetBuilder {
    ruleset: DialectRuleset,
}

impl DialectRulesetBuilder {
    #[must_use]
    pub fn new(name: impl Into<String>, kind: DialectKind, base: Arc<TypeRegistry>) -> Self {
        Self {
            ruleset: DialectRuleset {
                name: name.into(),
                kind,
                types: TypeRegistry::overlay(base),
                identifier_quote: None,
                identifier_case: None,
                max_identifier_len: 128,
                true_literal: "TRUE".to_string(),
                false_literal: "FALSE".to_string(),
                escape_backslashes: false,
                binary_literal: BinaryLiteral::Hex,
                error_rules: ErrorRules::default(),
            },
        }
    }

    /// Fixed quote character instead of the driver-reported one.
    #[must_use]
    pub fn identifier_quote(mut self, quote: char) -> Self {
        self.ruleset.identifier_quote = Some(quote);
        self
    }

    #[must_use]
    pub fn identifier_case(mut self, case: IdentifierCase) -> Self {
        self.ruleset.identifier_case = Some(case);
        self
    }

    #[must_use]
    pub fn max_identifier_len(mut self, len: usize) -> Self {
        self.ruleset.max_identifier_len = len;
        self
    }

    #[must_use]
    pub fn boolean_literals(mut self, true_literal: &str, false_literal: &str) -> Self {
        self.ruleset.true_literal = true_literal.to_string();
        self.ruleset.false_literal = false_literal.to_string();
        self
    }

    #[must_use]
    pub fn escape_backslashes(mut self, escape: bool) -> Self {
        self.ruleset.escape_backslashes = escape;
        self
    }

    #[must_use]
    pub fn binary_literal(mut self, style: BinaryLiteral) -> Self {
        self.ruleset.binary_literal = style;
        self
    }

    #[must_use]
    pub fn error_rules(mut self, rules: ErrorRules) -> Self {
        self.ruleset.error_rules = rules;
        self
    }

    /// Override the rule for `tag` in this dialect only.
    #[must_use]
    pub fn register(mut self, tag: TypeTag, rule: DecodingRule) -> Self {
        self.ruleset.types.register(tag, rule);
        self
    }

    /// # Errors
    /// Returns `OdbcMiddlewareError::RegistryError` if the alias is rejected by the registry.
    pub fn register_alias(
        mut self,
        new_tag: TypeTag,
        existing: TypeTag,
    ) -> Result<Self, OdbcMiddlewareError> {
        self.ruleset.types.register_alias(new_tag, existing)?;
        Ok(self)
    }

    #[must_use]
    pub fn finish(self) -> DialectRuleset {
        self.ruleset
    }
}
