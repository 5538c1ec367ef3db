use std::sync::Arc;

use regex::{Regex, RegexBuilder};
use tracing::debug;

use crate::error::OdbcMiddlewareError;
use crate::metadata::DatabaseMetadata;
use crate::registry::TypeRegistry;
use crate::types::DialectKind;

use super::DialectRuleset;

/// Ordered table of product-name patterns to rulesets, plus the fallback.
///
/// Built once and shared by every session. Patterns are case-insensitive regular expressions
/// searched anywhere in the product name; the first registered match wins.
#[derive(Debug, Clone)]
pub struct DialectRegistry {
    base: Arc<TypeRegistry>,
    entries: Vec<(Regex, Arc<DialectRuleset>)>,
    fallback: Arc<DialectRuleset>,
}

impl DialectRegistry {
    /// Registry with only the generic fallback and no patterns.
    ///
    /// # Errors
    /// Returns `OdbcMiddlewareError::RegistryError` if the base type map cannot be built.
    pub fn new() -> Result<Self, OdbcMiddlewareError> {
        let base = Arc::new(TypeRegistry::base()?);
        Self::with_base(base)
    }

    /// Registry over an existing base type map.
    ///
    /// # Errors
    /// Returns `OdbcMiddlewareError::RegistryError` if the generic ruleset cannot be built.
    pub fn with_base(base: Arc<TypeRegistry>) -> Result<Self, OdbcMiddlewareError> {
        let fallback = Arc::new(DialectRuleset::builtin(
            DialectKind::Generic,
            Arc::clone(&base),
        )?);
        Ok(Self {
            base,
            entries: Vec::new(),
            fallback,
        })
    }

    /// Registry with the built-in MySQL, PostgreSQL and Snowflake patterns.
    ///
    /// # Errors
    /// Returns `OdbcMiddlewareError::RegistryError` if a built-in ruleset cannot be built.
    pub fn with_builtins() -> Result<Self, OdbcMiddlewareError> {
        let mut registry = Self::new()?;
        for (pattern, kind) in [
            ("mysql|mariadb", DialectKind::Mysql),
            ("postgres", DialectKind::Postgres),
            ("snowflake", DialectKind::Snowflake),
        ] {
            let ruleset = DialectRuleset::builtin(kind, registry.base())?;
            registry.register(pattern, ruleset)?;
        }
        Ok(registry)
    }

    /// The base type map every ruleset here layers over.
    #[must_use]
    pub fn base(&self) -> Arc<TypeRegistry> {
        Arc::clone(&self.base)
    }

    /// Append `pattern → ruleset`. Earlier registrations take precedence.
    ///
    /// `pattern` is a regular expression: metacharacters such as `+` or `(` in a product name
    /// must be escaped, or use [`Self::register_literal`].
    ///
    /// # Errors
    /// Returns `OdbcMiddlewareError::ConfigError` if `pattern` is not a valid regular expression.
    pub fn register(
        &mut self,
        pattern: &str,
        ruleset: DialectRuleset,
    ) -> Result<&mut Self, OdbcMiddlewareError> {
        let regex = RegexBuilder::new(pattern)
            .case_insensitive(true)
            .build()
            .map_err(|e| {
                OdbcMiddlewareError::ConfigError(format!("invalid dialect pattern `{pattern}`: {e}"))
            })?;
        self.entries.push((regex, Arc::new(ruleset)));
        Ok(self)
    }

    /// Append a ruleset matched by a plain, case-insensitive substring of the product name.
    ///
    /// # Errors
    /// Returns `OdbcMiddlewareError::ConfigError` if the escaped pattern cannot be compiled.
    pub fn register_literal(
        &mut self,
        product: &str,
        ruleset: DialectRuleset,
    ) -> Result<&mut Self, OdbcMiddlewareError> {
        self.register(&regex::escape(product), ruleset)
    }

    /// Ruleset for a product name; the generic ruleset when nothing matches.
    #[must_use]
    pub fn detect_product(&self, product: &str) -> Arc<DialectRuleset> {
        let found = self
            .entries
            .iter()
            .find(|(pattern, _)| pattern.is_match(product))
            .map(|(_, ruleset)| Arc::clone(ruleset));
        match found {
            Some(ruleset) => {
                debug!(product, dialect = ruleset.name(), "dialect detected");
                ruleset
            }
            None => {
                debug!(product, "no dialect pattern matched, using generic ODBC");
                Arc::clone(&self.fallback)
            }
        }
    }

    #[must_use]
    pub fn detect(&self, metadata: &DatabaseMetadata) -> Arc<DialectRuleset> {
        self.detect_product(&metadata.dbms_name)
    }

    /// First registered ruleset of `kind`, for forcing a dialect without detection.
    #[must_use]
    pub fn by_kind(&self, kind: DialectKind) -> Option<Arc<DialectRuleset>> {
        if kind == DialectKind::Generic {
            return Some(Arc::clone(&self.fallback));
        }
        self.entries
            .iter()
            .find(|(_, ruleset)| ruleset.kind() == kind)
            .map(|(_, ruleset)| Arc::clone(ruleset))
    }

    #[must_use]
    pub fn fallback(&self) -> Arc<DialectRuleset> {
        Arc::clone(&self.fallback)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_patterns_are_case_insensitive() {
        let registry = DialectRegistry::with_builtins().unwrap();
        assert_eq!(registry.detect_product("MariaDB").kind(), DialectKind::Mysql);
        assert_eq!(registry.detect_product("PostgreSQL").kind(), DialectKind::Postgres);
        assert_eq!(registry.detect_product("SNOWFLAKE").kind(), DialectKind::Snowflake);
        assert_eq!(registry.detect_product("Oracle").kind(), DialectKind::Generic);
        assert_eq!(registry.detect_product("").kind(), DialectKind::Generic);
    }

    #[test]
    fn invalid_pattern_is_rejected() {
        let mut registry = DialectRegistry::new().unwrap();
        let ruleset = registry.fallback().as_ref().clone();
        assert!(matches!(
            registry.register("(unclosed", ruleset),
            Err(OdbcMiddlewareError::ConfigError(_))
        ));
    }
}
