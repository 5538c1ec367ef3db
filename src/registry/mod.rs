// Type registry - maps driver type tags to decoding rules
//
// - tag: driver-reported type identifiers
// - rule: decoding rules (kind + limit + decoder)
// - decode: the decoders behind the base rules
// - base: the base ODBC type map

mod base;
pub(crate) mod decode;
mod rule;
mod tag;

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

pub use base::initialize_type_map;
pub use rule::{Decoder, DecodingRule};
pub use tag::TypeTag;

use crate::driver::DriverValue;
use crate::error::OdbcMiddlewareError;
use crate::types::RowValues;

enum Entry<'a> {
    Rule(&'a DecodingRule),
    Alias(&'a TypeTag),
}

/// Table of decoding rules keyed by type tag.
///
/// A registry may be layered over a parent: its own entries win, everything else falls through
/// to the parent. Aliases forward to a base tag (one hop, never to another alias), resolved
/// against the layered view so an overriding rule also applies to the aliases of its tag.
#[derive(Debug, Clone, Default)]
pub struct TypeRegistry {
    parent: Option<Arc<TypeRegistry>>,
    rules: HashMap<TypeTag, DecodingRule>,
    aliases: HashMap<TypeTag, TypeTag>,
}

impl TypeRegistry {
    /// Empty registry with no parent.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry pre-populated with the base ODBC type map.
    ///
    /// # Errors
    /// Returns `OdbcMiddlewareError::RegistryError` if the base alias table is inconsistent.
    pub fn base() -> Result<Self, OdbcMiddlewareError> {
        let mut registry = Self::new();
        initialize_type_map(&mut registry)?;
        Ok(registry)
    }

    /// Empty override layer over `parent`.
    #[must_use]
    pub fn overlay(parent: Arc<TypeRegistry>) -> Self {
        Self {
            parent: Some(parent),
            ..Self::default()
        }
    }

    /// Insert or overwrite the rule for `tag`. An alias previously installed for `tag` in this
    /// layer is replaced.
    pub fn register(&mut self, tag: TypeTag, rule: DecodingRule) {
        self.aliases.remove(&tag);
        self.rules.insert(tag, rule);
    }

    /// Make `new_tag` decode exactly like `existing`.
    ///
    /// # Errors
    /// Returns `OdbcMiddlewareError::RegistryError` if `existing` is unknown or itself an alias,
    /// or if other aliases already forward to `new_tag`.
    pub fn register_alias(
        &mut self,
        new_tag: TypeTag,
        existing: TypeTag,
    ) -> Result<(), OdbcMiddlewareError> {
        if new_tag == existing {
            return Err(OdbcMiddlewareError::RegistryError(format!(
                "cannot alias {new_tag} to itself"
            )));
        }
        match self.entry(&existing) {
            Some(Entry::Rule(_)) => {}
            Some(Entry::Alias(target)) => {
                return Err(OdbcMiddlewareError::RegistryError(format!(
                    "cannot alias {new_tag} to {existing}: {existing} is an alias of {target}"
                )));
            }
            None => {
                return Err(OdbcMiddlewareError::RegistryError(format!(
                    "cannot alias {new_tag} to unregistered type {existing}"
                )));
            }
        }
        if self.is_alias_target(&new_tag) {
            return Err(OdbcMiddlewareError::RegistryError(format!(
                "cannot make {new_tag} an alias: other types already alias it"
            )));
        }
        self.rules.remove(&new_tag);
        self.aliases.insert(new_tag, existing);
        Ok(())
    }

    fn entry(&self, tag: &TypeTag) -> Option<Entry<'_>> {
        if let Some(rule) = self.rules.get(tag) {
            return Some(Entry::Rule(rule));
        }
        if let Some(target) = self.aliases.get(tag) {
            return Some(Entry::Alias(target));
        }
        self.parent.as_deref()?.entry(tag)
    }

    fn is_alias_target(&self, tag: &TypeTag) -> bool {
        self.aliases.values().any(|target| target == tag)
            || self
                .parent
                .as_deref()
                .is_some_and(|parent| parent.is_alias_target(tag))
    }

    /// The rule that decodes `tag`, following an alias if needed.
    ///
    /// # Errors
    /// Returns `OdbcMiddlewareError::DecodeError` if `tag` is not registered.
    pub fn rule(&self, tag: &TypeTag) -> Result<&DecodingRule, OdbcMiddlewareError> {
        let resolved = match self.entry(tag) {
            Some(Entry::Rule(rule)) => Some(rule),
            Some(Entry::Alias(target)) => match self.entry(target) {
                Some(Entry::Rule(rule)) => Some(rule),
                _ => None,
            },
            None => None,
        };
        resolved.ok_or_else(|| OdbcMiddlewareError::decode(tag, "unregistered type"))
    }

    /// Decode `raw` with the rule registered for `tag`.
    ///
    /// # Errors
    /// Returns `OdbcMiddlewareError::DecodeError` if `tag` is unregistered or the value does not
    /// convert to the rule's kind.
    pub fn lookup(&self, tag: &TypeTag, raw: &DriverValue) -> Result<RowValues, OdbcMiddlewareError> {
        self.rule(tag)?.decode(tag, raw)
    }

    #[must_use]
    pub fn contains(&self, tag: &TypeTag) -> bool {
        self.rule(tag).is_ok()
    }

    /// The base tag `tag` forwards to, if it is an alias.
    #[must_use]
    pub fn alias_target(&self, tag: &TypeTag) -> Option<&TypeTag> {
        match self.entry(tag) {
            Some(Entry::Alias(target)) => Some(target),
            _ => None,
        }
    }

    /// Every tag visible through this registry, parents included.
    #[must_use]
    pub fn tags(&self) -> BTreeSet<TypeTag> {
        let mut tags = self
            .parent
            .as_deref()
            .map(TypeRegistry::tags)
            .unwrap_or_default();
        tags.extend(self.rules.keys().cloned());
        tags.extend(self.aliases.keys().cloned());
        tags
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ValueKind;

    #[test]
    fn alias_to_alias_is_rejected() {
        let mut registry = TypeRegistry::new();
        registry.register(TypeTag::Char, DecodingRule::string());
        registry.register_alias(TypeTag::VarChar, TypeTag::Char).unwrap();
        let err = registry.register_alias(TypeTag::WVarChar, TypeTag::VarChar);
        assert!(matches!(err, Err(OdbcMiddlewareError::RegistryError(_))));
    }

    #[test]
    fn aliasing_an_alias_target_is_rejected() {
        let mut registry = TypeRegistry::new();
        registry.register(TypeTag::Char, DecodingRule::string());
        registry.register(TypeTag::LongVarChar, DecodingRule::text());
        registry.register_alias(TypeTag::VarChar, TypeTag::Char).unwrap();
        let err = registry.register_alias(TypeTag::Char, TypeTag::LongVarChar);
        assert!(matches!(err, Err(OdbcMiddlewareError::RegistryError(_))));
        assert_eq!(registry.rule(&TypeTag::VarChar).unwrap().kind(), ValueKind::String);
    }

    #[test]
    fn self_alias_and_unknown_target_are_rejected() {
        let mut registry = TypeRegistry::new();
        assert!(registry.register_alias(TypeTag::Char, TypeTag::Char).is_err());
        assert!(registry.register_alias(TypeTag::VarChar, TypeTag::Char).is_err());
    }

    #[test]
    fn register_replaces_alias_in_same_layer() {
        let mut registry = TypeRegistry::new();
        registry.register(TypeTag::Char, DecodingRule::string());
        registry.register_alias(TypeTag::VarChar, TypeTag::Char).unwrap();
        registry.register(TypeTag::VarChar, DecodingRule::text());
        assert!(registry.alias_target(&TypeTag::VarChar).is_none());
        assert_eq!(registry.rule(&TypeTag::VarChar).unwrap().kind(), ValueKind::Text);
    }

    #[test]
    fn overlay_override_applies_to_parent_aliases() {
        let mut base = TypeRegistry::new();
        base.register(TypeTag::Binary, DecodingRule::binary());
        base.register_alias(TypeTag::VarBinary, TypeTag::Binary).unwrap();
        let mut overlay = TypeRegistry::overlay(Arc::new(base));
        overlay.register(TypeTag::Binary, DecodingRule::text());

        assert_eq!(overlay.rule(&TypeTag::VarBinary).unwrap().kind(), ValueKind::Text);
        assert_eq!(overlay.tags().len(), 2);
    }
}
