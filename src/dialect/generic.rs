use std::sync::Arc;

use crate::registry::TypeRegistry;
use crate::types::DialectKind;

use super::DialectRuleset;

/// Plain ODBC: no type overrides, driver-reported quoting, `TRUE`/`FALSE`.
pub(super) fn ruleset(base: Arc<TypeRegistry>) -> DialectRuleset {
    DialectRuleset::builder(DialectKind::Generic.as_str(), DialectKind::Generic, base).finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::TypeTag;
    use crate::types::ValueKind;

    #[test]
    fn uses_the_base_map_unchanged() {
        let base = Arc::new(TypeRegistry::base().unwrap());
        let generic = ruleset(Arc::clone(&base));
        assert_eq!(generic.name(), "ODBC");
        assert_eq!(generic.types().tags(), base.tags());
        assert_eq!(generic.rule(&TypeTag::Numeric).unwrap().kind(), ValueKind::Integer);
    }
}
