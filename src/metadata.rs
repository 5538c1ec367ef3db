/// How the database stores unquoted identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IdentifierCase {
    Upper,
    Lower,
    Sensitive,
    #[default]
    Mixed,
}

/// Product metadata reported by the driver right after connecting.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DatabaseMetadata {
    /// Product name used for dialect detection (`SQL_DBMS_NAME`).
    pub dbms_name: String,
    pub dbms_version: Option<String>,
    pub identifier_case: IdentifierCase,
    /// `None` when the driver did not report one; `Some(' ')` when quoting is unsupported.
    pub identifier_quote_char: Option<char>,
    /// Zero or `None` means the driver did not report a limit.
    pub max_identifier_len: Option<usize>,
    pub user_name: Option<String>,
    pub database_name: Option<String>,
}

impl DatabaseMetadata {
    #[must_use]
    pub fn new(dbms_name: impl Into<String>) -> Self {
        Self {
            dbms_name: dbms_name.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_identifier_case(mut self, identifier_case: IdentifierCase) -> Self {
        self.identifier_case = identifier_case;
        self
    }

    #[must_use]
    pub fn with_identifier_quote_char(mut self, quote: Option<char>) -> Self {
        self.identifier_quote_char = quote;
        self
    }

    #[must_use]
    pub fn with_max_identifier_len(mut self, len: Option<usize>) -> Self {
        self.max_identifier_len = len;
        self
    }

    #[must_use]
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.dbms_version = Some(version.into());
        self
    }
}

impl IdentifierCase {
    /// Driver-cased identifier to framework case.
    ///
    /// With upper-case storage, names that already carry lowercase letters were quoted on
    /// creation and are returned untouched; everything else is lower-cased.
    #[must_use]
    pub fn format_case(self, identifier: &str) -> String {
        if self == IdentifierCase::Upper && !identifier.chars().any(|c| c.is_ascii_lowercase()) {
            identifier.to_lowercase()
        } else {
            identifier.to_string()
        }
    }

    /// Framework identifier to the database's native case. Inverse of [`Self::format_case`].
    #[must_use]
    pub fn native_case(self, identifier: &str) -> String {
        if self == IdentifierCase::Upper && !identifier.chars().any(|c| c.is_ascii_uppercase()) {
            identifier.to_uppercase()
        } else {
            identifier.to_string()
        }
    }
}
