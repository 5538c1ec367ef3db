use lazy_static::lazy_static;
use regex::Regex;

use crate::error::OdbcMiddlewareError;

lazy_static! {
    static ref NATIVE_CODE: Regex =
        Regex::new(r"^\S+\s+\((-?\d+)\)").expect("valid native-code regex");
}

/// Category of a database error message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    DuplicateKey,
    QueryTimeout,
    Unclassified,
}

/// Error classification table of a dialect.
///
/// A message is matched on the code it begins with, on case-sensitive substrings, and, for rules
/// that register native codes, on the parenthesized native code after the SQLSTATE
/// (`23000 (1062) ...`). Duplicate keys are checked before timeouts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorRules {
    duplicate_codes: Vec<i64>,
    timeout_codes: Vec<i64>,
    native_duplicate_codes: Vec<i64>,
    native_timeout_codes: Vec<i64>,
    duplicate_patterns: Vec<String>,
    timeout_patterns: Vec<String>,
}

impl Default for ErrorRules {
    fn default() -> Self {
        Self {
            duplicate_codes: vec![23505],
            timeout_codes: vec![57014],
            native_duplicate_codes: Vec::new(),
            native_timeout_codes: Vec::new(),
            duplicate_patterns: Vec::new(),
            timeout_patterns: vec!["Query has timed out".to_string()],
        }
    }
}

impl ErrorRules {
    /// Rules that classify nothing.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            duplicate_codes: Vec::new(),
            timeout_codes: Vec::new(),
            native_duplicate_codes: Vec::new(),
            native_timeout_codes: Vec::new(),
            duplicate_patterns: Vec::new(),
            timeout_patterns: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_duplicate_code(mut self, code: i64) -> Self {
        self.duplicate_codes.push(code);
        self
    }

    #[must_use]
    pub fn with_timeout_code(mut self, code: i64) -> Self {
        self.timeout_codes.push(code);
        self
    }

    /// Match `code` against the native code in `STATE (code) ...` messages.
    #[must_use]
    pub fn with_native_duplicate_code(mut self, code: i64) -> Self {
        self.native_duplicate_codes.push(code);
        self
    }

    #[must_use]
    pub fn with_native_timeout_code(mut self, code: i64) -> Self {
        self.native_timeout_codes.push(code);
        self
    }

    #[must_use]
    pub fn with_duplicate_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.duplicate_patterns.push(pattern.into());
        self
    }

    #[must_use]
    pub fn with_timeout_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.timeout_patterns.push(pattern.into());
        self
    }

    #[must_use]
    pub fn classify(&self, message: &str) -> ErrorKind {
        let native = native_code(message);
        let native_hit = |codes: &[i64]| native.is_some_and(|code| codes.contains(&code));
        if starts_with_code(message, &self.duplicate_codes)
            || native_hit(&self.native_duplicate_codes)
            || self.duplicate_patterns.iter().any(|p| message.contains(p.as_str()))
        {
            return ErrorKind::DuplicateKey;
        }
        if starts_with_code(message, &self.timeout_codes)
            || native_hit(&self.native_timeout_codes)
            || self.timeout_patterns.iter().any(|p| message.contains(p.as_str()))
        {
            return ErrorKind::QueryTimeout;
        }
        ErrorKind::Unclassified
    }

    /// Classify `message` and wrap it, unchanged, in the matching error variant.
    #[must_use]
    pub fn into_error(&self, message: String) -> OdbcMiddlewareError {
        match self.classify(&message) {
            ErrorKind::DuplicateKey => OdbcMiddlewareError::DuplicateKey(message),
            ErrorKind::QueryTimeout => OdbcMiddlewareError::QueryTimeout(message),
            ErrorKind::Unclassified => OdbcMiddlewareError::Unclassified(message),
        }
    }
}

fn starts_with_code(message: &str, codes: &[i64]) -> bool {
    codes
        .iter()
        .any(|code| message.starts_with(code.to_string().as_str()))
}

fn native_code(message: &str) -> Option<i64> {
    NATIVE_CODE
        .captures(message)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}
