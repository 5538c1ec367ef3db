use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use clap::ValueEnum;
use serde::Deserialize;

use crate::dialect::DialectRegistry;
use crate::driver::OdbcDriver;
use crate::error::OdbcMiddlewareError;
use crate::session::OdbcSession;
use crate::types::DialectKind;

/// How the driver should be asked to connect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectTarget {
    /// Named data source with optional credentials.
    Dsn {
        dsn: String,
        username: Option<String>,
        password: Option<String>,
    },
    /// Low-level driver attributes (`DSN`, `DRIVER`, `UID`, `PWD`, ...).
    DriverAttributes(BTreeMap<String, String>),
}

impl ConnectTarget {
    /// Render as an ODBC connection string. Values containing `;` are wrapped in braces.
    #[must_use]
    pub fn to_connection_string(&self) -> String {
        match self {
            ConnectTarget::Dsn {
                dsn,
                username,
                password,
            } => {
                let mut attrs = BTreeMap::new();
                attrs.insert("DSN".to_string(), dsn.clone());
                if let Some(username) = username {
                    attrs.insert("UID".to_string(), username.clone());
                }
                if let Some(password) = password {
                    attrs.insert("PWD".to_string(), password.clone());
                }
                render_attributes(&attrs)
            }
            ConnectTarget::DriverAttributes(attrs) => render_attributes(attrs),
        }
    }

    /// Connection description safe for logs (no credentials).
    #[must_use]
    pub fn redacted(&self) -> String {
        match self {
            ConnectTarget::Dsn { dsn, .. } => format!("DSN={dsn}"),
            ConnectTarget::DriverAttributes(attrs) => attrs
                .iter()
                .map(|(key, value)| {
                    if key.eq_ignore_ascii_case("PWD") || key.eq_ignore_ascii_case("PASSWORD") {
                        format!("{key}=***")
                    } else {
                        format!("{key}={value}")
                    }
                })
                .collect::<Vec<_>>()
                .join(";"),
        }
    }
}

fn render_attributes(attrs: &BTreeMap<String, String>) -> String {
    attrs
        .iter()
        .map(|(key, value)| {
            if value.contains(';') && !(value.starts_with('{') && value.ends_with('}')) {
                format!("{key}={{{value}}}")
            } else {
                format!("{key}={value}")
            }
        })
        .collect::<Vec<_>>()
        .join(";")
}

/// Parse `KEY=VALUE;KEY=VALUE` into driver attributes.
///
/// Each pair splits at its first `=`; later `=` stay in the value. Empty segments are skipped.
///
/// # Errors
/// Returns `OdbcMiddlewareError::ConfigError` for a segment without `=` or with an empty key.
pub fn parse_connection_string(
    conn_str: &str,
) -> Result<BTreeMap<String, String>, OdbcMiddlewareError> {
    let mut attrs = BTreeMap::new();
    for segment in conn_str.split(';') {
        let segment = segment.trim();
        if segment.is_empty() {
            continue;
        }
        let (key, value) = segment.split_once('=').ok_or_else(|| {
            OdbcMiddlewareError::ConfigError(format!(
                "connection string segment `{segment}` is not KEY=VALUE"
            ))
        })?;
        let key = key.trim();
        if key.is_empty() {
            return Err(OdbcMiddlewareError::ConfigError(format!(
                "connection string segment `{segment}` has an empty key"
            )));
        }
        attrs.insert(key.to_string(), value.trim().to_string());
    }
    Ok(attrs)
}

fn default_autocommit() -> bool {
    true
}

/// Options for opening an ODBC session.
///
/// Exactly one of `dsn` or `conn_str` must be set. Keys that are not options of their own are
/// collected as driver attributes; scalar values (strings, numbers, booleans) are accepted and
/// kept in their string form.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "RawOptions")]
pub struct OdbcOptions {
    pub dsn: Option<String>,
    pub conn_str: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub autocommit: bool,
    /// Query timeout in seconds, handed to the driver.
    pub timeout_secs: Option<u64>,
    /// Skip detection and use this dialect.
    pub force_dialect: Option<DialectKind>,
    pub attributes: BTreeMap<String, String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum AttributeValue {
    Bool(bool),
    Int(i64),
    Uint(u64),
    Float(f64),
    Text(String),
}

impl From<AttributeValue> for String {
    fn from(value: AttributeValue) -> Self {
        match value {
            AttributeValue::Bool(b) => b.to_string(),
            AttributeValue::Int(i) => i.to_string(),
            AttributeValue::Uint(u) => u.to_string(),
            AttributeValue::Float(f) => f.to_string(),
            AttributeValue::Text(s) => s,
        }
    }
}

#[derive(Deserialize)]
struct RawOptions {
    #[serde(default)]
    dsn: Option<String>,
    #[serde(default, alias = "connection_string")]
    conn_str: Option<String>,
    #[serde(default)]
    username: Option<String>,
    #[serde(default)]
    password: Option<String>,
    #[serde(default = "default_autocommit")]
    autocommit: bool,
    #[serde(default, rename = "timeout")]
    timeout_secs: Option<u64>,
    #[serde(default, rename = "dialect")]
    force_dialect: Option<DialectKind>,
    #[serde(flatten)]
    attributes: BTreeMap<String, AttributeValue>,
}

impl From<RawOptions> for OdbcOptions {
    fn from(raw: RawOptions) -> Self {
        Self {
            dsn: raw.dsn,
            conn_str: raw.conn_str,
            username: raw.username,
            password: raw.password,
            autocommit: raw.autocommit,
            timeout_secs: raw.timeout_secs,
            force_dialect: raw.force_dialect,
            attributes: raw
                .attributes
                .into_iter()
                .map(|(key, value)| (key, String::from(value)))
                .collect(),
        }
    }
}

impl Default for OdbcOptions {
    fn default() -> Self {
        Self {
            dsn: None,
            conn_str: None,
            username: None,
            password: None,
            autocommit: true,
            timeout_secs: None,
            force_dialect: None,
            attributes: BTreeMap::new(),
        }
    }
}

impl OdbcOptions {
    #[must_use]
    pub fn with_dsn(dsn: impl Into<String>) -> Self {
        Self {
            dsn: Some(dsn.into()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_conn_str(conn_str: impl Into<String>) -> Self {
        Self {
            conn_str: Some(conn_str.into()),
            ..Self::default()
        }
    }

    /// Build options from a flat string mapping.
    ///
    /// # Errors
    /// Returns `OdbcMiddlewareError::ConfigError` if `autocommit`, `timeout` or `dialect` hold
    /// values that do not parse.
    pub fn from_map<I, K, V>(map: I) -> Result<Self, OdbcMiddlewareError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut opts = Self::default();
        for (key, value) in map {
            let key = key.into();
            let value = value.into();
            match key.as_str() {
                "dsn" => opts.dsn = Some(value),
                "conn_str" | "connection_string" => opts.conn_str = Some(value),
                "username" => opts.username = Some(value),
                "password" => opts.password = Some(value),
                "autocommit" => {
                    opts.autocommit = crate::registry::decode::parse_bool(&value)
                        .map_err(|e| OdbcMiddlewareError::ConfigError(format!("autocommit: {e}")))?;
                }
                "timeout" => {
                    let secs = value.trim().parse::<u64>().map_err(|_| {
                        OdbcMiddlewareError::ConfigError(format!(
                            "timeout: `{value}` is not a number of seconds"
                        ))
                    })?;
                    opts.timeout_secs = Some(secs);
                }
                "dialect" => {
                    let kind = DialectKind::from_str(&value, true).map_err(|e| {
                        OdbcMiddlewareError::ConfigError(format!("dialect: {e}"))
                    })?;
                    opts.force_dialect = Some(kind);
                }
                _ => {
                    opts.attributes.insert(key, value);
                }
            }
        }
        Ok(opts)
    }

    /// Deserialize options from a JSON object.
    ///
    /// # Errors
    /// Returns `OdbcMiddlewareError::ConfigError` if the value does not describe options.
    pub fn from_json(value: serde_json::Value) -> Result<Self, OdbcMiddlewareError> {
        serde_json::from_value(value)
            .map_err(|e| OdbcMiddlewareError::ConfigError(format!("invalid ODBC options: {e}")))
    }

    #[must_use]
    pub fn query_timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    /// Decide how to connect.
    ///
    /// A DSN with nothing but credentials uses the named-DSN path. A DSN with extra attributes,
    /// or a connection string, uses driver attributes; `UID`/`PWD` come from the credentials.
    ///
    /// # Errors
    /// Returns `OdbcMiddlewareError::ConfigError` if neither or both of `dsn` and `conn_str`
    /// are set, if the one that is set is blank, or if the connection string is malformed.
    pub fn connect_target(&self) -> Result<ConnectTarget, OdbcMiddlewareError> {
        match (&self.dsn, &self.conn_str) {
            (Some(_), Some(_)) => Err(OdbcMiddlewareError::ConfigError(
                "`dsn` and `conn_str` are mutually exclusive".to_string(),
            )),
            (None, None) => Err(OdbcMiddlewareError::ConfigError(
                "either `dsn` or `conn_str` is required".to_string(),
            )),
            (Some(dsn), None) => {
                if dsn.trim().is_empty() {
                    return Err(OdbcMiddlewareError::ConfigError(
                        "`dsn` must not be empty".to_string(),
                    ));
                }
                if self.attributes.is_empty() {
                    return Ok(ConnectTarget::Dsn {
                        dsn: dsn.clone(),
                        username: self.username.clone(),
                        password: self.password.clone(),
                    });
                }
                let mut attrs = self.attributes.clone();
                attrs.insert("DSN".to_string(), dsn.clone());
                if let Some(username) = &self.username {
                    attrs.insert("UID".to_string(), username.clone());
                }
                if let Some(password) = &self.password {
                    attrs.insert("PWD".to_string(), password.clone());
                }
                Ok(ConnectTarget::DriverAttributes(attrs))
            }
            (None, Some(conn_str)) => {
                let attrs = parse_connection_string(conn_str)?;
                if attrs.is_empty() {
                    return Err(OdbcMiddlewareError::ConfigError(
                        "`conn_str` has no attributes".to_string(),
                    ));
                }
                Ok(ConnectTarget::DriverAttributes(attrs))
            }
        }
    }
}

/// Fluent builder for ODBC options.
#[derive(Debug, Clone)]
pub struct OdbcOptionsBuilder {
    opts: OdbcOptions,
}

impl OdbcOptionsBuilder {
    #[must_use]
    pub fn dsn(dsn: impl Into<String>) -> Self {
        Self {
            opts: OdbcOptions::with_dsn(dsn),
        }
    }

    #[must_use]
    pub fn conn_str(conn_str: impl Into<String>) -> Self {
        Self {
            opts: OdbcOptions::with_conn_str(conn_str),
        }
    }

    #[must_use]
    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.opts.username = Some(username.into());
        self
    }

    #[must_use]
    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.opts.password = Some(password.into());
        self
    }

    #[must_use]
    pub fn attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.opts.attributes.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn autocommit(mut self, autocommit: bool) -> Self {
        self.opts.autocommit = autocommit;
        self
    }

    #[must_use]
    pub fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.opts.timeout_secs = timeout.map(|t| t.as_secs());
        self
    }

    #[must_use]
    pub fn dialect(mut self, dialect: Option<DialectKind>) -> Self {
        self.opts.force_dialect = dialect;
        self
    }

    #[must_use]
    pub fn finish(self) -> OdbcOptions {
        self.opts
    }

    /// Open a session with these options.
    ///
    /// # Errors
    ///
    /// Returns `OdbcMiddlewareError` if the options are invalid or the connection fails.
    pub fn open<D: OdbcDriver>(
        self,
        driver: Arc<D>,
        dialects: Arc<DialectRegistry>,
    ) -> Result<OdbcSession<D>, OdbcMiddlewareError> {
        OdbcSession::open(self.finish(), driver, dialects)
    }
}
