//! Connection parameters and authentication selection.
//!
//! Operator input (server, database, optional login) is turned into a
//! [`ConnectionParams`] value. The password only ever lives inside
//! [`Credentials`]; everything else here is safe to log, and the only
//! rendered connection string is the redacted one.

use super::credentials::Credentials;
use crate::error::{ConnectStage, ConnectionError, ScoutError};
use std::fmt;
use std::time::Duration;

/// Default SQL Server TCP port.
pub const DEFAULT_PORT: u16 = 1433;

/// Where the target server listens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerAddress {
    /// Plain host with an optional explicit port
    Host { host: String, port: Option<u16> },
    /// Named instance resolved through the SQL Browser service
    Instance { host: String, instance: String },
}

impl ServerAddress {
    /// Parses `host`, `host,port`, `host\instance` and `tcp:`-prefixed forms.
    ///
    /// `.` and `(local)` are accepted as aliases for `localhost`.
    ///
    /// # Errors
    /// Returns a [`ConnectStage::Resolve`] error for an empty host, an empty
    /// instance name or a port that is not a non-zero `u16`.
    ///
    /// # Example
    /// ```rust
    /// use configscout_core::security::ServerAddress;
    ///
    /// let addr = ServerAddress::parse("db01,14330")?;
    /// assert_eq!(
    ///     addr,
    ///     ServerAddress::Host { host: "db01".to_string(), port: Some(14330) }
    /// );
    /// # Ok::<(), configscout_core::error::ConnectionError>(())
    /// ```
    pub fn parse(server: &str) -> Result<Self, ConnectionError> {
        let server = server.trim();
        let server = server.strip_prefix("tcp:").unwrap_or(server);

        if let Some((host, instance)) = server.split_once('\\') {
            let instance = instance.trim();
            if instance.is_empty() {
                return Err(ConnectionError::new(
                    ConnectStage::Resolve,
                    "instance name cannot be empty",
                ));
            }
            return Ok(Self::Instance {
                host: normalize_host(host)?,
                instance: instance.to_string(),
            });
        }

        if let Some((host, port)) = server.split_once(',') {
            let port = port
                .trim()
                .parse::<u16>()
                .ok()
                .filter(|p| *p != 0)
                .ok_or_else(|| {
                    ConnectionError::new(
                        ConnectStage::Resolve,
                        format!("invalid port '{}'", port.trim()),
                    )
                })?;
            return Ok(Self::Host {
                host: normalize_host(host)?,
                port: Some(port),
            });
        }

        Ok(Self::Host {
            host: normalize_host(server)?,
            port: None,
        })
    }

    /// Host part of the address.
    pub fn host(&self) -> &str {
        match self {
            Self::Host { host, .. } | Self::Instance { host, .. } => host,
        }
    }
}

impl fmt::Display for ServerAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Host { host, port: Some(port) } => write!(f, "{host},{port}"),
            Self::Host { host, port: None } => write!(f, "{host}"),
            Self::Instance { host, instance } => write!(f, "{host}\\{instance}"),
        }
    }
}

fn normalize_host(host: &str) -> Result<String, ConnectionError> {
    let host = host.trim();
    match host {
        "" => Err(ConnectionError::new(
            ConnectStage::Resolve,
            "server host cannot be empty",
        )),
        "." | "(local)" => Ok("localhost".to_string()),
        _ => Ok(host.to_string()),
    }
}

/// Authentication the driver will be asked to perform.
#[derive(Debug, Clone, Copy)]
pub enum AuthSelection<'a> {
    /// Trusted/integrated authentication of the current OS identity
    Integrated,
    /// SQL Server login with explicit credentials
    SqlServer(&'a Credentials),
}

/// Everything needed to open a scan session.
///
/// # Example
/// ```rust
/// use configscout_core::security::{ConnectionParams, Credentials};
///
/// let params = ConnectionParams::new("db01", "master")
///     .with_credentials(Credentials::new("auditor".to_string(), Some("pw".to_string())));
/// assert!(params.validate().is_ok());
/// assert!(!params.redacted_connection_string().contains("pw;"));
/// ```
#[derive(Debug, Clone)]
pub struct ConnectionParams {
    /// Server as entered by the operator
    pub server: String,
    /// Target database (catalog)
    pub database: String,
    /// Optional SQL Server login
    pub credentials: Option<Credentials>,
    /// Accept the server certificate without validation
    pub trust_server_certificate: bool,
    /// Upper bound for TCP connect plus login
    pub connect_timeout: Duration,
}

impl ConnectionParams {
    /// Creates parameters for integrated authentication with default settings.
    pub fn new(server: impl Into<String>, database: impl Into<String>) -> Self {
        Self {
            server: server.into(),
            database: database.into(),
            credentials: None,
            trust_server_certificate: false,
            connect_timeout: Duration::from_secs(30),
        }
    }

    /// Supplies a SQL Server login.
    #[must_use]
    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// Sets whether the server certificate is trusted without validation.
    #[must_use]
    pub const fn with_trust_server_certificate(mut self, trust: bool) -> Self {
        self.trust_server_certificate = trust;
        self
    }

    /// Sets the connect timeout.
    #[must_use]
    pub const fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Selects the authentication mode.
    ///
    /// A non-empty username selects a SQL Server login; anything else selects
    /// integrated authentication and any password is ignored.
    pub fn auth(&self) -> AuthSelection<'_> {
        match &self.credentials {
            Some(creds) if !creds.username().is_empty() => AuthSelection::SqlServer(creds),
            _ => AuthSelection::Integrated,
        }
    }

    /// Parses the server string.
    ///
    /// # Errors
    /// See [`ServerAddress::parse`].
    pub fn address(&self) -> Result<ServerAddress, ConnectionError> {
        ServerAddress::parse(&self.server)
    }

    /// Validates parameters before any connection attempt.
    ///
    /// # Errors
    /// Returns error if the server or database is empty, the server string
    /// is malformed, or the timeout is zero.
    pub fn validate(&self) -> crate::Result<()> {
        if self.server.trim().is_empty() {
            return Err(ScoutError::configuration("server cannot be empty"));
        }

        if self.database.trim().is_empty() {
            return Err(ScoutError::configuration("database cannot be empty"));
        }

        self.address()
            .map_err(|e| ScoutError::configuration(e.message))?;

        if self.connect_timeout.is_zero() {
            return Err(ScoutError::configuration(
                "connect_timeout must be greater than 0",
            ));
        }

        Ok(())
    }

    /// ADO-style connection string with the password masked.
    ///
    /// # Example
    /// ```rust
    /// use configscout_core::security::ConnectionParams;
    ///
    /// let params = ConnectionParams::new("localhost", "master");
    /// assert_eq!(
    ///     params.redacted_connection_string(),
    ///     "Server=localhost;Database=master;Integrated Security=true;"
    /// );
    /// ```
    pub fn redacted_connection_string(&self) -> String {
        let mut rendered = format!("Server={};Database={}", self.server.trim(), self.database);

        match self.auth() {
            AuthSelection::SqlServer(creds) => {
                rendered.push_str(&format!(";User Id={};Password=****;", creds.username()));
            }
            AuthSelection::Integrated => rendered.push_str(";Integrated Security=true;"),
        }

        if self.trust_server_certificate {
            rendered.push_str("TrustServerCertificate=true;");
        }

        rendered
    }
}
