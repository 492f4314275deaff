//! Error types with credential-free diagnostics.
//!
//! The taxonomy follows the scan's failure model: a [`ConnectionError`] is
//! fatal to a scan, a [`QueryError`] only fails the target it belongs to, and
//! an [`ExportError`] never touches scan state. Driver diagnostics (server
//! state, native code, message text) are preserved verbatim; connection
//! strings and passwords are never included.

use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Stage of connection establishment at which a [`ConnectionError`] occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConnectStage {
    /// The server string could not be turned into a driver configuration
    Resolve,
    /// The TCP socket (or SQL Browser lookup) could not be opened
    TcpConnect,
    /// The driver handshake or login was rejected
    DriverConnect,
    /// The connect timeout elapsed before the session was established
    Timeout,
}

impl ConnectStage {
    /// Stable identifier used in status lines and JSON output.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Resolve => "resolve",
            Self::TcpConnect => "tcp-connect",
            Self::DriverConnect => "driver-connect",
            Self::Timeout => "timeout",
        }
    }
}

impl fmt::Display for ConnectStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fatal failure to open a session against the target server.
///
/// Carries the first diagnostic produced by the driver. `state` and `code`
/// are only present when the server itself answered with an error token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConnectionError {
    /// Where establishment stopped
    pub stage: ConnectStage,
    /// Server-reported error state
    pub state: Option<u8>,
    /// Server-reported native error number
    pub code: Option<u32>,
    /// Driver diagnostic text
    pub message: String,
}

impl ConnectionError {
    /// Creates a connection error without server state information.
    pub fn new(stage: ConnectStage, message: impl Into<String>) -> Self {
        Self {
            stage,
            state: None,
            code: None,
            message: message.into(),
        }
    }

    /// Attaches the server-reported state and native error code.
    #[must_use]
    pub const fn with_server_state(mut self, state: u8, code: u32) -> Self {
        self.state = Some(state);
        self.code = Some(code);
        self
    }
}

impl fmt::Display for ConnectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Connection failed ({})", self.stage)?;
        if let (Some(state), Some(code)) = (self.state, self.code) {
            write!(f, " [state {state}, code {code}]")?;
        }
        write!(f, ": {}", self.message)
    }
}

impl std::error::Error for ConnectionError {}

/// Non-fatal failure of a single catalog lookup.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum QueryError {
    /// The driver rejected the statement or the server returned an error token
    #[error("Query for '{target}' failed: {message}")]
    Driver {
        /// Configuration being looked up
        target: String,
        /// Server-reported error state
        state: Option<u8>,
        /// Server-reported native error number
        code: Option<u32>,
        /// Driver diagnostic text
        message: String,
    },

    /// A returned column could not be decoded as text
    #[error("Failed to decode column '{column}' for '{target}': {message}")]
    Decode {
        /// Configuration being looked up
        target: String,
        /// Column that failed to decode
        column: &'static str,
        /// Decoder diagnostic text
        message: String,
    },

    /// A single-row query produced no row at all
    #[error("Query for '{target}' returned no row")]
    NoRow {
        /// Configuration being looked up
        target: String,
    },
}

impl QueryError {
    /// Name of the configuration target the failed query belonged to.
    pub fn target(&self) -> &str {
        match self {
            Self::Driver { target, .. } | Self::Decode { target, .. } | Self::NoRow { target } => {
                target
            }
        }
    }
}

/// Failure to write the CSV export.
#[derive(Debug, Error)]
pub enum ExportError {
    /// The destination could not be opened for writing; nothing was written
    #[error("cannot-create-file: {}", .path.display())]
    CannotCreateFile {
        /// Export destination
        path: PathBuf,
        /// Error raised while creating the file
        #[source]
        source: std::io::Error,
    },

    /// The destination was created but writing the report failed
    #[error("Failed to write export file {}", .path.display())]
    Write {
        /// Export destination
        path: PathBuf,
        /// Underlying CSV writer or I/O failure
        #[source]
        source: csv::Error,
    },
}

impl ExportError {
    /// Short machine-readable reason code.
    pub const fn reason(&self) -> &'static str {
        match self {
            Self::CannotCreateFile { .. } => "cannot-create-file",
            Self::Write { .. } => "write-failed",
        }
    }
}

/// Umbrella error for configscout operations.
#[derive(Debug, Error)]
pub enum ScoutError {
    /// Connection establishment failed
    #[error(transparent)]
    Connection(#[from] ConnectionError),

    /// A catalog query failed
    #[error(transparent)]
    Query(#[from] QueryError),

    /// Writing the export failed
    #[error(transparent)]
    Export(#[from] ExportError),

    /// Another scan already holds the runner
    #[error("A scan is already in progress")]
    ScanInProgress,

    /// The scan task ended without producing a report
    #[error("Scan task failed: {context}")]
    ScanTask {
        /// What went wrong with the task
        context: String,
    },

    /// Configuration or validation error
    #[error("Configuration error: {message}")]
    Configuration {
        /// What was invalid
        message: String,
    },

    /// I/O operation failed
    #[error("I/O operation failed: {context}")]
    Io {
        /// Operation that failed
        context: String,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Serialization failed
    #[error("Serialization failed: {context}")]
    Serialization {
        /// What was being serialized
        context: String,
        /// Underlying serializer error
        #[source]
        source: serde_json::Error,
    },
}

/// Convenience type alias for Results with [`ScoutError`]
pub type Result<T> = std::result::Result<T, ScoutError>;

impl ScoutError {
    /// Creates a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Creates a serialization error with context
    pub fn serialization(context: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Serialization {
            context: context.into(),
            source,
        }
    }
}
