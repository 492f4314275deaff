//! Mapping of driver errors onto the scan error taxonomy.

use crate::error::{ConnectStage, ConnectionError, QueryError};
use tiberius::error::Error as DriverError;

/// First diagnostic reported by the driver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Diagnostic {
    pub(crate) state: Option<u8>,
    pub(crate) code: Option<u32>,
    pub(crate) message: String,
}

impl Diagnostic {
    pub(crate) fn from_driver(error: &DriverError) -> Self {
        match error {
            DriverError::Server(token) => Self {
                state: Some(token.state()),
                code: Some(token.code()),
                message: token.message().to_string(),
            },
            other => Self {
                state: None,
                code: None,
                message: other.to_string(),
            },
        }
    }
}

pub(crate) fn connection_error(stage: ConnectStage, error: &DriverError) -> ConnectionError {
    let diagnostic = Diagnostic::from_driver(error);
    let connection_error = ConnectionError::new(stage, diagnostic.message);
    match (diagnostic.state, diagnostic.code) {
        (Some(state), Some(code)) => connection_error.with_server_state(state, code),
        _ => connection_error,
    }
}

pub(crate) fn query_error(target: &str, error: &DriverError) -> QueryError {
    let diagnostic = Diagnostic::from_driver(error);
    QueryError::Driver {
        target: target.to_string(),
        state: diagnostic.state,
        code: diagnostic.code,
        message: diagnostic.message,
    }
}
