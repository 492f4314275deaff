//! Credential handling and connection parameters.
//!
//! # Security Guarantees
//! - Credentials are stored in `Zeroizing` containers for automatic memory clearing
//! - Passwords never appear in `Debug` output, logs or error messages
//! - Only a redacted connection string is ever rendered
//!
//! # Module Structure
//! - `credentials`: Secure credential container with automatic memory zeroing
//! - `connection`: Server address parsing, auth selection and connection parameters

mod connection;
mod credentials;

pub use connection::{AuthSelection, ConnectionParams, DEFAULT_PORT, ServerAddress};
pub use credentials::Credentials;
