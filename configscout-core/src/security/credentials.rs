//! Secure credential container with automatic memory zeroing.
//!
//! # Security
//! - Username and password are stored in `Zeroizing<T>` containers
//! - Memory is automatically cleared when credentials go out of scope
//! - The password is never exposed in debug output or logs

use std::fmt;
use zeroize::{Zeroize, Zeroizing};

/// SQL Server login credentials that zero their memory on drop.
///
/// # Example
///
/// ```rust
/// use configscout_core::security::Credentials;
///
/// let creds = Credentials::new("auditor".to_string(), Some("secret".to_string()));
/// assert_eq!(creds.username(), "auditor");
/// assert!(creds.has_password());
/// assert!(!format!("{creds:?}").contains("secret"));
/// ```
#[derive(Clone, Zeroize)]
#[zeroize(drop)]
pub struct Credentials {
    username: Zeroizing<String>,
    password: Zeroizing<Option<String>>,
}

impl Credentials {
    /// Creates new credentials with automatic memory zeroing.
    pub fn new(username: String, password: Option<String>) -> Self {
        Self {
            username: Zeroizing::new(username),
            password: Zeroizing::new(password),
        }
    }

    /// Gets the username.
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Checks if a password is present without exposing it.
    pub fn has_password(&self) -> bool {
        self.password.is_some()
    }

    /// Password for the driver login; empty when none was supplied.
    pub(crate) fn password(&self) -> &str {
        self.password.as_deref().unwrap_or_default()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username())
            .field("password", &self.has_password().then_some("****"))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credentials_new() {
        let creds = Credentials::new("testuser".to_string(), Some("testpass".to_string()));
        assert_eq!(creds.username(), "testuser");
        assert!(creds.has_password());
        assert_eq!(creds.password(), "testpass");
    }

    #[test]
    fn test_credentials_no_password() {
        let creds = Credentials::new("testuser".to_string(), None);
        assert!(!creds.has_password());
        assert_eq!(creds.password(), "");
    }

    #[test]
    fn test_credential_debug_masks_password() {
        let creds = Credentials::new("sa".to_string(), Some("hunter2".to_string()));
        let debug = format!("{creds:?}");
        assert!(!debug.contains("hunter2"));
        assert!(debug.contains("****"));
        assert!(debug.contains("sa"));
    }

    #[test]
    fn test_credentials_clone() {
        let creds1 = Credentials::new("user".to_string(), Some("pass".to_string()));
        let creds2 = creds1.clone();
        assert_eq!(creds1.username(), creds2.username());
        assert_eq!(creds1.has_password(), creds2.has_password());
    }
}
