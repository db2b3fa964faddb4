//! The active-session handle passed to collaborators.

use std::fmt;

/// Endpoint and token of a logged-on session.
///
/// Builders receive this explicitly so they can produce token-bearing
/// download links without reaching for any shared state.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionContext {
    endpoint: String,
    token: String,
}

impl SessionContext {
    /// Creates a context for a logged-on session.
    pub fn new(endpoint: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            token: token.into(),
        }
    }

    /// Base URL of the installation.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Session token. Must never be logged.
    pub fn token(&self) -> &str {
        &self.token
    }
}

impl fmt::Debug for SessionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionContext")
            .field("endpoint", &self.endpoint)
            .field("token", &"[REDACTED]")
            .finish()
    }
}
