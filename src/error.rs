//! Error types for the FogBugz client.
//!
//! This module defines `FbError`, the unified error type used throughout
//! the crate for consistent error handling and propagation.
//!
//! # Security
//!
//! Error messages must never carry the account password or the session
//! token. Use `sanitize_message()` when constructing error messages from
//! external sources such as response bodies or transport errors.

use std::time::Duration;
use thiserror::Error;

/// FogBugz API error codes returned in `<error code="...">`.
pub mod codes {
    /// Incorrect password or username.
    pub const LOGON_FAILED: u32 = 1;
    /// More than one account matches the supplied email.
    pub const AMBIGUOUS_LOGON: u32 = 2;
    /// The token is missing, expired or was never issued.
    pub const NOT_LOGGED_ON: u32 = 3;
    /// A required argument was missing from the command.
    pub const ARGUMENT_MISSING: u32 = 10;
}

/// Unified error type for all FogBugz operations.
#[derive(Error, Debug)]
pub enum FbError {
    /// Configuration error - missing or invalid environment variables.
    #[error("configuration error: {0}")]
    Config(String),

    /// HTTP request failed during transmission.
    #[error("HTTP request failed: {0}")]
    Http(#[source] reqwest::Error),

    /// HTTP client initialization failed.
    #[error("HTTP client error: {0}")]
    HttpClient(#[source] reqwest::Error),

    /// HTTP response returned a non-success status code.
    #[error("HTTP {status}: {body}")]
    HttpStatus {
        /// The HTTP status code returned.
        status: reqwest::StatusCode,
        /// The response body, potentially containing error details.
        body: String,
    },

    /// Request timed out.
    #[error("request timed out after {duration:?} - the server may be slow or unreachable")]
    Timeout {
        /// How long we waited before timing out.
        duration: Duration,
        /// The command that timed out.
        operation: String,
    },

    /// The response body was not well-formed XML.
    #[error("malformed XML response: {0}")]
    Xml(#[from] roxmltree::Error),

    /// The API answered with an `<error>` element.
    #[error("FogBugz API error {code}: {message}")]
    Api {
        /// FogBugz error code.
        code: u32,
        /// Human-readable message from the server.
        message: String,
    },

    /// Logon was refused.
    #[error("authentication failed - check FOGBUGZ_EMAIL and FOGBUGZ_PASSWORD")]
    Authentication,

    /// A lookup matched nothing.
    #[error("{kind} not found: {id}")]
    NotFound {
        /// Entity kind, e.g. `case` or `person`.
        kind: &'static str,
        /// The identifier or name that was looked up.
        id: String,
    },

    /// A required value was unset before a command could be sent.
    #[error("precondition failed: {0}")]
    Precondition(String),

    /// The server has not granted the operation for this entity.
    #[error("operation {operation} is not allowed on case {number}")]
    RejectedOperation {
        /// The operation that was attempted.
        operation: String,
        /// The case number, rendered for display.
        number: String,
    },

    /// The response did not have the shape needed to update the entity.
    #[error("could not reconcile response: {0}")]
    Reconciliation(String),

    /// Input validation failed.
    #[error("validation error: {0}")]
    Validation(String),

    /// Reading an attachment from disk failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl FbError {
    /// Creates a configuration error for a missing environment variable.
    pub fn missing_env(var_name: &str) -> Self {
        FbError::Config(format!(
            "missing required environment variable: {}",
            var_name
        ))
    }

    /// Creates a configuration error for an invalid value.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        FbError::Config(message.into())
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        FbError::Validation(message.into())
    }

    /// Creates a precondition error.
    pub fn precondition(message: impl Into<String>) -> Self {
        FbError::Precondition(message.into())
    }

    /// Creates a reconciliation error.
    pub fn reconciliation(message: impl Into<String>) -> Self {
        FbError::Reconciliation(message.into())
    }

    /// Creates a not found error.
    pub fn not_found(kind: &'static str, id: impl Into<String>) -> Self {
        FbError::NotFound {
            kind,
            id: id.into(),
        }
    }

    /// Creates a timeout error.
    pub fn timeout(duration: Duration, operation: impl Into<String>) -> Self {
        FbError::Timeout {
            duration,
            operation: operation.into(),
        }
    }

    /// Maps an `<error code="..">` element to the matching variant.
    pub fn api(code: u32, message: impl Into<String>) -> Self {
        match code {
            codes::LOGON_FAILED | codes::AMBIGUOUS_LOGON => FbError::Authentication,
            _ => FbError::Api {
                code,
                message: message.into(),
            },
        }
    }

    /// Returns true if the server reported that the token is not valid.
    #[must_use]
    pub fn is_not_logged_on(&self) -> bool {
        matches!(self, FbError::Api { code, .. } if *code == codes::NOT_LOGGED_ON)
    }

    /// Returns true for errors raised locally before any request was sent.
    #[must_use]
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            FbError::Precondition(_) | FbError::RejectedOperation { .. } | FbError::Validation(_)
        )
    }

    /// Replaces every occurrence of each secret with `[REDACTED]`.
    ///
    /// Empty secrets are ignored so an unset token does not blank the message.
    #[must_use]
    pub fn sanitize_message(message: &str, secrets: &[&str]) -> String {
        secrets
            .iter()
            .filter(|secret| !secret.is_empty())
            .fold(message.to_string(), |acc, secret| {
                acc.replace(secret, "[REDACTED]")
            })
    }
}
