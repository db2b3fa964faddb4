//! Configuration management for the FogBugz client.
//!
//! This module handles loading configuration from environment variables,
//! with validation to ensure all required values are present.

use std::env;
use std::fmt;
use std::time::Duration;

use url::Url;

use crate::error::FbError;

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Configuration for connecting to a FogBugz installation.
///
/// The password is stored but never logged or exposed in error messages.
#[derive(Clone)]
pub struct Config {
    /// Base URL of the installation (e.g., `https://example.fogbugz.com`).
    pub endpoint: String,

    /// Account email used for logon.
    pub email: String,

    /// Account password. Must never be logged.
    password: String,

    /// Per-request timeout handed to the HTTP client.
    pub timeout: Duration,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("endpoint", &self.endpoint)
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl Config {
    /// Builds a configuration from explicit values, applying the same
    /// validation as [`Config::from_env`].
    ///
    /// # Errors
    ///
    /// Returns `FbError::Config` if the endpoint is not an http(s) URL or the
    /// password looks like a placeholder.
    pub fn new(
        endpoint: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Result<Self, FbError> {
        let endpoint = Self::validate_endpoint(endpoint.into())?;
        let password = password.into();
        Self::validate_password(&password)?;

        Ok(Config {
            endpoint,
            email: email.into(),
            password,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        })
    }

    /// Loads configuration from environment variables.
    ///
    /// # Required Environment Variables
    ///
    /// - `FOGBUGZ_URL`: Base URL of the FogBugz installation
    /// - `FOGBUGZ_EMAIL`: Account email
    /// - `FOGBUGZ_PASSWORD`: Account password
    ///
    /// # Optional
    ///
    /// - `FOGBUGZ_TIMEOUT_SECS`: Request timeout (default 30)
    ///
    /// # Errors
    ///
    /// Returns `FbError::Config` if any required variable is missing
    /// or if values fail validation.
    pub fn from_env() -> Result<Self, FbError> {
        let endpoint = Self::get_required_env("FOGBUGZ_URL")?;
        let email = Self::get_required_env("FOGBUGZ_EMAIL")?;
        let password = Self::get_required_env("FOGBUGZ_PASSWORD")?;

        let config = Self::new(endpoint, email, password)?;

        match env::var("FOGBUGZ_TIMEOUT_SECS") {
            Ok(raw) => Ok(config.with_timeout(Self::parse_timeout(&raw)?)),
            Err(_) => Ok(config),
        }
    }

    /// Overrides the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Returns the account password.
    ///
    /// Only the dispatch layer should read this, and only to send LOGON.
    pub fn password(&self) -> &str {
        &self.password
    }

    /// Gets a required environment variable, returning an error if missing or empty.
    fn get_required_env(name: &str) -> Result<String, FbError> {
        env::var(name)
            .map_err(|_| FbError::missing_env(name))
            .and_then(|value| {
                if value.trim().is_empty() {
                    Err(FbError::missing_env(name))
                } else {
                    Ok(value)
                }
            })
    }

    /// Validates and normalizes the endpoint URL.
    fn validate_endpoint(url: String) -> Result<String, FbError> {
        let url = url.trim().trim_end_matches('/').to_string();

        let parsed = Url::parse(&url)
            .map_err(|e| FbError::invalid_config(format!("FOGBUGZ_URL is not a valid URL: {}", e)))?;

        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(FbError::invalid_config(
                "FOGBUGZ_URL must start with http:// or https://",
            ));
        }

        Ok(url)
    }

    /// Validates the password is not a placeholder value.
    fn validate_password(password: &str) -> Result<(), FbError> {
        let lower = password.to_lowercase();
        let placeholder_patterns = ["your_password", "placeholder", "changeme", "xxx"];

        if placeholder_patterns.iter().any(|p| lower.contains(p)) {
            return Err(FbError::invalid_config(
                "FOGBUGZ_PASSWORD appears to be a placeholder value",
            ));
        }

        Ok(())
    }

    fn parse_timeout(raw: &str) -> Result<Duration, FbError> {
        raw.trim()
            .parse::<u64>()
            .ok()
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
            .ok_or_else(|| {
                FbError::invalid_config("FOGBUGZ_TIMEOUT_SECS must be a positive integer")
            })
    }
}
