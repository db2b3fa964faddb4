//! fogbugz - run a case search from the command line.
//!
//! Logs on with the configured account, runs the query given as arguments,
//! prints each matching case as one JSON line on stdout, then logs off.
//!
//! # Configuration
//!
//! Set the following environment variables (or use a `.env` file):
//!
//! - `FOGBUGZ_URL`: Base URL of the installation
//! - `FOGBUGZ_EMAIL`: Account email
//! - `FOGBUGZ_PASSWORD`: Account password
//!
//! # Usage
//!
//! ```bash
//! fogbugz assignedto:me status:active
//! ```

use anyhow::{bail, Context, Result};
use tracing_subscriber::{fmt, EnvFilter};

use fogbugz::{Config, HttpDispatch, Session};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (ignore errors if not found)
    dotenvy::dotenv().ok();

    // stdout carries the JSON output, so logs go to stderr
    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("fogbugz=info")),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    let criteria: Vec<String> = std::env::args().skip(1).collect();
    if criteria.is_empty() {
        bail!("usage: fogbugz <search terms...>");
    }

    let config = Config::from_env().context("Failed to load configuration")?;
    tracing::debug!(endpoint = %config.endpoint, "Configuration loaded");

    let dispatch = HttpDispatch::new(&config).context("Failed to create HTTP dispatch")?;
    let mut session = Session::new(dispatch);

    let criteria: Vec<&str> = criteria.iter().map(String::as_str).collect();
    let result = session.query(&criteria).await;

    // Log off even when the search failed
    if let Err(e) = session.close().await {
        tracing::warn!(error = %e, "Logoff failed");
    }

    let cases = result.context("Search failed")?;
    tracing::info!(count = cases.len(), "Search complete");

    for case in &cases {
        println!("{}", serde_json::to_string(case).context("Failed to encode case")?);
    }

    Ok(())
}
