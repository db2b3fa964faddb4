//! # fogbugz
//!
//! A session-managed client for the FogBugz XML API.
//!
//! Callers work with cases and people; the [`Session`] turns each call into
//! an authenticated API command, logging on lazily before the first one,
//! and writes the server's answer (case number, allowed operations) back
//! onto the case that was sent.
//!
//! ## Architecture
//!
//! - [`config`] - Configuration loading from environment variables
//! - [`error`] - Error types with credential redaction
//! - [`dispatch`] - The transport seam and its reqwest implementation
//! - [`session`] - Session state machine and protocol layer
//! - [`model`] - Cases, people, projects, areas and capabilities
//! - [`builder`] - Entity construction from response rows
//!
//! ## Configuration
//!
//! - `FOGBUGZ_URL`: Base URL of the installation
//! - `FOGBUGZ_EMAIL`: Account email
//! - `FOGBUGZ_PASSWORD`: Account password
//!
//! Optional:
//! - `FOGBUGZ_TIMEOUT_SECS`: Request timeout (default 30)
//! - `RUST_LOG`: Log level (e.g., `fogbugz=debug`)
//!
//! ## Example
//!
//! ```ignore
//! use fogbugz::{Case, Config, HttpDispatch, Session};
//!
//! async fn example() -> Result<(), fogbugz::FbError> {
//!     let config = Config::from_env()?;
//!     let mut session = Session::new(HttpDispatch::new(&config)?);
//!
//!     let mut case = Case::new("Inbox", "Misc", "Printer on fire", "Smoke everywhere");
//!     session.create(&mut case).await?;
//!
//!     case.set_event("Fire department called");
//!     session.resolve(&mut case).await?;
//!
//!     session.close().await
//! }
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod builder;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod model;
pub mod session;

pub use config::Config;
pub use dispatch::{Command, Dispatch, HttpDispatch, Request, Response};
pub use error::FbError;
pub use model::{AllowedOperation, Area, Attachment, Case, Event, Person, Project, Resource};
pub use session::{ConnectedSession, Session, SessionContext, State};
