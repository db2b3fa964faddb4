//! Transport seam between the session and the remote endpoint.
//!
//! [`Dispatch`] is the only thing the session knows about the network. The
//! production implementation is [`HttpDispatch`]; tests substitute a
//! recording fake.

mod http;
mod request;
mod response;

use async_trait::async_trait;
use reqwest::Method;

pub use http::HttpDispatch;
pub use request::{Command, Request};
pub use response::{Element, Response};

use crate::error::FbError;

/// Property under which the discovered API path is cached.
pub const PATH_PROPERTY: &str = "path";

/// Discovery document, relative to the endpoint.
pub const API_XML: &str = "api.xml";

/// Sends commands and raw requests to the FogBugz endpoint.
#[async_trait]
pub trait Dispatch: Send + Sync {
    /// Sends a command with its parameters and returns the parsed reply.
    async fn invoke(&self, request: &Request) -> Result<Response, FbError>;

    /// Requests an absolute URL without command framing.
    async fn fetch(&self, method: Method, url: &str) -> Result<Response, FbError>;

    /// Base URL of the installation.
    fn endpoint(&self) -> &str;

    /// Account email used for LOGON.
    fn email(&self) -> &str;

    /// Account password used for LOGON.
    fn password(&self) -> &str;

    /// Reads a transport property.
    fn property(&self, key: &str) -> Option<&str>;

    /// Stores a transport property.
    fn set_property(&mut self, key: &str, value: String);
}

/// Joins an endpoint and a relative path with exactly one slash.
pub fn join_url(endpoint: &str, path: &str) -> String {
    format!(
        "{}/{}",
        endpoint.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}
