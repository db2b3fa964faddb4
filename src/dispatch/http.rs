//! HTTP transport for the FogBugz XML API.
//!
//! Commands are sent as `GET {endpoint}/{path}cmd=...&key=value` where
//! `path` is the API location discovered from `api.xml` (defaulting to
//! `api.asp?`). Requests carrying attachments are sent as a multipart POST
//! instead, with the files under `File1..FileN` and `nFileCount`.
//!
//! # Security
//!
//! The password and the session token are never logged. All error messages
//! are sanitized before they leave this module.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Method, StatusCode};

use super::{join_url, Dispatch, Request, Response, PATH_PROPERTY};
use crate::config::Config;
use crate::error::FbError;
use crate::model::keys;

/// API path used until discovery has run.
const DEFAULT_API_PATH: &str = "api.asp?";

/// Maximum length for HTTP error response bodies to avoid leaking verbose server internals.
const MAX_ERROR_BODY_LEN: usize = 500;

/// reqwest-backed [`Dispatch`].
///
/// # Example
///
/// ```ignore
/// let config = Config::from_env()?;
/// let dispatch = HttpDispatch::new(&config)?;
/// let mut session = Session::new(dispatch);
/// ```
pub struct HttpDispatch {
    /// The underlying HTTP client (cloning is cheap).
    http: Client,

    /// Base URL of the installation, without trailing slash.
    endpoint: String,

    email: String,

    /// SECURITY: Never log this value!
    password: String,

    timeout: Duration,

    properties: HashMap<String, String>,
}

impl HttpDispatch {
    /// Creates a dispatch from configuration.
    ///
    /// # Errors
    ///
    /// Returns `FbError::HttpClient` if the HTTP client fails to initialize.
    pub fn new(config: &Config) -> Result<Self, FbError> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(FbError::HttpClient)?;

        Ok(Self {
            http,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            email: config.email.clone(),
            password: config.password().to_string(),
            timeout: config.timeout,
            properties: HashMap::new(),
        })
    }

    /// The command URL without any parameters.
    fn command_base(&self) -> String {
        let path = self.property(PATH_PROPERTY).unwrap_or(DEFAULT_API_PATH);
        join_url(&self.endpoint, path)
    }

    /// Builds the full GET URL for a command.
    fn command_url(&self, request: &Request) -> String {
        let mut url = self.command_base();
        if !url.ends_with('?') && !url.ends_with('&') {
            url.push(if url.contains('?') { '&' } else { '?' });
        }

        url.push_str(keys::CMD);
        url.push('=');
        url.push_str(&urlencoding::encode(request.command().as_str()));
        for (key, value) in request.parameters() {
            url.push('&');
            url.push_str(&urlencoding::encode(key));
            url.push('=');
            url.push_str(&urlencoding::encode(value));
        }
        url
    }

    /// Builds the multipart form for a request with attachments.
    fn multipart_form(request: &Request) -> Result<Form, FbError> {
        let mut form = Form::new().text(keys::CMD, request.command().as_str().to_string());
        for (key, value) in request.parameters() {
            form = form.text(key.clone(), value.clone());
        }

        for (index, attachment) in request.attachments().iter().enumerate() {
            let part = Part::bytes(attachment.bytes().to_vec())
                .file_name(attachment.filename().to_string())
                .mime_str(attachment.content_type())
                .map_err(|e| {
                    FbError::validation(format!(
                        "invalid content type for {}: {}",
                        attachment.filename(),
                        e
                    ))
                })?;
            form = form.part(format!("File{}", index + 1), part);
        }

        Ok(form.text(
            keys::FILE_COUNT,
            request.attachments().len().to_string(),
        ))
    }

    /// Secrets that must be scrubbed from anything derived from this request.
    fn secrets<'a>(&'a self, request: Option<&'a Request>) -> Vec<&'a str> {
        let mut secrets = vec![self.password.as_str()];
        if let Some(token) = request.and_then(|r| r.parameter(keys::TOKEN)) {
            secrets.push(token);
        }
        secrets
    }

    /// Sends a prepared request and parses the XML reply.
    async fn execute(
        &self,
        builder: reqwest::RequestBuilder,
        operation: &str,
        secrets: &[&str],
    ) -> Result<Response, FbError> {
        let response = builder
            .send()
            .await
            .map_err(|e| self.transport_error(e, operation))?;
        let status = response.status();

        if !status.is_success() {
            return Err(Self::handle_http_error(status, response, secrets).await);
        }

        let body = response
            .text()
            .await
            .map_err(|e| self.transport_error(e, operation))?;

        tracing::trace!(
            body = %FbError::sanitize_message(&body, secrets),
            "FogBugz API response"
        );

        Response::parse(&body)
    }

    /// Maps a reqwest failure while sending or reading a reply.
    ///
    /// The URL is stripped: it carries the password on LOGON and the token
    /// on every other command.
    fn transport_error(&self, error: reqwest::Error, operation: &str) -> FbError {
        if error.is_timeout() {
            return FbError::timeout(self.timeout, operation);
        }
        FbError::Http(error.without_url())
    }

    /// Handles HTTP-level errors and converts to FbError.
    async fn handle_http_error(
        status: StatusCode,
        response: reqwest::Response,
        secrets: &[&str],
    ) -> FbError {
        let body = response.text().await.unwrap_or_default();
        let body = FbError::sanitize_message(&body, secrets);
        let body = if body.len() > MAX_ERROR_BODY_LEN {
            let cut = (0..=MAX_ERROR_BODY_LEN)
                .rev()
                .find(|i| body.is_char_boundary(*i))
                .unwrap_or(0);
            format!("{}...[truncated]", &body[..cut])
        } else {
            body
        };

        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => FbError::Authentication,
            StatusCode::NOT_FOUND => FbError::not_found("resource", "endpoint"),
            StatusCode::BAD_GATEWAY
            | StatusCode::SERVICE_UNAVAILABLE
            | StatusCode::GATEWAY_TIMEOUT => {
                tracing::warn!(status = %status, "FogBugz server temporarily unavailable");
                FbError::HttpStatus { status, body }
            }
            _ => FbError::HttpStatus { status, body },
        }
    }
}

#[async_trait]
impl Dispatch for HttpDispatch {
    async fn invoke(&self, request: &Request) -> Result<Response, FbError> {
        let command = request.command();
        let secrets = self.secrets(Some(request));

        tracing::debug!(
            command = %command,
            parameters = ?request.parameter_names(),
            attachments = request.attachments().len(),
            "Sending FogBugz command"
        );

        let builder = if request.attachments().is_empty() {
            self.http.get(self.command_url(request))
        } else {
            self.http
                .post(self.command_base())
                .multipart(Self::multipart_form(request)?)
        };

        self.execute(builder, command.as_str(), &secrets).await
    }

    async fn fetch(&self, method: Method, url: &str) -> Result<Response, FbError> {
        tracing::debug!(method = %method, url = %url, "Fetching FogBugz resource");

        let secrets = self.secrets(None);
        let builder = self.http.request(method.clone(), url);
        self.execute(builder, &format!("{} {}", method, url), &secrets)
            .await
    }

    fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn email(&self) -> &str {
        &self.email
    }

    fn password(&self) -> &str {
        &self.password
    }

    fn property(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }

    fn set_property(&mut self, key: &str, value: String) {
        self.properties.insert(key.to_string(), value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Attachment;

    /// Creates a dispatch for unit tests without requiring env vars.
    fn test_dispatch() -> HttpDispatch {
        let config = Config::new("https://example.fogbugz.com/", "me@example.com", "hunter2")
            .unwrap();
        HttpDispatch::new(&config).unwrap()
    }

    #[test]
    fn test_command_url_default_path() {
        let dispatch = test_dispatch();
        let request = crate::dispatch::Request::new(crate::dispatch::Command::Search)
            .param("q", "assignedto:me status:active")
            .param("token", "abc");
        assert_eq!(
            dispatch.command_url(&request),
            "https://example.fogbugz.com/api.asp?cmd=search&q=assignedto%3Ame%20status%3Aactive&token=abc"
        );
    }

    #[test]
    fn test_command_url_uses_discovered_path() {
        let mut dispatch = test_dispatch();
        dispatch.set_property(PATH_PROPERTY, "fogbugz/api.asp?".to_string());
        let request = crate::dispatch::Request::new(crate::dispatch::Command::Logoff)
            .param("token", "abc");
        assert_eq!(
            dispatch.command_url(&request),
            "https://example.fogbugz.com/fogbugz/api.asp?cmd=logoff&token=abc"
        );
    }

    #[test]
    fn test_command_url_adds_separator() {
        let mut dispatch = test_dispatch();
        dispatch.set_property(PATH_PROPERTY, "api.asp".to_string());
        let request = crate::dispatch::Request::new(crate::dispatch::Command::Logoff);
        assert_eq!(
            dispatch.command_url(&request),
            "https://example.fogbugz.com/api.asp?cmd=logoff"
        );
    }

    #[test]
    fn test_secrets_include_token() {
        let dispatch = test_dispatch();
        let request = crate::dispatch::Request::new(crate::dispatch::Command::Edit)
            .param("token", "tok-1");
        assert_eq!(dispatch.secrets(Some(&request)), vec!["hunter2", "tok-1"]);
        assert_eq!(dispatch.secrets(None), vec!["hunter2"]);
    }

    #[tokio::test]
    async fn test_transport_error_strips_credentials_from_url() {
        let dispatch = test_dispatch();
        // Nothing listens on port 1, so the connection is refused.
        let url = "http://127.0.0.1:1/api.asp?cmd=logon&email=me&password=hunter2";
        let error = dispatch.http.get(url).send().await.unwrap_err();
        assert!(error.url().is_some());

        let mapped = dispatch.transport_error(error, "logon");

        assert!(matches!(mapped, FbError::Http(_)));
        assert!(!mapped.to_string().contains("hunter2"));
        if let FbError::Http(inner) = &mapped {
            assert!(inner.url().is_none());
        }
    }

    #[tokio::test]
    async fn test_transport_error_maps_timeout() {
        let config = Config::new("https://example.fogbugz.com", "me@example.com", "hunter2")
            .unwrap()
            .with_timeout(Duration::from_millis(50));
        let dispatch = HttpDispatch::new(&config).unwrap();

        // Accept the connection but never answer.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let _hold = tokio::spawn(async move {
            let (socket, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(5)).await;
            drop(socket);
        });

        let url = format!("http://{}/api.asp?cmd=search&token=tok-1", addr);
        let error = dispatch.http.get(&url).send().await.unwrap_err();
        let mapped = dispatch.transport_error(error, "search");

        assert!(matches!(mapped, FbError::Timeout { ref operation, .. } if operation == "search"));
        assert!(!mapped.to_string().contains("tok-1"));
    }

    #[test]
    fn test_multipart_form_rejects_bad_content_type() {
        let request = crate::dispatch::Request::new(crate::dispatch::Command::New).attach(vec![
            Attachment::new("log.txt", b"boom".to_vec()).with_content_type("not a mime"),
        ]);
        assert!(matches!(
            HttpDispatch::multipart_form(&request),
            Err(FbError::Validation(_))
        ));
    }
}
