//! Recording fake transport shared by integration tests.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;
use fogbugz::{Command, Dispatch, FbError, Request, Response};
use reqwest::Method;

pub const ENDPOINT: &str = "https://example.fogbugz.com";

pub const API_XML: &str =
    "<response><version>8</version><minversion>1</minversion><url>api.asp?</url></response>";

/// One call made through the fake, in order.
#[derive(Debug, Clone)]
pub enum Call {
    Fetch(String),
    Invoke(Request),
}

/// Dispatch that records every call and answers from a script, falling back
/// to plausible canned replies.
pub struct FakeDispatch {
    calls: Mutex<Vec<Call>>,
    scripted: Mutex<HashMap<Command, VecDeque<String>>>,
    logons: Mutex<u32>,
    properties: HashMap<String, String>,
}

impl FakeDispatch {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            scripted: Mutex::new(HashMap::new()),
            logons: Mutex::new(0),
            properties: HashMap::new(),
        }
    }

    /// Queues a reply body for the next `command`.
    pub fn script(self, command: Command, body: &str) -> Self {
        self.scripted
            .lock()
            .unwrap()
            .entry(command)
            .or_default()
            .push_back(body.to_string());
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn requests(&self) -> Vec<Request> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Invoke(request) => Some(request),
                Call::Fetch(_) => None,
            })
            .collect()
    }

    pub fn commands(&self) -> Vec<Command> {
        self.requests().iter().map(Request::command).collect()
    }

    pub fn count(&self, command: Command) -> usize {
        self.commands().into_iter().filter(|c| *c == command).count()
    }

    pub fn fetches(&self) -> usize {
        self.calls()
            .iter()
            .filter(|call| matches!(call, Call::Fetch(_)))
            .count()
    }

    fn default_body(&self, request: &Request) -> String {
        let number = request.parameter("ixBug").unwrap_or("7");
        match request.command() {
            Command::Logon => {
                let mut logons = self.logons.lock().unwrap();
                *logons += 1;
                format!("<response><token>tok-{}</token></response>", logons)
            }
            Command::Logoff => "<response></response>".to_string(),
            Command::New
            | Command::Edit
            | Command::Assign
            | Command::Reopen
            | Command::Reactivate
            | Command::Resolve => format!(
                r#"<response><case ixBug="{}" operations="edit,close"></case></response>"#,
                number
            ),
            Command::Close => format!(
                r#"<response><case ixBug="{}" operations="reopen"></case></response>"#,
                number
            ),
            Command::Search => r#"<response><cases count="0"></cases></response>"#.to_string(),
            _ => "<response></response>".to_string(),
        }
    }
}

#[async_trait]
impl Dispatch for FakeDispatch {
    async fn invoke(&self, request: &Request) -> Result<Response, FbError> {
        assert!(
            request.command().is_anonymous() || request.parameter("token").is_some(),
            "{} sent without a token",
            request.command()
        );
        self.calls.lock().unwrap().push(Call::Invoke(request.clone()));

        let scripted = self
            .scripted
            .lock()
            .unwrap()
            .get_mut(&request.command())
            .and_then(VecDeque::pop_front);
        let body = scripted.unwrap_or_else(|| self.default_body(request));
        Response::parse(&body)
    }

    async fn fetch(&self, _method: Method, url: &str) -> Result<Response, FbError> {
        self.calls.lock().unwrap().push(Call::Fetch(url.to_string()));
        Response::parse(API_XML)
    }

    fn endpoint(&self) -> &str {
        ENDPOINT
    }

    fn email(&self) -> &str {
        "me@example.com"
    }

    fn password(&self) -> &str {
        "hunter2"
    }

    fn property(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }

    fn set_property(&mut self, key: &str, value: String) {
        self.properties.insert(key.to_string(), value);
    }
}
