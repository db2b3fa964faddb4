//! Commands and the parameterized requests that carry them.

use std::fmt;

use crate::model::{Attachment, Fields};

/// A named FogBugz API command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    /// Endpoint discovery via `api.xml`; never sent as `cmd=`.
    Api,
    /// Exchange email and password for a token.
    Logon,
    /// Invalidate the token.
    Logoff,
    /// Open a new case.
    New,
    /// Change fields on an existing case.
    Edit,
    /// Assign a case to a person.
    Assign,
    /// Close a resolved case.
    Close,
    /// Reopen a closed case.
    Reopen,
    /// Reactivate a resolved case.
    Reactivate,
    /// Resolve an active case.
    Resolve,
    /// Search cases.
    Search,
    /// List all people.
    ListPeople,
    /// List all projects.
    ListProjects,
    /// List all areas.
    ListAreas,
    /// Fetch one person.
    ViewPerson,
    /// Fetch one project.
    ViewProject,
    /// Fetch one area.
    ViewArea,
}

impl Command {
    /// The value sent as the `cmd` parameter.
    pub fn as_str(self) -> &'static str {
        match self {
            Command::Api => "api",
            Command::Logon => "logon",
            Command::Logoff => "logoff",
            Command::New => "new",
            Command::Edit => "edit",
            Command::Assign => "assign",
            Command::Close => "close",
            Command::Reopen => "reopen",
            Command::Reactivate => "reactivate",
            Command::Resolve => "resolve",
            Command::Search => "search",
            Command::ListPeople => "listPeople",
            Command::ListProjects => "listProjects",
            Command::ListAreas => "listAreas",
            Command::ViewPerson => "viewPerson",
            Command::ViewProject => "viewProject",
            Command::ViewArea => "viewArea",
        }
    }

    /// Whether the command can be sent without a session token.
    pub fn is_anonymous(self) -> bool {
        matches!(self, Command::Api | Command::Logon)
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A command plus its parameters and optional binary attachments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    command: Command,
    parameters: Fields,
    attachments: Vec<Attachment>,
}

impl Request {
    /// Creates a request with no parameters.
    pub fn new(command: Command) -> Self {
        Self {
            command,
            parameters: Fields::new(),
            attachments: Vec::new(),
        }
    }

    /// Adds a single parameter, replacing any previous value.
    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.parameters.insert(key.into(), value.into());
        self
    }

    /// Merges a parameter map into the request.
    pub fn with_params(mut self, parameters: Fields) -> Self {
        self.parameters.extend(parameters);
        self
    }

    /// Attaches files to be sent as multipart form data.
    pub fn attach(mut self, attachments: impl IntoIterator<Item = Attachment>) -> Self {
        self.attachments.extend(attachments);
        self
    }

    /// The command being sent.
    pub fn command(&self) -> Command {
        self.command
    }

    /// All parameters, sorted by name.
    pub fn parameters(&self) -> &Fields {
        &self.parameters
    }

    /// Returns a single parameter value.
    pub fn parameter(&self, key: &str) -> Option<&str> {
        self.parameters.get(key).map(String::as_str)
    }

    /// Files sent alongside the parameters.
    pub fn attachments(&self) -> &[Attachment] {
        &self.attachments
    }

    /// Parameter names only, for logging without leaking values.
    pub fn parameter_names(&self) -> Vec<&str> {
        self.parameters.keys().map(String::as_str).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_wire_names() {
        assert_eq!(Command::Logon.as_str(), "logon");
        assert_eq!(Command::ListPeople.as_str(), "listPeople");
        assert_eq!(Command::Reactivate.to_string(), "reactivate");
    }

    #[test]
    fn test_only_logon_and_api_are_anonymous() {
        assert!(Command::Api.is_anonymous());
        assert!(Command::Logon.is_anonymous());
        assert!(!Command::Logoff.is_anonymous());
        assert!(!Command::Search.is_anonymous());
    }

    #[test]
    fn test_request_builder() {
        let request = Request::new(Command::Search)
            .param("q", "123")
            .param("token", "t");
        assert_eq!(request.parameter("q"), Some("123"));
        assert_eq!(request.parameter_names(), vec!["q", "token"]);
        assert!(request.attachments().is_empty());
    }
}
