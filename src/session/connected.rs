//! The protocol layer of a logged-on session.
//!
//! `ConnectedSession` owns the token and the discovered API path, turns each
//! logical operation into a [`Request`], and writes the server's answer back
//! onto the case that initiated it.

use reqwest::Method;

use super::SessionContext;
use crate::builder::{build_resources, CaseBuilder};
use crate::dispatch::{join_url, Command, Dispatch, Request, Response, API_XML, PATH_PROPERTY};
use crate::error::FbError;
use crate::model::resource::required_id;
use crate::model::{keys, parse_operations, AllowedOperation, Case, Fields, Resource};

/// Element carrying case data in replies.
const CASE_TAG: &str = "case";

/// Token-holding protocol session.
///
/// Every method except [`ConnectedSession::logon`] requires a token. Use
/// [`Session`](super::Session) to have logon handled automatically.
pub struct ConnectedSession<D> {
    dispatch: D,
    token: Option<String>,
    url: Option<String>,
}

impl<D: Dispatch> ConnectedSession<D> {
    /// Wraps a dispatch. No request is made until [`logon`](Self::logon).
    pub fn new(dispatch: D) -> Self {
        Self {
            dispatch,
            token: None,
            url: None,
        }
    }

    /// The underlying transport.
    pub fn dispatch(&self) -> &D {
        &self.dispatch
    }

    /// Endpoint and token, if logged on.
    pub fn context(&self) -> Option<SessionContext> {
        self.token
            .as_ref()
            .map(|token| SessionContext::new(self.dispatch.endpoint(), token.clone()))
    }

    /// Reads the API location from `api.xml` once per session instance.
    async fn discover_endpoint(&mut self) -> Result<(), FbError> {
        if self.url.is_some() {
            return Ok(());
        }

        let api_url = join_url(self.dispatch.endpoint(), API_XML);
        tracing::debug!(url = %api_url, "Discovering FogBugz API path");

        let response = self.dispatch.fetch(Method::GET, &api_url).await?;
        let path = response
            .children()
            .remove("url")
            .filter(|url| !url.is_empty())
            .ok_or_else(|| FbError::reconciliation("api.xml response has no <url>"))?;

        self.dispatch.set_property(PATH_PROPERTY, path.clone());
        self.url = Some(path);
        Ok(())
    }

    /// Discovers the API path if needed, then exchanges credentials for a token.
    ///
    /// # Errors
    ///
    /// Returns `FbError::Authentication` if the credentials are refused, or
    /// `FbError::Reconciliation` if the reply carries no token.
    pub async fn logon(&mut self) -> Result<(), FbError> {
        self.discover_endpoint().await?;

        let request = Request::new(Command::Logon)
            .param(keys::EMAIL, self.dispatch.email())
            .param(keys::PASSWORD, self.dispatch.password());
        let response = self.dispatch.invoke(&request).await?;

        let token = response
            .children()
            .remove(keys::TOKEN)
            .filter(|token| !token.is_empty())
            .ok_or_else(|| FbError::reconciliation("logon response has no <token>"))?;

        tracing::info!(email = %self.dispatch.email(), "Logged on to FogBugz");
        self.token = Some(token);
        Ok(())
    }

    /// Forgets the token without telling the server.
    pub(super) fn drop_token(&mut self) {
        self.token = None;
    }

    /// Invalidates the token. The token is dropped even if the server call fails.
    ///
    /// # Errors
    ///
    /// Returns `FbError::Precondition` if not logged on.
    pub async fn logoff(&mut self) -> Result<(), FbError> {
        let token = self
            .token
            .take()
            .ok_or_else(|| FbError::precondition("logoff requires a token"))?;

        let request = Request::new(Command::Logoff).param(keys::TOKEN, token);
        self.dispatch.invoke(&request).await?;

        tracing::info!("Logged off from FogBugz");
        Ok(())
    }

    /// Opens a new case and reconciles its number and capabilities.
    ///
    /// # Errors
    ///
    /// Returns `FbError::Precondition` if not logged on, any dispatch error
    /// unchanged, or `FbError::Reconciliation` on an unexpected reply.
    pub async fn create(&self, case: &mut Case) -> Result<(), FbError> {
        self.require_token()?;
        let response = self
            .send(Command::New, case.request_parameters(), case)
            .await?;
        case.mark_sent(true);
        reconcile(case, &response)
    }

    /// Sends pending changes to an existing case.
    pub async fn edit(&self, case: &mut Case) -> Result<(), FbError> {
        self.mutate(Command::Edit, case, true).await
    }

    /// Sends an assignment (`sPersonAssignedTo`) with any other pending changes.
    pub async fn assign(&self, case: &mut Case) -> Result<(), FbError> {
        self.mutate(Command::Assign, case, false).await
    }

    /// Reactivates a resolved case.
    pub async fn reactivate(&self, case: &mut Case) -> Result<(), FbError> {
        self.mutate(Command::Reactivate, case, false).await
    }

    /// Reopens a closed case.
    pub async fn reopen(&self, case: &mut Case) -> Result<(), FbError> {
        self.mutate(Command::Reopen, case, false).await
    }

    /// Resolves an active case.
    pub async fn resolve(&self, case: &mut Case) -> Result<(), FbError> {
        self.mutate(Command::Resolve, case, false).await
    }

    /// Files a scout report keyed on the case title. The reply is not
    /// reconciled: the server may append to an existing case instead.
    pub async fn scout(&self, case: &mut Case) -> Result<(), FbError> {
        self.require_token()?;
        let mut parameters = case.request_parameters();
        parameters.insert(
            keys::S_SCOUT_DESCRIPTION.to_string(),
            case.title().unwrap_or_default().to_string(),
        );
        self.send(Command::New, parameters, case).await?;
        case.mark_sent(true);
        Ok(())
    }

    /// Closes a case the server has granted CLOSE on.
    ///
    /// # Errors
    ///
    /// Returns `FbError::RejectedOperation` without contacting the server if
    /// CLOSE is not in the case's capability set.
    pub async fn close(&self, case: &mut Case) -> Result<(), FbError> {
        self.require_token()?;
        require_allowed(case, AllowedOperation::Close)?;
        let number = require_number(case, Command::Close)?;

        let mut parameters = Fields::new();
        parameters.insert(keys::IX_BUG.to_string(), number.to_string());
        let response = self.send_plain(Command::Close, parameters).await?;
        reconcile(case, &response)
    }

    /// Runs a search and returns one case per result row, in order.
    pub async fn query(&self, criteria: &[&str]) -> Result<Vec<Case>, FbError> {
        let context = self.require_context()?;
        let response = self.search(criteria.join(" ")).await?;
        CaseBuilder::new(&context).build_all(&response)
    }

    /// Fetches a single case by number.
    ///
    /// # Errors
    ///
    /// Returns `FbError::NotFound` if no case has that number.
    pub async fn get_case(&self, number: u32) -> Result<Case, FbError> {
        let context = self.require_context()?;
        let response = self.search(number.to_string()).await?;
        CaseBuilder::new(&context).build(&response, number)
    }

    /// Lists every record of kind `R`.
    pub async fn find_all<R: Resource>(&self) -> Result<Vec<R>, FbError> {
        let response = self.send_plain(R::LIST, Fields::new()).await?;
        build_resources(&response)
    }

    /// Fetches one record of kind `R` by id.
    pub async fn get_by_id<R: Resource>(&self, id: u32) -> Result<R, FbError> {
        let mut parameters = Fields::new();
        parameters.insert(R::ID_PARAM.to_string(), id.to_string());
        let response = self.send_plain(R::VIEW, parameters).await?;
        first(build_resources(&response)?, R::KIND, id.to_string())
    }

    /// Fetches one record of kind `R` by name.
    pub async fn get_by_name<R: Resource>(&self, name: &str) -> Result<R, FbError> {
        let Some(param) = R::NAME_PARAM else {
            return self
                .find_all::<R>()
                .await?
                .into_iter()
                .find(|record| record.name() == name)
                .ok_or_else(|| FbError::not_found(R::KIND, name));
        };

        let mut parameters = Fields::new();
        parameters.insert(param.to_string(), name.to_string());
        let response = self.send_plain(R::VIEW, parameters).await?;
        first(build_resources(&response)?, R::KIND, name)
    }

    async fn search(&self, query: String) -> Result<Response, FbError> {
        let mut parameters = Fields::new();
        parameters.insert(keys::QUERY.to_string(), query);
        parameters.insert(keys::COLS.to_string(), keys::CASE_COLUMNS.join(","));
        self.send_plain(Command::Search, parameters).await
    }

    async fn mutate(
        &self,
        command: Command,
        case: &mut Case,
        with_attachments: bool,
    ) -> Result<(), FbError> {
        self.require_token()?;
        require_number(case, command)?;

        let parameters = case.request_parameters();
        let response = if with_attachments {
            self.send(command, parameters, case).await?
        } else {
            self.send_plain(command, parameters).await?
        };
        case.mark_sent(with_attachments);
        reconcile(case, &response)
    }

    /// Sends a command with the case's queued attachments, if any.
    async fn send(
        &self,
        command: Command,
        parameters: Fields,
        case: &Case,
    ) -> Result<Response, FbError> {
        let request = self
            .authenticated(command, parameters)?
            .attach(case.attachments().iter().cloned());
        self.dispatch.invoke(&request).await
    }

    async fn send_plain(&self, command: Command, parameters: Fields) -> Result<Response, FbError> {
        let request = self.authenticated(command, parameters)?;
        self.dispatch.invoke(&request).await
    }

    fn authenticated(&self, command: Command, parameters: Fields) -> Result<Request, FbError> {
        let token = self.require_token()?;
        Ok(Request::new(command)
            .with_params(parameters)
            .param(keys::TOKEN, token))
    }

    fn require_token(&self) -> Result<&str, FbError> {
        self.token
            .as_deref()
            .ok_or_else(|| FbError::precondition("not logged on"))
    }

    fn require_context(&self) -> Result<SessionContext, FbError> {
        self.context()
            .ok_or_else(|| FbError::precondition("not logged on"))
    }
}

/// Fails unless the case has been assigned a number.
pub(crate) fn require_number(case: &Case, command: Command) -> Result<u32, FbError> {
    case.number().ok_or_else(|| {
        FbError::precondition(format!("{} requires a case number", command))
    })
}

/// Fails unless the server has granted `operation` on the case.
pub(crate) fn require_allowed(case: &Case, operation: AllowedOperation) -> Result<(), FbError> {
    if case.allows(operation) {
        return Ok(());
    }
    tracing::debug!(number = %case.number_display(), operation = %operation, "Operation not allowed");
    Err(FbError::RejectedOperation {
        operation: operation.to_string(),
        number: case.number_display(),
    })
}

/// Applies the first `<case>` row's number and operations to the case.
fn reconcile(case: &mut Case, response: &Response) -> Result<(), FbError> {
    let row = response
        .data(CASE_TAG)
        .into_iter()
        .next()
        .ok_or_else(|| FbError::reconciliation("response has no <case> element"))?;

    let number = required_id(&row, keys::IX_BUG, CASE_TAG)?;
    let operations = parse_operations(row.get(keys::OPERATIONS).map(String::as_str).unwrap_or(""))?;

    case.reconcile(number, operations);
    Ok(())
}

fn first<R>(records: Vec<R>, kind: &'static str, id: impl Into<String>) -> Result<R, FbError> {
    records
        .into_iter()
        .next()
        .ok_or_else(|| FbError::not_found(kind, id))
}
