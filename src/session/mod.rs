//! Session lifecycle.
//!
//! [`Session`] is the type callers use. It starts [`State::Disconnected`]
//! and logs on transparently before the first operation that needs a
//! token. The context of the active logon is exposed through
//! [`Session::context`] for collaborators that need it.
//!
//! Closing a case ends the working session: the state drops back to
//! disconnected without a LOGOFF, and the next operation logs on again.
//! [`Session::close`] is the graceful shutdown that issues LOGOFF.
//!
//! All operations take `&mut self`, so one session serves one caller at a
//! time. Share it across tasks behind a `tokio::sync::Mutex`.

mod connected;
mod context;

pub use connected::ConnectedSession;
pub use context::SessionContext;

use connected::{require_allowed, require_number};

use crate::dispatch::{Command, Dispatch};
use crate::error::FbError;
use crate::model::{AllowedOperation, Case, Resource};

/// Whether the session currently holds a live logon.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    /// No logon; the next operation will log on first.
    Disconnected,
    /// Logged on; operations go straight to the server.
    Connected,
}

/// Self-connecting FogBugz session.
///
/// # Example
///
/// ```ignore
/// let dispatch = HttpDispatch::new(&Config::from_env()?)?;
/// let mut session = Session::new(dispatch);
///
/// for case in session.query(&["assignedto:me", "status:active"]).await? {
///     println!("#{:?}: {:?}", case.number(), case.title());
/// }
///
/// session.close().await?;
/// ```
pub struct Session<D> {
    inner: ConnectedSession<D>,
    state: State,
    current: Option<SessionContext>,
}

impl<D: Dispatch> Session<D> {
    /// Creates a disconnected session. No request is made yet.
    pub fn new(dispatch: D) -> Self {
        Self {
            inner: ConnectedSession::new(dispatch),
            state: State::Disconnected,
            current: None,
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> State {
        self.state
    }

    /// The active logon, if connected.
    pub fn context(&self) -> Option<&SessionContext> {
        self.current.as_ref()
    }

    /// The underlying transport.
    pub fn dispatch(&self) -> &D {
        self.inner.dispatch()
    }

    fn transition(&mut self, next: State) {
        if self.state != next {
            tracing::debug!(from = ?self.state, to = ?next, "Session state change");
            self.state = next;
        }
    }

    /// Logs on if disconnected, then publishes the active context.
    ///
    /// Calling this while connected issues no request.
    ///
    /// # Errors
    ///
    /// Propagates logon failures; the session stays disconnected.
    pub async fn ensure_connected(&mut self) -> Result<(), FbError> {
        if self.state == State::Disconnected {
            self.inner.logon().await?;
            self.transition(State::Connected);
        }
        self.current = self.inner.context();
        Ok(())
    }

    /// Graceful shutdown: LOGOFF if connected, then disconnect.
    ///
    /// A never-connected session makes no request. The state is
    /// disconnected afterwards even if LOGOFF fails.
    pub async fn close(&mut self) -> Result<(), FbError> {
        let result = if self.state == State::Connected {
            self.inner.logoff().await
        } else {
            Ok(())
        };

        self.transition(State::Disconnected);
        self.current = None;
        result
    }

    /// Drops the logon without LOGOFF.
    fn disconnect_internal(&mut self) {
        if self.state == State::Connected {
            tracing::info!("Dropping FogBugz session after closing a case");
            self.transition(State::Disconnected);
        }
        self.inner.drop_token();
        self.current = None;
    }

    /// Opens a new case. See [`ConnectedSession::create`].
    pub async fn create(&mut self, case: &mut Case) -> Result<(), FbError> {
        self.ensure_connected().await?;
        self.inner.create(case).await
    }

    /// Sends pending changes. See [`ConnectedSession::edit`].
    pub async fn edit(&mut self, case: &mut Case) -> Result<(), FbError> {
        require_number(case, Command::Edit)?;
        self.ensure_connected().await?;
        self.inner.edit(case).await
    }

    /// Sends an assignment. See [`ConnectedSession::assign`].
    pub async fn assign(&mut self, case: &mut Case) -> Result<(), FbError> {
        require_number(case, Command::Assign)?;
        self.ensure_connected().await?;
        self.inner.assign(case).await
    }

    /// Reactivates a resolved case.
    pub async fn reactivate(&mut self, case: &mut Case) -> Result<(), FbError> {
        require_number(case, Command::Reactivate)?;
        self.ensure_connected().await?;
        self.inner.reactivate(case).await
    }

    /// Reopens a closed case.
    pub async fn reopen(&mut self, case: &mut Case) -> Result<(), FbError> {
        require_number(case, Command::Reopen)?;
        self.ensure_connected().await?;
        self.inner.reopen(case).await
    }

    /// Resolves an active case.
    pub async fn resolve(&mut self, case: &mut Case) -> Result<(), FbError> {
        require_number(case, Command::Resolve)?;
        self.ensure_connected().await?;
        self.inner.resolve(case).await
    }

    /// Files a scout report. See [`ConnectedSession::scout`].
    pub async fn scout(&mut self, case: &mut Case) -> Result<(), FbError> {
        self.ensure_connected().await?;
        self.inner.scout(case).await
    }

    /// Closes a case, then drops the logon without LOGOFF.
    ///
    /// # Errors
    ///
    /// Returns `FbError::RejectedOperation` before any request if the
    /// server has not granted CLOSE on the case.
    pub async fn close_case(&mut self, case: &mut Case) -> Result<(), FbError> {
        require_allowed(case, AllowedOperation::Close)?;
        require_number(case, Command::Close)?;
        self.ensure_connected().await?;

        let result = self.inner.close(case).await;
        self.disconnect_internal();
        result
    }

    /// Searches cases. Criteria are joined with spaces into one query.
    pub async fn query(&mut self, criteria: &[&str]) -> Result<Vec<Case>, FbError> {
        self.ensure_connected().await?;
        self.inner.query(criteria).await
    }

    /// Fetches one case by number.
    pub async fn get_case(&mut self, number: u32) -> Result<Case, FbError> {
        self.ensure_connected().await?;
        self.inner.get_case(number).await
    }

    /// Lists every record of kind `R`.
    pub async fn find_all<R: Resource>(&mut self) -> Result<Vec<R>, FbError> {
        self.ensure_connected().await?;
        self.inner.find_all().await
    }

    /// Fetches one record of kind `R` by id.
    pub async fn get_by_id<R: Resource>(&mut self, id: u32) -> Result<R, FbError> {
        self.ensure_connected().await?;
        self.inner.get_by_id(id).await
    }

    /// Fetches one record of kind `R` by name.
    pub async fn get_by_name<R: Resource>(&mut self, name: &str) -> Result<R, FbError> {
        self.ensure_connected().await?;
        self.inner.get_by_name(name).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::{Request, Response};
    use async_trait::async_trait;
    use reqwest::Method;

    /// Answers every command with a fixed reply.
    struct StubDispatch;

    #[async_trait]
    impl Dispatch for StubDispatch {
        async fn invoke(&self, request: &Request) -> Result<Response, FbError> {
            let body = match request.command() {
                Command::Logon => "<response><token>stub</token></response>",
                Command::Close => r#"<response><case ixBug="3" operations="reopen"/></response>"#,
                _ => r#"<response><case ixBug="3" operations="edit,close"/></response>"#,
            };
            Response::parse(body)
        }

        async fn fetch(&self, _method: Method, _url: &str) -> Result<Response, FbError> {
            Response::parse("<response><url>api.asp?</url></response>")
        }

        fn endpoint(&self) -> &str {
            "https://example.fogbugz.com"
        }

        fn email(&self) -> &str {
            "me@example.com"
        }

        fn password(&self) -> &str {
            "hunter2"
        }

        fn property(&self, _key: &str) -> Option<&str> {
            None
        }

        fn set_property(&mut self, _key: &str, _value: String) {}
    }

    #[tokio::test]
    async fn test_close_case_forgets_token() {
        let mut session = Session::new(StubDispatch);
        let mut case = Case::new("Inbox", "Misc", "Title", "Body");
        session.create(&mut case).await.unwrap();
        assert!(session.inner.context().is_some());

        session.close_case(&mut case).await.unwrap();

        assert_eq!(session.state(), State::Disconnected);
        assert!(session.inner.context().is_none());
        assert!(matches!(
            session.inner.query(&["3"]).await,
            Err(FbError::Precondition(_))
        ));
    }
}
