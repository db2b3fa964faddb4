//! Projects cases are filed under.

use serde::Serialize;

use super::resource::{optional, required_id};
use super::{keys, Fields, Resource};
use crate::dispatch::Command;
use crate::error::FbError;

/// A FogBugz project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Project {
    id: u32,
    name: String,
    owner: Option<String>,
    owner_email: Option<String>,
    inbox: bool,
}

impl Project {
    /// Project identifier (`ixProject`).
    pub fn id(&self) -> u32 {
        self.id
    }

    /// Primary contact's full name.
    pub fn owner(&self) -> Option<&str> {
        self.owner.as_deref()
    }

    /// Primary contact's email.
    pub fn owner_email(&self) -> Option<&str> {
        self.owner_email.as_deref()
    }

    /// Whether this is the installation's inbox project.
    pub fn is_inbox(&self) -> bool {
        self.inbox
    }
}

impl Resource for Project {
    const KIND: &'static str = "project";
    const LIST: Command = Command::ListProjects;
    const VIEW: Command = Command::ViewProject;
    const TAG: &'static str = "project";
    const ID_PARAM: &'static str = keys::IX_PROJECT;
    const NAME_PARAM: Option<&'static str> = Some(keys::S_PROJECT);

    fn from_fields(fields: &Fields) -> Result<Self, FbError> {
        Ok(Self {
            id: required_id(fields, keys::IX_PROJECT, Self::KIND)?,
            name: optional(fields, keys::S_PROJECT).unwrap_or_default(),
            owner: optional(fields, keys::S_PERSON_OWNER),
            owner_email: optional(fields, keys::S_EMAIL),
            inbox: fields
                .get("fInbox")
                .is_some_and(|value| value.trim().eq_ignore_ascii_case("true")),
        })
    }

    fn name(&self) -> &str {
        &self.name
    }
}
