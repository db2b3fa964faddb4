//! Case (bug) entity.
//!
//! A case is a field map plus two server-controlled values: its `number`
//! and the set of operations the server currently allows. Callers change
//! fields through the setters, which also record each change as a pending
//! event. The session sends the pending events with the next mutating
//! command, clears them once the server has accepted it, and then writes the
//! server's answer back through the crate-private reconciliation methods.

use std::collections::BTreeSet;

use serde::Serialize;

use super::{keys, AllowedOperation, Attachment, Event, Fields};
use crate::error::FbError;

/// A FogBugz case.
///
/// # Example
///
/// ```ignore
/// let mut case = Case::new("Inbox", "Misc", "Printer on fire", "Smoke everywhere");
/// session.create(&mut case).await?;
/// assert!(case.number().is_some());
/// ```
#[derive(Debug, Clone, Default, Serialize)]
pub struct Case {
    #[serde(skip_serializing_if = "Option::is_none")]
    number: Option<u32>,

    allowed_operations: BTreeSet<AllowedOperation>,

    fields: Fields,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    events: Vec<Event>,

    #[serde(skip)]
    pending: Fields,

    #[serde(skip)]
    attachments: Vec<Attachment>,
}

impl Case {
    /// Creates an unsaved case with the four fields FogBugz needs to open one.
    pub fn new(
        project: impl Into<String>,
        area: impl Into<String>,
        title: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        let mut case = Self::default();
        case.set_project(project)
            .set_area(area)
            .set_title(title)
            .set_event(description);
        case
    }

    /// Built from a search result row; nothing is pending.
    pub(crate) fn from_parts(
        number: u32,
        allowed_operations: BTreeSet<AllowedOperation>,
        fields: Fields,
        events: Vec<Event>,
    ) -> Self {
        Self {
            number: Some(number),
            allowed_operations,
            fields,
            events,
            pending: Fields::new(),
            attachments: Vec::new(),
        }
    }

    /// Server-assigned case number, set once the case has been created.
    pub fn number(&self) -> Option<u32> {
        self.number
    }

    /// Operations the server allowed after the last successful call.
    pub fn allowed_operations(&self) -> &BTreeSet<AllowedOperation> {
        &self.allowed_operations
    }

    /// Whether the server allows `operation` on this case.
    pub fn allows(&self, operation: AllowedOperation) -> bool {
        self.allowed_operations.contains(&operation)
    }

    /// Reads any field by wire name.
    pub fn field(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    /// Case title.
    pub fn title(&self) -> Option<&str> {
        self.field(keys::S_TITLE)
    }

    /// Project name.
    pub fn project(&self) -> Option<&str> {
        self.field(keys::S_PROJECT)
    }

    /// Area name.
    pub fn area(&self) -> Option<&str> {
        self.field(keys::S_AREA)
    }

    /// Text of the most recent event set on this case.
    pub fn event(&self) -> Option<&str> {
        self.field(keys::S_EVENT)
    }

    /// Scout key used to match duplicate reports.
    pub fn scout_description(&self) -> Option<&str> {
        self.field(keys::S_SCOUT_DESCRIPTION)
    }

    /// History, populated only on cases returned by a search.
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Changes that will be sent with the next mutating command.
    ///
    /// Cleared once that command succeeds.
    pub fn pending_events(&self) -> &Fields {
        &self.pending
    }

    /// Files that will be uploaded with the next create, edit or scout.
    pub fn attachments(&self) -> &[Attachment] {
        &self.attachments
    }

    /// Sets any field by wire name.
    ///
    /// # Errors
    ///
    /// Returns `FbError::Validation` for server-controlled keys
    /// (`ixBug`, `operations`).
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) -> Result<&mut Self, FbError> {
        let key = key.into();
        if keys::PROTECTED.contains(&key.as_str()) {
            return Err(FbError::validation(format!(
                "{} is assigned by the server",
                key
            )));
        }
        Ok(self.record(key, value.into()))
    }

    /// Sets the title.
    pub fn set_title(&mut self, title: impl Into<String>) -> &mut Self {
        self.record(keys::S_TITLE.to_string(), title.into())
    }

    /// Moves the case to a project by name.
    pub fn set_project(&mut self, project: impl Into<String>) -> &mut Self {
        self.record(keys::S_PROJECT.to_string(), project.into())
    }

    /// Moves the case to an area by name.
    pub fn set_area(&mut self, area: impl Into<String>) -> &mut Self {
        self.record(keys::S_AREA.to_string(), area.into())
    }

    /// Sets the text recorded with the next event.
    pub fn set_event(&mut self, text: impl Into<String>) -> &mut Self {
        self.record(keys::S_EVENT.to_string(), text.into())
    }

    /// Assigns the case to a person by full name.
    pub fn assign_to(&mut self, person: impl Into<String>) -> &mut Self {
        self.record(keys::S_PERSON_ASSIGNED_TO.to_string(), person.into())
    }

    /// Queues a file for upload.
    pub fn attach(&mut self, attachment: Attachment) -> &mut Self {
        self.attachments.push(attachment);
        self
    }

    /// Drops all pending events and queued attachments.
    pub fn clear_pending(&mut self) {
        self.pending.clear();
        self.attachments.clear();
    }

    fn record(&mut self, key: String, value: String) -> &mut Self {
        self.fields.insert(key.clone(), value.clone());
        self.pending.insert(key, value);
        self
    }

    /// Snapshot of the pending events plus `ixBug` once the case has a number.
    pub(crate) fn request_parameters(&self) -> Fields {
        let mut parameters = self.pending.clone();
        if let Some(number) = self.number {
            parameters.insert(keys::IX_BUG.to_string(), number.to_string());
        }
        parameters
    }

    /// Clears what the last successful command carried.
    pub(crate) fn mark_sent(&mut self, with_attachments: bool) {
        self.pending.clear();
        if with_attachments {
            self.attachments.clear();
        }
    }

    /// Display form of the number for error messages.
    pub(crate) fn number_display(&self) -> String {
        self.number
            .map(|n| n.to_string())
            .unwrap_or_else(|| "(unsaved)".to_string())
    }

    /// Overwrites the server-controlled values after a successful command.
    pub(crate) fn reconcile(&mut self, number: u32, operations: BTreeSet<AllowedOperation>) {
        self.number = Some(number);
        self.allowed_operations = operations;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_new_case_records_pending_events() {
        let case = Case::new("Inbox", "Misc", "Printer on fire", "Smoke everywhere");
        assert_eq!(case.number(), None);
        assert_eq!(case.title(), Some("Printer on fire"));
        assert_eq!(case.pending_events().len(), 4);
        assert_eq!(
            case.pending_events().get(keys::S_EVENT).map(String::as_str),
            Some("Smoke everywhere")
        );
    }

    #[test]
    fn test_request_parameters_include_number_once_assigned() {
        let mut case = Case::new("Inbox", "Misc", "Title", "Body");
        assert!(!case.request_parameters().contains_key(keys::IX_BUG));

        case.reconcile(42, BTreeSet::from([AllowedOperation::Edit]));
        assert_eq!(
            case.request_parameters().get(keys::IX_BUG).map(String::as_str),
            Some("42")
        );
    }

    #[test]
    fn test_set_rejects_server_controlled_keys() {
        let mut case = Case::default();
        assert!(case.set(keys::IX_BUG, "7").is_err());
        assert!(case.set(keys::OPERATIONS, "close").is_err());
        assert!(case.set(keys::TOKEN, "stolen").is_err());
        assert!(case.set(keys::CMD, "logoff").is_err());
        assert!(case.set("sCustomerEmail", "a@b.c").is_ok());
        assert_eq!(case.number(), None);
    }

    #[test]
    fn test_reconcile_replaces_capabilities() {
        let mut case = Case::default();
        case.reconcile(1, BTreeSet::from([AllowedOperation::Close, AllowedOperation::Edit]));
        case.reconcile(1, BTreeSet::from([AllowedOperation::Reopen]));
        assert!(case.allows(AllowedOperation::Reopen));
        assert!(!case.allows(AllowedOperation::Close));
    }

    #[test]
    fn test_clear_pending() {
        let mut case = Case::new("Inbox", "Misc", "Title", "Body");
        case.attach(Attachment::new("a.txt", vec![1, 2]));
        case.clear_pending();
        assert!(case.pending_events().is_empty());
        assert!(case.attachments().is_empty());
        assert_eq!(case.title(), Some("Title"));
    }

    #[test]
    fn test_mark_sent_keeps_unsent_attachments() {
        let mut case = Case::new("Inbox", "Misc", "Title", "Body");
        case.attach(Attachment::new("a.txt", vec![1]));

        case.mark_sent(false);
        assert!(case.pending_events().is_empty());
        assert_eq!(case.attachments().len(), 1);

        case.mark_sent(true);
        assert!(case.attachments().is_empty());
    }

    #[test]
    fn test_serialize_skips_pending() {
        let case = Case::new("Inbox", "Misc", "Title", "Body");
        let json = serde_json::to_value(&case).unwrap();
        assert!(json.get("pending").is_none());
        assert_eq!(json["fields"]["sTitle"], "Title");
    }
}
