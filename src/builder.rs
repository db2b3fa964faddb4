//! Entity builders.
//!
//! Turn response rows into entities. Case builders need the active
//! [`SessionContext`] to produce attachment download links, and receive it
//! explicitly from the session that issued the search.

use crate::dispatch::{join_url, Element, Response};
use crate::error::FbError;
use crate::model::resource::required_id;
use crate::model::{keys, parse_operations, Case, Event, EventAttachment, Resource};
use crate::session::SessionContext;

const CASE_TAG: &str = "case";
const EVENT_TAG: &str = "event";
const ATTACHMENT_TAG: &str = "attachment";

/// Builds cases from search responses.
pub struct CaseBuilder<'a> {
    context: &'a SessionContext,
}

impl<'a> CaseBuilder<'a> {
    /// Creates a builder bound to the session that ran the search.
    pub fn new(context: &'a SessionContext) -> Self {
        Self { context }
    }

    /// One case per `<case>` element, in response order.
    ///
    /// # Errors
    ///
    /// Returns `FbError::Reconciliation` if a row lacks a usable `ixBug`
    /// or lists an unknown operation.
    pub fn build_all(&self, response: &Response) -> Result<Vec<Case>, FbError> {
        response
            .elements(CASE_TAG)
            .into_iter()
            .map(|element| self.build_case(element))
            .collect()
    }

    /// The first case in the response.
    ///
    /// # Errors
    ///
    /// Returns `FbError::NotFound` if the search matched nothing.
    pub fn build(&self, response: &Response, number: u32) -> Result<Case, FbError> {
        self.build_all(response)?
            .into_iter()
            .next()
            .ok_or_else(|| FbError::not_found("case", number.to_string()))
    }

    fn build_case(&self, element: &Element) -> Result<Case, FbError> {
        let mut fields = element.fields();
        let number = required_id(&fields, keys::IX_BUG, CASE_TAG)?;
        let operations =
            parse_operations(fields.get(keys::OPERATIONS).map(String::as_str).unwrap_or(""))?;
        fields.remove(keys::IX_BUG);
        fields.remove(keys::OPERATIONS);
        fields.remove(keys::EVENTS);

        let events = match element.child(keys::EVENTS) {
            Some(events) => events
                .children
                .iter()
                .filter(|child| child.name == EVENT_TAG)
                .map(|event| self.build_event(event))
                .collect::<Result<Vec<_>, _>>()?,
            None => Vec::new(),
        };

        Ok(Case::from_parts(number, operations, fields, events))
    }

    fn build_event(&self, element: &Element) -> Result<Event, FbError> {
        let fields = element.fields();
        let text = |key: &str| {
            fields
                .get(key)
                .map(|value| value.trim())
                .filter(|value| !value.is_empty())
                .map(str::to_string)
        };

        let attachments = element
            .child(keys::RG_ATTACHMENTS)
            .map(|list| {
                list.children
                    .iter()
                    .filter(|child| child.name == ATTACHMENT_TAG)
                    .map(|attachment| EventAttachment {
                        filename: attachment
                            .child_text(keys::S_FILE_NAME)
                            .unwrap_or_default()
                            .to_string(),
                        url: self.download_url(attachment.child_text(keys::S_URL).unwrap_or_default()),
                    })
                    .collect()
            })
            .unwrap_or_default();

        Ok(Event {
            id: required_id(&fields, keys::IX_BUG_EVENT, EVENT_TAG)?,
            verb: text(keys::S_VERB),
            description: text(keys::EVT_DESCRIPTION),
            text: text(keys::S),
            person: text(keys::S_PERSON),
            date: text(keys::DT),
            attachments,
        })
    }

    fn download_url(&self, relative: &str) -> String {
        format!(
            "{}&{}={}",
            join_url(self.context.endpoint(), relative),
            keys::TOKEN,
            urlencoding::encode(self.context.token())
        )
    }
}

/// Builds every record of kind `R` in the response, in order.
///
/// # Errors
///
/// Returns `FbError::Reconciliation` if a row is missing its id.
pub fn build_resources<R: Resource>(response: &Response) -> Result<Vec<R>, FbError> {
    response.data(R::TAG).iter().map(R::from_fields).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AllowedOperation, Person};
    use pretty_assertions::assert_eq;

    const SEARCH: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<response><cases count="2">
  <case ixBug="123" operations="edit,assign,resolve">
    <sProject><![CDATA[Inbox]]></sProject>
    <sArea><![CDATA[Misc]]></sArea>
    <sTitle><![CDATA[Printer on fire]]></sTitle>
    <events>
      <event ixBugEvent="501" ixBug="123">
        <ixBugEvent>501</ixBugEvent>
        <sVerb><![CDATA[Opened]]></sVerb>
        <sPerson><![CDATA[Jane Smith]]></sPerson>
        <dt>2024-03-01T10:00:00Z</dt>
        <s><![CDATA[Smoke everywhere]]></s>
        <evtDescription><![CDATA[Opened by Jane Smith]]></evtDescription>
        <rgAttachments>
          <attachment>
            <sFileName><![CDATA[photo.jpg]]></sFileName>
            <sURL><![CDATA[default.asp?pg=pgDownload&pgType=pgFile&ixBugEvent=501&ixAttachment=7&sFileName=photo.jpg]]></sURL>
          </attachment>
        </rgAttachments>
      </event>
    </events>
  </case>
  <case ixBug="124" operations="reopen"><sTitle>Second</sTitle></case>
</cases></response>"#;

    fn context() -> SessionContext {
        SessionContext::new("https://example.fogbugz.com", "tok en")
    }

    #[test]
    fn test_build_all_in_response_order() {
        let response = Response::parse(SEARCH).unwrap();
        let context = context();
        let cases = CaseBuilder::new(&context).build_all(&response).unwrap();

        assert_eq!(cases.len(), 2);
        assert_eq!(cases[0].number(), Some(123));
        assert_eq!(cases[0].title(), Some("Printer on fire"));
        assert_eq!(cases[0].project(), Some("Inbox"));
        assert!(cases[0].allows(AllowedOperation::Resolve));
        assert!(cases[0].pending_events().is_empty());
        assert_eq!(cases[0].field(keys::IX_BUG), None);
        assert_eq!(cases[1].number(), Some(124));
        assert!(cases[1].events().is_empty());
    }

    #[test]
    fn test_build_events_with_download_links() {
        let response = Response::parse(SEARCH).unwrap();
        let context = context();
        let case = CaseBuilder::new(&context).build(&response, 123).unwrap();

        let event = &case.events()[0];
        assert_eq!(event.id, 501);
        assert_eq!(event.verb.as_deref(), Some("Opened"));
        assert_eq!(event.text.as_deref(), Some("Smoke everywhere"));
        assert_eq!(event.attachments[0].filename, "photo.jpg");
        assert_eq!(
            event.attachments[0].url,
            "https://example.fogbugz.com/default.asp?pg=pgDownload&pgType=pgFile&ixBugEvent=501&ixAttachment=7&sFileName=photo.jpg&token=tok%20en"
        );
    }

    #[test]
    fn test_build_empty_is_not_found() {
        let response = Response::parse(r#"<response><cases count="0"></cases></response>"#).unwrap();
        let context = context();
        let err = CaseBuilder::new(&context).build(&response, 9).unwrap_err();
        assert!(matches!(err, FbError::NotFound { kind: "case", .. }));
    }

    #[test]
    fn test_build_unknown_operation_fails() {
        let response =
            Response::parse(r#"<response><cases><case ixBug="1" operations="levitate"/></cases></response>"#)
                .unwrap();
        let context = context();
        assert!(matches!(
            CaseBuilder::new(&context).build_all(&response),
            Err(FbError::Reconciliation(_))
        ));
    }

    #[test]
    fn test_empty_events_column_is_not_a_field() {
        let response = Response::parse(
            r#"<response><cases><case ixBug="5" operations="edit"><sTitle>Quiet</sTitle><events/></case></cases></response>"#,
        )
        .unwrap();
        let context = context();
        let case = CaseBuilder::new(&context).build(&response, 5).unwrap();

        assert_eq!(case.field(keys::EVENTS), None);
        assert!(case.events().is_empty());
        assert_eq!(case.title(), Some("Quiet"));
    }

    #[test]
    fn test_build_resources() {
        let response = Response::parse(
            r#"<response><people>
                <person><ixPerson>1</ixPerson><sFullName>Administrator</sFullName><sEmail>admin@example.com</sEmail></person>
                <person><ixPerson>2</ixPerson><sFullName>Jane Smith</sFullName><sEmail>jane@example.com</sEmail></person>
            </people></response>"#,
        )
        .unwrap();
        let people: Vec<Person> = build_resources(&response).unwrap();
        assert_eq!(people.len(), 2);
        assert_eq!(people[1].fullname(), "Jane Smith");
    }
}
