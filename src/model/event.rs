//! Case history events.

use serde::Serialize;

/// A single entry in a case's history, as returned by a search with the
/// `events` column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Event {
    /// Event identifier (`ixBugEvent`).
    pub id: u32,
    /// What happened, e.g. "Opened" or "Resolved (Fixed)".
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verb: Option<String>,
    /// Server-rendered summary line.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Text entered with the event.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Full name of the person responsible.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub person: Option<String>,
    /// Timestamp as sent by the server (ISO 8601, UTC).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    /// Files attached to this event.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<EventAttachment>,
}

/// A downloadable file recorded on an event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventAttachment {
    /// Original file name.
    pub filename: String,
    /// Absolute download URL, including the token of the session that built it.
    #[serde(skip)]
    pub url: String,
}
