//! Parameter and field names used on the wire.

#![allow(missing_docs)]

/// Command name parameter.
pub const CMD: &str = "cmd";
/// Session token parameter.
pub const TOKEN: &str = "token";
/// Logon email parameter.
pub const EMAIL: &str = "email";
/// Logon password parameter.
pub const PASSWORD: &str = "password";

/// Case number.
pub const IX_BUG: &str = "ixBug";
/// Comma-delimited allowed operations attribute.
pub const OPERATIONS: &str = "operations";
/// Search query text.
pub const QUERY: &str = "q";
/// Comma-delimited search columns.
pub const COLS: &str = "cols";
/// Number of attached files.
pub const FILE_COUNT: &str = "nFileCount";

pub const S_TITLE: &str = "sTitle";
pub const S_PROJECT: &str = "sProject";
pub const S_AREA: &str = "sArea";
pub const S_EVENT: &str = "sEvent";
pub const S_SCOUT_DESCRIPTION: &str = "sScoutDescription";
pub const S_PERSON_ASSIGNED_TO: &str = "sPersonAssignedTo";
pub const EVENTS: &str = "events";

pub const IX_PERSON: &str = "ixPerson";
pub const S_EMAIL: &str = "sEmail";
pub const S_FULLNAME: &str = "sFullName";
pub const S_PHONE: &str = "sPhone";

pub const IX_PROJECT: &str = "ixProject";
pub const S_PERSON_OWNER: &str = "sPersonOwner";

pub const IX_AREA: &str = "ixArea";

pub const IX_BUG_EVENT: &str = "ixBugEvent";
pub const S_VERB: &str = "sVerb";
pub const EVT_DESCRIPTION: &str = "evtDescription";
pub const S_PERSON: &str = "sPerson";
pub const DT: &str = "dt";
pub const S: &str = "s";
pub const RG_ATTACHMENTS: &str = "rgAttachments";
pub const S_FILE_NAME: &str = "sFileName";
pub const S_URL: &str = "sURL";

/// Columns requested by every case search.
pub const CASE_COLUMNS: [&str; 6] = [
    S_PROJECT,
    S_AREA,
    S_SCOUT_DESCRIPTION,
    S_TITLE,
    S_EVENT,
    EVENTS,
];

/// Keys that only the server or the request framing may set on a case.
pub(crate) const PROTECTED: [&str; 4] = [IX_BUG, OPERATIONS, CMD, TOKEN];
