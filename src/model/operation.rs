//! Server-granted capabilities on a case.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::FbError;

/// An operation the server currently permits on a case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AllowedOperation {
    /// Change fields.
    Edit,
    /// Assign to a person.
    Assign,
    /// Resolve.
    Resolve,
    /// Reactivate after resolution.
    Reactivate,
    /// Close after resolution.
    Close,
    /// Reopen after closing.
    Reopen,
    /// Reply to the originating email.
    Reply,
    /// Forward by email.
    Forward,
    /// Send an email.
    Email,
    /// Move out of an inbox.
    Move,
    /// Mark as spam.
    Spam,
    /// Set a reminder.
    Remind,
}

impl AllowedOperation {
    /// Upper-case tag name.
    pub fn as_str(self) -> &'static str {
        match self {
            AllowedOperation::Edit => "EDIT",
            AllowedOperation::Assign => "ASSIGN",
            AllowedOperation::Resolve => "RESOLVE",
            AllowedOperation::Reactivate => "REACTIVATE",
            AllowedOperation::Close => "CLOSE",
            AllowedOperation::Reopen => "REOPEN",
            AllowedOperation::Reply => "REPLY",
            AllowedOperation::Forward => "FORWARD",
            AllowedOperation::Email => "EMAIL",
            AllowedOperation::Move => "MOVE",
            AllowedOperation::Spam => "SPAM",
            AllowedOperation::Remind => "REMIND",
        }
    }
}

impl fmt::Display for AllowedOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AllowedOperation {
    type Err = FbError;

    /// Case-insensitive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "EDIT" => Ok(AllowedOperation::Edit),
            "ASSIGN" => Ok(AllowedOperation::Assign),
            "RESOLVE" => Ok(AllowedOperation::Resolve),
            "REACTIVATE" => Ok(AllowedOperation::Reactivate),
            "CLOSE" => Ok(AllowedOperation::Close),
            "REOPEN" => Ok(AllowedOperation::Reopen),
            "REPLY" => Ok(AllowedOperation::Reply),
            "FORWARD" => Ok(AllowedOperation::Forward),
            "EMAIL" => Ok(AllowedOperation::Email),
            "MOVE" => Ok(AllowedOperation::Move),
            "SPAM" => Ok(AllowedOperation::Spam),
            "REMIND" => Ok(AllowedOperation::Remind),
            _ => Err(FbError::reconciliation(format!(
                "unknown operation {:?}",
                s.chars().take(50).collect::<String>()
            ))),
        }
    }
}

/// Parses a comma-delimited operations list into a deduplicated set.
///
/// Blank entries are skipped, so an empty string yields an empty set.
///
/// # Errors
///
/// Returns `FbError::Reconciliation` if any entry is not a known operation.
pub fn parse_operations(raw: &str) -> Result<BTreeSet<AllowedOperation>, FbError> {
    raw.split(',')
        .map(str::trim)
        .filter(|op| !op.is_empty())
        .map(str::parse::<AllowedOperation>)
        .collect()
}
