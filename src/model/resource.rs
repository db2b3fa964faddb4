//! Read-only records fetched by list and view commands.

use super::Fields;
use crate::dispatch::Command;
use crate::error::FbError;

/// An entity kind the session can list, and fetch by id or by name.
pub trait Resource: Sized + Send {
    /// Name used in errors and logs, e.g. `person`.
    const KIND: &'static str;
    /// Command returning every record of this kind.
    const LIST: Command;
    /// Command returning a single record.
    const VIEW: Command;
    /// Element name of one record in the response.
    const TAG: &'static str;
    /// Parameter carrying the numeric id for [`Resource::VIEW`].
    const ID_PARAM: &'static str;
    /// Parameter carrying the name for [`Resource::VIEW`]; `None` means the
    /// server has no name lookup and the full list is filtered instead.
    const NAME_PARAM: Option<&'static str>;

    /// Builds a record from one response row.
    ///
    /// # Errors
    ///
    /// Returns `FbError::Reconciliation` if a required field is missing.
    fn from_fields(fields: &Fields) -> Result<Self, FbError>;

    /// Display name compared by name lookups.
    fn name(&self) -> &str;
}

/// Reads a required numeric field.
pub(crate) fn required_id(fields: &Fields, key: &str, kind: &str) -> Result<u32, FbError> {
    let raw = fields
        .get(key)
        .ok_or_else(|| FbError::reconciliation(format!("{} row has no {}", kind, key)))?;
    raw.trim().parse::<u32>().map_err(|_| {
        FbError::reconciliation(format!("{} row has non-numeric {}: {:?}", kind, key, raw))
    })
}

/// Reads an optional text field, treating blank as absent.
pub(crate) fn optional(fields: &Fields, key: &str) -> Option<String> {
    fields
        .get(key)
        .map(|value| value.trim())
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}
