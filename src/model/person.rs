//! People (users) known to the installation.

use serde::Serialize;

use super::resource::{optional, required_id};
use super::{keys, Fields, Resource};
use crate::dispatch::Command;
use crate::error::FbError;

/// A FogBugz user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Person {
    id: u32,
    email: Option<String>,
    fullname: String,
    phone: Option<String>,
}

impl Person {
    /// Person identifier (`ixPerson`).
    pub fn id(&self) -> u32 {
        self.id
    }

    /// Email address, also usable as the logon name.
    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    /// Full display name.
    pub fn fullname(&self) -> &str {
        &self.fullname
    }

    /// Phone number.
    pub fn phone(&self) -> Option<&str> {
        self.phone.as_deref()
    }
}

impl Resource for Person {
    const KIND: &'static str = "person";
    const LIST: Command = Command::ListPeople;
    const VIEW: Command = Command::ViewPerson;
    const TAG: &'static str = "person";
    const ID_PARAM: &'static str = keys::IX_PERSON;
    const NAME_PARAM: Option<&'static str> = Some(keys::S_EMAIL);

    fn from_fields(fields: &Fields) -> Result<Self, FbError> {
        Ok(Self {
            id: required_id(fields, keys::IX_PERSON, Self::KIND)?,
            email: optional(fields, keys::S_EMAIL),
            fullname: optional(fields, keys::S_FULLNAME).unwrap_or_default(),
            phone: optional(fields, keys::S_PHONE),
        })
    }

    /// People are looked up by email.
    fn name(&self) -> &str {
        self.email.as_deref().unwrap_or(&self.fullname)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(pairs: &[(&str, &str)]) -> Fields {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_from_fields() {
        let person = Person::from_fields(&row(&[
            ("ixPerson", "3"),
            ("sFullName", "Jane Smith"),
            ("sEmail", "jane@example.com"),
            ("sPhone", ""),
        ]))
        .unwrap();
        assert_eq!(person.id(), 3);
        assert_eq!(person.fullname(), "Jane Smith");
        assert_eq!(person.email(), Some("jane@example.com"));
        assert_eq!(person.phone(), None);
        assert_eq!(person.name(), "jane@example.com");
    }

    #[test]
    fn test_from_fields_requires_id() {
        assert!(Person::from_fields(&row(&[("sFullName", "Nobody")])).is_err());
    }
}
