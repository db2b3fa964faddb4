//! Areas subdivide a project.

use serde::Serialize;

use super::resource::{optional, required_id};
use super::{keys, Fields, Resource};
use crate::dispatch::Command;
use crate::error::FbError;

/// A FogBugz area.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Area {
    id: u32,
    name: String,
    project_id: Option<u32>,
    project: Option<String>,
    owner: Option<String>,
}

impl Area {
    /// Area identifier (`ixArea`).
    pub fn id(&self) -> u32 {
        self.id
    }

    /// Owning project's identifier.
    pub fn project_id(&self) -> Option<u32> {
        self.project_id
    }

    /// Owning project's name.
    pub fn project(&self) -> Option<&str> {
        self.project.as_deref()
    }

    /// Default assignee for new cases in this area.
    pub fn owner(&self) -> Option<&str> {
        self.owner.as_deref()
    }
}

impl Resource for Area {
    const KIND: &'static str = "area";
    const LIST: Command = Command::ListAreas;
    const VIEW: Command = Command::ViewArea;
    const TAG: &'static str = "area";
    const ID_PARAM: &'static str = keys::IX_AREA;
    // viewArea needs ixProject alongside sArea, so names resolve from the list.
    const NAME_PARAM: Option<&'static str> = None;

    fn from_fields(fields: &Fields) -> Result<Self, FbError> {
        Ok(Self {
            id: required_id(fields, keys::IX_AREA, Self::KIND)?,
            name: optional(fields, keys::S_AREA).unwrap_or_default(),
            project_id: optional(fields, keys::IX_PROJECT).and_then(|id| id.parse().ok()),
            project: optional(fields, keys::S_PROJECT),
            owner: optional(fields, keys::S_PERSON_OWNER),
        })
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_fields() {
        let fields: Fields = [
            ("ixArea", "9"),
            ("sArea", "Misc"),
            ("ixProject", "2"),
            ("sProject", "Inbox"),
        ]
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        let area = Area::from_fields(&fields).unwrap();
        assert_eq!(area.id(), 9);
        assert_eq!(area.name(), "Misc");
        assert_eq!(area.project_id(), Some(2));
        assert_eq!(area.project(), Some("Inbox"));
        assert_eq!(area.owner(), None);
    }
}
