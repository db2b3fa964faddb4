//! Entity model for the FogBugz API.
//!
//! Cases carry the protocol-controlled `number` and capability set, which
//! only the session layer may change. People, projects and areas are plain
//! read-only records implementing [`Resource`].

mod area;
mod attachment;
mod case;
mod event;
pub mod keys;
mod operation;
mod person;
mod project;
pub(crate) mod resource;

use std::collections::BTreeMap;

pub use area::Area;
pub use attachment::Attachment;
pub use case::Case;
pub use event::{Event, EventAttachment};
pub use operation::{parse_operations, AllowedOperation};
pub use person::Person;
pub use project::Project;
pub use resource::Resource;

/// Field name to value, as sent in requests and read from responses.
pub type Fields = BTreeMap<String, String>;
