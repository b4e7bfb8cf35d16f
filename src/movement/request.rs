use std::fmt;

use crate::error::ConfigError;

/// What kind of cause usually raises a request. Tooling metadata only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestCategory {
    PlayerInput,
    Physics,
    InputOrPhysics,
    None,
}

/// Static description of a request tag.
#[derive(Debug, Clone, Copy)]
pub struct RequestDescriptor {
    pub tag: RequestTag,
    /// Stable key used by the persistence format.
    pub name: &'static str,
    pub display_name: &'static str,
    pub category: RequestCategory,
}

/// Identifies why a movement option wants the machine to change state.
///
/// Matching is by tag, never by the instance that was queued. `None` is the
/// placeholder carried by transitions that have no activator configured; it
/// matches nothing, itself included, so use [`RequestTag::is_same_request`]
/// rather than `==` when deciding whether a transition fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RequestTag {
    None,
    Jump,
    WallGrab,
    WallRun,
    Land,
}

const DESCRIPTORS: [RequestDescriptor; 5] = [
    RequestDescriptor {
        tag: RequestTag::None,
        name: "None",
        display_name: "None",
        category: RequestCategory::None,
    },
    RequestDescriptor {
        tag: RequestTag::Jump,
        name: "Jump",
        display_name: "Jump pressed",
        category: RequestCategory::PlayerInput,
    },
    RequestDescriptor {
        tag: RequestTag::WallGrab,
        name: "WallGrab",
        display_name: "Wall grab started",
        category: RequestCategory::InputOrPhysics,
    },
    RequestDescriptor {
        tag: RequestTag::WallRun,
        name: "WallRun",
        display_name: "Wall run started",
        category: RequestCategory::Physics,
    },
    RequestDescriptor {
        tag: RequestTag::Land,
        name: "Land",
        display_name: "Landed",
        category: RequestCategory::Physics,
    },
];

impl RequestTag {
    pub fn all() -> impl Iterator<Item = RequestTag> {
        DESCRIPTORS.iter().map(|d| d.tag)
    }

    pub fn describe(self) -> &'static RequestDescriptor {
        // DESCRIPTORS is declared in variant order.
        &DESCRIPTORS[self as usize]
    }

    pub fn name(self) -> &'static str {
        self.describe().name
    }

    /// Resolve a stable tag name back to its tag.
    pub fn from_name(name: &str) -> Result<RequestTag, ConfigError> {
        DESCRIPTORS
            .iter()
            .find(|d| d.name == name)
            .map(|d| d.tag)
            .ok_or_else(|| ConfigError::UnknownRequest(name.to_string()))
    }

    pub fn is_same_request(self, other: RequestTag) -> bool {
        self != RequestTag::None && self == other
    }
}

impl fmt::Display for RequestTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
