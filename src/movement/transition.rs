use serde::{Deserialize, Serialize};

use super::request::RequestTag;
use super::StateId;
use crate::error::ConfigError;

/// Directed edge between two states, guarded by a single request tag.
///
/// The target is held by id so a graph can be rebuilt from its saved form
/// without resolving cycles during load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    source: StateId,
    target: StateId,
    request: RequestTag,
}

/// Saved form of a [`Transition`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionData {
    pub source: StateId,
    pub target: StateId,
    pub request: String,
}

impl Transition {
    pub fn new(target: StateId, request: RequestTag, source: StateId) -> Self {
        Self {
            source,
            target,
            request,
        }
    }

    pub fn source(&self) -> StateId {
        self.source
    }

    pub fn target(&self) -> StateId {
        self.target
    }

    pub fn request(&self) -> RequestTag {
        self.request
    }

    pub fn check_request(&self, request: RequestTag) -> bool {
        self.request.is_same_request(request)
    }

    /// Guard the transition with a different tag.
    pub fn set_request(&mut self, request: RequestTag) {
        self.request = request;
    }

    pub fn to_data(&self) -> TransitionData {
        TransitionData {
            source: self.source,
            target: self.target,
            request: self.request.name().to_string(),
        }
    }

    pub fn from_data(data: &TransitionData) -> Result<Self, ConfigError> {
        let request = RequestTag::from_name(&data.request)?;
        Ok(Self::new(data.target, request, data.source))
    }
}
