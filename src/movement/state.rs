use serde::{Deserialize, Serialize};

use super::handler::{BodySnapshot, StateMovementHandler};
use super::machine::{PendingTransition, TransitionQueue};
use super::registry::{OptionDescriptor, OptionRegistry};
use super::request::RequestTag;
use super::transition::{Transition, TransitionData};
use super::StateId;
use crate::error::ConfigError;

/// Priority given to request tags a state has no entry for: evaluated last.
pub const UNMAPPED_PRIORITY: i32 = i32::MAX;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestPriority {
    pub request: RequestTag,
    /// Lower values win.
    pub priority: i32,
}

/// Saved form of a [`RequestPriority`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriorityData {
    pub request: String,
    pub priority: i32,
}

/// Saved form of a [`MovementState`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateData {
    pub id: StateId,
    pub name: String,
    pub is_initial: bool,
    pub options: Vec<String>,
    pub transitions: Vec<TransitionData>,
    pub priorities: Vec<PriorityData>,
}

/// A node of the movement graph.
///
/// Owns the handler that drives its allowed options while active, its
/// outgoing transitions, and the order in which simultaneous requests are
/// handed to the machine.
#[derive(Debug)]
pub struct MovementState {
    id: StateId,
    name: String,
    is_initial: bool,
    pub(crate) handler: StateMovementHandler,
    transitions: Vec<Transition>,
    options: Vec<&'static str>,
    priorities: Vec<RequestPriority>,
}

impl MovementState {
    pub fn new(id: StateId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            is_initial: false,
            handler: StateMovementHandler::new(),
            transitions: Vec::new(),
            options: Vec::new(),
            priorities: Vec::new(),
        }
    }

    pub fn id(&self) -> StateId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn is_initial(&self) -> bool {
        self.is_initial
    }

    pub(crate) fn set_initial(&mut self, is_initial: bool) {
        self.is_initial = is_initial;
    }

    pub fn handler(&self) -> &StateMovementHandler {
        &self.handler
    }

    pub fn transitions(&self) -> &[Transition] {
        &self.transitions
    }

    /// Option kinds allowed to run while this state is active, in
    /// registration order.
    pub fn movement_options(&self) -> &[&'static str] {
        &self.options
    }

    pub fn priorities(&self) -> &[RequestPriority] {
        &self.priorities
    }

    // -----------------------------------------------------------------------
    // Transitions
    // -----------------------------------------------------------------------

    pub(crate) fn add_transition(&mut self, target: StateId, request: RequestTag) {
        self.transitions
            .push(Transition::new(target, request, self.id));
    }

    pub(crate) fn remove_transition(&mut self, index: usize) -> Option<Transition> {
        (index < self.transitions.len()).then(|| self.transitions.remove(index))
    }

    pub(crate) fn remove_transitions_to(&mut self, target: StateId) {
        self.transitions.retain(|t| t.target() != target);
    }

    /// Guard the transition at `index` with a different tag.
    pub fn rebind_transition(&mut self, index: usize, request: RequestTag) -> bool {
        match self.transitions.get_mut(index) {
            Some(transition) => {
                transition.set_request(request);
                true
            }
            None => false,
        }
    }

    /// First outgoing transition guarded by `request`.
    pub fn find_transition(&self, request: RequestTag) -> Option<&Transition> {
        self.transitions.iter().find(|t| t.check_request(request))
    }

    // -----------------------------------------------------------------------
    // Priorities
    // -----------------------------------------------------------------------

    pub fn priority_of(&self, request: RequestTag) -> i32 {
        self.priorities
            .iter()
            .find(|p| p.request == request)
            .map_or(UNMAPPED_PRIORITY, |p| p.priority)
    }

    pub fn set_priority(&mut self, request: RequestTag, priority: i32) {
        match self.priorities.iter_mut().find(|p| p.request == request) {
            Some(entry) => entry.priority = priority,
            None => self.priorities.push(RequestPriority { request, priority }),
        }
    }

    fn next_priority(&self) -> i32 {
        self.priorities
            .iter()
            .map(|p| p.priority)
            .max()
            .map_or(0, |max| max.saturating_add(1))
    }

    // -----------------------------------------------------------------------
    // Movement options
    // -----------------------------------------------------------------------

    /// Allow an option kind in this state and give any request it newly makes
    /// possible the next free priority.
    pub(crate) fn add_movement_option(&mut self, descriptor: &OptionDescriptor) {
        if !self.options.contains(&descriptor.kind) {
            self.options.push(descriptor.kind);
        }
        for &request in descriptor.possible_requests {
            if request == RequestTag::None {
                continue;
            }
            if !self.priorities.iter().any(|p| p.request == request) {
                let priority = self.next_priority();
                self.priorities.push(RequestPriority { request, priority });
            }
        }
    }

    /// Disallow an option kind and drop priorities no remaining option can
    /// raise. Returns false if the kind was not allowed here.
    pub(crate) fn remove_movement_option(
        &mut self,
        kind: &str,
        registry: &OptionRegistry,
    ) -> Result<bool, ConfigError> {
        let Some(index) = self.options.iter().position(|k| *k == kind) else {
            return Ok(false);
        };
        self.options.remove(index);

        let mut still_possible = Vec::new();
        for remaining in &self.options {
            still_possible.extend_from_slice(registry.get(remaining)?.possible_requests);
        }
        self.priorities
            .retain(|p| still_possible.contains(&p.request));
        Ok(true)
    }

    // -----------------------------------------------------------------------
    // Requests
    // -----------------------------------------------------------------------

    /// Forward `request` to the machine if one of this state's transitions
    /// accepts it. Unmatched requests are dropped.
    pub fn request_state_change(&self, request: RequestTag, queue: &mut TransitionQueue) -> bool {
        match self.find_transition(request) {
            Some(transition) => {
                queue.push(PendingTransition {
                    priority: self.priority_of(request),
                    transition: *transition,
                });
                true
            }
            None => {
                tracing::debug!(state = %self.id, request = %request, "request_unmatched");
                false
            }
        }
    }

    /// Forward requests raised together, most important first.
    pub fn request_state_changes(&self, mut requests: Vec<RequestTag>, queue: &mut TransitionQueue) {
        requests.sort_by_key(|r| self.priority_of(*r));
        for request in requests {
            self.request_state_change(request, queue);
        }
    }

    // -----------------------------------------------------------------------
    // Lifecycle
    // -----------------------------------------------------------------------

    pub(crate) fn on_enter(&mut self, previous: BodySnapshot) {
        self.handler.adopt(previous);
        self.handler.take_requests();
    }

    pub(crate) fn on_exit(&mut self) -> BodySnapshot {
        self.handler.take_requests();
        self.handler.snapshot()
    }

    // -----------------------------------------------------------------------
    // Persistence
    // -----------------------------------------------------------------------

    pub fn to_data(&self) -> StateData {
        StateData {
            id: self.id,
            name: self.name.clone(),
            is_initial: self.is_initial,
            options: self.options.iter().map(|k| k.to_string()).collect(),
            transitions: self.transitions.iter().map(Transition::to_data).collect(),
            priorities: self
                .priorities
                .iter()
                .map(|p| PriorityData {
                    request: p.request.name().to_string(),
                    priority: p.priority,
                })
                .collect(),
        }
    }

    /// Rebuild a state: options first, then the saved priority list, which
    /// replaces the one the options seeded and keeps its saved order, then
    /// transitions.
    pub fn from_data(data: &StateData, registry: &OptionRegistry) -> Result<Self, ConfigError> {
        let mut state = Self::new(data.id, data.name.clone());
        state.is_initial = data.is_initial;

        for kind in &data.options {
            state.add_movement_option(registry.get(kind)?);
        }
        state.priorities = data
            .priorities
            .iter()
            .map(|entry| {
                Ok(RequestPriority {
                    request: RequestTag::from_name(&entry.request)?,
                    priority: entry.priority,
                })
            })
            .collect::<Result<_, ConfigError>>()?;
        for transition in &data.transitions {
            let transition = Transition::from_data(transition)?;
            if transition.source() != state.id {
                return Err(ConfigError::MismatchedSource {
                    owner: state.id,
                    claimed: transition.source(),
                });
            }
            state.transitions.push(transition);
        }
        Ok(state)
    }
}
