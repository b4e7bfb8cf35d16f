use std::collections::{BTreeMap, VecDeque};

use glam::Vec3;
use tracing::{debug, info};

use super::body::PhysicsBody;
use super::handler::{BodySnapshot, Clock};
use super::registry::OptionRegistry;
use super::request::RequestTag;
use super::state::MovementState;
use super::transition::Transition;
use super::StateId;
use crate::engine::input::InputSource;
use crate::error::{ConfigError, MachineError};
use crate::options::{OptionId, OptionPool, TickContext};
use crate::settings::MovementSettings;

/// A transition some state accepted, waiting for the next drain point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingTransition {
    pub priority: i32,
    pub transition: Transition,
}

/// FIFO handoff between the options raising requests during a dispatch and
/// the arbitration that follows it.
#[derive(Debug, Default)]
pub struct TransitionQueue {
    pending: VecDeque<PendingTransition>,
}

impl TransitionQueue {
    pub fn push(&mut self, pending: PendingTransition) {
        self.pending.push_back(pending);
    }

    pub fn pop(&mut self) -> Option<PendingTransition> {
        self.pending.pop_front()
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PendingTransition> {
        self.pending.iter()
    }
}

/// Hands out state ids for one machine. Ids are never reused.
#[derive(Debug, Default, Clone)]
pub struct StateIdGenerator {
    next: u32,
}

impl StateIdGenerator {
    pub fn starting_at(next: u32) -> Self {
        Self { next }
    }

    pub fn next_id(&mut self) -> StateId {
        let id = StateId(self.next);
        self.next += 1;
        id
    }

    /// Make sure `id` can never be handed out again.
    pub fn reserve(&mut self, id: StateId) {
        self.next = self.next.max(id.0 + 1);
    }
}

/// Observes state changes.
pub trait StateListener {
    fn on_exit(&mut self, _state: &MovementState) {}
    fn on_enter(&mut self, _state: &MovementState, _previous: Option<&MovementState>) {}
}

/// Runtime owner of one entity's movement graph.
///
/// States live in a table keyed by id; transitions and handlers refer to
/// states and options by id only. Requests raised during a dispatch are
/// queued and resolved at four drain points per full tick: before and after
/// [`update`](Self::update), and before and after
/// [`fixed_update`](Self::fixed_update). At most one transition is taken per
/// drain point and the queue is always emptied.
pub struct MovementStateMachine {
    registry: OptionRegistry,
    settings: MovementSettings,
    states: BTreeMap<StateId, MovementState>,
    options: OptionPool,
    general_options: Vec<&'static str>,
    current: Option<StateId>,
    queue: TransitionQueue,
    ids: StateIdGenerator,
    listeners: Vec<Box<dyn StateListener>>,
}

impl MovementStateMachine {
    pub fn new(registry: OptionRegistry, settings: MovementSettings) -> Self {
        Self {
            registry,
            settings,
            states: BTreeMap::new(),
            options: OptionPool::new(),
            general_options: Vec::new(),
            current: None,
            queue: TransitionQueue::default(),
            ids: StateIdGenerator::default(),
            listeners: Vec::new(),
        }
    }

    pub fn registry(&self) -> &OptionRegistry {
        &self.registry
    }

    pub fn settings(&self) -> &MovementSettings {
        &self.settings
    }

    pub fn add_listener(&mut self, listener: Box<dyn StateListener>) {
        self.listeners.push(listener);
    }

    // -----------------------------------------------------------------------
    // Graph editing
    // -----------------------------------------------------------------------

    /// Give the entity an instance of `kind`. Returns its pool id.
    pub fn add_general_option(&mut self, kind: &str) -> Result<OptionId, ConfigError> {
        let descriptor = *self.registry.get(kind)?;
        if let Some(id) = self.options.find(descriptor.kind) {
            return Ok(id);
        }
        let option = self.registry.build(descriptor.kind, &self.settings)?;
        self.general_options.push(descriptor.kind);
        Ok(self.options.insert(option))
    }

    pub fn general_options(&self) -> &[&'static str] {
        &self.general_options
    }

    pub fn add_state(&mut self, name: impl Into<String>) -> StateId {
        let id = self.ids.next_id();
        self.states.insert(id, MovementState::new(id, name));
        id
    }

    /// Remove a state along with every transition that pointed at it.
    /// The current state cannot be removed.
    pub fn remove_state(&mut self, id: StateId) -> Result<MovementState, ConfigError> {
        if self.current == Some(id) {
            return Err(ConfigError::StateInUse(id));
        }
        let removed = self
            .states
            .remove(&id)
            .ok_or(ConfigError::MissingState(id))?;
        for state in self.states.values_mut() {
            state.remove_transitions_to(id);
        }
        Ok(removed)
    }

    pub fn set_initial_state(&mut self, id: StateId) -> Result<(), ConfigError> {
        if !self.states.contains_key(&id) {
            return Err(ConfigError::MissingState(id));
        }
        for state in self.states.values_mut() {
            let is_initial = state.id() == id;
            state.set_initial(is_initial);
        }
        Ok(())
    }

    /// Allow `kind` in `state`, creating the entity's instance if needed.
    /// When `state` is the current state the option starts running at once.
    pub fn add_movement_option(&mut self, state: StateId, kind: &str) -> Result<(), ConfigError> {
        let descriptor = *self.registry.get(kind)?;
        if !self.states.contains_key(&state) {
            return Err(ConfigError::MissingState(state));
        }
        let oid = self.add_general_option(descriptor.kind)?;
        let target = self.states.get_mut(&state).ok_or(ConfigError::MissingState(state))?;
        let newly_allowed = !target.movement_options().contains(&descriptor.kind);
        target.add_movement_option(&descriptor);

        if newly_allowed && self.current == Some(state) {
            if let Some(option) = self.options.get_mut(oid) {
                option.initialize(oid, &mut target.handler);
            }
        }
        Ok(())
    }

    /// Disallow `kind` in `state`. When `state` is the current state the
    /// option is stopped first.
    pub fn remove_movement_option(&mut self, state: StateId, kind: &str) -> Result<bool, ConfigError> {
        let target = self
            .states
            .get_mut(&state)
            .ok_or(ConfigError::MissingState(state))?;
        if !target.movement_options().iter().any(|k| *k == kind) {
            return Ok(false);
        }

        if self.current == Some(state) {
            if let Some(option) = self.options.find(kind).and_then(|oid| self.options.get_mut(oid)) {
                option.stop(&mut target.handler);
            }
        }
        target.remove_movement_option(kind, &self.registry)
    }

    pub fn add_transition(
        &mut self,
        source: StateId,
        target: StateId,
        request: RequestTag,
    ) -> Result<(), ConfigError> {
        if !self.states.contains_key(&target) {
            return Err(ConfigError::UnresolvedState {
                from: source,
                to: target,
            });
        }
        self.state_entry(source)?.add_transition(target, request);
        Ok(())
    }

    pub fn remove_transition(&mut self, source: StateId, index: usize) -> Result<Option<Transition>, ConfigError> {
        Ok(self.state_entry(source)?.remove_transition(index))
    }

    pub fn rebind_transition(
        &mut self,
        source: StateId,
        index: usize,
        request: RequestTag,
    ) -> Result<bool, ConfigError> {
        Ok(self.state_entry(source)?.rebind_transition(index, request))
    }

    pub fn set_request_priority(
        &mut self,
        state: StateId,
        request: RequestTag,
        priority: i32,
    ) -> Result<(), ConfigError> {
        self.state_entry(state)?.set_priority(request, priority);
        Ok(())
    }

    fn state_entry(&mut self, id: StateId) -> Result<&mut MovementState, ConfigError> {
        self.states.get_mut(&id).ok_or(ConfigError::MissingState(id))
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    pub fn state(&self, id: StateId) -> Option<&MovementState> {
        self.states.get(&id)
    }

    pub fn states(&self) -> impl Iterator<Item = &MovementState> {
        self.states.values()
    }

    pub fn initial_state_id(&self) -> Option<StateId> {
        self.states.values().find(|s| s.is_initial()).map(|s| s.id())
    }

    pub fn current_state_id(&self) -> Option<StateId> {
        self.current
    }

    pub fn current_state(&self) -> Option<&MovementState> {
        self.current.and_then(|id| self.states.get(&id))
    }

    pub fn is_started(&self) -> bool {
        self.current.is_some()
    }

    pub fn pending_requests(&self) -> usize {
        self.queue.len()
    }

    pub fn options(&self) -> &OptionPool {
        &self.options
    }

    pub fn velocity(&self) -> Vec3 {
        self.current_state()
            .map_or(Vec3::ZERO, |s| s.handler().velocity())
    }

    pub fn speed(&self) -> f32 {
        self.velocity().length()
    }

    pub fn player_direction(&self) -> Vec3 {
        self.current_state()
            .map_or(Vec3::ZERO, |s| s.handler().player_direction())
    }

    /// Asked by the ground-snapping code before it pulls the body down.
    pub fn player_action_prevents_ground_snapping(&self) -> bool {
        self.current_state().map_or(false, |s| {
            s.handler()
                .check_player_action_prevents_ground_snapping(&self.options)
        })
    }

    // -----------------------------------------------------------------------
    // Lifecycle
    // -----------------------------------------------------------------------

    /// Check the graph is complete and consistent.
    pub fn validate(&self) -> Result<StateId, ConfigError> {
        let initial: Vec<StateId> = self
            .states
            .values()
            .filter(|s| s.is_initial())
            .map(|s| s.id())
            .collect();
        let initial = match initial.as_slice() {
            [] => return Err(ConfigError::NoInitialState),
            [id] => *id,
            many => {
                return Err(ConfigError::MultipleInitialStates { count: many.len() });
            }
        };

        for state in self.states.values() {
            for transition in state.transitions() {
                if !self.states.contains_key(&transition.target()) {
                    return Err(ConfigError::UnresolvedState {
                        from: state.id(),
                        to: transition.target(),
                    });
                }
            }
            for kind in state.movement_options() {
                if self.options.find(kind).is_none() {
                    return Err(ConfigError::UnknownOption(kind.to_string()));
                }
            }
        }
        Ok(initial)
    }

    /// Validate the graph and enter the initial state.
    pub fn start(&mut self) -> Result<(), ConfigError> {
        let initial = self.validate()?;
        if self.current.is_some() {
            return Ok(());
        }
        self.queue.clear();
        self.enter(initial, None)?;
        Ok(())
    }

    fn require_current(&self) -> Result<StateId, MachineError> {
        self.current.ok_or(MachineError::NotStarted)
    }

    /// Queue `request` on behalf of the current state. Ignored when the
    /// current state has no transition for it.
    pub fn request_state_change(&mut self, request: RequestTag) -> Result<bool, MachineError> {
        let current = self.require_current()?;
        let state = self
            .states
            .get(&current)
            .ok_or(ConfigError::MissingState(current))?;
        Ok(state.request_state_change(request, &mut self.queue))
    }

    /// Variable-rate tick.
    pub fn update(&mut self, input: &dyn InputSource, dt: f32) -> Result<(), MachineError> {
        self.resolve_transitions()?;
        self.dispatch(Clock::Update, input, dt)?;
        self.resolve_transitions()?;
        Ok(())
    }

    /// Fixed-rate tick. Reads the body before the options run and writes it
    /// back right after.
    pub fn fixed_update(
        &mut self,
        body: &mut dyn PhysicsBody,
        input: &dyn InputSource,
        dt: f32,
    ) -> Result<(), MachineError> {
        self.resolve_transitions()?;
        let current = self.require_current()?;
        self.state_entry(current)?.handler.sync_from(body);
        self.dispatch(Clock::Fixed, input, dt)?;
        let current = self.require_current()?;
        self.state_entry(current)?.handler.write_to(body);
        self.resolve_transitions()?;
        Ok(())
    }

    fn dispatch(&mut self, clock: Clock, input: &dyn InputSource, dt: f32) -> Result<(), MachineError> {
        let current = self.require_current()?;
        let state = self
            .states
            .get_mut(&current)
            .ok_or(ConfigError::MissingState(current))?;

        for id in state.handler.listeners(clock) {
            let Some(option) = self.options.get_mut(id) else {
                continue;
            };
            let mut ctx = TickContext {
                handler: &mut state.handler,
                input,
                dt,
            };
            match clock {
                Clock::Update => option.update(&mut ctx),
                Clock::Fixed => option.fixed_update(&mut ctx),
            }
        }

        let requests = state.handler.take_requests();
        if !requests.is_empty() {
            state.request_state_changes(requests, &mut self.queue);
        }
        Ok(())
    }

    /// Drain the queue, taking the first transition that still leaves the
    /// current state.
    fn resolve_transitions(&mut self) -> Result<Option<StateId>, MachineError> {
        let current = self.require_current()?;
        let mut chosen = None;
        while let Some(pending) = self.queue.pop() {
            let queued = pending.transition;
            let live = if queued.source() == current {
                self.states
                    .get(&current)
                    .and_then(|s| s.find_transition(queued.request()))
                    .copied()
            } else {
                None
            };
            if let Some(transition) = live {
                chosen = Some(transition);
                break;
            }
            debug!(request = %queued.request(), "request_discarded");
        }

        if !self.queue.is_empty() {
            debug!(count = self.queue.len(), "pending_requests_cleared");
            self.queue.clear();
        }

        match chosen {
            Some(transition) => {
                self.switch_to(transition)?;
                Ok(Some(transition.target()))
            }
            None => Ok(None),
        }
    }

    fn switch_to(&mut self, transition: Transition) -> Result<(), ConfigError> {
        let from = transition.source();
        let to = transition.target();
        if !self.states.contains_key(&to) {
            return Err(ConfigError::UnresolvedState { from, to });
        }

        let snapshot = self.exit(from)?;
        self.enter(to, Some((from, snapshot)))?;
        info!(
            from = %from,
            to = %to,
            request = %transition.request(),
            "state_transition"
        );
        Ok(())
    }

    fn exit(&mut self, id: StateId) -> Result<BodySnapshot, ConfigError> {
        let state = self.states.get_mut(&id).ok_or(ConfigError::MissingState(id))?;
        let kinds = state.movement_options().to_vec();
        for kind in kinds {
            if let Some(option) = self.options.find(kind).and_then(|oid| self.options.get_mut(oid)) {
                option.stop(&mut state.handler);
            }
        }
        let snapshot = state.on_exit();
        for listener in &mut self.listeners {
            listener.on_exit(state);
        }
        Ok(snapshot)
    }

    fn enter(
        &mut self,
        id: StateId,
        previous: Option<(StateId, BodySnapshot)>,
    ) -> Result<(), ConfigError> {
        let snapshot = previous.map(|(_, s)| s).unwrap_or_default();
        let state = self.states.get_mut(&id).ok_or(ConfigError::MissingState(id))?;
        state.on_enter(snapshot);
        let kinds = state.movement_options().to_vec();
        for kind in kinds {
            let Some(oid) = self.options.find(kind) else {
                continue;
            };
            if let Some(option) = self.options.get_mut(oid) {
                option.initialize(oid, &mut state.handler);
            }
        }
        self.current = Some(id);

        let state = self.states.get(&id).ok_or(ConfigError::MissingState(id))?;
        let previous = previous.and_then(|(prev, _)| self.states.get(&prev));
        for listener in &mut self.listeners {
            listener.on_enter(state, previous);
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Persistence hooks
    // -----------------------------------------------------------------------

    pub(crate) fn insert_loaded_state(&mut self, state: MovementState) -> Result<(), ConfigError> {
        let id = state.id();
        if self.states.contains_key(&id) {
            return Err(ConfigError::DuplicateState(id));
        }
        self.ids.reserve(id);
        self.states.insert(id, state);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_monotonic_per_machine() {
        let mut a = MovementStateMachine::new(OptionRegistry::builtin(), MovementSettings::default());
        let mut b = MovementStateMachine::new(OptionRegistry::builtin(), MovementSettings::default());
        let first = a.add_state("A");
        let second = a.add_state("B");
        a.remove_state(second).unwrap();
        let third = a.add_state("C");
        assert_eq!((first, second, third), (StateId(0), StateId(1), StateId(2)));
        assert_eq!(b.add_state("Other"), StateId(0));
    }

    #[test]
    fn reserve_skips_loaded_ids() {
        let mut ids = StateIdGenerator::default();
        ids.reserve(StateId(7));
        assert_eq!(ids.next_id(), StateId(8));
        ids.reserve(StateId(2));
        assert_eq!(ids.next_id(), StateId(9));
    }

    #[test]
    fn removing_a_state_drops_transitions_into_it() {
        let mut m = MovementStateMachine::new(OptionRegistry::builtin(), MovementSettings::default());
        let idle = m.add_state("Idle");
        let air = m.add_state("Air");
        m.add_transition(idle, air, RequestTag::Jump).unwrap();
        m.remove_state(air).unwrap();
        assert!(m.state(idle).unwrap().transitions().is_empty());
    }

    #[test]
    fn start_requires_exactly_one_initial_state() {
        let mut m = MovementStateMachine::new(OptionRegistry::builtin(), MovementSettings::default());
        m.add_state("A");
        assert!(matches!(m.start(), Err(ConfigError::NoInitialState)));
    }

    #[test]
    fn ticking_before_start_fails() {
        let mut m = MovementStateMachine::new(OptionRegistry::builtin(), MovementSettings::default());
        let input = crate::engine::input::InputState::new();
        assert!(matches!(m.update(&input, 0.016), Err(MachineError::NotStarted)));
    }
}
