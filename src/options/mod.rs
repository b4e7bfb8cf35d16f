//! Pluggable movement behaviors.
//!
//! A [`MovementOption`] is bound to the handler of whichever state is active,
//! registers callbacks on one or both clocks, nudges the body's velocity and
//! may raise a single kind of transition request.

pub mod jump;
pub mod planar;
pub mod wall_grab;
pub mod wall_run;

pub use jump::{jump_direction, jump_speed, jump_velocity_delta, JumpOption};
pub use planar::PlanarMovement;
pub use wall_grab::WallGrab;
pub use wall_run::{WallRun, WallRunState};

use crate::engine::input::InputSource;
use crate::movement::handler::{CallbackToken, Clock, StateMovementHandler};
use crate::movement::RequestTag;

/// Index of an option instance in its machine's [`OptionPool`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OptionId(pub usize);

/// Which clocks an option listens to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Clocks {
    Update,
    Fixed,
    Both,
}

impl Clocks {
    fn iter(self) -> impl Iterator<Item = Clock> {
        let (update, fixed) = match self {
            Clocks::Update => (true, false),
            Clocks::Fixed => (false, true),
            Clocks::Both => (true, true),
        };
        [(update, Clock::Update), (fixed, Clock::Fixed)]
            .into_iter()
            .filter_map(|(on, clock)| on.then_some(clock))
    }
}

/// Tokens an option holds while bound to a handler.
#[derive(Debug, Default)]
pub struct Registrations {
    tokens: Vec<CallbackToken>,
}

impl Registrations {
    pub fn register(&mut self, id: OptionId, clocks: Clocks, handler: &mut StateMovementHandler) {
        for clock in clocks.iter() {
            self.tokens.push(handler.register(clock, id));
        }
    }

    pub fn unregister_all(&mut self, handler: &mut StateMovementHandler) {
        for token in self.tokens.drain(..) {
            handler.unregister(token);
        }
    }

    pub fn is_bound(&self) -> bool {
        !self.tokens.is_empty()
    }
}

/// Everything a callback gets to see during one dispatch.
pub struct TickContext<'a> {
    pub handler: &'a mut StateMovementHandler,
    pub input: &'a dyn InputSource,
    pub dt: f32,
}

pub trait MovementOption {
    /// Registry key, also the name stored in saved graphs.
    fn kind(&self) -> &'static str;

    fn name(&self) -> &str {
        self.kind()
    }

    fn clocks(&self) -> Clocks;

    fn registrations_mut(&mut self) -> &mut Registrations;

    /// The single tag this option may raise.
    fn transition_request(&self) -> RequestTag {
        RequestTag::None
    }

    /// Recompute cached values derived from the tunables.
    fn validate(&mut self) {}

    /// Bind to the handler of the state that is becoming active.
    fn initialize(&mut self, id: OptionId, handler: &mut StateMovementHandler) {
        let clocks = self.clocks();
        self.registrations_mut().register(id, clocks, handler);
    }

    /// Drop every callback registered by [`initialize`](Self::initialize).
    /// A no-op when the option is not bound.
    fn stop(&mut self, handler: &mut StateMovementHandler) {
        self.registrations_mut().unregister_all(handler);
    }

    fn update(&mut self, _ctx: &mut TickContext<'_>) {}

    fn fixed_update(&mut self, _ctx: &mut TickContext<'_>) {}

    fn request_state_change(&self, handler: &mut StateMovementHandler) {
        handler.request_state_change(self.transition_request());
    }

    fn suppresses_ground_snap(&self) -> bool {
        false
    }
}

struct OptionSlot {
    kind: &'static str,
    option: Box<dyn MovementOption>,
}

/// Owns one instance of every option kind a machine uses.
#[derive(Default)]
pub struct OptionPool {
    slots: Vec<OptionSlot>,
}

impl OptionPool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, option: Box<dyn MovementOption>) -> OptionId {
        let kind = option.kind();
        if let Some(id) = self.find(kind) {
            self.slots[id.0].option = option;
            return id;
        }
        self.slots.push(OptionSlot { kind, option });
        OptionId(self.slots.len() - 1)
    }

    pub fn find(&self, kind: &str) -> Option<OptionId> {
        self.slots
            .iter()
            .position(|slot| slot.kind == kind)
            .map(OptionId)
    }

    pub fn get(&self, id: OptionId) -> Option<&dyn MovementOption> {
        self.slots.get(id.0).map(|slot| slot.option.as_ref())
    }

    pub fn get_mut(&mut self, id: OptionId) -> Option<&mut (dyn MovementOption + 'static)> {
        self.slots.get_mut(id.0).map(|slot| slot.option.as_mut())
    }

    pub fn kinds(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.slots.iter().map(|slot| slot.kind)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}
