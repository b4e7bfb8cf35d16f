use glam::Vec3;

use super::body::{Contacts, PhysicsBody, SurfaceMaterial};
use super::request::RequestTag;
use crate::options::{OptionId, OptionPool};

/// The two clocks a movement option can listen to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Clock {
    /// Variable rate, once per rendered frame.
    Update,
    /// Fixed rate, once per physics step.
    Fixed,
}

/// Handle returned by [`StateMovementHandler::register`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CallbackToken(u64);

#[derive(Debug, Clone, Copy)]
struct Registration {
    token: CallbackToken,
    clock: Clock,
    option: OptionId,
}

/// Body state as seen by the options of one state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodySnapshot {
    pub velocity: Vec3,
    pub contacts: Contacts,
    pub gravity: Vec3,
    pub material: SurfaceMaterial,
}

impl Default for BodySnapshot {
    fn default() -> Self {
        Self {
            velocity: Vec3::ZERO,
            contacts: Contacts::default(),
            gravity: Vec3::new(0.0, -9.81, 0.0),
            material: SurfaceMaterial::Default,
        }
    }
}

/// Per-state driver of movement options.
///
/// Holds the authoritative velocity while its state is active, the ordered
/// callback table for both clocks, and the requests options raised during
/// the current dispatch.
#[derive(Debug, Default)]
pub struct StateMovementHandler {
    body: BodySnapshot,
    callbacks: Vec<Registration>,
    next_token: u64,
    requests: Vec<RequestTag>,
    snap_guard: Option<OptionId>,
}

impl StateMovementHandler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn velocity(&self) -> Vec3 {
        self.body.velocity
    }

    pub fn set_velocity(&mut self, velocity: Vec3) {
        self.body.velocity = velocity;
    }

    pub fn add_velocity(&mut self, delta: Vec3) {
        self.body.velocity += delta;
    }

    pub fn speed(&self) -> f32 {
        self.body.velocity.length()
    }

    /// Normalized velocity, zero while standing still.
    pub fn player_direction(&self) -> Vec3 {
        self.body.velocity.normalize_or_zero()
    }

    pub fn contacts(&self) -> &Contacts {
        &self.body.contacts
    }

    pub fn set_contacts(&mut self, contacts: Contacts) {
        self.body.contacts = contacts;
    }

    pub fn gravity(&self) -> Vec3 {
        self.body.gravity
    }

    pub fn set_gravity(&mut self, gravity: Vec3) {
        self.body.gravity = gravity;
    }

    pub fn material(&self) -> SurfaceMaterial {
        self.body.material
    }

    pub fn set_material(&mut self, material: SurfaceMaterial) {
        self.body.material = material;
    }

    pub fn snapshot(&self) -> BodySnapshot {
        self.body
    }

    /// Take over the body state of the handler being left.
    pub fn adopt(&mut self, previous: BodySnapshot) {
        self.body = previous;
    }

    pub fn sync_from(&mut self, body: &dyn PhysicsBody) {
        self.body = BodySnapshot {
            velocity: body.velocity(),
            contacts: body.contacts(),
            gravity: body.gravity(),
            material: body.material(),
        };
    }

    pub fn write_to(&self, body: &mut dyn PhysicsBody) {
        body.set_velocity(self.body.velocity);
        body.set_material(self.body.material);
    }

    // -----------------------------------------------------------------------
    // Callback table
    // -----------------------------------------------------------------------

    pub fn register(&mut self, clock: Clock, option: OptionId) -> CallbackToken {
        let token = CallbackToken(self.next_token);
        self.next_token += 1;
        self.callbacks.push(Registration {
            token,
            clock,
            option,
        });
        token
    }

    /// Remove a registration. Returns false if the token was already gone.
    pub fn unregister(&mut self, token: CallbackToken) -> bool {
        let before = self.callbacks.len();
        self.callbacks.retain(|r| r.token != token);
        self.callbacks.len() != before
    }

    /// Options listening to `clock`, in registration order.
    pub fn listeners(&self, clock: Clock) -> Vec<OptionId> {
        self.callbacks
            .iter()
            .filter(|r| r.clock == clock)
            .map(|r| r.option)
            .collect()
    }

    pub fn registration_count(&self) -> usize {
        self.callbacks.len()
    }

    // -----------------------------------------------------------------------
    // Requests
    // -----------------------------------------------------------------------

    /// Queue `request` for arbitration once the current dispatch ends.
    pub fn request_state_change(&mut self, request: RequestTag) {
        if request != RequestTag::None {
            self.requests.push(request);
        }
    }

    pub fn take_requests(&mut self) -> Vec<RequestTag> {
        std::mem::take(&mut self.requests)
    }

    // -----------------------------------------------------------------------
    // Ground snapping
    // -----------------------------------------------------------------------

    pub fn set_snap_guard(&mut self, guard: Option<OptionId>) {
        self.snap_guard = guard;
    }

    pub fn snap_guard(&self) -> Option<OptionId> {
        self.snap_guard
    }

    /// True while the registered guard (the jump option) asks for ground
    /// snapping to stay off, so a fresh jump is not pulled back down.
    pub fn check_player_action_prevents_ground_snapping(&self, pool: &OptionPool) -> bool {
        self.snap_guard
            .and_then(|id| pool.get(id))
            .map_or(false, |option| option.suppresses_ground_snap())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unregister_is_idempotent() {
        let mut handler = StateMovementHandler::new();
        let a = handler.register(Clock::Update, OptionId(0));
        let b = handler.register(Clock::Fixed, OptionId(1));
        assert!(handler.unregister(a));
        assert!(!handler.unregister(a));
        assert_eq!(handler.registration_count(), 1);
        assert!(handler.unregister(b));
    }

    #[test]
    fn listeners_keep_registration_order_per_clock() {
        let mut handler = StateMovementHandler::new();
        handler.register(Clock::Fixed, OptionId(2));
        handler.register(Clock::Update, OptionId(0));
        handler.register(Clock::Fixed, OptionId(1));
        assert_eq!(handler.listeners(Clock::Fixed), vec![OptionId(2), OptionId(1)]);
        assert_eq!(handler.listeners(Clock::Update), vec![OptionId(0)]);
    }

    #[test]
    fn none_requests_are_not_buffered() {
        let mut handler = StateMovementHandler::new();
        handler.request_state_change(RequestTag::None);
        handler.request_state_change(RequestTag::Jump);
        assert_eq!(handler.take_requests(), vec![RequestTag::Jump]);
        assert!(handler.take_requests().is_empty());
    }

    #[test]
    fn direction_is_zero_when_still() {
        let mut handler = StateMovementHandler::new();
        assert_eq!(handler.player_direction(), Vec3::ZERO);
        handler.add_velocity(Vec3::new(3.0, 0.0, 4.0));
        assert!((handler.speed() - 5.0).abs() < 1e-6);
        assert!((handler.player_direction() - Vec3::new(0.6, 0.0, 0.8)).length() < 1e-6);
    }
}
