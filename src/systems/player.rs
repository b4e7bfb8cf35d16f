use glam::Vec3;
use hecs::{Entity, World};

use crate::components::{Contacts, GroundTracker, Position, Surface, Velocity};
use crate::engine::input::InputSource;
use crate::error::MachineError;
use crate::movement::{MovementStateMachine, PhysicsBody, SurfaceMaterial};
use crate::settings::SandboxSettings;

use super::physics::GRAVITY;
use super::raycast::raycast_static;

/// Borrowed view of the player's physics components, handed to the
/// movement machine for one fixed tick.
pub struct PlayerBody<'a> {
    pub velocity: &'a mut Velocity,
    pub contacts: &'a Contacts,
    pub surface: &'a mut Surface,
}

impl PhysicsBody for PlayerBody<'_> {
    fn velocity(&self) -> Vec3 {
        self.velocity.0
    }

    fn set_velocity(&mut self, velocity: Vec3) {
        self.velocity.0 = velocity;
    }

    fn contacts(&self) -> Contacts {
        *self.contacts
    }

    fn gravity(&self) -> Vec3 {
        GRAVITY
    }

    fn material(&self) -> SurfaceMaterial {
        self.surface.0
    }

    fn set_material(&mut self, material: SurfaceMaterial) {
        self.surface.0 = material;
    }
}

/// Run the player's movement machine for one fixed tick against its body.
pub fn player_movement_system(
    world: &mut World,
    player: Entity,
    machine: &mut MovementStateMachine,
    input: &dyn InputSource,
    dt: f32,
) -> Result<(), MachineError> {
    let Ok((velocity, contacts, surface)) =
        world.query_one_mut::<(&mut Velocity, &Contacts, &mut Surface)>(player)
    else {
        return Ok(());
    };
    let mut body = PlayerBody {
        velocity,
        contacts,
        surface,
    };
    machine.fixed_update(&mut body, input, dt)
}

/// Keep the player glued to the ground when it runs off a small ledge or
/// crests a slope. Skipped for a tick after leaving the ground on its own
/// and while `prevented` (an action such as a jump just launched it).
///
/// Returns true when the player was snapped this tick.
pub fn snap_to_ground_system(
    world: &mut World,
    player: Entity,
    settings: &SandboxSettings,
    prevented: bool,
) -> bool {
    let Ok((position, velocity, contacts, tracker)) =
        world.query_one_mut::<(&Position, &Velocity, &Contacts, &mut GroundTracker)>(player)
    else {
        return false;
    };

    tracker.ticks_since_grounded = tracker.ticks_since_grounded.saturating_add(1);
    if contacts.on_ground() {
        tracker.ticks_since_grounded = 0;
        return false;
    }
    if tracker.ticks_since_grounded > 1 || prevented {
        return false;
    }
    let (position, velocity) = (position.0, velocity.0);

    let speed = velocity.length();
    if speed > settings.max_snap_speed {
        return false;
    }
    let Some(hit) = raycast_static(world, position, Vec3::NEG_Y, settings.snap_ray_distance) else {
        return false;
    };
    if hit.normal.y < settings.min_ground_dot() {
        return false;
    }

    let mut snapped = velocity;
    let dot = velocity.dot(hit.normal);
    if dot > 0.0 {
        snapped = (velocity - hit.normal * dot).normalize_or_zero() * speed;
    }

    if let Ok((velocity, contacts, tracker)) =
        world.query_one_mut::<(&mut Velocity, &mut Contacts, &mut GroundTracker)>(player)
    {
        velocity.0 = snapped;
        contacts.clear();
        contacts.add_ground(hit.normal);
        contacts.finish();
        tracker.ticks_since_grounded = 0;
    }
    true
}
