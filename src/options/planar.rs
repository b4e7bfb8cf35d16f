use glam::{Vec2, Vec3};

use super::{Clocks, MovementOption, Registrations, TickContext};
use crate::movement::RequestTag;
use crate::settings::PlanarSettings;

pub const KIND: &str = "planar";

/// Steers planar velocity toward the move axis, along the ground plane.
/// Raises [`RequestTag::Land`] when ground contact is regained.
pub struct PlanarMovement {
    settings: PlanarSettings,
    registrations: Registrations,
    desired: Vec2,
    was_grounded: bool,
}

impl PlanarMovement {
    pub fn new(settings: PlanarSettings) -> Self {
        Self {
            settings,
            registrations: Registrations::default(),
            desired: Vec2::ZERO,
            was_grounded: false,
        }
    }
}

fn move_towards(current: f32, target: f32, max_delta: f32) -> f32 {
    if (target - current).abs() <= max_delta {
        target
    } else {
        current + (target - current).signum() * max_delta
    }
}

fn project_on_plane(v: Vec3, normal: Vec3) -> Vec3 {
    (v - normal * v.dot(normal)).normalize_or_zero()
}

impl MovementOption for PlanarMovement {
    fn kind(&self) -> &'static str {
        KIND
    }

    fn name(&self) -> &str {
        "Planar movement"
    }

    fn clocks(&self) -> Clocks {
        Clocks::Both
    }

    fn registrations_mut(&mut self) -> &mut Registrations {
        &mut self.registrations
    }

    fn transition_request(&self) -> RequestTag {
        RequestTag::Land
    }

    fn validate(&mut self) {
        self.settings.max_speed = self.settings.max_speed.max(0.0);
        self.settings.max_acceleration = self.settings.max_acceleration.max(0.0);
        self.settings.max_air_acceleration = self.settings.max_air_acceleration.max(0.0);
    }

    fn update(&mut self, ctx: &mut TickContext<'_>) {
        self.desired = ctx.input.move_axis().clamp_length_max(1.0) * self.settings.max_speed;
    }

    fn fixed_update(&mut self, ctx: &mut TickContext<'_>) {
        let contacts = *ctx.handler.contacts();
        let grounded = contacts.on_ground();
        let normal = if grounded { contacts.ground_normal } else { Vec3::Y };

        let x_axis = project_on_plane(Vec3::X, normal);
        let z_axis = project_on_plane(Vec3::Z, normal);
        let velocity = ctx.handler.velocity();
        let current_x = velocity.dot(x_axis);
        let current_z = velocity.dot(z_axis);

        let acceleration = if grounded {
            self.settings.max_acceleration
        } else {
            self.settings.max_air_acceleration
        };
        let max_change = acceleration * ctx.dt;
        let new_x = move_towards(current_x, self.desired.x, max_change);
        let new_z = move_towards(current_z, self.desired.y, max_change);
        ctx.handler
            .add_velocity(x_axis * (new_x - current_x) + z_axis * (new_z - current_z));

        if grounded && !self.was_grounded {
            self.request_state_change(ctx.handler);
        }
        self.was_grounded = grounded;
    }
}
