use glam::Vec3;
use hecs::World;

use crate::components::{GravityAffected, Position, Static, Velocity};
use crate::settings::SandboxSettings;

use super::collision::collision_system;

pub const PHYSICS_DT: f32 = 1.0 / 60.0;
pub const GRAVITY: Vec3 = Vec3::new(0.0, -9.81, 0.0);

/// Advance one fixed step: gravity, semi-implicit Euler integration, then
/// collision resolution, which also rebuilds every body's contacts.
pub fn physics_step(world: &mut World, settings: &SandboxSettings) {
    for (_entity, (position, velocity, gravity)) in world
        .query_mut::<(&mut Position, &mut Velocity, Option<&GravityAffected>)>()
        .without::<&Static>()
    {
        if gravity.is_some() {
            velocity.0 += GRAVITY * PHYSICS_DT;
        }
        // Semi-implicit Euler: update velocity first, then position
        position.0 += velocity.0 * PHYSICS_DT;
    }

    collision_system(world, settings);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn free_fall_integrates_gravity() {
        let mut world = World::new();
        let body = world.spawn((Position(Vec3::new(0.0, 10.0, 0.0)), Velocity(Vec3::ZERO), GravityAffected));
        physics_step(&mut world, &SandboxSettings::default());

        let velocity = world.get::<&Velocity>(body).unwrap().0;
        let position = world.get::<&Position>(body).unwrap().0;
        assert!((velocity.y - GRAVITY.y * PHYSICS_DT).abs() < 1e-6);
        assert!((position.y - (10.0 + velocity.y * PHYSICS_DT)).abs() < 1e-6);
    }
}
